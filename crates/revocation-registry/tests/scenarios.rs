//! End-to-end revocation scenarios, run against both backends.

use std::sync::Arc;
use std::time::Duration;

use revocation_registry::core::{Digest, RevokedClaimsInfo, RevokedTokenInfo};
use revocation_registry::store::{ManualClock, RevocationStore};
use revocation_registry::{
    ErrorClass, HashAlgorithm, Registry, RegistryConfig, RevocationReadFact, RevocationWriteFact,
    RetentionConfig, StoreConfig, Timestamp,
};
use revocation_registry_testkit::TestFixture;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn registries(start: u64) -> Vec<(Registry, ManualClock)> {
    init_tracing();
    let memory = TestFixture::memory(start);
    let sqlite = TestFixture::sqlite(start, 5).unwrap();
    vec![
        (
            Registry::new(memory.dyn_store(), RegistryConfig::default()),
            memory.clock,
        ),
        (
            Registry::new(sqlite.dyn_store(), RegistryConfig::default()),
            sqlite.clock,
        ),
    ]
}

#[tokio::test]
async fn token_revocation_is_served_as_digest() {
    for (registry, clock) in registries(5000) {
        let record = registry
            .revoke(RevocationWriteFact::token("abc.def.ghi", 1000u64).into())
            .await
            .unwrap();
        clock.set(Timestamp(5001));

        let records = registry.revocations_since(Timestamp::ZERO).await.unwrap();
        assert_eq!(records, vec![record.clone()]);
        assert_eq!(
            record.fact,
            RevocationReadFact::Token(RevokedTokenInfo {
                token_hash: Digest::from_base64("ZVnpC13VdAW98YDym1CQU6PTbEq_PeU1qySbVNQycjQ=")
                    .unwrap(),
                hash_algorithm: HashAlgorithm::Sha256,
                issued_before: Timestamp(1000),
            }),
            "backend {}",
            registry.store().backend()
        );
    }
}

#[tokio::test]
async fn claim_revocation_is_served_as_names_and_digest() {
    for (registry, _clock) in registries(5000) {
        let record = registry
            .revoke(
                RevocationWriteFact::claims([("sub", "u1"), ("realm", "employees")], 2000u64)
                    .into(),
            )
            .await
            .unwrap();

        assert_eq!(
            record.fact,
            RevocationReadFact::ClaimSet(RevokedClaimsInfo {
                names: vec!["realm".into(), "sub".into()],
                value_hash: Digest::from_base64("31u--JmKAhb1XC5XVYxQvaSJi5DScehI8o8y-gyM4Zc=")
                    .unwrap(),
                hash_algorithm: HashAlgorithm::Sha256,
                separator: '|',
                issued_before: Timestamp(2000),
            })
        );
    }
}

#[tokio::test]
async fn list_since_returns_later_records_in_order() {
    for (registry, clock) in registries(0) {
        let mut records = Vec::new();
        for t in [10u64, 20, 30] {
            clock.set(Timestamp(t));
            records.push(
                registry
                    .revoke(RevocationWriteFact::global(t).into())
                    .await
                    .unwrap(),
            );
        }

        let since_15 = registry.revocations_since(Timestamp(15)).await.unwrap();
        assert_eq!(since_15, records[1..].to_vec());

        // Inclusive at the cursor, exclusive one second later.
        let at_20 = registry.revocations_since(Timestamp(20)).await.unwrap();
        assert_eq!(at_20, records[1..].to_vec());
        let after_30 = registry.revocations_since(Timestamp(31)).await.unwrap();
        assert!(after_30.is_empty());
    }
}

#[tokio::test]
async fn prune_removes_only_expired_records() {
    for (registry, clock) in registries(0) {
        let config = RegistryConfig {
            retention: RetentionConfig {
                max_credential_lifetime_secs: 25,
                prune_interval_secs: 60,
            },
            ..Default::default()
        };
        let registry = Registry::new(registry.store().clone(), config);

        let mut records = Vec::new();
        for t in [10u64, 20, 30] {
            clock.set(Timestamp(t));
            records.push(
                registry
                    .revoke(RevocationWriteFact::global(t).into())
                    .await
                    .unwrap(),
            );
        }
        clock.set(Timestamp(40));

        let report = registry.prune().await.unwrap();
        assert_eq!(report.cutoff, Timestamp(15));
        assert_eq!(report.removed_records, 1);

        let remaining = registry.revocations_since(Timestamp::ZERO).await.unwrap();
        assert_eq!(remaining, records[1..].to_vec());

        // A second pass changes nothing.
        let again = registry.prune().await.unwrap();
        assert_eq!(again.removed_records, 0);
        assert_eq!(
            registry.revocations_since(Timestamp::ZERO).await.unwrap(),
            remaining
        );
    }
}

#[tokio::test]
async fn poller_sees_each_record_after_its_watermark() {
    for (registry, clock) in registries(100) {
        let mut poller = registry.poller(Timestamp::ZERO);
        assert!(poller.poll().await.unwrap().is_empty());

        clock.set(Timestamp(110));
        let record = registry
            .revoke(RevocationWriteFact::claims([("sub", "u9")], 105u64).into())
            .await
            .unwrap();

        let page = poller.poll().await.unwrap();
        assert_eq!(page, vec![record]);
        assert_eq!(poller.cursor(), Timestamp(110));
    }
}

#[tokio::test]
async fn out_of_range_issued_before_is_a_client_error_on_every_backend() {
    for (registry, _clock) in registries(100) {
        let backend = registry.store().backend();
        let err = registry
            .revoke(RevocationWriteFact::global(u64::MAX).into())
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidInput, "backend {}", backend);
        assert!(!err.is_retryable());

        let record = registry
            .revoke(RevocationWriteFact::global(Timestamp::MAX_ISSUED_BEFORE).into())
            .await
            .unwrap();
        assert_eq!(
            registry.revocations_since(Timestamp::ZERO).await.unwrap(),
            vec![record],
            "backend {}",
            backend
        );
    }
}

#[tokio::test]
async fn sqlite_registry_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = RegistryConfig {
        store: StoreConfig::Sqlite {
            path: dir.path().join("registry.db"),
            bucket_width_secs: 60,
            write_visibility_window_secs: 0,
        },
        ..Default::default()
    };
    let clock = ManualClock::new(Timestamp(1000));

    let written = {
        let registry =
            Registry::from_config_with_clock(config.clone(), Arc::new(clock.clone())).unwrap();
        registry
            .revoke(RevocationWriteFact::token("abc.def.ghi", 999u64).into())
            .await
            .unwrap()
    };

    clock.set(Timestamp(1001));
    let registry = Registry::from_config_with_clock(config, Arc::new(clock)).unwrap();
    let records = registry.revocations_since(Timestamp::ZERO).await.unwrap();
    assert_eq!(records, vec![written]);
}

#[tokio::test]
async fn background_pruner_enforces_retention() {
    init_tracing();
    let fixture = TestFixture::memory(0);
    fixture.append_globals_at(&[10, 20, 30]).await.unwrap();
    fixture.clock.set(Timestamp(40));

    let pruner = revocation_registry::Pruner::spawn(
        fixture.dyn_store(),
        Duration::from_secs(25),
        Duration::from_millis(10),
    )
    .unwrap();

    let mut remaining = 0;
    for _ in 0..200 {
        remaining = fixture
            .store
            .list_since(Timestamp::ZERO)
            .await
            .unwrap()
            .len();
        if remaining == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(remaining, 2);
    pruner.shutdown().await;
}

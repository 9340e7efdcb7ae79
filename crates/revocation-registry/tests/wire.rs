//! Wire format: JSON requests in, JSON records out.

use proptest::prelude::*;
use serde_json::{json, Value};

use revocation_registry::{
    ErrorClass, Registry, RegistryConfig, RegistryError, RevocationRecord, RevocationRequest,
    Timestamp,
};
use revocation_registry_testkit::generators::{fact_from_params, FactParams};
use revocation_registry_testkit::TestFixture;

fn registry() -> (Registry, TestFixture<revocation_registry::store::MemoryStore>) {
    let fixture = TestFixture::memory(1010);
    (
        Registry::new(fixture.dyn_store(), RegistryConfig::default()),
        fixture,
    )
}

async fn revoke_json(registry: &Registry, body: Value) -> Result<Value, RegistryError> {
    let request: RevocationRequest = serde_json::from_value(body).unwrap();
    let record = registry.revoke(request).await?;
    Ok(serde_json::to_value(record).unwrap())
}

#[tokio::test]
async fn token_request_and_response() {
    let (registry, _fixture) = registry();
    let response = revoke_json(
        &registry,
        json!({"type": "TOKEN", "data": {"token": "abc.def.ghi", "issued_before": 1000}}),
    )
    .await
    .unwrap();

    assert_eq!(
        response,
        json!({
            "type": "TOKEN",
            "revoked_at": 1010,
            "data": {
                "token_hash": "ZVnpC13VdAW98YDym1CQU6PTbEq_PeU1qySbVNQycjQ=",
                "hash_algorithm": "SHA-256",
                "issued_before": 1000
            }
        })
    );
}

#[tokio::test]
async fn claim_request_and_response() {
    let (registry, _fixture) = registry();
    let response = revoke_json(
        &registry,
        json!({
            "type": "CLAIM",
            "data": {"claims": {"sub": "u1", "realm": "employees"}, "issued_before": 2000}
        }),
    )
    .await
    .unwrap();

    assert_eq!(
        response,
        json!({
            "type": "CLAIM",
            "revoked_at": 1010,
            "data": {
                "names": ["realm", "sub"],
                "value_hash": "31u--JmKAhb1XC5XVYxQvaSJi5DScehI8o8y-gyM4Zc=",
                "hash_algorithm": "SHA-256",
                "separator": "|",
                "issued_before": 2000
            }
        })
    );
}

#[tokio::test]
async fn global_request_and_feed_array() {
    let (registry, _fixture) = registry();
    revoke_json(
        &registry,
        json!({"type": "GLOBAL", "data": {"issued_before": 3000}}),
    )
    .await
    .unwrap();

    let records = registry.revocations_since(Timestamp::ZERO).await.unwrap();
    let body = serde_json::to_value(&records).unwrap();
    assert_eq!(
        body,
        json!([{"type": "GLOBAL", "revoked_at": 1010, "data": {"issued_before": 3000}}])
    );

    let parsed: Vec<RevocationRecord> = serde_json::from_value(body).unwrap();
    assert_eq!(parsed, records);
}

#[test]
fn mismatched_type_is_rejected() {
    let result: Result<RevocationRequest, _> = serde_json::from_value(json!({
        "type": "GLOBAL",
        "data": {"token": "abc.def.ghi", "issued_before": 1000}
    }));
    let err = result.unwrap_err().to_string();
    assert!(err.contains("does not match"), "{}", err);
    assert!(!err.contains("abc.def.ghi"));
}

#[tokio::test]
async fn invalid_claims_are_client_errors_without_values() {
    let (registry, _fixture) = registry();
    let err = revoke_json(
        &registry,
        json!({
            "type": "CLAIM",
            "data": {"claims": {"sub": "evil|value"}, "issued_before": 1}
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.class(), ErrorClass::InvalidInput);
    assert!(err.class().is_client_error());
    assert!(!err.to_string().contains("evil|value"));
    assert!(registry
        .revocations_since(Timestamp::ZERO)
        .await
        .unwrap()
        .is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn served_json_never_contains_raw_secrets(params: FactParams) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let (registry, _fixture) = registry();

        let served = runtime.block_on(async {
            registry.revoke(fact_from_params(&params).into()).await.unwrap();
            registry.revocations_since(Timestamp::ZERO).await.unwrap()
        });
        let json = serde_json::to_string(&served).unwrap();

        for secret in params.secrets() {
            prop_assert!(!json.contains(secret));
        }
    }
}

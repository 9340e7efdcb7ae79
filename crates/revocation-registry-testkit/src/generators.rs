//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use proptest::prelude::*;

use revocation_registry_core::{RevocationKind, RevocationWriteFact, Timestamp};

/// Generate a raw token. Long and distinctive enough that a substring
/// search for it in stored data cannot match by accident.
pub fn token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{24,64}\\.[A-Za-z0-9_-]{8,32}".prop_map(String::from)
}

/// Generate a claim name.
pub fn claim_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_map(String::from)
}

/// Generate a claim value that never contains the default separator.
pub fn claim_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9@._-]{0,24}".prop_map(String::from)
}

/// Generate a non-empty claim set with unique names.
pub fn claim_set(max_len: usize) -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(claim_name(), claim_value(), 1..=max_len.max(1))
}

/// Generate a reasonable issued-before timestamp.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    (0u64..=4_102_444_800u64).prop_map(Timestamp)
}

/// Generate a RevocationKind.
pub fn revocation_kind() -> impl Strategy<Value = RevocationKind> {
    prop_oneof![
        Just(RevocationKind::Token),
        Just(RevocationKind::ClaimSet),
        Just(RevocationKind::Global),
    ]
}

/// Parameters for generating a valid write fact.
///
/// Kept separate from the fact so a test can search stored output for the
/// raw secrets afterwards.
#[derive(Debug, Clone)]
pub struct FactParams {
    pub kind: RevocationKind,
    pub token: String,
    pub claims: BTreeMap<String, String>,
    pub issued_before: Timestamp,
}

impl FactParams {
    /// Raw values that must never appear in stored or served data.
    pub fn secrets(&self) -> Vec<&str> {
        match self.kind {
            RevocationKind::Token => vec![self.token.as_str()],
            // Short values can collide with names or base64 by chance.
            RevocationKind::ClaimSet => self
                .claims
                .values()
                .map(String::as_str)
                .filter(|v| v.len() >= 12)
                .collect(),
            RevocationKind::Global => Vec::new(),
        }
    }
}

impl Arbitrary for FactParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (revocation_kind(), token(), claim_set(4), timestamp())
            .prop_map(|(kind, token, claims, issued_before)| FactParams {
                kind,
                token,
                claims,
                issued_before,
            })
            .boxed()
    }
}

/// Generate a write fact from parameters.
pub fn fact_from_params(params: &FactParams) -> RevocationWriteFact {
    match params.kind {
        RevocationKind::Token => {
            RevocationWriteFact::token(params.token.clone(), params.issued_before)
        }
        RevocationKind::ClaimSet => {
            RevocationWriteFact::claims(params.claims.clone(), params.issued_before)
        }
        RevocationKind::Global => RevocationWriteFact::global(params.issued_before),
    }
}

/// Generate a valid write fact of any kind.
pub fn write_fact() -> impl Strategy<Value = RevocationWriteFact> {
    any::<FactParams>().prop_map(|p| fact_from_params(&p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use revocation_registry_core::RevocationHasher;

    proptest! {
        #[test]
        fn test_generated_facts_are_valid(params: FactParams) {
            let fact = fact_from_params(&params);
            prop_assert_eq!(fact.kind(), params.kind);
            prop_assert!(RevocationHasher::default().digest_fact(&fact).is_ok());
        }

        #[test]
        fn test_digest_is_deterministic(fact in write_fact()) {
            let hasher = RevocationHasher::default();
            prop_assert_eq!(
                hasher.digest_fact(&fact).unwrap(),
                hasher.digest_fact(&fact).unwrap()
            );
        }

        #[test]
        fn test_serialized_read_fact_hides_secrets(params: FactParams) {
            let fact = fact_from_params(&params);
            let read = RevocationHasher::default().digest_fact(&fact).unwrap();
            let json = serde_json::to_string(&read).unwrap();
            for secret in params.secrets() {
                prop_assert!(!json.contains(secret));
            }
        }
    }
}

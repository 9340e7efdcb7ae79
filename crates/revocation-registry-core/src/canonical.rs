//! Canonicalization and digesting of sensitive revocation input.
//!
//! Tokens are hashed as-is. Claim sets are canonicalized first:
//!
//! 1. Every name must be non-empty and unique.
//! 2. Neither names nor values may contain the separator.
//! 3. Pairs are sorted by name (byte order).
//! 4. Values are joined with the separator in sorted-name order.
//!
//! The joined string is what gets hashed. Rule 2 is what keeps the join
//! unambiguous: `{a: "x|y", b: "z"}` and `{a: "x", b: "y|z"}` would otherwise
//! collide. No escaping is applied.

use crate::crypto::{Digest, HashAlgorithm};
use crate::error::{CoreError, Result};
use crate::fact::{
    RevocationReadFact, RevocationWriteFact, RevokedClaimsInfo, RevokedGlobal, RevokedTokenInfo,
};
use crate::types::Timestamp;

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = '|';

/// Digest of a canonicalized claim set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimSetDigest {
    /// Claim names, sorted ascending.
    pub names: Vec<String>,
    pub value_hash: Digest,
    pub hash_algorithm: HashAlgorithm,
    pub separator: char,
}

/// Sort and join claim values.
///
/// Returns the sorted names and the string that gets hashed. Exposed so
/// verifiers and test vectors can check the exact input to the digest.
pub fn canonical_claim_values<'a, I>(claims: I, separator: char) -> Result<(Vec<String>, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = claims.into_iter().collect();
    if pairs.is_empty() {
        return Err(CoreError::EmptyClaimSet);
    }

    pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    for (i, (name, value)) in pairs.iter().enumerate() {
        if name.is_empty() {
            return Err(CoreError::EmptyClaimName);
        }
        if i > 0 && pairs[i - 1].0 == *name {
            return Err(CoreError::DuplicateClaim {
                name: name.to_string(),
            });
        }
        if name.contains(separator) {
            return Err(CoreError::SeparatorInClaimName {
                name: name.to_string(),
                separator,
            });
        }
        if value.contains(separator) {
            return Err(CoreError::SeparatorInClaimValue {
                name: name.to_string(),
                separator,
            });
        }
    }

    let names = pairs.iter().map(|(n, _)| n.to_string()).collect();
    let mut joined = String::new();
    for (i, (_, value)) in pairs.iter().enumerate() {
        if i > 0 {
            joined.push(separator);
        }
        joined.push_str(value);
    }

    Ok((names, joined))
}

/// Turns raw revocation input into digests.
///
/// Cheap to copy; stores keep one and digest every fact on `append`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevocationHasher {
    algorithm: HashAlgorithm,
    separator: char,
}

impl Default for RevocationHasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default(), DEFAULT_SEPARATOR)
    }
}

impl RevocationHasher {
    pub const fn new(algorithm: HashAlgorithm, separator: char) -> Self {
        Self {
            algorithm,
            separator,
        }
    }

    pub const fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Digest a raw token.
    pub fn digest_token(&self, raw: &str) -> Result<(Digest, HashAlgorithm)> {
        if raw.is_empty() {
            return Err(CoreError::EmptyToken);
        }
        Ok((self.algorithm.digest(raw.as_bytes()), self.algorithm))
    }

    /// Digest a claim set joined with an explicit separator.
    pub fn digest_claim_set<'a, I>(&self, claims: I, separator: char) -> Result<ClaimSetDigest>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let (names, joined) = canonical_claim_values(claims, separator)?;
        Ok(ClaimSetDigest {
            names,
            value_hash: self.algorithm.digest(joined.as_bytes()),
            hash_algorithm: self.algorithm,
            separator,
        })
    }

    /// Digest a claim set joined with the configured separator.
    pub fn digest_claims<'a, I>(&self, claims: I) -> Result<ClaimSetDigest>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.digest_claim_set(claims, self.separator)
    }

    /// Convert a write fact into the form that gets stored.
    pub fn digest_fact(&self, fact: &RevocationWriteFact) -> Result<RevocationReadFact> {
        let issued_before = fact.issued_before();
        if issued_before > Timestamp::MAX_ISSUED_BEFORE {
            return Err(CoreError::IssuedBeforeOutOfRange {
                value: issued_before.0,
                max: Timestamp::MAX_ISSUED_BEFORE.0,
            });
        }

        match fact {
            RevocationWriteFact::Token(t) => {
                let (token_hash, hash_algorithm) = self.digest_token(&t.token)?;
                Ok(RevocationReadFact::Token(RevokedTokenInfo {
                    token_hash,
                    hash_algorithm,
                    issued_before: t.issued_before,
                }))
            }
            RevocationWriteFact::ClaimSet(c) => {
                let digest = self
                    .digest_claims(c.claims.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
                Ok(RevocationReadFact::ClaimSet(RevokedClaimsInfo {
                    names: digest.names,
                    value_hash: digest.value_hash,
                    hash_algorithm: digest.hash_algorithm,
                    separator: digest.separator,
                    issued_before: c.issued_before,
                }))
            }
            RevocationWriteFact::Global(g) => Ok(RevocationReadFact::Global(RevokedGlobal {
                issued_before: g.issued_before,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_token_digest_vector() {
        let hasher = RevocationHasher::default();
        let (digest, alg) = hasher.digest_token("abc.def.ghi").unwrap();
        assert_eq!(alg, HashAlgorithm::Sha256);
        assert_eq!(
            digest.to_base64(),
            "ZVnpC13VdAW98YDym1CQU6PTbEq_PeU1qySbVNQycjQ="
        );
    }

    #[test]
    fn test_claim_set_vector() {
        let hasher = RevocationHasher::default();
        let digest = hasher
            .digest_claims([("sub", "u1"), ("realm", "employees")])
            .unwrap();
        assert_eq!(digest.names, vec!["realm", "sub"]);
        assert_eq!(digest.separator, '|');
        assert_eq!(
            digest.value_hash.to_base64(),
            "31u--JmKAhb1XC5XVYxQvaSJi5DScehI8o8y-gyM4Zc="
        );
        assert_eq!(
            digest.value_hash,
            HashAlgorithm::Sha256.digest(b"employees|u1")
        );
    }

    #[test]
    fn test_canonical_join() {
        let (names, joined) =
            canonical_claim_values([("uid", "011011100"), ("sub", "test0")], '|').unwrap();
        assert_eq!(names, vec!["sub", "uid"]);
        assert_eq!(joined, "test0|011011100");
    }

    #[test]
    fn test_names_sort_by_bytes() {
        let (names, joined) =
            canonical_claim_values([("b", "2"), ("B", "1"), ("a", "3")], ',').unwrap();
        assert_eq!(names, vec!["B", "a", "b"]);
        assert_eq!(joined, "1,3,2");
    }

    #[test]
    fn test_empty_values_are_allowed() {
        let (_, joined) = canonical_claim_values([("a", ""), ("b", "")], '|').unwrap();
        assert_eq!(joined, "|");
    }

    #[test]
    fn test_rejects_empty_token() {
        let hasher = RevocationHasher::default();
        assert_eq!(hasher.digest_token(""), Err(CoreError::EmptyToken));
    }

    #[test]
    fn test_rejects_empty_claim_set() {
        let hasher = RevocationHasher::default();
        let empty: [(&str, &str); 0] = [];
        assert_eq!(hasher.digest_claims(empty), Err(CoreError::EmptyClaimSet));
    }

    #[test]
    fn test_rejects_empty_name() {
        let hasher = RevocationHasher::default();
        assert_eq!(
            hasher.digest_claims([("", "x")]),
            Err(CoreError::EmptyClaimName)
        );
    }

    #[test]
    fn test_rejects_duplicate_name() {
        let hasher = RevocationHasher::default();
        assert_eq!(
            hasher.digest_claims([("sub", "a"), ("sub", "b")]),
            Err(CoreError::DuplicateClaim { name: "sub".into() })
        );
    }

    #[test]
    fn test_rejects_separator_in_value_without_leaking_it() {
        let hasher = RevocationHasher::default();
        let err = hasher.digest_claims([("sub", "sec|ret")]).unwrap_err();
        assert_eq!(
            err,
            CoreError::SeparatorInClaimValue {
                name: "sub".into(),
                separator: '|'
            }
        );
        assert!(!err.to_string().contains("sec|ret"));
    }

    #[test]
    fn test_rejects_separator_in_name() {
        let hasher = RevocationHasher::default();
        assert!(matches!(
            hasher.digest_claim_set([("a,b", "x")], ','),
            Err(CoreError::SeparatorInClaimName { .. })
        ));
    }

    #[test]
    fn test_algorithm_recorded_with_digest() {
        let hasher = RevocationHasher::new(HashAlgorithm::Blake3, '|');
        let fact = hasher
            .digest_fact(&RevocationWriteFact::token("abc.def.ghi", 1000u64))
            .unwrap();
        assert_eq!(fact.hash_algorithm(), Some(HashAlgorithm::Blake3));
    }

    #[test]
    fn test_digest_fact_global_is_passthrough() {
        let hasher = RevocationHasher::default();
        let fact = hasher
            .digest_fact(&RevocationWriteFact::global(42u64))
            .unwrap();
        assert_eq!(
            fact,
            RevocationReadFact::Global(RevokedGlobal {
                issued_before: Timestamp(42)
            })
        );
    }

    #[test]
    fn test_issued_before_is_bounded() {
        let hasher = RevocationHasher::default();
        let limit = Timestamp::MAX_ISSUED_BEFORE;
        assert!(hasher
            .digest_fact(&RevocationWriteFact::global(limit))
            .is_ok());

        for fact in [
            RevocationWriteFact::global(u64::MAX),
            RevocationWriteFact::token("abc.def.ghi", limit.0 + 1),
            RevocationWriteFact::claims([("sub", "u1")], u64::MAX),
        ] {
            assert!(matches!(
                hasher.digest_fact(&fact),
                Err(CoreError::IssuedBeforeOutOfRange { .. })
            ));
        }
    }

    fn claim_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::btree_map("[a-z_]{1,12}", "[a-zA-Z0-9.@-]{0,24}", 1..8)
            .prop_map(|m| m.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    }

    proptest! {
        #[test]
        fn claim_digest_is_order_independent(pairs in claim_pairs()) {
            let hasher = RevocationHasher::default();
            let mut reversed = pairs.clone();
            reversed.reverse();

            let a = hasher
                .digest_claims(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .unwrap();
            let b = hasher
                .digest_claims(reversed.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn read_fact_never_contains_token(token in "[A-Za-z0-9._-]{8,64}") {
            let hasher = RevocationHasher::default();
            let fact = hasher
                .digest_fact(&RevocationWriteFact::token(token.clone(), 1u64))
                .unwrap();
            let json = serde_json::to_string(&fact).unwrap();
            prop_assert!(!json.contains(&token));
        }
    }
}

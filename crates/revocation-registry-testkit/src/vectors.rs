//! Golden test vectors for digest verification.
//!
//! Verifiers in other languages rebuild these digests from their own copy of
//! a token or claim set, so the expected strings here are fixed forever for
//! a given algorithm.

use revocation_registry_core::{
    HashAlgorithm, RevocationHasher, RevocationReadFact, RevocationWriteFact, DEFAULT_SEPARATOR,
};

/// What a vector digests.
#[derive(Debug, Clone)]
pub enum VectorInput {
    Token(&'static str),
    Claims(&'static [(&'static str, &'static str)]),
}

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub input: VectorInput,
    pub algorithm: HashAlgorithm,
    /// Sorted claim names, empty for tokens.
    pub expected_names: &'static [&'static str],
    /// Expected digest, URL-safe base64 with padding.
    pub expected_digest: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "JWT-shaped token",
            input: VectorInput::Token("abc.def.ghi"),
            algorithm: HashAlgorithm::Sha256,
            expected_names: &[],
            expected_digest: "ZVnpC13VdAW98YDym1CQU6PTbEq_PeU1qySbVNQycjQ=",
        },
        GoldenVector {
            name: "subject within realm",
            input: VectorInput::Claims(&[("sub", "u1"), ("realm", "employees")]),
            algorithm: HashAlgorithm::Sha256,
            expected_names: &["realm", "sub"],
            expected_digest: "31u--JmKAhb1XC5XVYxQvaSJi5DScehI8o8y-gyM4Zc=",
        },
        GoldenVector {
            name: "single claim",
            input: VectorInput::Claims(&[("sub", "u1")]),
            algorithm: HashAlgorithm::Sha256,
            expected_names: &["sub"],
            expected_digest: "u4IDDbwryroyqQvy4geoSoVvxfAzt3xICDarb3f0Dxk=",
        },
        GoldenVector {
            name: "bit mask claim",
            input: VectorInput::Claims(&[("mask", "011011100"), ("alias", "test0")]),
            algorithm: HashAlgorithm::Sha256,
            expected_names: &["alias", "mask"],
            expected_digest: "xAJgZ51vFgfzpvRSYibkaxopTeLWFDV5vke_U-MCh3A=",
        },
    ]
}

/// Build the write fact a vector describes.
pub fn write_fact_from_vector(vector: &GoldenVector) -> RevocationWriteFact {
    match &vector.input {
        VectorInput::Token(token) => RevocationWriteFact::token(*token, 0u64),
        VectorInput::Claims(claims) => RevocationWriteFact::claims(claims.iter().copied(), 0u64),
    }
}

/// Digest a vector and return `(names, base64 digest)`.
pub fn digest_vector(vector: &GoldenVector) -> (Vec<String>, String) {
    let hasher = RevocationHasher::new(vector.algorithm, DEFAULT_SEPARATOR);
    let fact = write_fact_from_vector(vector);
    match hasher.digest_fact(&fact) {
        Ok(RevocationReadFact::Token(info)) => (Vec::new(), info.token_hash.to_base64()),
        Ok(RevocationReadFact::ClaimSet(info)) => (info.names, info.value_hash.to_base64()),
        Ok(RevocationReadFact::Global(_)) => (Vec::new(), String::new()),
        Err(e) => (Vec::new(), format!("error: {}", e)),
    }
}

/// Check every vector against this build's hasher.
///
/// Returns `(name, matches, actual digest)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let (names, digest) = digest_vector(v);
            let matches = digest == v.expected_digest && names == v.expected_names;
            (v.name.to_string(), matches, digest)
        })
        .collect()
}

//! # Revocation Registry Core
//!
//! Pure primitives for the revocation registry: revocation facts, digests,
//! and the canonicalization that turns sensitive input into digests.
//!
//! This crate contains no I/O, no storage, no clocks.
//!
//! ## Key Types
//!
//! - [`RevocationKind`] - Wire discriminator (`TOKEN`, `CLAIM`, `GLOBAL`)
//! - [`RevocationWriteFact`] - What a client asked to revoke (raw input)
//! - [`RevocationReadFact`] - What is stored and served (digests only)
//! - [`RevocationRecord`] - A read fact plus its store-assigned timestamp
//! - [`RevocationHasher`] - Digests tokens and claim sets
//!
//! ## Security invariant
//!
//! A [`RevocationReadFact`] never holds a raw token or claim value. The only
//! way to build one from client input is [`RevocationHasher::digest_fact`].

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod fact;
pub mod types;

pub use canonical::{canonical_claim_values, ClaimSetDigest, RevocationHasher, DEFAULT_SEPARATOR};
pub use crypto::{Digest, HashAlgorithm};
pub use error::{CoreError, Result};
pub use fact::{
    RevocationKind, RevocationReadFact, RevocationRecord, RevocationRequest, RevocationWriteFact,
    RevokedClaims, RevokedClaimsInfo, RevokedGlobal, RevokedToken, RevokedTokenInfo,
};
pub use types::Timestamp;

//! Revocation facts and their envelopes.
//!
//! Write-side facts carry raw client input (a token, claim values) and only
//! live long enough to be digested. Read-side facts are what the store keeps
//! and what verifiers poll: they hold digests, never raw secrets.
//!
//! ## Wire format
//!
//! ```text
//! request: {"type": "TOKEN", "data": {"token": "...", "issued_before": 1000}}
//! record:  {"type": "TOKEN", "revoked_at": 1010,
//!           "data": {"token_hash": "...", "hash_algorithm": "SHA-256", "issued_before": 1000}}
//! ```
//!
//! The `type` tag is checked against the shape of `data` on decode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::crypto::{Digest, HashAlgorithm};
use crate::error::{CoreError, Result};
use crate::types::Timestamp;

/// What a revocation targets.
///
/// The declaration order is part of the wire and storage contract (see
/// [`RevocationKind::code`]). New kinds go at the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RevocationKind {
    /// One specific credential.
    #[serde(rename = "TOKEN")]
    Token,
    /// Every credential whose named claims carry the given values.
    #[serde(rename = "CLAIM")]
    ClaimSet,
    /// Every credential issued before a cut-off.
    #[serde(rename = "GLOBAL")]
    Global,
}

impl RevocationKind {
    /// All kinds in contract order.
    pub const ALL: [RevocationKind; 3] = [
        RevocationKind::Token,
        RevocationKind::ClaimSet,
        RevocationKind::Global,
    ];

    /// Stable integer code, used by the durable store.
    pub const fn code(&self) -> u8 {
        match self {
            RevocationKind::Token => 0,
            RevocationKind::ClaimSet => 1,
            RevocationKind::Global => 2,
        }
    }

    /// Inverse of [`RevocationKind::code`].
    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(CoreError::UnknownKindCode(code))
    }

    /// Wire name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RevocationKind::Token => "TOKEN",
            RevocationKind::ClaimSet => "CLAIM",
            RevocationKind::Global => "GLOBAL",
        }
    }
}

impl fmt::Display for RevocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Write side
// ─────────────────────────────────────────────────────────────────────────────

/// Revoke every credential equal to `token` issued before `issued_before`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedToken {
    pub token: String,
    pub issued_before: Timestamp,
}

impl fmt::Debug for RevokedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevokedToken")
            .field("token", &"<redacted>")
            .field("issued_before", &self.issued_before)
            .finish()
    }
}

/// Revoke every credential whose claims match `claims`, issued before `issued_before`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedClaims {
    pub claims: BTreeMap<String, String>,
    pub issued_before: Timestamp,
}

impl fmt::Debug for RevokedClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevokedClaims")
            .field("names", &self.claims.keys().collect::<Vec<_>>())
            .field("issued_before", &self.issued_before)
            .finish()
    }
}

/// Revoke everything issued before `issued_before`.
///
/// Carries no secret, so the same shape is used on both sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedGlobal {
    pub issued_before: Timestamp,
}

/// What a client asked to revoke.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RevocationWriteFact {
    Token(RevokedToken),
    ClaimSet(RevokedClaims),
    Global(RevokedGlobal),
}

impl RevocationWriteFact {
    /// Revoke a single token.
    pub fn token(token: impl Into<String>, issued_before: impl Into<Timestamp>) -> Self {
        RevocationWriteFact::Token(RevokedToken {
            token: token.into(),
            issued_before: issued_before.into(),
        })
    }

    /// Revoke by claim values.
    pub fn claims<K, V, I>(claims: I, issued_before: impl Into<Timestamp>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        RevocationWriteFact::ClaimSet(RevokedClaims {
            claims: claims
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            issued_before: issued_before.into(),
        })
    }

    /// Revoke everything issued before a cut-off.
    pub fn global(issued_before: impl Into<Timestamp>) -> Self {
        RevocationWriteFact::Global(RevokedGlobal {
            issued_before: issued_before.into(),
        })
    }

    pub fn kind(&self) -> RevocationKind {
        match self {
            RevocationWriteFact::Token(_) => RevocationKind::Token,
            RevocationWriteFact::ClaimSet(_) => RevocationKind::ClaimSet,
            RevocationWriteFact::Global(_) => RevocationKind::Global,
        }
    }

    pub fn issued_before(&self) -> Timestamp {
        match self {
            RevocationWriteFact::Token(t) => t.issued_before,
            RevocationWriteFact::ClaimSet(c) => c.issued_before,
            RevocationWriteFact::Global(g) => g.issued_before,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read side
// ─────────────────────────────────────────────────────────────────────────────

/// Stored form of a token revocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedTokenInfo {
    pub token_hash: Digest,
    pub hash_algorithm: HashAlgorithm,
    pub issued_before: Timestamp,
}

/// Stored form of a claim-set revocation.
///
/// A verifier rebuilds `value_hash` by joining its own claim values for
/// `names` (in this order) with `separator` and hashing with `hash_algorithm`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedClaimsInfo {
    pub names: Vec<String>,
    pub value_hash: Digest,
    pub hash_algorithm: HashAlgorithm,
    pub separator: char,
    pub issued_before: Timestamp,
}

/// What the registry stores and serves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RevocationReadFact {
    Token(RevokedTokenInfo),
    ClaimSet(RevokedClaimsInfo),
    Global(RevokedGlobal),
}

impl RevocationReadFact {
    pub fn kind(&self) -> RevocationKind {
        match self {
            RevocationReadFact::Token(_) => RevocationKind::Token,
            RevocationReadFact::ClaimSet(_) => RevocationKind::ClaimSet,
            RevocationReadFact::Global(_) => RevocationKind::Global,
        }
    }

    pub fn issued_before(&self) -> Timestamp {
        match self {
            RevocationReadFact::Token(t) => t.issued_before,
            RevocationReadFact::ClaimSet(c) => c.issued_before,
            RevocationReadFact::Global(g) => g.issued_before,
        }
    }

    /// Algorithm behind the fact's digest, if it has one.
    pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
        match self {
            RevocationReadFact::Token(t) => Some(t.hash_algorithm),
            RevocationReadFact::ClaimSet(c) => Some(c.hash_algorithm),
            RevocationReadFact::Global(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelopes
// ─────────────────────────────────────────────────────────────────────────────

/// Inbound write envelope: `{"type", "data"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RequestWire", into = "RequestWire")]
pub struct RevocationRequest {
    pub fact: RevocationWriteFact,
}

impl RevocationRequest {
    pub fn kind(&self) -> RevocationKind {
        self.fact.kind()
    }
}

impl From<RevocationWriteFact> for RevocationRequest {
    fn from(fact: RevocationWriteFact) -> Self {
        Self { fact }
    }
}

#[derive(Serialize, Deserialize)]
struct RequestWire {
    #[serde(rename = "type")]
    kind: RevocationKind,
    data: RevocationWriteFact,
}

impl TryFrom<RequestWire> for RevocationRequest {
    type Error = CoreError;

    fn try_from(wire: RequestWire) -> Result<Self> {
        check_kind(wire.kind, wire.data.kind())?;
        Ok(Self { fact: wire.data })
    }
}

impl From<RevocationRequest> for RequestWire {
    fn from(request: RevocationRequest) -> Self {
        Self {
            kind: request.fact.kind(),
            data: request.fact,
        }
    }
}

/// A stored revocation: `{"type", "revoked_at", "data"}`.
///
/// `recorded_at` is assigned by the store when the fact becomes visible and
/// is the cursor field for incremental polling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordWire", into = "RecordWire")]
pub struct RevocationRecord {
    pub recorded_at: Timestamp,
    pub fact: RevocationReadFact,
}

impl RevocationRecord {
    pub fn new(recorded_at: Timestamp, fact: RevocationReadFact) -> Self {
        Self { recorded_at, fact }
    }

    pub fn kind(&self) -> RevocationKind {
        self.fact.kind()
    }
}

#[derive(Serialize, Deserialize)]
struct RecordWire {
    #[serde(rename = "type")]
    kind: RevocationKind,
    revoked_at: Timestamp,
    data: RevocationReadFact,
}

impl TryFrom<RecordWire> for RevocationRecord {
    type Error = CoreError;

    fn try_from(wire: RecordWire) -> Result<Self> {
        check_kind(wire.kind, wire.data.kind())?;
        Ok(Self {
            recorded_at: wire.revoked_at,
            fact: wire.data,
        })
    }
}

impl From<RevocationRecord> for RecordWire {
    fn from(record: RevocationRecord) -> Self {
        Self {
            kind: record.fact.kind(),
            revoked_at: record.recorded_at,
            data: record.fact,
        }
    }
}

fn check_kind(declared: RevocationKind, actual: RevocationKind) -> Result<()> {
    if declared != actual {
        return Err(CoreError::KindMismatch { declared, actual });
    }
    Ok(())
}

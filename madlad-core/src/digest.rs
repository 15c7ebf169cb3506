//! Stable SHA-256 digests of configuration values.
//!
//! Ω is hashed over a tag-prefixed binary encoding rather than a text format,
//! so the digest of a value never depends on serializer settings.

use crate::omega::{Omega, Scalar};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use thiserror::Error;

/// Prefix of every rendered digest
pub const DIGEST_PREFIX: &str = "sha256:";

const TAG_EMPTY: u8 = 0x00;
const TAG_WRAP: u8 = 0x01;
const TAG_SEQ: u8 = 0x02;
const TAG_INT: u8 = 0x10;
const TAG_BOOL: u8 = 0x11;
const TAG_SYM: u8 = 0x12;

/// A 32-byte SHA-256 digest, rendered as `sha256:<hex>`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest([u8; 32]);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DigestParseError {
    #[error("digest must start with '{DIGEST_PREFIX}'")]
    MissingPrefix,
    #[error("digest must have 64 hex characters, found {0}")]
    InvalidLength(usize),
    #[error("invalid hex in digest: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl Digest {
    /// Digest of a configuration value's canonical encoding
    pub fn of(value: &Omega) -> Self {
        let mut bytes = Vec::with_capacity(64);
        encode_canonical(value, &mut bytes);
        Self::of_bytes(&bytes)
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&hasher.finalize());
        Digest(arr)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("{DIGEST_PREFIX}{}", hex::encode(self.0))
    }

    pub fn from_hex_str(s: &str) -> Result<Self, DigestParseError> {
        let rest = s
            .strip_prefix(DIGEST_PREFIX)
            .ok_or(DigestParseError::MissingPrefix)?;
        if rest.len() != 64 {
            return Err(DigestParseError::InvalidLength(rest.len()));
        }
        let mut buf = [0u8; 32];
        hex::decode_to_slice(rest, &mut buf)?;
        Ok(Digest(buf))
    }
}

/// Append the canonical encoding of `value` to `out`
pub fn encode_canonical(value: &Omega, out: &mut Vec<u8>) {
    match value {
        Omega::Empty => out.push(TAG_EMPTY),
        Omega::Wrap(inner) => {
            out.push(TAG_WRAP);
            encode_canonical(inner, out);
        }
        Omega::Seq(items) => {
            out.push(TAG_SEQ);
            out.extend_from_slice(&(items.len() as u64).to_be_bytes());
            for item in items {
                encode_canonical(item, out);
            }
        }
        Omega::Scalar(Scalar::Int(n)) => {
            out.push(TAG_INT);
            out.extend_from_slice(&n.to_be_bytes());
        }
        Omega::Scalar(Scalar::Bool(b)) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*b));
        }
        Omega::Scalar(Scalar::Sym(s)) => {
            out.push(TAG_SYM);
            out.extend_from_slice(&(s.len() as u64).to_be_bytes());
            out.extend_from_slice(s.as_bytes());
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_hex()
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Digest::from_hex_str(&value)
    }
}

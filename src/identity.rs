//! Record identity: short random identifiers and content-derived lookup hashes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of generated product identifiers.
pub const ID_LENGTH: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a short lowercase base-36 identifier from a v4 UUID's random bits.
pub fn generate_id() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(ID_LENGTH);
    for _ in 0..ID_LENGTH {
        id.push(BASE36[(value % 36) as usize] as char);
        value /= 36;
    }
    id
}

/// How the public lookup hash of a product is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashStrategy {
    /// Hex SHA-256 over id, name, description and creation time.
    #[default]
    Sha256,
    /// 32-bit shift/subtract fold over id, name and description. Kept for
    /// compatibility with lists produced by older tooling.
    Rolling,
}

impl HashStrategy {
    pub fn derive(
        &self,
        id: &str,
        name: &str,
        description: &str,
        created_at: &DateTime<Utc>,
    ) -> String {
        match self {
            HashStrategy::Sha256 => sha256_hash(id, name, description, created_at),
            HashStrategy::Rolling => rolling_hash(&format!("{}{}{}", id, name, description)),
        }
    }
}

impl std::fmt::Display for HashStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashStrategy::Sha256 => write!(f, "sha256"),
            HashStrategy::Rolling => write!(f, "rolling"),
        }
    }
}

impl std::str::FromStr for HashStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(HashStrategy::Sha256),
            "rolling" => Ok(HashStrategy::Rolling),
            _ => Err(format!("Invalid hash strategy: {}", s)),
        }
    }
}

fn sha256_hash(id: &str, name: &str, description: &str, created_at: &DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(name.as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(
        created_at
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );
    format!("{:x}", hasher.finalize())
}

/// `h = h * 31 + c` over UTF-16 code units with 32-bit wraparound, rendered
/// as the absolute value in hex.
fn rolling_hash(input: &str) -> String {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    format!("{:x}", i64::from(hash).abs())
}

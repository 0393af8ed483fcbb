use serde::{Deserialize, Serialize};

use crate::model::error::Result;
use crate::model::{generate_id, Id, UserConfig};

/// Record of one successful save: an immutable fingerprint of the committed rule set.
/// The committed value itself lives in the store's snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Commit {
    /// Unique identifier of this save
    pub id: Id,
    /// SHA-256 hash of the committed rule set
    pub hash: String,
    /// Hash of the previous save (None for the first save)
    pub parent_hash: Option<String>,
    /// When the save happened
    pub created_at: String, // ISO 8601 string
    /// Rule types that had a rule at save time
    pub rule_types: Vec<String>,
    /// Size of the canonical JSON for monitoring
    pub data_size: usize,
}

impl Commit {
    /// Fingerprint `config` as the next save after `parent_hash`
    pub fn new(parent_hash: Option<String>, config: &UserConfig) -> Result<Self> {
        let serialized = Self::canonical_json(config)?;
        let hash = Self::calculate_hash(parent_hash.as_deref(), &serialized);

        Ok(Self {
            id: generate_id(),
            hash,
            parent_hash,
            created_at: chrono::Utc::now().to_rfc3339(),
            rule_types: config.keys().cloned().collect(),
            data_size: serialized.len(),
        })
    }

    /// Deterministic JSON of a rule set; keys are ordered by the map
    pub fn canonical_json(config: &UserConfig) -> Result<String> {
        Ok(serde_json::to_string(config)?)
    }

    fn calculate_hash(parent_hash: Option<&str>, data: &str) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        if let Some(parent) = parent_hash {
            hasher.update(format!("parent:{}\n", parent));
        }
        hasher.update(format!("data:{}\n", data));

        hex::encode(hasher.finalize())
    }

    /// Whether `config` hashes to the same content as this save, given the same parent
    pub fn matches(&self, config: &UserConfig) -> Result<bool> {
        let serialized = Self::canonical_json(config)?;
        Ok(Self::calculate_hash(self.parent_hash.as_deref(), &serialized) == self.hash)
    }
}

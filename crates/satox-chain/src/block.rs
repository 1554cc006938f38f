//! Block entity.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transaction::{Transaction, TransactionRecord};
use crate::Result;

/// A block with chain linkage, transactions and PoW fields.
///
/// Hash-like fields are lowercase hex strings. `kawpow_mix_hash` and
/// `kawpow_header_hash` must be both empty or both set; validation rejects
/// a block with only one of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block<T = TransactionRecord> {
    /// Block hash; its first 32 bytes are the PoW header.
    pub hash: String,
    pub previous_hash: String,
    /// Unix seconds.
    pub timestamp: i64,
    pub nonce: u64,
    pub difficulty: u32,
    pub merkle_root: String,
    pub version: u32,
    pub height: u64,
    pub miner_address: String,
    pub block_reward: u64,
    /// Hex of the PoW mix hash.
    pub kawpow_mix_hash: String,
    /// Hex of the final PoW hash.
    pub kawpow_header_hash: String,
    pub transactions: Vec<T>,
    /// Opaque metadata object.
    #[serde(default = "empty_object")]
    pub metadata: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl<T> Default for Block<T> {
    fn default() -> Self {
        Self {
            hash: String::new(),
            previous_hash: String::new(),
            timestamp: 0,
            nonce: 0,
            difficulty: 0,
            merkle_root: String::new(),
            version: 1,
            height: 0,
            miner_address: String::new(),
            block_reward: 0,
            kawpow_mix_hash: String::new(),
            kawpow_header_hash: String::new(),
            transactions: Vec::new(),
            metadata: empty_object(),
        }
    }
}

impl<T> Block<T>
where
    T: Transaction + Serialize + DeserializeOwned,
{
    /// Serialize every field, transactions included, to a JSON object.
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parse a block from a JSON object.
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Serialize to a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a block from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl<T: Transaction> Block<T> {
    /// Whether both PoW hash fields are populated.
    pub fn has_kawpow_fields(&self) -> bool {
        !self.kawpow_mix_hash.is_empty() && !self.kawpow_header_hash.is_empty()
    }

    /// Number of transactions.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

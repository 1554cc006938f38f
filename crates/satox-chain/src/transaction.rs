//! Transaction collaborator contract.
//!
//! Blocks only need two things from a transaction: an identifier to build
//! the Merkle root from, and a validity verdict. Business validation stays
//! with the transaction type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a block requires of the transactions it owns.
pub trait Transaction {
    /// Transaction identifier, used as a Merkle leaf.
    fn txid(&self) -> &str;

    /// Whether the transaction is valid on its own.
    fn is_valid(&self) -> bool;
}

/// Stored transaction record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub txid: String,
    pub version: u64,
    pub locktime: u64,
    pub inputs: Vec<Value>,
    pub outputs: Vec<Value>,
    pub size: u64,
    pub weight: u64,
    pub fee: u64,
    #[serde(rename = "blockHash")]
    pub block_hash: String,
    #[serde(rename = "blockHeight")]
    pub block_height: u64,
    pub timestamp: u64,
    #[serde(rename = "isCoinbase")]
    pub is_coinbase: bool,
    pub status: String,
}

impl Transaction for TransactionRecord {
    fn txid(&self) -> &str {
        &self.txid
    }

    /// A record is valid when its txid is 32 bytes of hex, it has at least
    /// one output, and it spends inputs exactly when it is not a coinbase.
    fn is_valid(&self) -> bool {
        let mut id = [0u8; 32];
        if hex::decode_to_slice(&self.txid, &mut id).is_err() {
            return false;
        }
        if self.outputs.is_empty() {
            return false;
        }
        self.is_coinbase == self.inputs.is_empty()
    }
}

//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use serde::Serialize;
use thiserror::Error;

use crate::units::UnitsError;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during facade operations.
#[derive(Debug, Error)]
pub enum FacadeError {
    /// Unparseable decimal, hex payload or transaction id.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Address failed syntactic validation.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Converted amount does not fit its target integer.
    #[error("Amount overflow: {0}")]
    Overflow(String),

    /// The node answered with an explicit error payload.
    #[error("Node error: {0}")]
    Node(String),

    /// The node could not be reached or the response was unreadable.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The node contradicted itself (included without receipt, unknown status).
    #[error("Inconsistent node state: {0}")]
    InconsistentState(String),

    /// The node does not know the transaction.
    #[error("Transaction {0} not found")]
    UnknownTransaction(TxHash),

    /// The node has no block at this height.
    #[error("Block {0} not found")]
    UnknownBlock(u64),

    /// Contract return data could not be ABI-decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Key loading, derivation or signing failed.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl From<UnitsError> for FacadeError {
    fn from(err: UnitsError) -> Self {
        match err {
            UnitsError::InvalidFormat(_) => FacadeError::InvalidFormat(err.to_string()),
            UnitsError::Overflow { .. } => FacadeError::Overflow(err.to_string()),
        }
    }
}

/// Result type for facade operations.
pub type FacadeResult<T> = Result<T, FacadeError>;

/// Lifecycle state of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Known to the node but not yet in a block.
    Pending,
    /// Mined with a successful receipt.
    Included,
    /// Mined but execution failed.
    Reverted,
}

/// Transaction as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    pub hash: TxHash,
    /// `None` (or zero) while the transaction is still pending.
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub input: Bytes,
}

impl TransactionInfo {
    /// Whether the node reports a real (non-zero) block hash.
    pub fn is_included(&self) -> bool {
        self.block_hash.is_some_and(|hash| !hash.is_zero())
    }
}

/// Receipt as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptInfo {
    pub tx_hash: TxHash,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// EIP-658 status code; `None` for pre-Byzantium state-root receipts.
    pub status_code: Option<u64>,
}

/// Block header summary with its transaction ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub number: u64,
    pub hash: B256,
    pub transactions: Vec<TxHash>,
}

/// Transaction view handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub tx_id: TxHash,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub from: Address,
    pub to: Option<Address>,
    /// Raw value in wei.
    pub value: U256,
    pub nonce: u64,
    pub status: TxStatus,
}

impl TransactionRecord {
    /// Pair a node transaction with its resolved lifecycle status.
    pub fn new(tx: TransactionInfo, status: TxStatus) -> Self {
        Self {
            tx_id: tx.hash,
            block_hash: tx.block_hash,
            block_number: tx.block_number,
            from: tx.from,
            to: tx.to,
            value: tx.value,
            nonce: tx.nonce,
            status,
        }
    }
}

/// ERC20 token metadata. Fetched on demand, never cached here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenMetadata {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

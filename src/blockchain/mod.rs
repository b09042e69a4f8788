//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! caller input (addresses, amounts, tx ids)
//!     → address.rs (syntactic validation, no I/O)
//!     → lifecycle.rs (prepare, estimate, broadcast, confirm, query)
//!     → gateway.rs (single RPC handle to one node)
//!
//! wallet.rs (mnemonic, derivation, signing) feeds signed payloads
//! back into lifecycle.rs for broadcast.
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or mnemonics
//! - Validation errors never reach the node

pub mod address;
pub mod gateway;
pub mod lifecycle;
pub mod token;
pub mod types;
pub mod wallet;

pub use address::{checksum_address, is_valid_address, parse_address};
pub use gateway::{NodeGateway, RpcGateway};
pub use lifecycle::{parse_tx_hash, TransactionLifecycle, TransferIntent};
pub use types::{
    BlockInfo, ChainId, FacadeError, FacadeResult, ReceiptInfo, TokenMetadata, TransactionInfo,
    TransactionRecord, TxStatus,
};
pub use wallet::{generate_wallet, wallet_from_mnemonic, GeneratedWallet, Wallet};

//! Ethereum node client facade library.
//!
//! Derives wallet keys, reads native and ERC20 balances, prepares and
//! broadcasts signed transactions, and checks confirmation status against
//! one JSON-RPC node. Amounts cross the API as exact decimal strings.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod units;

pub use blockchain::{FacadeError, FacadeResult, NodeGateway, RpcGateway, TransactionLifecycle};
pub use config::FacadeConfig;

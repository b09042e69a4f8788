//! Node gateway: the one RPC handle this crate talks through.
//!
//! # Responsibilities
//! - Connect to a single JSON-RPC endpoint
//! - Expose the primitive node operations the lifecycle needs
//! - Separate node error payloads from transport failures
//!
//! # Design Decisions
//! - Constructed explicitly at startup and shared by `Arc`; no global handle
//! - No timeouts or retries here; callers wrap calls if they need them
//! - `NodeGateway` is the seam tests substitute with an in-memory node

use std::future::Future;
use std::sync::Arc;

use alloy::consensus::{Eip658Value, Transaction as _, TxReceipt};
use alloy::eips::BlockNumberOrTag;
use alloy::network::TransactionResponse as _;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Transaction, TransactionReceipt, TransactionRequest};
use alloy::transports::{RpcError, TransportError};

use crate::blockchain::types::{
    BlockInfo, ChainId, FacadeError, FacadeResult, ReceiptInfo, TransactionInfo,
};
use crate::config::NodeConfig;

/// Primitive operations of an Ethereum JSON-RPC node.
///
/// Every method reports [`FacadeError::Node`] when the node answered with an
/// error payload and [`FacadeError::Transport`] for anything else.
pub trait NodeGateway: Send + Sync {
    /// `eth_chainId`
    fn get_chain_id(&self) -> impl Future<Output = FacadeResult<ChainId>> + Send;

    /// `eth_getBalance` at the latest block.
    fn get_balance(&self, address: Address) -> impl Future<Output = FacadeResult<U256>> + Send;

    /// `eth_call`, read-only contract invocation.
    fn call(&self, request: TransactionRequest)
        -> impl Future<Output = FacadeResult<Bytes>> + Send;

    /// `eth_estimateGas`
    fn estimate_gas(
        &self,
        request: TransactionRequest,
    ) -> impl Future<Output = FacadeResult<u64>> + Send;

    /// `eth_sendRawTransaction`
    fn send_raw_transaction(
        &self,
        payload: Bytes,
    ) -> impl Future<Output = FacadeResult<TxHash>> + Send;

    /// `eth_getTransactionByHash`
    fn get_transaction_by_hash(
        &self,
        hash: TxHash,
    ) -> impl Future<Output = FacadeResult<Option<TransactionInfo>>> + Send;

    /// `eth_getTransactionReceipt`
    fn get_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> impl Future<Output = FacadeResult<Option<ReceiptInfo>>> + Send;

    /// `eth_getBlockByNumber` with transaction hashes only.
    fn get_block_by_number(
        &self,
        number: u64,
    ) -> impl Future<Output = FacadeResult<Option<BlockInfo>>> + Send;

    /// `eth_getTransactionCount` (next nonce) at the latest block.
    fn get_transaction_count(
        &self,
        address: Address,
    ) -> impl Future<Output = FacadeResult<u64>> + Send;

    /// `eth_gasPrice` in wei.
    fn get_gas_price(&self) -> impl Future<Output = FacadeResult<u128>> + Send;
}

/// Gateway backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct RpcGateway {
    provider: Arc<dyn Provider + Send + Sync>,
    rpc_url: String,
}

impl RpcGateway {
    /// Create the gateway for the configured endpoint.
    ///
    /// No request is sent here; the first operation opens the connection.
    pub fn connect(config: &NodeConfig) -> FacadeResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            FacadeError::InvalidFormat(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let provider =
            Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        tracing::info!(rpc_url = %config.rpc_url, "Node gateway initialized");

        Ok(Self {
            provider,
            rpc_url: config.rpc_url.clone(),
        })
    }

    /// Endpoint this gateway talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

impl std::fmt::Debug for RpcGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcGateway")
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}

impl NodeGateway for RpcGateway {
    async fn get_chain_id(&self) -> FacadeResult<ChainId> {
        self.provider
            .get_chain_id()
            .await
            .map(ChainId)
            .map_err(classify)
    }

    async fn get_balance(&self, address: Address) -> FacadeResult<U256> {
        self.provider.get_balance(address).await.map_err(classify)
    }

    async fn call(&self, request: TransactionRequest) -> FacadeResult<Bytes> {
        self.provider.call(request).await.map_err(classify)
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> FacadeResult<u64> {
        self.provider.estimate_gas(request).await.map_err(classify)
    }

    async fn send_raw_transaction(&self, payload: Bytes) -> FacadeResult<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(&payload)
            .await
            .map_err(classify)?;
        Ok(*pending.tx_hash())
    }

    async fn get_transaction_by_hash(&self, hash: TxHash) -> FacadeResult<Option<TransactionInfo>> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(classify)?;
        Ok(tx.map(transaction_info))
    }

    async fn get_transaction_receipt(&self, hash: TxHash) -> FacadeResult<Option<ReceiptInfo>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(classify)?;
        Ok(receipt.map(receipt_info))
    }

    async fn get_block_by_number(&self, number: u64) -> FacadeResult<Option<BlockInfo>> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .map_err(classify)?;

        Ok(block.map(|block| BlockInfo {
            number: block.header.inner.number,
            hash: block.header.hash,
            transactions: block.transactions.hashes().collect(),
        }))
    }

    async fn get_transaction_count(&self, address: Address) -> FacadeResult<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(classify)
    }

    async fn get_gas_price(&self) -> FacadeResult<u128> {
        self.provider.get_gas_price().await.map_err(classify)
    }
}

/// Split node error payloads from transport failures.
fn classify(err: TransportError) -> FacadeError {
    match err {
        RpcError::ErrorResp(payload) => FacadeError::Node(payload.message.to_string()),
        other => FacadeError::Transport(other.to_string()),
    }
}

fn transaction_info(tx: Transaction) -> TransactionInfo {
    TransactionInfo {
        hash: tx.tx_hash(),
        block_hash: tx.block_hash,
        block_number: tx.block_number,
        from: tx.from(),
        to: tx.to(),
        value: tx.value(),
        nonce: tx.nonce(),
        gas_limit: tx.gas_limit(),
        input: tx.input().clone(),
    }
}

fn receipt_info(receipt: TransactionReceipt) -> ReceiptInfo {
    let status_code = match receipt.inner.status_or_post_state() {
        Eip658Value::Eip658(success) => Some(u64::from(success)),
        Eip658Value::PostState(_) => None,
    };

    ReceiptInfo {
        tx_hash: receipt.transaction_hash,
        block_hash: receipt.block_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        status_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::transports::TransportErrorKind;

    fn test_config() -> NodeConfig {
        NodeConfig {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337, // Anvil default
        }
    }

    #[test]
    fn test_gateway_creation_is_offline() {
        let gateway = RpcGateway::connect(&test_config()).unwrap();
        assert_eq!(gateway.rpc_url(), "http://localhost:8545");
        assert!(format!("{:?}", gateway).contains("localhost:8545"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let err = RpcGateway::connect(&config).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[test]
    fn test_classify_node_error_payload() {
        let payload = ErrorPayload {
            code: -32000,
            message: "nonce too low".into(),
            data: None,
        };
        let err = classify(RpcError::ErrorResp(payload));
        assert!(matches!(err, FacadeError::Node(ref msg) if msg == "nonce too low"));
    }

    #[test]
    fn test_classify_transport_failure() {
        let err = classify(TransportErrorKind::backend_gone());
        assert!(matches!(err, FacadeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_failure() {
        let mut config = test_config();
        config.rpc_url = "http://127.0.0.1:1".to_string();
        let gateway = RpcGateway::connect(&config).unwrap();
        let result = gateway.get_gas_price().await;
        assert!(matches!(result, Err(FacadeError::Transport(_))));
    }
}

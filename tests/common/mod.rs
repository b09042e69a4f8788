//! Shared utilities for integration testing.
//!
//! `MockGateway` is an in-memory node: tests seed balances, contract
//! responses, transactions, receipts and blocks, then inspect which
//! requests reached it.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::rpc::types::TransactionRequest;
use eth_facade::blockchain::{
    BlockInfo, ChainId, FacadeError, FacadeResult, NodeGateway, ReceiptInfo, TransactionInfo,
    TransactionLifecycle,
};

pub const OWNER: &str = "0x2C104AB32BEA7eCff8f37987AB1930bdF9FDb0ac";
pub const RECIPIENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const TOKEN: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

pub fn addr(input: &str) -> Address {
    input.parse().unwrap()
}

pub fn tx_hash(byte: u8) -> TxHash {
    B256::repeat_byte(byte)
}

pub fn tx_id(byte: u8) -> String {
    tx_hash(byte).to_string()
}

/// ABI word holding an unsigned integer.
pub fn abi_uint(value: u128) -> Bytes {
    Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec())
}

/// ABI return data of a single `string`.
pub fn abi_string(value: &str) -> Bytes {
    let mut out = Vec::new();
    out.extend_from_slice(&U256::from(32u8).to_be_bytes::<32>());
    out.extend_from_slice(&U256::from(value.len()).to_be_bytes::<32>());
    let mut data = value.as_bytes().to_vec();
    data.resize(value.len().div_ceil(32) * 32, 0);
    out.extend_from_slice(&data);
    Bytes::from(out)
}

pub fn transaction(byte: u8, block_hash: Option<B256>) -> TransactionInfo {
    TransactionInfo {
        hash: tx_hash(byte),
        block_hash,
        block_number: block_hash.map(|_| 100),
        from: addr(OWNER),
        to: Some(addr(RECIPIENT)),
        value: U256::from(byte),
        nonce: u64::from(byte),
        gas_limit: 21_000,
        input: Bytes::new(),
    }
}

pub fn receipt(byte: u8, status_code: Option<u64>) -> ReceiptInfo {
    ReceiptInfo {
        tx_hash: tx_hash(byte),
        block_hash: Some(B256::repeat_byte(0xbb)),
        block_number: Some(100),
        gas_used: 21_000,
        status_code,
    }
}

/// In-memory node.
#[derive(Default)]
pub struct MockGateway {
    pub chain_id: u64,
    pub balances: HashMap<Address, U256>,
    /// Contract call responses by function selector; `Err` is a node error.
    pub call_results: HashMap<[u8; 4], Result<Bytes, String>>,
    pub gas_estimate: Option<Result<u64, String>>,
    pub send_result: Option<Result<TxHash, String>>,
    pub transactions: HashMap<TxHash, TransactionInfo>,
    /// Transaction ids whose lookup fails at the transport level.
    pub poisoned: HashSet<TxHash>,
    pub receipts: HashMap<TxHash, ReceiptInfo>,
    pub blocks: HashMap<u64, BlockInfo>,
    pub nonce: u64,
    pub gas_price: u128,

    requests: AtomicUsize,
    pub sent_payloads: Mutex<Vec<Bytes>>,
    pub estimated: Mutex<Vec<TransactionRequest>>,
    pub called: Mutex<Vec<TransactionRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            chain_id: 31337,
            gas_price: 2_000_000_000,
            ..Default::default()
        }
    }

    /// Number of requests that reached the node.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn into_lifecycle(self) -> (Arc<MockGateway>, TransactionLifecycle<MockGateway>) {
        let gateway = Arc::new(self);
        let lifecycle = TransactionLifecycle::new(gateway.clone());
        (gateway, lifecycle)
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

impl NodeGateway for MockGateway {
    async fn get_chain_id(&self) -> FacadeResult<ChainId> {
        self.hit();
        Ok(ChainId(self.chain_id))
    }

    async fn get_balance(&self, address: Address) -> FacadeResult<U256> {
        self.hit();
        Ok(self.balances.get(&address).copied().unwrap_or_default())
    }

    async fn call(&self, request: TransactionRequest) -> FacadeResult<Bytes> {
        self.hit();
        let selector: [u8; 4] = request
            .input
            .input()
            .and_then(|input| input.get(..4))
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| FacadeError::Node("execution reverted".to_string()))?;
        self.called.lock().unwrap().push(request);

        match self.call_results.get(&selector) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(message)) => Err(FacadeError::Node(message.clone())),
            None => Err(FacadeError::Node("execution reverted".to_string())),
        }
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> FacadeResult<u64> {
        self.hit();
        self.estimated.lock().unwrap().push(request);
        match &self.gas_estimate {
            Some(Ok(gas)) => Ok(*gas),
            Some(Err(message)) => Err(FacadeError::Node(message.clone())),
            None => Ok(21_000),
        }
    }

    async fn send_raw_transaction(&self, payload: Bytes) -> FacadeResult<TxHash> {
        self.hit();
        self.sent_payloads.lock().unwrap().push(payload);
        match &self.send_result {
            Some(Ok(hash)) => Ok(*hash),
            Some(Err(message)) => Err(FacadeError::Node(message.clone())),
            None => Ok(tx_hash(0xee)),
        }
    }

    async fn get_transaction_by_hash(&self, hash: TxHash) -> FacadeResult<Option<TransactionInfo>> {
        self.hit();
        if self.poisoned.contains(&hash) {
            return Err(FacadeError::Transport("connection reset by peer".to_string()));
        }
        Ok(self.transactions.get(&hash).cloned())
    }

    async fn get_transaction_receipt(&self, hash: TxHash) -> FacadeResult<Option<ReceiptInfo>> {
        self.hit();
        Ok(self.receipts.get(&hash).cloned())
    }

    async fn get_block_by_number(&self, number: u64) -> FacadeResult<Option<BlockInfo>> {
        self.hit();
        Ok(self.blocks.get(&number).cloned())
    }

    async fn get_transaction_count(&self, _address: Address) -> FacadeResult<u64> {
        self.hit();
        Ok(self.nonce)
    }

    async fn get_gas_price(&self) -> FacadeResult<u128> {
        self.hit();
        Ok(self.gas_price)
    }
}

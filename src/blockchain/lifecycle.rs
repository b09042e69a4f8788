//! Transaction lifecycle and account queries.
//!
//! # Responsibilities
//! - Validate caller input before anything reaches the node
//! - Prepare transfers (nonce, gas price, gas estimate)
//! - Broadcast signed payloads exactly once
//! - Decide whether a transaction is pending, included or reverted
//! - Read native and ERC20 balances and token metadata
//!
//! # State Machine
//! ```text
//! Built → Estimated → Broadcast → Pending ─┬→ Included
//!                                          └→ Reverted
//! ```

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{hex, Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;

use crate::blockchain::address::parse_address;
use crate::blockchain::gateway::NodeGateway;
use crate::blockchain::token::{self, IERC20};
use crate::blockchain::types::{
    FacadeError, FacadeResult, TokenMetadata, TransactionInfo, TransactionRecord, TxStatus,
};
use crate::units::{from_display, from_ether, to_display, ETHER_DECIMALS};

/// Receipt status code of a successful transaction.
const RECEIPT_STATUS_SUCCESS: u64 = 1;

/// Receipt status code of a reverted transaction.
const RECEIPT_STATUS_FAILURE: u64 = 0;

/// Parse a `0x`-prefixed 32-byte transaction id.
pub fn parse_tx_hash(input: &str) -> FacadeResult<TxHash> {
    if !input.starts_with("0x") {
        return Err(FacadeError::InvalidFormat(format!("transaction id '{input}'")));
    }
    input
        .parse()
        .map_err(|_| FacadeError::InvalidFormat(format!("transaction id '{input}'")))
}

/// A transfer whose addresses and amount were checked without touching the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    pub from: Address,
    pub to: Address,
    /// ERC20 contract; `None` for a native transfer.
    pub token: Option<Address>,
    /// Display amount, scaled once the decimals are known.
    pub amount: String,
}

impl TransferIntent {
    /// Validate every caller-supplied field of a transfer.
    ///
    /// # Errors
    /// - `InvalidAddress` for a malformed sender, recipient or token
    /// - `InvalidFormat` or `Overflow` for an unusable amount
    pub fn parse(from: &str, to: &str, amount: &str, token: Option<&str>) -> FacadeResult<Self> {
        let from = parse_address(from)?;
        let to = parse_address(to)?;
        let token = token.map(parse_address).transpose()?;

        // Scaling only grows a value, so an amount that fails at scale 0
        // fails at every scale.
        from_display(amount, 0)?;

        Ok(Self {
            from,
            to,
            token,
            amount: amount.to_string(),
        })
    }
}

/// Drives transactions from intent to outcome over a [`NodeGateway`].
pub struct TransactionLifecycle<G> {
    gateway: Arc<G>,
}

impl<G> Clone for TransactionLifecycle<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
        }
    }
}

impl<G: NodeGateway> TransactionLifecycle<G> {
    /// Create a lifecycle over a shared gateway.
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Get the underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Verify the node serves the expected chain.
    pub async fn verify_chain_id(&self, expected: u64) -> FacadeResult<()> {
        let actual = self.gateway.get_chain_id().await?.0;
        if actual != expected {
            return Err(FacadeError::ChainMismatch { expected, actual });
        }
        Ok(())
    }

    /// Native balance of `address`, formatted in ether.
    pub async fn native_balance(&self, address: &str) -> FacadeResult<String> {
        let address = parse_address(address)?;
        let balance = self.gateway.get_balance(address).await?;
        tracing::debug!(%address, wei = %balance, "Fetched native balance");
        Ok(to_display(balance, ETHER_DECIMALS))
    }

    /// ERC20 balance of `address`, formatted with the token's decimals.
    ///
    /// Two round trips: `balanceOf`, then `decimals`.
    pub async fn token_balance(&self, address: &str, contract: &str) -> FacadeResult<String> {
        let owner = parse_address(address)?;
        let contract = parse_address(contract)?;

        let raw = self.raw_token_balance(owner, contract).await?;
        let decimals = self.read_decimals(contract).await?;
        Ok(to_display(raw, decimals))
    }

    /// ERC20 balance formatted with caller-supplied decimals (one round trip).
    pub async fn token_balance_with_decimals(
        &self,
        address: &str,
        contract: &str,
        decimals: u8,
    ) -> FacadeResult<String> {
        let owner = parse_address(address)?;
        let contract = parse_address(contract)?;

        let raw = self.raw_token_balance(owner, contract).await?;
        Ok(to_display(raw, decimals))
    }

    /// Decimal count reported by the token contract.
    pub async fn token_decimals(&self, contract: &str) -> FacadeResult<u8> {
        let contract = parse_address(contract)?;
        self.read_decimals(contract).await
    }

    /// Symbol reported by the token contract.
    pub async fn token_symbol(&self, contract: &str) -> FacadeResult<String> {
        let contract = parse_address(contract)?;
        self.read_contract(Address::ZERO, contract, IERC20::symbolCall {})
            .await
    }

    /// Name reported by the token contract.
    pub async fn token_name(&self, contract: &str) -> FacadeResult<String> {
        let contract = parse_address(contract)?;
        self.read_contract(Address::ZERO, contract, IERC20::nameCall {})
            .await
    }

    /// Symbol, name and decimals in three read-only calls.
    pub async fn token_metadata(&self, contract: &str) -> FacadeResult<TokenMetadata> {
        let contract = parse_address(contract)?;

        let symbol = self
            .read_contract(Address::ZERO, contract, IERC20::symbolCall {})
            .await?;
        let name = self
            .read_contract(Address::ZERO, contract, IERC20::nameCall {})
            .await?;
        let decimals = self.read_decimals(contract).await?;

        Ok(TokenMetadata {
            symbol,
            name,
            decimals,
        })
    }

    /// Gas needed for an ERC20 `transfer(to, value)` sent by `from`.
    pub async fn estimate_gas(
        &self,
        from: &str,
        to: &str,
        contract: &str,
        value: U256,
    ) -> FacadeResult<u64> {
        let from = parse_address(from)?;
        let to = parse_address(to)?;
        let contract = parse_address(contract)?;

        let request = token_transfer_request(from, to, contract, value);
        let gas = self.gateway.estimate_gas(request).await?;

        tracing::debug!(%from, %contract, gas, "Estimated token transfer gas");
        Ok(gas)
    }

    /// Build a fully populated transfer ready for signing.
    ///
    /// `value` is raw: wei for native transfers, token units when `token`
    /// names an ERC20 contract.
    pub async fn prepare_transfer(
        &self,
        from: &str,
        to: &str,
        value: U256,
        token: Option<&str>,
    ) -> FacadeResult<TransactionRequest> {
        let from = parse_address(from)?;
        let to = parse_address(to)?;
        let token = token.map(parse_address).transpose()?;

        self.populate_transfer(from, to, value, token).await
    }

    /// Raw value of an intent: wei for native transfers, token units otherwise.
    pub async fn intent_value(&self, intent: &TransferIntent) -> FacadeResult<U256> {
        match intent.token {
            Some(contract) => {
                let decimals = self.read_decimals(contract).await?;
                Ok(from_display(&intent.amount, decimals)?)
            }
            None => Ok(from_ether(&intent.amount)?),
        }
    }

    /// Gas for a transfer given as a display amount.
    ///
    /// Every field is validated before the first request.
    pub async fn estimate_transfer_gas(
        &self,
        from: &str,
        to: &str,
        amount: &str,
        token: Option<&str>,
    ) -> FacadeResult<u64> {
        let intent = TransferIntent::parse(from, to, amount, token)?;
        let value = self.intent_value(&intent).await?;

        let request = transfer_request(intent.from, intent.to, value, intent.token);
        let gas = self.gateway.estimate_gas(request).await?;

        tracing::debug!(from = %intent.from, token = ?intent.token, gas, "Estimated transfer gas");
        Ok(gas)
    }

    /// Prepare a transfer given as a display amount on the expected chain.
    ///
    /// Every field is validated before the first request.
    pub async fn prepare_display_transfer(
        &self,
        from: &str,
        to: &str,
        amount: &str,
        token: Option<&str>,
        expected_chain_id: u64,
    ) -> FacadeResult<TransactionRequest> {
        let intent = TransferIntent::parse(from, to, amount, token)?;
        self.verify_chain_id(expected_chain_id).await?;

        let value = self.intent_value(&intent).await?;
        self.populate_transfer(intent.from, intent.to, value, intent.token)
            .await
    }

    /// Submit a hex-encoded signed transaction.
    ///
    /// Not retried: a failed broadcast is reported and resubmission is left
    /// to the caller.
    pub async fn broadcast(&self, signed_payload: &str) -> FacadeResult<TxHash> {
        let bytes = hex::decode(signed_payload.trim())
            .map_err(|e| FacadeError::InvalidFormat(format!("signed payload: {e}")))?;
        if bytes.is_empty() {
            return Err(FacadeError::InvalidFormat("signed payload is empty".to_string()));
        }

        self.broadcast_bytes(bytes.into()).await
    }

    /// Submit raw signed transaction bytes.
    pub async fn broadcast_bytes(&self, payload: Bytes) -> FacadeResult<TxHash> {
        match self.gateway.send_raw_transaction(payload).await {
            Ok(tx_hash) => {
                tracing::info!(tx_hash = %tx_hash, "Transaction broadcast");
                Ok(tx_hash)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Broadcast rejected");
                Err(e)
            }
        }
    }

    /// Look up a transaction by id, with its status resolved from the receipt.
    ///
    /// `None` if the node does not know the id. A mined transaction without a
    /// usable receipt is `InconsistentState`, as in [`Self::transaction_status`].
    pub async fn transaction(&self, tx_id: &str) -> FacadeResult<Option<TransactionRecord>> {
        let hash = parse_tx_hash(tx_id)?;
        let Some(tx) = self.gateway.get_transaction_by_hash(hash).await? else {
            return Ok(None);
        };

        let status = self.resolve_status(&tx).await?;
        Ok(Some(TransactionRecord::new(tx, status)))
    }

    /// Current lifecycle state of a transaction.
    ///
    /// # Errors
    /// - `UnknownTransaction` if the node does not know the id
    /// - `InconsistentState` if the transaction has a block hash but no
    ///   receipt, or the receipt carries no recognised status code
    pub async fn transaction_status(&self, tx_id: &str) -> FacadeResult<TxStatus> {
        let hash = parse_tx_hash(tx_id)?;

        let tx = self
            .gateway
            .get_transaction_by_hash(hash)
            .await?
            .ok_or(FacadeError::UnknownTransaction(hash))?;

        self.resolve_status(&tx).await
    }

    /// Whether a transaction is mined with a successful receipt.
    ///
    /// A transaction without a block hash is simply not confirmed yet.
    pub async fn is_confirmed(&self, tx_id: &str) -> FacadeResult<bool> {
        Ok(self.transaction_status(tx_id).await? == TxStatus::Included)
    }

    /// All transactions of the block at `height`.
    ///
    /// Individual transactions that fail to load, or whose receipt cannot
    /// settle their status, are logged and skipped.
    pub async fn block_transactions(&self, height: u64) -> FacadeResult<Vec<TransactionRecord>> {
        let block = self
            .gateway
            .get_block_by_number(height)
            .await?
            .ok_or(FacadeError::UnknownBlock(height))?;

        let mut records = Vec::with_capacity(block.transactions.len());
        for hash in &block.transactions {
            match self.gateway.get_transaction_by_hash(*hash).await {
                Ok(Some(tx)) => match self.resolve_status(&tx).await {
                    Ok(status) => records.push(TransactionRecord::new(tx, status)),
                    Err(e) => {
                        tracing::warn!(tx_hash = %hash, height, error = %e, "Failed to resolve block transaction status, skipping");
                    }
                },
                Ok(None) => {
                    tracing::warn!(tx_hash = %hash, height, "Block transaction not found, skipping");
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %hash, height, error = %e, "Failed to fetch block transaction, skipping");
                }
            }
        }

        tracing::info!(
            height = block.number,
            block_hash = %block.hash,
            listed = block.transactions.len(),
            fetched = records.len(),
            "Fetched block transactions"
        );

        Ok(records)
    }

    /// Pending without a real block hash, otherwise decided by the receipt.
    async fn resolve_status(&self, tx: &TransactionInfo) -> FacadeResult<TxStatus> {
        let hash = tx.hash;
        if !tx.is_included() {
            tracing::debug!(tx_hash = %hash, "Transaction pending");
            return Ok(TxStatus::Pending);
        }

        let receipt = self
            .gateway
            .get_transaction_receipt(hash)
            .await?
            .ok_or_else(|| {
                FacadeError::InconsistentState(format!(
                    "transaction {hash} is in a block but has no receipt"
                ))
            })?;

        match receipt.status_code {
            Some(RECEIPT_STATUS_SUCCESS) => Ok(TxStatus::Included),
            Some(RECEIPT_STATUS_FAILURE) => Ok(TxStatus::Reverted),
            Some(code) => Err(FacadeError::InconsistentState(format!(
                "receipt for {hash} has unrecognized status code {code}"
            ))),
            None => Err(FacadeError::InconsistentState(format!(
                "receipt for {hash} has no status code"
            ))),
        }
    }

    async fn populate_transfer(
        &self,
        from: Address,
        to: Address,
        value: U256,
        token: Option<Address>,
    ) -> FacadeResult<TransactionRequest> {
        let request = transfer_request(from, to, value, token);

        let nonce = self.gateway.get_transaction_count(from).await?;
        let gas_price = self.gateway.get_gas_price().await?;
        let gas_limit = self.gateway.estimate_gas(request.clone()).await?;
        let chain_id = self.gateway.get_chain_id().await?;

        tracing::info!(
            %from,
            %to,
            nonce,
            gas_price,
            gas_limit,
            chain_id = chain_id.0,
            token = ?token,
            "Transfer prepared"
        );

        Ok(request
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_gas_limit(gas_limit)
            .with_chain_id(chain_id.0))
    }

    async fn raw_token_balance(&self, owner: Address, contract: Address) -> FacadeResult<U256> {
        self.read_contract(owner, contract, IERC20::balanceOfCall { account: owner })
            .await
    }

    async fn read_decimals(&self, contract: Address) -> FacadeResult<u8> {
        let decimals = self
            .read_contract(Address::ZERO, contract, IERC20::decimalsCall {})
            .await?;
        tracing::debug!(%contract, decimals, "Fetched token decimals");
        Ok(decimals)
    }

    async fn read_contract<C: SolCall>(
        &self,
        from: Address,
        contract: Address,
        call: C,
    ) -> FacadeResult<C::Return> {
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(contract)
            .with_input(call.abi_encode());

        let output = self.gateway.call(request).await.inspect_err(|e| {
            tracing::warn!(%contract, function = C::SIGNATURE, error = %e, "Contract call failed");
        })?;

        token::decode_returns::<C>(&output)
    }
}

fn transfer_request(
    from: Address,
    to: Address,
    value: U256,
    token: Option<Address>,
) -> TransactionRequest {
    match token {
        Some(contract) => token_transfer_request(from, to, contract, value),
        None => TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_value(value),
    }
}

fn token_transfer_request(
    from: Address,
    to: Address,
    contract: Address,
    value: U256,
) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(from)
        .with_to(contract)
        .with_value(U256::ZERO)
        .with_input(token::transfer_call(to, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tx_hash() {
        let id = format!("0x{}", "ab".repeat(32));
        let hash = parse_tx_hash(&id).unwrap();
        assert_eq!(hash.as_slice()[0], 0xab);

        assert!(matches!(
            parse_tx_hash(&"ab".repeat(32)),
            Err(FacadeError::InvalidFormat(_))
        ));
        assert!(matches!(parse_tx_hash("0x1234"), Err(FacadeError::InvalidFormat(_))));
        assert!(matches!(parse_tx_hash(""), Err(FacadeError::InvalidFormat(_))));
    }

    #[test]
    fn test_token_transfer_request_targets_contract() {
        let from = Address::repeat_byte(0x01);
        let to = Address::repeat_byte(0x02);
        let contract = Address::repeat_byte(0x03);

        let request = token_transfer_request(from, to, contract, U256::from(7u8));
        assert_eq!(request.from, Some(from));
        assert_eq!(request.to, Some(contract.into()));
        assert_eq!(request.value, Some(U256::ZERO));

        let input = request.input.input().unwrap();
        assert_eq!(&input[..4], &IERC20::transferCall::SELECTOR);
    }
}

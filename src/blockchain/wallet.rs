//! Key derivation and transaction signing.
//!
//! # Security
//! - Signing keys are loaded ONLY from environment variables
//! - Keys and mnemonics are never logged
//! - `Debug` output of generated wallets redacts the secrets

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::coins_bip39::{English, Mnemonic};
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};
use serde::Serialize;

use crate::blockchain::types::{FacadeError, FacadeResult};

/// Environment variable name for the signing key.
pub const PRIVATE_KEY_ENV_VAR: &str = "ETH_FACADE_PRIVATE_KEY";

/// BIP44 path of the first external Ethereum account.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Mnemonic lengths accepted by BIP39.
pub const SUPPORTED_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Key material produced by [`generate_wallet`] or [`wallet_from_mnemonic`].
#[derive(Clone, Serialize)]
pub struct GeneratedWallet {
    pub mnemonic: String,
    pub derivation_path: String,
    pub address: Address,
    pub private_key: B256,
    /// Uncompressed secp256k1 public key without the `0x04` tag.
    pub public_key: Bytes,
}

impl std::fmt::Debug for GeneratedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedWallet")
            .field("mnemonic", &"<redacted>")
            .field("derivation_path", &self.derivation_path)
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Generate a fresh mnemonic from OS entropy and derive its account key.
pub fn generate_wallet(word_count: usize, derivation_path: &str) -> FacadeResult<GeneratedWallet> {
    if !SUPPORTED_WORD_COUNTS.contains(&word_count) {
        return Err(FacadeError::Wallet(format!(
            "Unsupported mnemonic length {word_count}"
        )));
    }

    let mut rng = rand::thread_rng();
    let mnemonic = Mnemonic::<English>::new_with_count(&mut rng, word_count)
        .map_err(|e| FacadeError::Wallet(format!("Mnemonic generation failed: {}", e)))?;

    wallet_from_mnemonic(&mnemonic.to_phrase(), derivation_path)
}

/// Derive the account key of an existing mnemonic (empty passphrase).
pub fn wallet_from_mnemonic(phrase: &str, derivation_path: &str) -> FacadeResult<GeneratedWallet> {
    let signer = MnemonicBuilder::<English>::default()
        .phrase(phrase)
        .derivation_path(derivation_path)
        .map_err(|e| FacadeError::Wallet(format!("Invalid derivation path: {}", e)))?
        .build()
        .map_err(|e| FacadeError::Wallet(format!("Key derivation failed: {}", e)))?;

    let public_key = signer
        .credential()
        .verifying_key()
        .to_encoded_point(false);

    let wallet = GeneratedWallet {
        mnemonic: phrase.to_string(),
        derivation_path: derivation_path.to_string(),
        address: signer.address(),
        private_key: signer.to_bytes(),
        public_key: Bytes::copy_from_slice(&public_key.as_bytes()[1..]),
    };

    tracing::info!(
        address = %wallet.address,
        derivation_path = %wallet.derivation_path,
        "Wallet derived"
    );

    Ok(wallet)
}

/// Signing wallet for outgoing transactions.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> FacadeResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| FacadeError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet loaded");

        Ok(Self { signer })
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `ETH_FACADE_PRIVATE_KEY` from environment.
    pub fn from_env() -> FacadeResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            FacadeError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a prepared transaction and return its EIP-2718 encoding.
    ///
    /// The request must carry nonce, gas price, gas limit and chain id.
    pub async fn sign_transaction(&self, request: TransactionRequest) -> FacadeResult<Bytes> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let envelope = request
            .build(&wallet)
            .await
            .map_err(|e| FacadeError::Wallet(format!("Transaction signing failed: {}", e)))?;

        tracing::debug!(tx_hash = %envelope.tx_hash(), "Transaction signed");
        Ok(envelope.encoded_2718().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";
    const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(wallet.address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let wallet = Wallet::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(wallet.address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_invalid_private_key() {
        let result = Wallet::from_private_key("invalid_key");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_known_mnemonic_derivation() {
        let wallet = wallet_from_mnemonic(TEST_MNEMONIC, DEFAULT_DERIVATION_PATH).unwrap();
        assert_eq!(wallet.address.to_string().to_lowercase(), TEST_ADDRESS);
        assert_eq!(
            wallet.private_key.to_string(),
            format!("0x{}", TEST_PRIVATE_KEY)
        );
        assert_eq!(wallet.public_key.len(), 64);
    }

    #[test]
    fn test_generated_wallet_round_trips() {
        let generated = generate_wallet(12, DEFAULT_DERIVATION_PATH).unwrap();
        assert_eq!(generated.mnemonic.split_whitespace().count(), 12);

        let recovered = wallet_from_mnemonic(&generated.mnemonic, DEFAULT_DERIVATION_PATH).unwrap();
        assert_eq!(recovered.address, generated.address);
        assert_eq!(recovered.private_key, generated.private_key);
    }

    #[test]
    fn test_unsupported_word_count() {
        let err = generate_wallet(13, DEFAULT_DERIVATION_PATH).unwrap_err();
        assert!(err.to_string().contains("Unsupported mnemonic length"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let wallet = wallet_from_mnemonic(TEST_MNEMONIC, DEFAULT_DERIVATION_PATH).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(!debug.contains("junk"));
        assert!(!debug.contains(TEST_PRIVATE_KEY));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_sign_legacy_transfer() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let request = TransactionRequest::default()
            .with_from(wallet.address())
            .with_to(Address::repeat_byte(0x42))
            .with_value(U256::from(1_000u64))
            .with_nonce(0)
            .with_gas_price(1_000_000_000)
            .with_gas_limit(21_000)
            .with_chain_id(31337);

        let payload = wallet.sign_transaction(request).await.unwrap();
        // Legacy transactions encode as a bare RLP list.
        assert!(payload[0] >= 0xc0);
    }
}

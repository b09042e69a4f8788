//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (chain id, mnemonic length)
//! - Check the RPC URL and log filter parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FacadeConfig → Result<(), Vec<ValidationError>>

use tracing_subscriber::EnvFilter;

use crate::blockchain::wallet::SUPPORTED_WORD_COUNTS;
use crate::config::schema::FacadeConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &FacadeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.node.rpc_url.parse::<url::Url>() {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "node.rpc_url",
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("node.rpc_url", e.to_string())),
    }

    if config.node.chain_id == 0 {
        errors.push(ValidationError::new("node.chain_id", "must be greater than 0"));
    }

    if !SUPPORTED_WORD_COUNTS.contains(&config.wallet.word_count) {
        errors.push(ValidationError::new(
            "wallet.word_count",
            format!("{} is not one of {:?}", config.wallet.word_count, SUPPORTED_WORD_COUNTS),
        ));
    }

    if !config.wallet.derivation_path.starts_with("m/") {
        errors.push(ValidationError::new(
            "wallet.derivation_path",
            "must start with 'm/'",
        ));
    }

    if let Err(e) = EnvFilter::try_new(&config.observability.log_level) {
        errors.push(ValidationError::new("observability.log_level", e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&FacadeConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FacadeConfig::default();
        config.node.rpc_url = "ws://localhost:8546".to_string();
        config.node.chain_id = 0;
        config.wallet.word_count = 13;
        config.wallet.derivation_path = "44'/60'".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "node.rpc_url",
                "node.chain_id",
                "wallet.word_count",
                "wallet.derivation_path"
            ]
        );
    }

    #[test]
    fn test_unparseable_url() {
        let mut config = FacadeConfig::default();
        config.node.rpc_url = "localhost".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "node.rpc_url");
    }
}

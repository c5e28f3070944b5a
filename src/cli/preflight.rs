//! Pre-flight checks before expensive operations.
//!
//! Validates that required API credentials are configured before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, TerpError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion requires the embedding API token.
    Ingest,
    /// Chat requires both the embedding token and the chat API key.
    Chat,
    /// Generation requires the chat API key.
    Generate,
    /// Search requires the embedding token.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest | Operation::Search => {
            check_env_key(&settings.embedding.api_key_env)?;
        }
        Operation::Chat => {
            check_env_key(&settings.embedding.api_key_env)?;
            check_env_key(&settings.api.api_key_env)?;
        }
        Operation::Generate => {
            check_env_key(&settings.api.api_key_env)?;
        }
    }
    Ok(())
}

/// Check that an API credential environment variable is set and non-empty.
fn check_env_key(name: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(TerpError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            name, name
        ))),
        Err(_) => Err(TerpError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            name, name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_missing_key_fails() {
        assert!(check_env_key("TERP_TEST_KEY_THAT_DOES_NOT_EXIST").is_err());
    }
}

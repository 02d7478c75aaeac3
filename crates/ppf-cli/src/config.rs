//! Configuration file management.
//!
//! The file is TOML. Its path comes from `--config` or the `PPF_CONFIG`
//! environment variable; a missing file means defaults.

use std::path::Path;

use anyhow::{bail, Context};
use ppf_crypto::secp256k1::OperatorKey;
use ppf_types::Address;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Environment variable holding the operator key as hex.
pub const OPERATOR_KEY_ENV: &str = "PPF_OPERATOR_KEY";

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Feed roles.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Operator key location.
    #[serde(default)]
    pub signer: SignerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Roles of the feed a replay runs against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Authorized operator. Defaults to the signer's address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Address>,
    /// Owner allowed to replace the operator. Defaults to the operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_owner: Option<Address>,
}

/// Where the operator key comes from. `key_hex` wins over `key_file`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignerConfig {
    #[serde(default)]
    pub key_hex: String,
    /// File containing the key as hex.
    #[serde(default)]
    pub key_file: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "trace" | "debug" | "info" | "warn" | "error". `RUST_LOG` overrides.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`.
    ///
    /// Falls back to defaults if no path is given or the file does not exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the operator key from config, key file or `PPF_OPERATOR_KEY`.
    pub fn operator_key(&self) -> anyhow::Result<OperatorKey> {
        if !self.signer.key_hex.is_empty() {
            return Ok(OperatorKey::from_hex(&self.signer.key_hex)?);
        }
        if !self.signer.key_file.is_empty() {
            let mut content = std::fs::read_to_string(&self.signer.key_file)
                .with_context(|| format!("reading key file {}", self.signer.key_file))?;
            let key = OperatorKey::from_hex(content.trim());
            content.zeroize();
            return Ok(key?);
        }
        if let Ok(mut hex_key) = std::env::var(OPERATOR_KEY_ENV) {
            let key = OperatorKey::from_hex(&hex_key);
            hex_key.zeroize();
            return Ok(key?);
        }
        bail!("no operator key: set signer.key_hex, signer.key_file or {OPERATOR_KEY_ENV}")
    }

    /// Operator and owner for a replay, filling gaps from the signer key.
    pub fn roles(&self) -> anyhow::Result<(Address, Address)> {
        let operator = match self.feed.operator {
            Some(operator) => operator,
            None => self
                .operator_key()
                .context("feed.operator not set and no signer key to derive it")?
                .address(),
        };
        let owner = self.feed.operator_owner.unwrap_or(operator);
        Ok((operator, owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert!(config.feed.operator.is_none());
        assert!(config.signer.key_hex.is_empty());
        assert_eq!(config.logging.log_level, "info");
    }

    #[test]
    fn test_config_serialization() {
        let config = CliConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let _parsed: CliConfig = toml::from_str(&toml_str).expect("parse");
    }

    #[test]
    fn test_parse_roles() {
        let config = CliConfig::parse(
            r#"
            [feed]
            operator = "0x6ec28f4e814f88da2d981e6e787b786162006d39"
            operator_owner = "0x1234123412341234123412341234123412341234"

            [logging]
            log_level = "debug"
            "#,
        )
        .expect("parse");
        let (operator, owner) = config.roles().expect("roles");
        assert_eq!(operator.to_string(), "0x6ec28f4e814f88da2d981e6e787b786162006d39");
        assert_eq!(owner.to_string(), "0x1234123412341234123412341234123412341234");
        assert_eq!(config.logging.log_level, "debug");
    }

    #[test]
    fn test_operator_derived_from_key() {
        let config = CliConfig::parse(
            r#"
            [signer]
            key_hex = "0xb9694bb642e9721b2d5ed112a9114ff32f07f15b4a3b10a4e1651e9542c6fe2f"
            "#,
        )
        .expect("parse");
        let (operator, owner) = config.roles().expect("roles");
        assert_eq!(operator.to_string(), "0x6ec28f4e814f88da2d981e6e787b786162006d39");
        assert_eq!(owner, operator);
    }

    #[test]
    fn test_bad_address_rejected() {
        assert!(CliConfig::parse("[feed]\noperator = \"0x12\"\n").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = CliConfig::load(Some(Path::new("/nonexistent/ppf/config.toml")))
            .expect("defaults");
        assert_eq!(config.logging.log_level, "info");
        assert!(CliConfig::load(None).expect("defaults").feed.operator.is_none());
    }

    const OPERATOR_PK: &str = "b9694bb642e9721b2d5ed112a9114ff32f07f15b4a3b10a4e1651e9542c6fe2f";
    const OPERATOR: &str = "0x6ec28f4e814f88da2d981e6e787b786162006d39";
    const SCALAR_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const SCALAR_ONE_ADDRESS: &str = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf";

    fn key_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "{content}").expect("write key");
        file
    }

    fn signer_config(key_hex: &str, key_file: Option<&tempfile::NamedTempFile>) -> CliConfig {
        let mut config = CliConfig::default();
        config.signer.key_hex = key_hex.to_string();
        if let Some(file) = key_file {
            config.signer.key_file = file.path().display().to_string();
        }
        config
    }

    fn address_of(config: &CliConfig) -> String {
        config.operator_key().expect("operator key").address().to_string()
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ppf.toml");
        std::fs::write(
            &path,
            format!(
                "[feed]\noperator = \"{OPERATOR}\"\n\n[signer]\nkey_hex = \"{OPERATOR_PK}\"\n\n\
                 [logging]\nlog_level = \"debug\"\n"
            ),
        )
        .expect("write config");

        let config = CliConfig::load(Some(path.as_path())).expect("load");
        assert_eq!(config.feed.operator.map(|a| a.to_string()).as_deref(), Some(OPERATOR));
        assert_eq!(config.logging.log_level, "debug");
        assert_eq!(address_of(&config), OPERATOR);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ppf.toml");
        std::fs::write(&path, "[feed\noperator = 1\n").expect("write config");
        assert!(CliConfig::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_key_from_file() {
        let file = key_file(&format!("0x{OPERATOR_PK}"));
        assert_eq!(address_of(&signer_config("", Some(&file))), OPERATOR);
    }

    #[test]
    fn test_key_hex_wins_over_key_file() {
        let file = key_file(SCALAR_ONE);
        assert_eq!(address_of(&signer_config(OPERATOR_PK, Some(&file))), OPERATOR);
        assert_eq!(address_of(&signer_config("", Some(&file))), SCALAR_ONE_ADDRESS);
    }

    #[test]
    fn test_bad_key_file_rejected() {
        let file = key_file("not a key");
        assert!(signer_config("", Some(&file)).operator_key().is_err());

        let zero = key_file(&"0".repeat(64));
        assert!(signer_config("", Some(&zero)).operator_key().is_err());

        let mut missing = CliConfig::default();
        missing.signer.key_file = "/nonexistent/ppf/operator.key".to_string();
        assert!(missing.operator_key().is_err());
    }

    #[test]
    fn test_env_key_is_last_fallback() {
        let file = key_file(OPERATOR_PK);

        std::env::set_var(OPERATOR_KEY_ENV, SCALAR_ONE);
        let from_env = signer_config("", None).operator_key().map(|k| k.address());
        let from_file = signer_config("", Some(&file)).operator_key().map(|k| k.address());
        let from_hex = signer_config(OPERATOR_PK, None).operator_key().map(|k| k.address());
        std::env::remove_var(OPERATOR_KEY_ENV);

        assert_eq!(from_env.expect("env key").to_string(), SCALAR_ONE_ADDRESS);
        assert_eq!(from_file.expect("file key").to_string(), OPERATOR);
        assert_eq!(from_hex.expect("hex key").to_string(), OPERATOR);
    }
}

//! `shadowpatch.toml` loading.
//!
//! ```toml
//! roots = ["app::Person", "app::Ledger"]
//!
//! [reader]
//! deny_unknown_fields = true
//! max_depth = 32
//! ```

use serde::{Deserialize, Serialize};
use shadowpatch_core::reader::{DEFAULT_MAX_DEPTH, ReaderOptions};
use shadowpatch_schema::node::{TypeRef, TypeRefParseError};
use std::{collections::BTreeSet, fs, io, path::Path, str::FromStr};
use thiserror::Error as ThisError;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "shadowpatch.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid root type: {0}")]
    InvalidRoot(#[from] TypeRefParseError),

    #[error("reader.max_depth must be at least 1")]
    InvalidMaxDepth,
}

///
/// ShadowConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadowConfig {
    /// Entry-point types, in `TypeRef` syntax.
    pub roots: Vec<String>,

    pub reader: ReaderConfig,
}

impl ShadowConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;

        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.reader.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }
        self.root_types()?;

        Ok(())
    }

    /// Parsed root set; duplicates collapse.
    pub fn root_types(&self) -> Result<BTreeSet<TypeRef>, ConfigError> {
        self.roots
            .iter()
            .map(|root| TypeRef::from_str(root).map_err(ConfigError::from))
            .collect()
    }

    #[must_use]
    pub const fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            deny_unknown_fields: self.reader.deny_unknown_fields,
            max_depth: self.reader.max_depth,
        }
    }
}

///
/// ReaderConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    pub deny_unknown_fields: bool,
    pub max_depth: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            deny_unknown_fields: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ShadowConfig::from_toml_str("").expect("empty config parses");

        assert!(config.roots.is_empty());
        assert_eq!(config.reader_options(), ReaderOptions::default());
    }

    #[test]
    fn roots_and_reader_section_parse() {
        let config = ShadowConfig::from_toml_str(
            r#"
            roots = ["app::Person", "app::Box<app::Item>", "app::Person"]

            [reader]
            deny_unknown_fields = true
            max_depth = 8
            "#,
        )
        .expect("config parses");

        let roots = config.root_types().expect("roots parse");
        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&TypeRef::named("app::Person")));
        assert!(roots.contains(&TypeRef::generic(
            "app::Box",
            vec![TypeRef::named("app::Item")]
        )));
        assert_eq!(
            config.reader_options(),
            ReaderOptions {
                deny_unknown_fields: true,
                max_depth: 8,
            }
        );
    }

    #[test]
    fn bad_root_is_rejected_at_load() {
        let err = ShadowConfig::from_toml_str(r#"roots = ["app::Box<"]"#)
            .expect_err("unterminated generic");

        assert!(matches!(err, ConfigError::InvalidRoot(_)));
    }

    #[test]
    fn unknown_keys_and_zero_depth_are_rejected() {
        assert!(matches!(
            ShadowConfig::from_toml_str("rots = []"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ShadowConfig::from_toml_str("[reader]\nmax_depth = 0"),
            Err(ConfigError::InvalidMaxDepth)
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ShadowConfig::load("/nonexistent/shadowpatch.toml").expect_err("no such file");

        assert!(matches!(err, ConfigError::Io(_)));
    }
}

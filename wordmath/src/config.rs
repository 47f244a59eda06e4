//! `appsettings.json` style configuration.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use wordmath_parser::ParseOptions;
use wordmath_passes::naming::Naming;
use wordmath_target::unit::UnitHeader;
use wordmath_target::Language;

/// Prefixes of generated identifiers. Missing keys keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NamingConfig {
    pub variable_prefix: String,
    pub function_prefix: String,
    pub init_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        let naming = Naming::default();
        Self {
            variable_prefix: naming.variable_prefix,
            function_prefix: naming.function_prefix,
            init_prefix: naming.init_prefix,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub language: Language,
    pub namespace: String,
    pub class_name: String,
    /// Skip statements that fail to parse instead of aborting.
    pub ignore_errors: bool,
    pub naming: NamingConfig,
}

impl Default for Config {
    fn default() -> Self {
        let header = UnitHeader::default();
        Self {
            language: Language::default(),
            namespace: header.namespace,
            class_name: header.class_name,
            ignore_errors: false,
            naming: NamingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn header(&self) -> UnitHeader {
        UnitHeader {
            namespace: self.namespace.clone(),
            class_name: self.class_name.clone(),
        }
    }

    pub fn naming(&self) -> Naming {
        Naming {
            variable_prefix: self.naming.variable_prefix.clone(),
            function_prefix: self.naming.function_prefix.clone(),
            init_prefix: self.naming.init_prefix.clone(),
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            skip_broken_statements: self.ignore_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.language, Language::CSharp);
        assert_eq!(config.header(), UnitHeader::default());
        assert_eq!(config.naming(), Naming::default());
        assert!(!config.parse_options().skip_broken_statements);
    }

    #[test]
    fn test_keys() {
        let config = Config::from_json_str(
            r#"{
                "language": "VisualBasic",
                "namespace": "Physics",
                "className": "Kinematics",
                "ignoreErrors": true,
                "naming": { "functionPrefix": "fn_" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.language, Language::VisualBasic);
        assert_eq!(config.header().namespace, "Physics");
        assert_eq!(config.header().class_name, "Kinematics");
        assert!(config.parse_options().skip_broken_statements);
        assert_eq!(config.naming().function_prefix, "fn_");
        assert_eq!(config.naming().variable_prefix, "v_");
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            Config::from_json_str(r#"{ "language": "Fortran" }"#),
            Err(Error::Config(_))
        ));
    }
}

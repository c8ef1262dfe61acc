/// Registry files.
///
/// A registry file is TOML listing the known annotation classes and,
/// optionally, the namespace aliases to resolve them with:
///
/// ```toml
/// [namespaces]
/// ORM = "Doctrine\\ORM\\Mapping"
///
/// [[annotation]]
/// class = "Doctrine\\ORM\\Mapping\\Column"
/// on = ["property"]
/// creator = { kind = "constructor", params = [
///     { name = "type", type = "string", required = true },
/// ] }
/// ```
///
/// Classes loaded this way have no Rust type behind them, so every entry is
/// paired with a [`ClassFactory::record`] that builds a generic
/// [`Record`](crate::Record) for whatever creator the entry declares.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::builder::{ClassFactory, ObjectBuilder};
use crate::error::ConfigError;
use crate::parser::DocblockParser;
use crate::registry::AnnotationConfigurator;
use crate::types::{AnnotationMetadata, Creator, NamespaceMap};

/// Directory name under the user configuration directory.
pub const APP_DIR: &str = "php-annotation";
/// File name of the default registry inside [`APP_DIR`].
pub const REGISTRY_FILE: &str = "registry.toml";

/// A loaded registry file.
#[derive(Debug, Default)]
pub struct Config {
    pub registry: AnnotationConfigurator,
    pub builder: ObjectBuilder,
    pub namespaces: NamespaceMap,
}

impl Config {
    /// A parser over this registry, plus the namespace aliases to use with it.
    pub fn into_parser(self) -> (DocblockParser, NamespaceMap) {
        let parser = DocblockParser::new(Arc::new(self.registry), Arc::new(self.builder));
        (parser, self.namespaces)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default)]
    namespaces: NamespaceMap,
    #[serde(default, rename = "annotation")]
    annotations: Vec<AnnotationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnnotationEntry {
    class: String,
    #[serde(default)]
    on: Option<Vec<String>>,
    #[serde(default)]
    extends: Vec<String>,
    #[serde(default)]
    creator: Creator,
}

/// Parse a registry from TOML text.
pub fn load_str(content: &str) -> Result<Config, ConfigError> {
    let file: RegistryFile = toml::from_str(content)?;
    let config = Config {
        namespaces: file.namespaces,
        ..Config::default()
    };

    for entry in file.annotations {
        let meta = AnnotationMetadata {
            on: entry.on,
            creator: entry.creator,
            ..AnnotationMetadata::new(entry.class)
        };
        config
            .builder
            .register(ClassFactory::record(meta.class.as_str()).extends(entry.extends));
        config.registry.register(meta);
    }

    Ok(config)
}

/// Read and parse the registry file at `path`.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&content)
}

/// `<user config dir>/php-annotation/registry.toml`
///
/// On Linux this honours `XDG_CONFIG_HOME`.
pub fn default_registry_path() -> Result<PathBuf, ConfigError> {
    use etcetera::BaseStrategy;

    let strategy = etcetera::choose_base_strategy().map_err(|_| ConfigError::NoConfigDir)?;
    Ok(strategy.config_dir().join(APP_DIR).join(REGISTRY_FILE))
}

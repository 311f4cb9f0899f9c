use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// Default Alchemy NFT API root for mainnet
pub const DEFAULT_INDEXING_BASE_URL: &str = "https://eth-mainnet.g.alchemy.com/nft/v2";

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub ws: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexingConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Image URI rendered for tokens whose metadata carries none
    #[serde(default)]
    pub placeholder_image: Option<String>,
}

impl Config {
    pub fn indexing_base_url(&self) -> String {
        self.indexing
            .base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INDEXING_BASE_URL.to_string())
    }

    /// API key resolution order: env override, then config file
    pub fn indexing_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("GLIMPSE_API_KEY") {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
        self.indexing
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("GLIMPSE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("glimpse").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("glimpse").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "glimpse", "glimpse")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.endpoints.is_empty());
        assert_eq!(config.indexing_base_url(), DEFAULT_INDEXING_BASE_URL);
    }

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            placeholder_image = "https://example.com/blank.png"

            [indexing]
            base_url = "https://eth-sepolia.g.alchemy.com/nft/v2"
            api_key = "demo"

            [[endpoints]]
            name = "local"
            rpc = "http://localhost:8545"

            [[endpoints]]
            ws = "ws://localhost:8546"
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[0].name.as_deref(), Some("local"));
        assert_eq!(
            config.indexing_base_url(),
            "https://eth-sepolia.g.alchemy.com/nft/v2"
        );
        assert_eq!(
            config.placeholder_image.as_deref(),
            Some("https://example.com/blank.png")
        );
    }
}

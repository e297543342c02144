use blockpost_compiler_html::CompileOptions;
use blockpost_storage::StorageConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "blockpost.config.json";

/// Blockpost configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing block documents (`*.json`)
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Directory compiled and rendered HTML is written to
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// HTML serializer options
    #[serde(default)]
    pub compiler_options: CompileOptions,

    /// Backend settings for published posts
    #[serde(default)]
    pub storage: StorageConfig,

    /// Snapshot file of the local post store
    #[serde(default = "default_store_file")]
    pub store_file: String,
}

fn default_src_dir() -> String {
    "posts".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_store_file() -> String {
    ".blockpost/store.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn get_src_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.src_dir)
    }

    pub fn get_out_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.out_dir)
    }

    pub fn get_store_file(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.store_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            compiler_options: CompileOptions::default(),
            storage: StorageConfig::default(),
            store_file: default_store_file(),
        }
    }
}

use crate::error::CompilerError;
use crate::parser::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "TINYC_CONFIG";
const LOCAL_CONFIG: &str = "tinyc.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TreeFormat {
    /// Indented outline, one node per line
    #[default]
    Outline,
    /// Nested JSON objects
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub tree_format: TreeFormat,
    pub echo_diagnostics: bool,
    /// Deepest nesting of parentheses and `if`/`repeat` bodies the parser
    /// descends into.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: String::from("warn"),
            tree_format: TreeFormat::Outline,
            echo_diagnostics: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Loads the file named by `TINYC_CONFIG`, else `./tinyc.json`, else
    /// falls back to defaults.
    pub fn load() -> Result<Self, CompilerError> {
        match Self::get_config_path() {
            Some(path) => Self::from_path(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, CompilerError> {
        let contents = fs::read_to_string(path).map_err(|source| CompilerError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| CompilerError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get_config_path() -> Option<PathBuf> {
        if let Ok(custom) = env::var(CONFIG_ENV) {
            return Some(PathBuf::from(custom));
        }

        let local = Path::new(LOCAL_CONFIG);
        local.is_file().then(|| local.to_path_buf())
    }

    /// Unknown level names fall back to `warn`.
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::WARN)
    }
}

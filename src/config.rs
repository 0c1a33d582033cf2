use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(about = "Runs the bookshelf service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookshelf")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_database")]
    database: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub turso_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub turso_auth_token: Option<String>,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
}

fn default_database() -> String {
    "bookshelf.db".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_sync_interval() -> u64 {
    60
}

// `${TURSO_URL:-}` substitutes to an empty string when the variable is unset
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str);
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    /// Replaces `${VAR}` and `${VAR:-default}` with values from the
    /// environment. Unset variables without a default become empty.
    fn substitute_env_vars(yaml_str: &str) -> String {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            let Some(end) = result[actual_start..].find('}') else {
                break;
            };
            let var_name = &result[actual_start + 2..actual_start + end];

            let env_value = match var_name.split_once(":-") {
                Some((actual_var, default_val)) => {
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                }
                None => env::var(var_name).unwrap_or_else(|_| {
                    tracing::warn!("environment variable '{}' not found", var_name);
                    String::new()
                }),
            };

            result.replace_range(actual_start..actual_start + end + 1, &env_value);
            offset = actual_start + env_value.len();
        }

        result
    }
}

use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Call-signaling relay server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "callrelay-server", version, about = "Call-signaling relay server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "RELAY_PORT", default_value = "3000")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "RELAY_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./callrelay.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "RELAY_JSON_LOGS")]
    pub json_logs: bool,

    /// Disable the FCM keep-alive broadcaster
    #[arg(long, env = "RELAY_KEEP_ALIVE_DISABLED")]
    pub keep_alive_disabled: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// FCM push transport settings (loaded from [push] section in TOML)
    #[arg(skip)]
    #[serde(default)]
    pub push: Option<PushConfig>,
}

/// Configuration for the FCM push transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// FCM send endpoint URL
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,

    /// FCM server key used in the Authorization header
    #[serde(default)]
    pub server_key: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: default_push_endpoint(),
            server_key: String::new(),
        }
    }
}

fn default_push_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            config: "./callrelay.toml".to_string(),
            json_logs: false,
            keep_alive_disabled: false,
            generate_config: false,
            push: Some(PushConfig::default()),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (RELAY_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("RELAY_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Call-Signaling Relay Server Configuration
# Place this file at ./callrelay.toml or specify with --config <path>
# All settings can be overridden via environment variables (RELAY_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 3000)
# port = 3000

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Disable the once-per-minute FCM keep-alive broadcast
# keep_alive_disabled = false

# ---- FCM Push Transport ----
# [push]

# FCM send endpoint
# endpoint = "https://fcm.googleapis.com/fcm/send"

# FCM server key (required when the keep-alive broadcaster is enabled)
# server_key = ""
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert!(!config.keep_alive_disabled);
        let push = config.push.unwrap();
        assert_eq!(push.endpoint, "https://fcm.googleapis.com/fcm/send");
    }
}

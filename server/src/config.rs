use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// ladder leaderboard server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "ladder-server", version, about = "Live leaderboard push server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "LADDER_PORT", default_value = "8080")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "LADDER_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./ladder.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "LADDER_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Redis connection URL for the ranked score store
    #[arg(long, env = "LADDER_REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Sorted-set key holding the leaderboard
    #[arg(long, env = "LADDER_LEADERBOARD_KEY", default_value = "leaderboard")]
    pub leaderboard_key: String,

    /// Number of entries in a leaderboard snapshot
    #[arg(long, env = "LADDER_LEADERBOARD_SIZE", default_value = "10")]
    pub leaderboard_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            config: "./ladder.toml".to_string(),
            json_logs: false,
            generate_config: false,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            leaderboard_key: "leaderboard".to_string(),
            leaderboard_size: 10,
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (LADDER_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("LADDER_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# ladder Leaderboard Server Configuration
# Place this file at ./ladder.toml or specify with --config <path>
# All settings can be overridden via environment variables (LADDER_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 8080)
# port = 8080

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Redis connection URL for the ranked score store
# redis_url = "redis://127.0.0.1:6379"

# Sorted-set key holding the leaderboard
# leaderboard_key = "leaderboard"

# Number of entries in a leaderboard snapshot (top-N)
# leaderboard_size = 10
"#
    .to_string()
}

use std::env;
use std::path::PathBuf;

/// Where the ledger lives unless overridden.
const DEFAULT_DATA_FILE: &str = "data/db.json";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings resolved from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_file: PathBuf,
    pub log_filter: String,
}

impl CliConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        CliConfig {
            data_file: env::var("CREDIT_QUEST_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE)),
            log_filter: env::var("CREDIT_QUEST_LOG")
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_data_file(mut self, data_file: Option<PathBuf>) -> Self {
        if let Some(path) = data_file {
            self.data_file = path;
        }
        self
    }
}

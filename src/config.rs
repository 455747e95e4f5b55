use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub storage_dir: String,
    pub batch_size: u32,
    pub poll_interval_secs: u64,
    pub visibility_timeout_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://creatordesk.db?mode=rwc".to_string());

        let storage_dir = env::var("STORAGE_DIR").unwrap_or_else(|_| "storage".to_string());

        let batch_size = env::var("WORKER_BATCH_SIZE")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .ok()
            .filter(|n: &u32| *n > 0)
            .ok_or(ConfigError::InvalidBatchSize)?;

        let poll_interval_secs = env::var("WORKER_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .unwrap_or(1);

        let visibility_timeout_secs = env::var("WORKER_VISIBILITY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        Ok(Config {
            database_url,
            storage_dir,
            batch_size,
            poll_interval_secs,
            visibility_timeout_secs,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("WORKER_BATCH_SIZE must be a positive integer")]
    InvalidBatchSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns the WORKER_BATCH_SIZE variable end to end; env vars are
    // process-global, so splitting this up would race under parallel tests.
    #[test]
    fn batch_size_must_be_a_positive_integer() {
        env::set_var("WORKER_BATCH_SIZE", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidBatchSize)
        ));

        env::set_var("WORKER_BATCH_SIZE", "not-a-number");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidBatchSize)
        ));

        env::set_var("WORKER_BATCH_SIZE", "4");
        let config = Config::from_env().expect("Valid batch size should parse");
        assert_eq!(config.batch_size, 4);

        env::remove_var("WORKER_BATCH_SIZE");
        let config = Config::from_env().expect("Default should apply");
        assert_eq!(config.batch_size, 1);
    }
}

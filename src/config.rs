/// Runtime configuration, read once at startup from the environment
/// (`.env` friendly via dotenv).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            database_url: dotenv::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://crowdsolve.db?mode=rwc".to_owned()),
            bind_addr: dotenv::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_owned()),
        }
    }
}

use std::time::Duration;

/// 36kr gateway endpoint serving the 24h hot ranking.
pub const DEFAULT_ENDPOINT: &str = "https://gateway.36kr.com/api/mis/nav/home/nav/rank/hot";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const ENV_RETRY_MAX: &str = "FETCH_RETRY_MAX";
pub const ENV_RETRY_BASE_DELAY_MS: &str = "FETCH_RETRY_BASE_DELAY_MS";
pub const ENV_RETRY_MAX_DELAY_MS: &str = "FETCH_RETRY_MAX_DELAY_MS";

#[derive(Debug, Clone)]
pub struct Config {
    pub fetch: FetchConfig,
}

impl Config {
    /// Read the process environment once. Invalid values fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            fetch: FetchConfig {
                retry: RetryPolicy::from_env(),
                ..FetchConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Values below 1 mean a single attempt.
    pub max_attempts: i64,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> i64 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a policy from an arbitrary key lookup (useful for testing)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            max_attempts: parse_or(lookup(ENV_RETRY_MAX), default_max_attempts()),
            base_delay_ms: parse_or(lookup(ENV_RETRY_BASE_DELAY_MS), default_base_delay_ms()),
            max_delay_ms: parse_or(lookup(ENV_RETRY_MAX_DELAY_MS), default_max_delay_ms()),
        }
    }

    /// Effective number of attempts, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.clamp(1, i64::from(u32::MAX)) as u32
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

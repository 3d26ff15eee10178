use crate::error::{GatewayError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "deepseek-r1:7b";
pub const DEFAULT_COLORMIND_URL: &str = "http://colormind.io";

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub executable: PathBuf,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: i32,
    pub probe_timeout: Duration,
}

/// How long startup waits for a freshly launched runtime to answer its probe.
#[derive(Debug, Clone)]
pub struct StartupPolicy {
    pub attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub deadline: Duration,
    /// Fail startup instead of serving when the runtime never becomes ready.
    pub strict: bool,
}

#[derive(Debug, Clone)]
pub struct ColormindConfig {
    pub enabled: bool,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub ollama: OllamaConfig,
    pub startup: StartupPolicy,
    pub colormind: ColormindConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|val| matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

impl Default for OllamaConfig {
    fn default() -> Self {
        OllamaConfig {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            executable: PathBuf::from("ollama"),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 100,
            probe_timeout: Duration::from_secs(2),
        }
    }
}

impl OllamaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        OllamaConfig {
            base_url: env::var("OLLAMA_URL").unwrap_or(defaults.base_url),
            executable: env::var("OLLAMA_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.executable),
            model: env::var("OLLAMA_MODEL").unwrap_or(defaults.model),
            temperature: env_parse("OLLAMA_TEMPERATURE").unwrap_or(defaults.temperature),
            max_tokens: env_parse("OLLAMA_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            probe_timeout: env_parse("OLLAMA_PROBE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.probe_timeout),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_generation(mut self, temperature: f32, max_tokens: i32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Joins `path` onto the runtime base URL without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for StartupPolicy {
    fn default() -> Self {
        StartupPolicy {
            attempts: 10,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(2),
            deadline: Duration::from_secs(30),
            strict: false,
        }
    }
}

impl StartupPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        StartupPolicy {
            attempts: env_parse("OLLAMA_STARTUP_ATTEMPTS").unwrap_or(defaults.attempts),
            initial_backoff: env_parse("OLLAMA_STARTUP_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_backoff),
            max_backoff: env_parse("OLLAMA_STARTUP_MAX_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_backoff),
            deadline: env_parse("OLLAMA_STARTUP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.deadline),
            strict: env_flag("OLLAMA_STARTUP_STRICT").unwrap_or(defaults.strict),
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Delay before probe number `attempt` (zero based), doubling up to `max_backoff`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for ColormindConfig {
    fn default() -> Self {
        ColormindConfig {
            enabled: true,
            base_url: DEFAULT_COLORMIND_URL.to_string(),
        }
    }
}

impl ColormindConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        ColormindConfig {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        ColormindConfig {
            enabled: env_flag("COLORMIND_ENABLED").unwrap_or(defaults.enabled),
            base_url: env::var("COLORMIND_URL").unwrap_or(defaults.base_url),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: true,
            ollama: OllamaConfig::default(),
            startup: StartupPolicy::default(),
            colormind: ColormindConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Config {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT").unwrap_or(defaults.port),
            debug: env_flag("DEBUG").unwrap_or(defaults.debug),
            ollama: OllamaConfig::from_env(),
            startup: StartupPolicy::from_env(),
            colormind: ColormindConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_ollama(mut self, config: OllamaConfig) -> Self {
        self.ollama = config;
        self
    }

    pub fn with_startup(mut self, policy: StartupPolicy) -> Self {
        self.startup = policy;
        self
    }

    pub fn with_colormind(mut self, config: ColormindConfig) -> Self {
        self.colormind = config;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("OLLAMA_URL", &self.ollama.base_url),
            ("COLORMIND_URL", &self.colormind.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(GatewayError::ConfigError(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        if !(0.0..=2.0).contains(&self.ollama.temperature) {
            return Err(GatewayError::ConfigError(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.ollama.temperature
            )));
        }
        if self.ollama.max_tokens == 0 || self.ollama.max_tokens < -1 {
            return Err(GatewayError::ConfigError(
                "max tokens must be positive, or -1 for unlimited".into(),
            ));
        }
        if self.startup.attempts == 0 {
            return Err(GatewayError::ConfigError(
                "startup attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 4000);
        assert!(config.debug);
        assert_eq!(config.ollama.model, "deepseek-r1:7b");
        assert_eq!(config.ollama.temperature, 0.7);
        assert_eq!(config.ollama.max_tokens, 100);
        assert_eq!(config.ollama.probe_timeout, Duration::from_secs(2));
        assert_eq!(config.ollama.executable, PathBuf::from("ollama"));
        assert!(!config.startup.strict);
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = OllamaConfig::new().with_base_url("http://127.0.0.1:11434/");
        assert_eq!(config.endpoint("/api/tags"), "http://127.0.0.1:11434/api/tags");
        assert_eq!(config.endpoint("api/chat"), "http://127.0.0.1:11434/api/chat");
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = StartupPolicy::new()
            .with_backoff(Duration::from_millis(100), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(40), Duration::from_millis(500));
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_host("127.0.0.1")
            .with_port(8000)
            .with_debug(false)
            .with_ollama(OllamaConfig::new().with_model("llama3").with_generation(0.2, 64))
            .with_colormind(ColormindConfig::disabled());

        assert_eq!(config.bind_addr(), ("127.0.0.1".to_string(), 8000));
        assert!(!config.debug);
        assert_eq!(config.ollama.model, "llama3");
        assert_eq!(config.ollama.max_tokens, 64);
        assert!(!config.colormind.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = Config::new().with_ollama(OllamaConfig::new().with_base_url("localhost:11434"));
        assert!(matches!(bad_url.validate(), Err(GatewayError::ConfigError(_))));

        let bad_temp = Config::new().with_ollama(OllamaConfig::new().with_generation(5.0, 100));
        assert!(bad_temp.validate().is_err());

        let negative_tokens = Config::new().with_ollama(OllamaConfig::new().with_generation(0.7, -5));
        assert!(negative_tokens.validate().is_err());

        let unlimited = Config::new().with_ollama(OllamaConfig::new().with_generation(0.7, -1));
        assert!(unlimited.validate().is_ok());

        let no_attempts = Config::new().with_startup(StartupPolicy::new().with_attempts(0));
        assert!(no_attempts.validate().is_err());
    }
}

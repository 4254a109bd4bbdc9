use std::env;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Typed application configuration.
///
/// Loaded from a TOML file (path from `DEEPSEARCH_CONFIG`, else
/// `./config.toml`), with every field defaulted so a missing file still
/// yields a runnable config. Environment overrides are applied after the
/// file so deployments can inject secrets without writing them to disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_dir: PathBuf,
    /// CORS origins; empty means local development defaults.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_dir: PathBuf::from("logs"),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API, without the `/v1` suffix.
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// "tavily" or "brave".
    pub provider: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: "tavily".to_string(),
            api_key: String::new(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: format!("deepsearch-backend/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AppConfig {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var("DEEPSEARCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var("OPENAI_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(url) = env::var("OPENAI_BASE_URL") {
            self.llm.base_url = url;
        }
        match self.search.provider.as_str() {
            "brave" => {
                if let Ok(key) = env::var("BRAVE_API_KEY") {
                    self.search.api_key = key;
                }
            }
            _ => {
                if let Ok(key) = env::var("TAVILY_API_KEY") {
                    self.search.api_key = key;
                }
            }
        }
    }

    /// One-line startup summary; key material never appears in logs.
    pub fn summary(&self) -> String {
        format!(
            "server {}:{}, llm model {} at {} (key {}), search provider {} (key {})",
            self.server.host,
            self.server.port,
            self.llm.model,
            self.llm.base_url,
            redact(&self.llm.api_key),
            self.search.provider,
            redact(&self.search.api_key),
        )
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() {
        "unset"
    } else {
        "set"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    // Env-var tests share process state; serialize them.
    fn env_lock() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let previous = env::var(key).ok();
            env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(value) => env::set_var(self.key, value),
                None => env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn defaults_are_runnable() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.search.provider, "tavily");
        assert_eq!(config.fetch.timeout_secs, 15);
    }

    #[test]
    fn toml_overrides_defaults_per_field() {
        let raw = r#"
[server]
port = 9001

[llm]
model = "gpt-4o"

[search]
provider = "brave"
"#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.search.provider, "brave");
        assert_eq!(config.search.timeout_secs, 20);
    }

    #[test]
    fn env_overrides_api_keys() {
        let _lock = env_lock();
        let _openai = EnvGuard::set("OPENAI_API_KEY", "sk-test");
        let _tavily = EnvGuard::set("TAVILY_API_KEY", "tvly-test");

        let mut config = AppConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.search.api_key, "tvly-test");
    }

    #[test]
    fn brave_provider_reads_brave_key() {
        let _lock = env_lock();
        let _brave = EnvGuard::set("BRAVE_API_KEY", "bsk-test");

        let mut config = AppConfig::default();
        config.search.provider = "brave".to_string();
        config.apply_env_overrides();

        assert_eq!(config.search.api_key, "bsk-test");
    }

    #[test]
    fn load_reads_file_from_env_path() {
        let _lock = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9100\n").unwrap();
        let _cfg = EnvGuard::set("DEEPSEARCH_CONFIG", path.to_str().unwrap());

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn summary_redacts_keys() {
        let mut config = AppConfig::default();
        config.llm.api_key = "sk-secret".to_string();
        config.search.api_key = "tvly-secret".to_string();

        let summary = config.summary();
        assert!(!summary.contains("sk-secret"));
        assert!(!summary.contains("tvly-secret"));
        assert!(summary.contains("gpt-4o-mini"));
    }
}

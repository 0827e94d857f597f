use crate::error::{HueError, Result};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "HUEQUITAS_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HueConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub mock: MockConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// `http` talks to the remote API; `mock` serves in-memory fixtures.
    #[serde(default = "default_backend_kind")]
    pub kind: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    /// Simulate network latency on every mock call.
    #[serde(default = "default_true")]
    pub latency: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self { latency: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Custom path for the credential file. Defaults to `~/.config/huequitas/session.json`.
    #[serde(default)]
    pub path: Option<String>,
}

/// Valid backend names.
pub const VALID_BACKENDS: &[&str] = &["http", "mock"];

// -- Defaults --

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_backend_kind() -> String {
    "http".to_string()
}
fn default_true() -> bool {
    true
}

impl HueConfig {
    /// Load configuration with three-layer TOML merge, then the environment:
    /// 1. ~/.config/huequitas/config.toml (global)
    /// 2. .huequitas/config.toml (project)
    /// 3. .huequitas/config.local.toml (local, gitignored)
    /// 4. `HUEQUITAS_API_URL`
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        Self::load_with_env(project_dir, std::env::var(API_URL_ENV).ok())
    }

    /// Same as [`load`](Self::load) with the base-URL override passed in explicitly.
    pub fn load_with_env(project_dir: Option<&Path>, api_url: Option<String>) -> Result<Self> {
        let mut builder = Config::builder();

        // Layer 1: Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            // Layer 2: Project config
            let project_config = dir.join(".huequitas").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }

            // Layer 3: Local config (gitignored)
            let local_config = dir.join(".huequitas").join("config.local.toml");
            if local_config.exists() {
                builder = builder.add_source(File::from(local_config).required(false));
            }
        }

        let config = builder
            .build()
            .map_err(|e| HueError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| HueError::Config(e.to_string()))?;

        // Layer 4: environment
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            cfg.api.base_url = url;
        }

        cfg.validate();
        Ok(cfg)
    }

    /// Defaults only (no files, no environment).
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig::default(),
            backend: BackendConfig::default(),
            mock: MockConfig::default(),
            session: SessionConfig::default(),
        }
    }

    /// Validate config values, resetting bad ones and logging warnings.
    /// Lenient: bad values are replaced, never rejected.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !VALID_BACKENDS.contains(&self.backend.kind.as_str()) {
            warnings.push(format!(
                "unknown backend '{}', valid: {}; using http",
                self.backend.kind,
                VALID_BACKENDS.join(", ")
            ));
            self.backend.kind = default_backend_kind();
        }

        let trimmed = self.api.base_url.trim().trim_end_matches('/').to_string();
        let scheme = trimmed.to_ascii_lowercase();
        if trimmed.is_empty() {
            warnings.push(format!(
                "api.base_url is empty, using {}",
                default_base_url()
            ));
            self.api.base_url = default_base_url();
        } else if !scheme.starts_with("http://") && !scheme.starts_with("https://") {
            warnings.push(format!(
                "api.base_url '{trimmed}' has no http(s) scheme, assuming http://"
            ));
            self.api.base_url = format!("http://{trimmed}");
        } else {
            self.api.base_url = trimmed;
        }

        if let Some(ref p) = self.session.path {
            if p.trim().is_empty() {
                warnings.push("session.path is empty, using default location".to_string());
                self.session.path = None;
            }
        }

        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }

    /// `true` when the mock fixtures should be served instead of the remote API.
    pub fn is_mock(&self) -> bool {
        self.backend.kind == "mock"
    }

    /// Resolved credential file location.
    pub fn session_path(&self) -> Result<PathBuf> {
        match &self.session.path {
            Some(p) => Ok(PathBuf::from(p)),
            None => default_session_path(),
        }
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("huequitas").join("config.toml"))
}

/// Path of the global config file, for display.
pub fn global_config_display() -> String {
    global_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(no config directory)".to_string())
}

/// Default credential path: `~/.config/huequitas/session.json`
fn default_session_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("huequitas").join("session.json"))
        .ok_or_else(|| HueError::Config("cannot determine config directory".to_string()))
}

// Pipeline configuration
//
// Resolution order:
//   1. defaults for the deployment profile (local or serverless)
//   2. YAML file: --config, then $INSTAFETCH_CONFIG, then ~/.config/instafetch/config.yml
//   3. environment overrides (INSTAFETCH_PYTHON, INSTAFETCH_SCRIPTS_DIR,
//      INSTAFETCH_PROXY, INSTAFETCH_USER_AGENT)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::extractor::models::Placeholders;
use crate::extractor::strategies::FALLBACK_USER_AGENT;

pub const CONFIG_ENV: &str = "INSTAFETCH_CONFIG";
pub const PYTHON_ENV: &str = "INSTAFETCH_PYTHON";
pub const SCRIPTS_DIR_ENV: &str = "INSTAFETCH_SCRIPTS_DIR";
pub const PROXY_ENV: &str = "INSTAFETCH_PROXY";
pub const USER_AGENT_ENV: &str = "INSTAFETCH_USER_AGENT";

pub const FULL_WORKER_SCRIPT: &str = "instagram_downloader_vercel.py";
pub const SIMPLE_WORKER_SCRIPT: &str = "instagram_downloader_simple.py";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Where the pipeline runs. Serverless hosts get shorter budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentProfile {
    Local,
    Serverless,
}

impl DeploymentProfile {
    /// Serverless when `VERCEL` or `AWS_LAMBDA_FUNCTION_NAME` is set.
    pub fn detect<F>(env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| env(key).map_or(false, |v| !v.trim().is_empty());
        if set("VERCEL") || set("AWS_LAMBDA_FUNCTION_NAME") {
            Self::Serverless
        } else {
            Self::Local
        }
    }

    pub fn default_budgets(&self) -> Budgets {
        match self {
            Self::Local => Budgets {
                markup_secs: 35,
                full_worker_secs: 30,
                simple_worker_secs: 15,
            },
            Self::Serverless => Budgets {
                markup_secs: 18,
                full_worker_secs: 15,
                simple_worker_secs: 10,
            },
        }
    }

    pub fn default_interpreter(&self) -> &'static str {
        if cfg!(windows) || *self == Self::Serverless {
            "python"
        } else {
            "python3"
        }
    }
}

/// Per-strategy wall-clock budgets, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budgets {
    pub markup_secs: u64,
    pub full_worker_secs: u64,
    pub simple_worker_secs: u64,
}

impl Budgets {
    pub fn markup(&self) -> Duration {
        Duration::from_secs(self.markup_secs)
    }

    pub fn full_worker(&self) -> Duration {
        Duration::from_secs(self.full_worker_secs)
    }

    pub fn simple_worker(&self) -> Duration {
        Duration::from_secs(self.simple_worker_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub profile: DeploymentProfile,
    pub interpreter: String,
    pub scripts_dir: PathBuf,
    pub full_worker_script: Option<PathBuf>,
    pub simple_worker_script: Option<PathBuf>,
    pub budgets: Budgets,
    pub user_agents: Vec<String>,
    pub proxy: Option<String>,
    pub placeholders: Placeholders,
}

/// On-disk shape: every key optional, layered over the profile defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub profile: Option<DeploymentProfile>,
    pub interpreter: Option<String>,
    pub scripts_dir: Option<PathBuf>,
    pub full_worker_script: Option<PathBuf>,
    pub simple_worker_script: Option<PathBuf>,
    pub budgets: Option<BudgetsFile>,
    pub user_agents: Option<Vec<String>>,
    pub proxy: Option<String>,
    pub placeholders: Option<Placeholders>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetsFile {
    pub markup_secs: Option<u64>,
    pub full_worker_secs: Option<u64>,
    pub simple_worker_secs: Option<u64>,
}

fn default_user_agents() -> Vec<String> {
    vec![
        FALLBACK_USER_AGENT.to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
    ]
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl PipelineConfig {
    pub fn for_profile(profile: DeploymentProfile) -> Self {
        Self {
            profile,
            interpreter: profile.default_interpreter().to_string(),
            scripts_dir: PathBuf::from("scripts"),
            full_worker_script: None,
            simple_worker_script: None,
            budgets: profile.default_budgets(),
            user_agents: default_user_agents(),
            proxy: None,
            placeholders: Placeholders::default(),
        }
    }

    /// Load from the process environment and the first config file found.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit_path, default_config_path(), |key| std::env::var(key).ok())
    }

    /// `load` with the environment and default file location injected.
    pub fn load_with<F>(
        explicit_path: Option<&Path>,
        default_path: Option<PathBuf>,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match explicit_path
            .map(Path::to_path_buf)
            .or_else(|| non_blank(env(CONFIG_ENV)).map(PathBuf::from))
        {
            Some(path) => Some(read_config_file(&path)?),
            None => match default_path.filter(|p| p.is_file()) {
                Some(path) => Some(read_config_file(&path)?),
                None => None,
            },
        };

        let profile = file
            .as_ref()
            .and_then(|f| f.profile)
            .unwrap_or_else(|| DeploymentProfile::detect(&env));

        let mut config = Self::for_profile(profile);
        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_env(&env);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(profile) = file.profile {
            if profile != self.profile {
                self.profile = profile;
                self.budgets = profile.default_budgets();
                self.interpreter = profile.default_interpreter().to_string();
            }
        }
        if let Some(interpreter) = non_blank(file.interpreter) {
            self.interpreter = interpreter;
        }
        if let Some(dir) = file.scripts_dir {
            self.scripts_dir = dir;
        }
        if file.full_worker_script.is_some() {
            self.full_worker_script = file.full_worker_script;
        }
        if file.simple_worker_script.is_some() {
            self.simple_worker_script = file.simple_worker_script;
        }
        if let Some(budgets) = file.budgets {
            self.budgets.markup_secs = budgets.markup_secs.unwrap_or(self.budgets.markup_secs);
            self.budgets.full_worker_secs =
                budgets.full_worker_secs.unwrap_or(self.budgets.full_worker_secs);
            self.budgets.simple_worker_secs =
                budgets.simple_worker_secs.unwrap_or(self.budgets.simple_worker_secs);
        }
        if let Some(agents) = file.user_agents {
            let agents: Vec<String> = agents
                .into_iter()
                .filter_map(|a| non_blank(Some(a)))
                .collect();
            if !agents.is_empty() {
                self.user_agents = agents;
            }
        }
        if let Some(proxy) = non_blank(file.proxy) {
            self.proxy = Some(proxy);
        }
        if let Some(placeholders) = file.placeholders {
            self.placeholders = placeholders;
        }
    }

    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(python) = non_blank(env(PYTHON_ENV)) {
            self.interpreter = python;
        }
        if let Some(dir) = non_blank(env(SCRIPTS_DIR_ENV)) {
            self.scripts_dir = PathBuf::from(dir);
        }
        if let Some(proxy) = non_blank(env(PROXY_ENV)) {
            self.proxy = Some(proxy);
        }
        if let Some(agent) = non_blank(env(USER_AGENT_ENV)) {
            self.user_agents = vec![agent];
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interpreter.trim().is_empty() {
            return Err(ConfigError::Invalid("interpreter must not be empty".to_string()));
        }
        let b = &self.budgets;
        if b.markup_secs == 0 || b.full_worker_secs == 0 || b.simple_worker_secs == 0 {
            return Err(ConfigError::Invalid("budgets must be at least 1 second".to_string()));
        }
        Ok(())
    }

    pub fn full_worker_path(&self) -> PathBuf {
        self.full_worker_script
            .clone()
            .unwrap_or_else(|| self.scripts_dir.join(FULL_WORKER_SCRIPT))
    }

    pub fn simple_worker_path(&self) -> PathBuf {
        self.simple_worker_script
            .clone()
            .unwrap_or_else(|| self.scripts_dir.join(SIMPLE_WORKER_SCRIPT))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_profile(DeploymentProfile::detect(|key| std::env::var(key).ok()))
    }
}

/// ~/.config/instafetch/config.yml (same place on every platform).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("instafetch").join("config.yml"))
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config file");

    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;

use super::state::{State, StateError};

const STATE_FILE: &str = "terraform.tfstate";
const STDERR_LIMIT: usize = 4096;

#[derive(Debug, Error)]
pub enum TerraformError {
    #[error("failed to run terraform {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("terraform {command} exited with status {code}: {stderr}")]
    Command {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Operations the test runner needs from Terraform, one working directory per call.
#[async_trait]
pub trait Terraform: Send + Sync {
    async fn init(&self, dir: &Path) -> Result<(), TerraformError>;
    async fn apply(&self, dir: &Path) -> Result<(), TerraformError>;
    /// Returns `true` when a fresh plan has no pending changes.
    async fn plan_is_empty(&self, dir: &Path) -> Result<bool, TerraformError>;
    async fn import(&self, dir: &Path, address: &str, id: &str) -> Result<(), TerraformError>;
    async fn destroy(&self, dir: &Path) -> Result<(), TerraformError>;
    async fn state(&self, dir: &Path) -> Result<State, TerraformError>;
}

/// Drives the `terraform` binary.
///
/// Clones share one init lock: the plugin cache directory does not tolerate
/// concurrent `terraform init` runs.
#[derive(Clone)]
pub struct TerraformCli {
    binary: PathBuf,
    plugin_cache_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
    init_lock: Arc<Mutex<()>>,
}

impl TerraformCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            plugin_cache_dir: None,
            env: BTreeMap::new(),
            init_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_plugin_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_cache_dir = Some(dir.into());
        self
    }

    /// Sets an environment variable for every terraform invocation, e.g. provider credentials.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_envs<K, V>(self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        vars.into_iter()
            .fold(self, |cli, (key, value)| cli.with_env(key, value))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn plugin_cache_dir(&self) -> Option<&Path> {
        self.plugin_cache_dir.as_deref()
    }

    /// Binary from `TF_ACC_TERRAFORM_PATH`, plugin cache from `TF_PLUGIN_CACHE_DIR`
    /// or the user cache directory.
    pub fn from_env() -> Self {
        let binary = std::env::var("TF_ACC_TERRAFORM_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "terraform".to_string());
        let cache = std::env::var("TF_PLUGIN_CACHE_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(default_plugin_cache_dir);

        let cli = Self::new(binary);
        match cache {
            Some(dir) => cli.with_plugin_cache_dir(dir),
            None => cli,
        }
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<Output, TerraformError> {
        let command = args.first().copied().unwrap_or_default().to_string();
        tracing::debug!(dir = %dir.display(), ?args, "running terraform");

        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .current_dir(dir)
            .envs(&self.env)
            .env("TF_IN_AUTOMATION", "1")
            .env("CHECKPOINT_DISABLE", "1");
        if let Some(cache) = &self.plugin_cache_dir {
            cmd.env("TF_PLUGIN_CACHE_DIR", cache);
        }

        cmd.output()
            .await
            .map_err(|source| TerraformError::Spawn { command, source })
    }

    async fn run_checked(&self, dir: &Path, args: &[&str]) -> Result<(), TerraformError> {
        let output = self.run(dir, args).await?;
        if output.status.success() {
            return Ok(());
        }
        Err(command_error(args, &output))
    }
}

#[async_trait]
impl Terraform for TerraformCli {
    async fn init(&self, dir: &Path) -> Result<(), TerraformError> {
        let _guard = match &self.plugin_cache_dir {
            Some(cache) => {
                let guard = self.init_lock.lock().await;
                tokio::fs::create_dir_all(cache).await?;
                Some(guard)
            }
            None => None,
        };
        self.run_checked(dir, &["init", "-input=false", "-no-color"]).await
    }

    async fn apply(&self, dir: &Path) -> Result<(), TerraformError> {
        self.run_checked(dir, &["apply", "-auto-approve", "-input=false", "-no-color"])
            .await
    }

    async fn plan_is_empty(&self, dir: &Path) -> Result<bool, TerraformError> {
        let args = ["plan", "-detailed-exitcode", "-input=false", "-no-color"];
        let output = self.run(dir, &args).await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(2) => Ok(false),
            _ => Err(command_error(&args, &output)),
        }
    }

    async fn import(&self, dir: &Path, address: &str, id: &str) -> Result<(), TerraformError> {
        self.run_checked(dir, &["import", "-input=false", "-no-color", address, id])
            .await
    }

    async fn destroy(&self, dir: &Path) -> Result<(), TerraformError> {
        self.run_checked(dir, &["destroy", "-auto-approve", "-input=false", "-no-color"])
            .await
    }

    async fn state(&self, dir: &Path) -> Result<State, TerraformError> {
        let path = dir.join(STATE_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(State::parse(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(State::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for TerraformCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values may hold credentials.
        let env_keys: Vec<&String> = self.env.keys().collect();
        f.debug_struct("TerraformCli")
            .field("binary", &self.binary)
            .field("plugin_cache_dir", &self.plugin_cache_dir)
            .field("env", &env_keys)
            .finish()
    }
}

fn default_plugin_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("flexibleengine-acc").join("plugins"))
}

fn command_error(args: &[&str], output: &Output) -> TerraformError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let stderr = match stderr.char_indices().nth(STDERR_LIMIT) {
        Some((cut, _)) => format!("{}...", &stderr[..cut]),
        None => stderr.to_string(),
    };

    TerraformError::Command {
        command: args.first().copied().unwrap_or_default().to_string(),
        code: output.status.code().unwrap_or(-1),
        stderr,
    }
}

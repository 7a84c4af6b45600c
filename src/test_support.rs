//! Test support utilities shared across unit and integration tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::acceptance::IMPORT_DIR_PREFIX;
use crate::terraform::{State, Terraform, TerraformError};

/// Scripted Terraform driver that hands out pre-seeded states in FIFO order.
///
/// Each `apply` moves the next seeded state into the working directory's
/// current state; import directories report the seeded import state.
#[derive(Debug, Default)]
pub struct ScriptedTerraform {
    apply_states: Mutex<VecDeque<State>>,
    current: Mutex<State>,
    import_state: Mutex<State>,
    dirty_plan: bool,
    apply_failure: Option<String>,
    destroy_failure: Option<String>,
    calls: Mutex<Vec<String>>,
    configs: Mutex<Vec<String>>,
}

impl ScriptedTerraform {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_apply_state(self, state: State) -> Self {
        lock(&self.apply_states).push_back(state);
        self
    }

    #[must_use]
    pub fn with_import_state(self, state: State) -> Self {
        *lock(&self.import_state) = state;
        self
    }

    /// Every plan after apply reports pending changes.
    #[must_use]
    pub fn with_dirty_plan(mut self) -> Self {
        self.dirty_plan = true;
        self
    }

    /// Apply fails after recording the next seeded state, like a partial apply.
    #[must_use]
    pub fn with_failing_apply(mut self, stderr: &str) -> Self {
        self.apply_failure = Some(stderr.to_string());
        self
    }

    #[must_use]
    pub fn with_failing_destroy(mut self, stderr: &str) -> Self {
        self.destroy_failure = Some(stderr.to_string());
        self
    }

    /// Commands received so far, e.g. `["init", "apply", "plan", "destroy"]`.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Contents of `main.tf` at each apply.
    pub fn applied_configs(&self) -> Vec<String> {
        lock(&self.configs).clone()
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl Terraform for ScriptedTerraform {
    async fn init(&self, _dir: &Path) -> Result<(), TerraformError> {
        self.record("init".to_string());
        Ok(())
    }

    async fn apply(&self, dir: &Path) -> Result<(), TerraformError> {
        self.record("apply".to_string());
        let config = tokio::fs::read_to_string(dir.join("main.tf")).await?;
        lock(&self.configs).push(config);

        if let Some(next) = lock(&self.apply_states).pop_front() {
            *lock(&self.current) = next;
        }

        match &self.apply_failure {
            Some(stderr) => Err(TerraformError::Command {
                command: "apply".to_string(),
                code: 1,
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn plan_is_empty(&self, _dir: &Path) -> Result<bool, TerraformError> {
        self.record("plan".to_string());
        Ok(!self.dirty_plan)
    }

    async fn import(&self, _dir: &Path, address: &str, id: &str) -> Result<(), TerraformError> {
        self.record(format!("import {} {}", address, id));
        Ok(())
    }

    async fn destroy(&self, _dir: &Path) -> Result<(), TerraformError> {
        self.record("destroy".to_string());
        if let Some(stderr) = &self.destroy_failure {
            return Err(TerraformError::Command {
                command: "destroy".to_string(),
                code: 1,
                stderr: stderr.clone(),
            });
        }
        *lock(&self.current) = State::default();
        Ok(())
    }

    async fn state(&self, dir: &Path) -> Result<State, TerraformError> {
        let is_import_dir = dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(IMPORT_DIR_PREFIX));

        if is_import_dir {
            Ok(lock(&self.import_state).clone())
        } else {
            Ok(lock(&self.current).clone())
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use super::case::{TestCase, TestStep};
use super::check::{BoxedCheck, CheckContext};
use super::env::{AccEnv, PreCheckError, TF_ACC};
use super::CheckError;
use crate::config::Config;
use crate::error::AccError;
use crate::resource::ResourceAddress;
use crate::terraform::{InstanceState, State, Terraform};

pub const DEFAULT_PROVIDER_SOURCE: &str = "FlexibleEngineCloud/flexibleengine";
pub const IMPORT_DIR_PREFIX: &str = "import-";

const CONFIG_FILE: &str = "main.tf";
const IGNORED_IMPORT_PREFIXES: &[&str] = &["timeouts"];

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    Skipped(String),
    Failed(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Skipped(_) => "SKIP",
            Outcome::Failed(_) => "FAIL",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub index: usize,
    pub kind: &'static str,
    pub outcome: Outcome,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct TestReport {
    pub name: String,
    pub outcome: Outcome,
    pub steps: Vec<StepReport>,
    pub duration: Duration,
}

/// Runs acceptance cases against a Terraform driver.
///
/// Every case gets its own temporary working directory. Steps run in order;
/// whatever was applied is destroyed afterwards, even when a step failed,
/// and the case's destroy check then runs against the last applied state.
#[derive(Clone)]
pub struct Runner {
    terraform: Arc<dyn Terraform>,
    env: AccEnv,
    config: Option<Config>,
    provider_source: String,
    work_root: Option<PathBuf>,
}

impl Runner {
    pub fn new(terraform: Arc<dyn Terraform>, env: AccEnv) -> Self {
        Self {
            terraform,
            env,
            config: None,
            provider_source: DEFAULT_PROVIDER_SOURCE.to_string(),
            work_root: None,
        }
    }

    /// Use `config` instead of building one from the environment.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_provider_source(mut self, source: impl Into<String>) -> Self {
        self.provider_source = source.into();
        self
    }

    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    pub fn env(&self) -> &AccEnv {
        &self.env
    }

    /// Runs all cases. Parallel cases are spawned onto the runtime; the rest
    /// run one after another. Reports come back in input order.
    pub async fn run_all(&self, cases: Vec<TestCase>) -> Vec<TestReport> {
        let mut handles = Vec::new();
        let mut reports: Vec<(usize, TestReport)> = Vec::new();

        for (i, case) in cases.into_iter().enumerate() {
            if case.parallel {
                let runner = self.clone();
                let name = case.name.clone();
                handles.push((i, name, tokio::spawn(async move { runner.run(case).await })));
            } else {
                reports.push((i, self.run(case).await));
            }
        }

        for (i, name, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => TestReport {
                    name,
                    outcome: Outcome::Failed(format!("test panicked: {}", e)),
                    steps: Vec::new(),
                    duration: Duration::ZERO,
                },
            };
            reports.push((i, report));
        }

        reports.sort_by_key(|(i, _)| *i);
        reports.into_iter().map(|(_, r)| r).collect()
    }

    pub async fn run(&self, case: TestCase) -> TestReport {
        let started = Instant::now();
        let name = case.name.clone();

        let report = |outcome: Outcome, steps: Vec<StepReport>| TestReport {
            name: name.clone(),
            outcome,
            steps,
            duration: started.elapsed(),
        };

        if !self.env.acceptance_enabled {
            let reason = format!("acceptance tests skipped unless env '{}' set", TF_ACC);
            tracing::info!(case = %case.name, "{}", reason);
            return report(Outcome::Skipped(reason), Vec::new());
        }

        for pre_check in &case.pre_checks {
            match pre_check(&self.env) {
                Ok(()) => {}
                Err(PreCheckError::Skip(reason)) => {
                    tracing::info!(case = %case.name, %reason, "case skipped");
                    return report(Outcome::Skipped(reason), Vec::new());
                }
                Err(e) => return report(Outcome::Failed(AccError::from(e).to_string()), Vec::new()),
            }
        }

        let config = match self.config.clone() {
            Some(config) => config,
            None => match self.env.provider_config() {
                Ok(config) => config,
                Err(e) => return report(Outcome::Failed(AccError::from(e).to_string()), Vec::new()),
            },
        };

        let workdir = match self.workdir() {
            Ok(dir) => dir,
            Err(e) => return report(Outcome::Failed(e.to_string()), Vec::new()),
        };

        tracing::info!(case = %case.name, dir = %workdir.path().display(), "running case");
        let (steps, result) = self.run_steps(&case, &config, workdir.path()).await;

        match result {
            Ok(()) => {
                tracing::info!(case = %case.name, "case passed");
                report(Outcome::Passed, steps)
            }
            Err(e) => {
                tracing::error!(case = %case.name, error = %e, "case failed");
                report(Outcome::Failed(e.to_string()), steps)
            }
        }
    }

    async fn run_steps(
        &self,
        case: &TestCase,
        config: &Config,
        dir: &Path,
    ) -> (Vec<StepReport>, Result<(), AccError>) {
        let total = case.steps.len();
        let mut reports = Vec::new();
        let mut progress = Progress::default();
        let mut failure: Option<AccError> = None;

        for (i, step) in case.steps.iter().enumerate() {
            let started = Instant::now();
            tracing::info!(case = %case.name, step = i + 1, kind = step.kind(), "running step");

            let result = match step {
                TestStep::Config {
                    config: hcl,
                    check,
                    expect_non_empty_plan,
                } => {
                    self.config_step(dir, config, hcl, check.as_ref(), *expect_non_empty_plan, &mut progress)
                        .await
                }
                TestStep::Import {
                    resource_name,
                    verify,
                    verify_ignore,
                } => {
                    self.import_step(dir, i + 1, resource_name, *verify, verify_ignore, &progress)
                        .await
                }
            };

            reports.push(StepReport {
                index: i + 1,
                kind: step.kind(),
                outcome: outcome_of(&result),
                duration: started.elapsed(),
            });

            if let Err(e) = result {
                failure = Some(AccError::Step {
                    step: i + 1,
                    total,
                    source: Box::new(e),
                });
                break;
            }
        }

        if progress.applied {
            let started = Instant::now();
            let result = self.teardown(case, config, dir, &progress.state).await;
            reports.push(StepReport {
                index: reports.len() + 1,
                kind: "destroy",
                outcome: outcome_of(&result),
                duration: started.elapsed(),
            });

            if let Err(e) = result {
                match &failure {
                    Some(_) => tracing::error!(case = %case.name, error = %e, "teardown failed"),
                    None => failure = Some(e),
                }
            }
        }

        (reports, failure.map_or(Ok(()), Err))
    }

    async fn config_step(
        &self,
        dir: &Path,
        config: &Config,
        hcl: &str,
        check: Option<&BoxedCheck>,
        expect_non_empty_plan: bool,
        progress: &mut Progress,
    ) -> Result<(), AccError> {
        self.write_config(dir, hcl).await?;
        progress.config = Some(hcl.to_string());

        self.terraform.init(dir).await?;
        progress.applied = true;
        self.terraform.apply(dir).await?;

        let state = self.terraform.state(dir).await?;
        progress.state = state;

        if let Some(check) = check {
            check.check(&CheckContext::new(config, &progress.state)).await?;
        }

        if !expect_non_empty_plan && !self.terraform.plan_is_empty(dir).await? {
            return Err(AccError::NonEmptyPlan);
        }

        Ok(())
    }

    async fn import_step(
        &self,
        dir: &Path,
        step: usize,
        resource_name: &str,
        verify: bool,
        verify_ignore: &[String],
        progress: &Progress,
    ) -> Result<(), AccError> {
        let hcl = progress.config.as_deref().ok_or(AccError::ImportWithoutConfig)?;
        let address = ResourceAddress::parse(resource_name).map_err(CheckError::from)?;

        let expected = progress
            .state
            .resource(resource_name)
            .ok_or_else(|| CheckError::ResourceNotFound {
                address: resource_name.to_string(),
            })?;
        if expected.id.is_empty() {
            return Err(CheckError::MissingId {
                address: resource_name.to_string(),
            }
            .into());
        }

        let import_dir = dir.join(format!("{}{}", IMPORT_DIR_PREFIX, step));
        tokio::fs::create_dir_all(&import_dir).await?;
        self.write_config(&import_dir, hcl).await?;

        self.terraform.init(&import_dir).await?;
        self.terraform
            .import(&import_dir, &address.cli_address(), &expected.id)
            .await?;

        let imported_state = self.terraform.state(&import_dir).await?;
        let imported = imported_state
            .resource(resource_name)
            .ok_or_else(|| CheckError::ResourceNotFound {
                address: resource_name.to_string(),
            })?;

        if verify {
            let differences = import_differences(imported, expected, verify_ignore);
            if !differences.is_empty() {
                return Err(CheckError::ImportVerify {
                    address: resource_name.to_string(),
                    differences: differences.join("; "),
                }
                .into());
            }
        }

        tracing::info!(address = %resource_name, id = %expected.id, "import verified");
        Ok(())
    }

    async fn teardown(
        &self,
        case: &TestCase,
        config: &Config,
        dir: &Path,
        step_state: &State,
    ) -> Result<(), AccError> {
        // A failed apply can leave resources that no step state recorded.
        let last_state = match self.terraform.state(dir).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(case = %case.name, error = %e, "reading state before destroy failed");
                step_state.clone()
            }
        };

        self.terraform.destroy(dir).await?;

        if let Some(check) = &case.check_destroy {
            check.check(&CheckContext::new(config, &last_state)).await?;
        }
        Ok(())
    }

    async fn write_config(&self, dir: &Path, hcl: &str) -> Result<(), AccError> {
        let contents = format!("{}\n{}", self.provider_block(), hcl);
        tokio::fs::write(dir.join(CONFIG_FILE), contents).await?;
        Ok(())
    }

    fn provider_block(&self) -> String {
        format!(
            "terraform {{\n  required_providers {{\n    flexibleengine = {{\n      source = \"{}\"\n    }}\n  }}\n}}\n",
            self.provider_source
        )
    }

    fn workdir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tf-acc-");
        match &self.work_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
    }
}

#[derive(Debug, Default)]
struct Progress {
    config: Option<String>,
    state: State,
    applied: bool,
}

fn outcome_of(result: &Result<(), AccError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Passed,
        Err(e) => Outcome::Failed(e.to_string()),
    }
}

fn import_differences(
    imported: &InstanceState,
    expected: &InstanceState,
    ignore: &[String],
) -> Vec<String> {
    let ignored = |key: &str| {
        IGNORED_IMPORT_PREFIXES.iter().any(|p| key.starts_with(p))
            || ignore.iter().any(|p| key.starts_with(p.as_str()))
    };

    let keys: BTreeSet<&String> = imported
        .attributes
        .keys()
        .chain(expected.attributes.keys())
        .collect();

    keys.into_iter()
        .filter(|k| !ignored(k.as_str()))
        .filter_map(|k| {
            let actual = imported.attribute(k);
            let wanted = expected.attribute(k);
            (actual != wanted).then(|| {
                format!(
                    "{}: imported {:?}, expected {:?}",
                    k,
                    actual.unwrap_or_default(),
                    wanted.unwrap_or_default()
                )
            })
        })
        .collect()
}

//! Acceptance-test harness: state checks, live-resource checks and a runner
//! that drives Terraform through config and import steps.

mod case;
mod check;
mod env;
mod error;
mod resource_check;
mod runner;

pub mod evs_volume;
pub mod lb_whitelist;

pub use case::{TestCase, TestStep};
pub use check::{
    BoxedCheck, Check, CheckContext, check_no_resource_attr, check_resource_attr,
    check_resource_attr_pair, check_resource_attr_set, compose,
};
pub use env::{
    AccEnv, PreCheck, PreCheckError, acceptance_flag_enabled, pre_check, pre_check_charging_mode,
    pre_check_eps_id,
};
pub use error::{CheckError, FetchError};
pub use resource_check::{ResourceCheck, ResourceFetcher};
pub use runner::{
    DEFAULT_PROVIDER_SOURCE, IMPORT_DIR_PREFIX, Outcome, Runner, StepReport, TestReport,
};

const RANDOM_SUFFIX_LEN: usize = 5;

/// Name for resources created by one test run, e.g. `tf_test_kqzbe`.
pub fn random_acc_resource_name() -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(RANDOM_SUFFIX_LEN)
        .map(|b| (b'a' + b % 26) as char)
        .collect();
    format!("tf_test_{}", suffix)
}

//! Live acceptance runs. Every case reports `Skipped` unless `TF_ACC` is set
//! together with the `OS_*` credentials.

use std::sync::Arc;

use flexibleengine_acc::acceptance::{
    AccEnv, Outcome, Runner, evs_volume, random_acc_resource_name,
};
use flexibleengine_acc::terraform::TerraformCli;

fn runner() -> Runner {
    let env = AccEnv::from_env();
    let terraform = TerraformCli::from_env().with_envs(env.provider_env());
    Runner::new(Arc::new(terraform), env)
}

fn assert_not_failed(outcome: &Outcome) {
    if let Outcome::Failed(message) = outcome {
        panic!("{}", message);
    }
}

#[tokio::test]
async fn test_acc_evs_volume_basic() {
    let rname = random_acc_resource_name();
    let report = runner().run(evs_volume::basic_case(&rname)).await;
    assert_not_failed(&report.outcome);
}

#[tokio::test]
async fn test_acc_evs_volume_with_eps_id() {
    let runner = runner();
    let rname = random_acc_resource_name();
    let eps_id = runner.env().enterprise_project_id.clone().unwrap_or_default();
    let report = runner
        .run(evs_volume::with_eps_id_case(&rname, &eps_id))
        .await;
    assert_not_failed(&report.outcome);
}

#[tokio::test]
async fn test_acc_evs_volume_pre_paid() {
    let rname = random_acc_resource_name();
    let report = runner().run(evs_volume::pre_paid_case(&rname)).await;
    assert_not_failed(&report.outcome);
}

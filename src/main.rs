mod cli;
mod output;

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing_subscriber::EnvFilter;

use cli::{CaseName, Cli, Command, RunArgs};
use flexibleengine_acc::ServiceClient;
use flexibleengine_acc::acceptance::{
    AccEnv, Runner, TestCase, evs_volume, lb_whitelist, random_acc_resource_name,
};
use flexibleengine_acc::sdk::whitelists;
use flexibleengine_acc::terraform::TerraformCli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args).await?,
        Command::WhitelistUrl(args) => {
            // URL building needs no credentials.
            let client = ServiceClient::new("", args.endpoint)?;
            println!("{}", whitelists::root_url(&client));
            if let Some(id) = args.id {
                println!("{}", whitelists::resource_url(&client, &id));
            }
        }
    }

    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    let env = args.acc_env();
    let rname = random_acc_resource_name();
    let cases: Vec<TestCase> = args
        .cases
        .iter()
        .map(|name| build_case(*name, &rname, &env))
        .collect();

    let terraform = terraform_driver(&args).with_envs(env.provider_env());
    let mut runner = Runner::new(Arc::new(terraform), env.clone());
    if let Some(source) = &args.provider_source {
        runner = runner.with_provider_source(source);
    }
    if !args.service_endpoints.is_empty() {
        let mut config = env.provider_config()?;
        for (service, url) in &args.service_endpoints {
            config = config.with_endpoint(service, url);
        }
        runner = runner.with_config(config);
    }

    tracing::info!(count = cases.len(), name = %rname, "running acceptance cases");
    let reports = runner.run_all(cases).await;
    println!("{}", output::render_reports(&reports));

    let failed = reports.iter().filter(|r| r.outcome.is_failed()).count();
    if failed > 0 {
        bail!("{} of {} cases failed", failed, reports.len());
    }
    Ok(())
}

fn build_case(name: CaseName, rname: &str, env: &AccEnv) -> TestCase {
    match name {
        CaseName::EvsVolumeBasic => evs_volume::basic_case(rname),
        CaseName::EvsVolumeWithEpsId => evs_volume::with_eps_id_case(
            rname,
            env.enterprise_project_id.as_deref().unwrap_or_default(),
        ),
        CaseName::EvsVolumePrePaid => evs_volume::pre_paid_case(rname),
        CaseName::LbWhitelistBasic => lb_whitelist::basic_case(rname),
    }
}

fn terraform_driver(args: &RunArgs) -> TerraformCli {
    let from_env = TerraformCli::from_env();
    match &args.terraform {
        Some(binary) => {
            let cli = TerraformCli::new(binary);
            match from_env.plugin_cache_dir() {
                Some(dir) => cli.with_plugin_cache_dir(dir),
                None => cli,
            }
        }
        None => from_env,
    }
}

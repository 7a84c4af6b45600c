use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use flexibleengine_acc::acceptance::{AccEnv, acceptance_flag_enabled};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run acceptance cases against the configured region
    Run(RunArgs),
    /// Print the load-balancer whitelist URLs for an ELB endpoint
    WhitelistUrl(WhitelistUrlArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseName {
    EvsVolumeBasic,
    EvsVolumeWithEpsId,
    EvsVolumePrePaid,
    LbWhitelistBasic,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[arg(value_enum, required = true)]
    pub cases: Vec<CaseName>,

    /// Actually run the cases; without it every case is skipped
    #[arg(long, env = "TF_ACC", num_args = 0..=1, default_missing_value = "1")]
    pub acc: Option<String>,

    #[arg(long, env = "TF_ACC_TERRAFORM_PATH")]
    pub terraform: Option<PathBuf>,

    #[arg(long, env = "OS_REGION_NAME")]
    pub region: Option<String>,

    #[arg(long, env = "OS_PROJECT_ID")]
    pub project_id: Option<String>,

    #[arg(long, env = "OS_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "OS_ENTERPRISE_PROJECT_ID_TEST")]
    pub enterprise_project_id: Option<String>,

    #[arg(long, env = "OS_CHARGING_MODE")]
    pub charging_mode: Option<String>,

    #[arg(long, env = "FLEXIBLEENGINE_CLOUD")]
    pub cloud: Option<String>,

    /// Provider source written into every generated configuration
    #[arg(long)]
    pub provider_source: Option<String>,

    /// Endpoint override, e.g. `evs=http://localhost:8080/`
    #[arg(long = "service-endpoint", value_parser = parse_service_endpoint)]
    pub service_endpoints: Vec<(String, String)>,
}

impl RunArgs {
    pub fn acc_env(&self) -> AccEnv {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        AccEnv {
            acceptance_enabled: acceptance_flag_enabled(self.acc.as_deref()),
            region: non_empty(&self.region),
            project_id: non_empty(&self.project_id),
            auth_token: non_empty(&self.token),
            enterprise_project_id: non_empty(&self.enterprise_project_id),
            charging_mode: non_empty(&self.charging_mode),
            cloud: non_empty(&self.cloud),
        }
    }
}

fn parse_service_endpoint(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((service, url)) if !service.is_empty() && !url.is_empty() => {
            Ok((service.to_string(), url.to_string()))
        }
        _ => Err(format!("expected SERVICE=URL, got '{}'", s)),
    }
}

#[derive(clap::Args, Debug)]
pub struct WhitelistUrlArgs {
    /// ELB service base, e.g. `https://elb.eu-west-0.prod-cloud-ocb.orange-business.com/v2.0/`
    #[arg(long)]
    pub endpoint: String,

    #[arg(long)]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    fn run_args(cli: Cli) -> RunArgs {
        match cli.command {
            Command::Run(args) => args,
            other => panic!("Expected Run command, got {:?}", other),
        }
    }

    #[test]
    fn test_run_parses_case_names() {
        let cli = Cli::parse_from([
            "flexibleengine-acc",
            "run",
            "evs-volume-basic",
            "lb-whitelist-basic",
        ]);
        let args = run_args(cli);
        assert_eq!(args.cases, vec![CaseName::EvsVolumeBasic, CaseName::LbWhitelistBasic]);
    }

    #[test]
    fn test_run_requires_a_case() {
        assert!(Cli::try_parse_from(["flexibleengine-acc", "run"]).is_err());
        assert!(Cli::try_parse_from(["flexibleengine-acc", "run", "no-such-case"]).is_err());
    }

    #[test]
    fn test_service_endpoint_flag() {
        let cli = Cli::parse_from([
            "flexibleengine-acc",
            "run",
            "evs-volume-basic",
            "--service-endpoint=evs=http://localhost:8080/",
        ]);
        let args = run_args(cli);
        assert_eq!(
            args.service_endpoints,
            vec![("evs".to_string(), "http://localhost:8080/".to_string())]
        );
    }

    #[test]
    fn test_service_endpoint_rejects_missing_url() {
        assert!(parse_service_endpoint("evs=").is_err());
        assert!(parse_service_endpoint("evs").is_err());
    }

    #[test]
    fn test_whitelist_url_args() {
        let cli = Cli::parse_from([
            "flexibleengine-acc",
            "whitelist-url",
            "--endpoint=https://elb.example.com/v2.0/",
            "--id=abc",
        ]);
        if let Command::WhitelistUrl(args) = cli.command {
            assert_eq!(args.endpoint, "https://elb.example.com/v2.0/");
            assert_eq!(args.id, Some("abc".to_string()));
        } else {
            panic!("Expected WhitelistUrl command, got {:?}", cli.command);
        }
    }

    #[test]
    #[serial]
    fn test_region_from_env_var_fallback() {
        let backup = std::env::var("OS_REGION_NAME").ok();

        unsafe {
            std::env::set_var("OS_REGION_NAME", "eu-west-0");
        }

        let cli = Cli::parse_from(["flexibleengine-acc", "run", "evs-volume-basic"]);

        unsafe {
            match backup {
                Some(region) => std::env::set_var("OS_REGION_NAME", region),
                None => std::env::remove_var("OS_REGION_NAME"),
            }
        }

        assert_eq!(run_args(cli).region, Some("eu-west-0".to_string()));
    }

    #[test]
    #[serial]
    fn test_token_cli_flag_takes_precedence_over_env() {
        let backup = std::env::var("OS_AUTH_TOKEN").ok();

        unsafe {
            std::env::set_var("OS_AUTH_TOKEN", "env_token");
        }

        let cli = Cli::parse_from([
            "flexibleengine-acc",
            "run",
            "evs-volume-basic",
            "--token=cli_token",
        ]);

        unsafe {
            match backup {
                Some(token) => std::env::set_var("OS_AUTH_TOKEN", token),
                None => std::env::remove_var("OS_AUTH_TOKEN"),
            }
        }

        assert_eq!(run_args(cli).token, Some("cli_token".to_string()));
    }

    #[test]
    #[serial]
    fn test_acc_env_drops_blank_values() {
        let backup = std::env::var("TF_ACC").ok();

        unsafe {
            std::env::set_var("TF_ACC", "1");
        }

        let cli = Cli::parse_from([
            "flexibleengine-acc",
            "run",
            "evs-volume-basic",
            "--region=eu-west-0",
            "--enterprise-project-id=",
        ]);

        unsafe {
            match backup {
                Some(v) => std::env::set_var("TF_ACC", v),
                None => std::env::remove_var("TF_ACC"),
            }
        }

        let env = run_args(cli).acc_env();
        assert!(env.acceptance_enabled);
        assert_eq!(env.region.as_deref(), Some("eu-west-0"));
        assert!(env.enterprise_project_id.is_none());
    }

    #[test]
    fn test_acc_flag_without_value_enables() {
        let cli = Cli::parse_from(["flexibleengine-acc", "run", "evs-volume-basic", "--acc"]);
        assert!(run_args(cli).acc_env().acceptance_enabled);
    }

    #[test]
    #[serial]
    fn test_tf_acc_zero_enables_like_acc_env() {
        let backup = std::env::var("TF_ACC").ok();

        unsafe {
            std::env::set_var("TF_ACC", "0");
        }

        let cli = Cli::parse_from(["flexibleengine-acc", "run", "evs-volume-basic"]);
        let from_env = AccEnv::from_env();

        unsafe {
            match backup {
                Some(v) => std::env::set_var("TF_ACC", v),
                None => std::env::remove_var("TF_ACC"),
            }
        }

        assert!(run_args(cli).acc_env().acceptance_enabled);
        assert!(from_env.acceptance_enabled);
    }

    #[test]
    #[serial]
    fn test_blank_tf_acc_disables() {
        let backup = std::env::var("TF_ACC").ok();

        unsafe {
            std::env::set_var("TF_ACC", "");
        }

        let cli = Cli::parse_from(["flexibleengine-acc", "run", "evs-volume-basic"]);

        unsafe {
            match backup {
                Some(v) => std::env::set_var("TF_ACC", v),
                None => std::env::remove_var("TF_ACC"),
            }
        }

        assert!(!run_args(cli).acc_env().acceptance_enabled);
    }
}

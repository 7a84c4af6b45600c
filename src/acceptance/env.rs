use thiserror::Error;

use crate::config::{Config, ConfigError, DEFAULT_CLOUD};

pub const TF_ACC: &str = "TF_ACC";
pub const OS_REGION_NAME: &str = "OS_REGION_NAME";
pub const OS_PROJECT_ID: &str = "OS_PROJECT_ID";
pub const OS_AUTH_TOKEN: &str = "OS_AUTH_TOKEN";
pub const OS_ENTERPRISE_PROJECT_ID_TEST: &str = "OS_ENTERPRISE_PROJECT_ID_TEST";
pub const OS_CHARGING_MODE: &str = "OS_CHARGING_MODE";
pub const FLEXIBLEENGINE_CLOUD: &str = "FLEXIBLEENGINE_CLOUD";

pub const PRE_PAID: &str = "prePaid";

#[derive(Debug, Error, PartialEq)]
pub enum PreCheckError {
    /// The case cannot run in this environment and is skipped.
    #[error("skipped: {0}")]
    Skip(String),

    /// A variable every acceptance case needs is missing.
    #[error("{0} must be set for acceptance tests")]
    Missing(&'static str),
}

pub type PreCheck = fn(&AccEnv) -> Result<(), PreCheckError>;

/// `TF_ACC` turns acceptance runs on with any non-blank value, `0` included.
pub fn acceptance_flag_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Acceptance-test settings read from the environment.
#[derive(Clone, Default, PartialEq)]
pub struct AccEnv {
    pub acceptance_enabled: bool,
    pub region: Option<String>,
    pub project_id: Option<String>,
    pub auth_token: Option<String>,
    pub enterprise_project_id: Option<String>,
    pub charging_mode: Option<String>,
    pub cloud: Option<String>,
}

impl AccEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            acceptance_enabled: acceptance_flag_enabled(get(TF_ACC).as_deref()),
            region: get(OS_REGION_NAME),
            project_id: get(OS_PROJECT_ID),
            auth_token: get(OS_AUTH_TOKEN),
            enterprise_project_id: get(OS_ENTERPRISE_PROJECT_ID_TEST),
            charging_mode: get(OS_CHARGING_MODE),
            cloud: get(FLEXIBLEENGINE_CLOUD),
        }
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or_default()
    }

    /// Credentials the provider reads from the terraform process environment.
    pub fn provider_env(&self) -> Vec<(&'static str, String)> {
        [
            (OS_REGION_NAME, &self.region),
            (OS_PROJECT_ID, &self.project_id),
            (OS_AUTH_TOKEN, &self.auth_token),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
        .collect()
    }

    pub fn provider_config(&self) -> Result<Config, ConfigError> {
        let region = self.region.clone().ok_or(ConfigError::Missing(OS_REGION_NAME))?;
        let project_id = self.project_id.clone().ok_or(ConfigError::Missing(OS_PROJECT_ID))?;
        let token = self.auth_token.clone().ok_or(ConfigError::Missing(OS_AUTH_TOKEN))?;

        Ok(Config::new(region, project_id, token)
            .with_cloud(self.cloud.as_deref().unwrap_or(DEFAULT_CLOUD))
            .with_enterprise_project_id(self.enterprise_project_id.clone()))
    }
}

impl std::fmt::Debug for AccEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccEnv")
            .field("acceptance_enabled", &self.acceptance_enabled)
            .field("region", &self.region)
            .field("project_id", &self.project_id)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("enterprise_project_id", &self.enterprise_project_id)
            .field("charging_mode", &self.charging_mode)
            .field("cloud", &self.cloud)
            .finish()
    }
}

/// Settings every acceptance case needs.
pub fn pre_check(env: &AccEnv) -> Result<(), PreCheckError> {
    if env.region.is_none() {
        return Err(PreCheckError::Missing(OS_REGION_NAME));
    }
    if env.project_id.is_none() {
        return Err(PreCheckError::Missing(OS_PROJECT_ID));
    }
    if env.auth_token.is_none() {
        return Err(PreCheckError::Missing(OS_AUTH_TOKEN));
    }
    Ok(())
}

pub fn pre_check_eps_id(env: &AccEnv) -> Result<(), PreCheckError> {
    if env.enterprise_project_id.is_none() {
        return Err(PreCheckError::Skip(format!(
            "{} must be set for acceptance tests",
            OS_ENTERPRISE_PROJECT_ID_TEST
        )));
    }
    Ok(())
}

pub fn pre_check_charging_mode(env: &AccEnv) -> Result<(), PreCheckError> {
    if env.charging_mode.as_deref() != Some(PRE_PAID) {
        return Err(PreCheckError::Skip(format!(
            "this environment does not support prepaid tests, set {}={}",
            OS_CHARGING_MODE, PRE_PAID
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(vars: &[(&str, &str)]) -> AccEnv {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AccEnv::from_lookup(|name| map.get(name).cloned())
    }

    fn full_env() -> AccEnv {
        env_from(&[
            (TF_ACC, "1"),
            (OS_REGION_NAME, "eu-west-0"),
            (OS_PROJECT_ID, "proj123"),
            (OS_AUTH_TOKEN, "secret_token_value"),
        ])
    }

    #[test]
    fn test_from_lookup_reads_variables() {
        let env = full_env();
        assert!(env.acceptance_enabled);
        assert_eq!(env.region(), "eu-west-0");
        assert_eq!(env.project_id.as_deref(), Some("proj123"));
        assert!(env.enterprise_project_id.is_none());
    }

    #[test]
    fn test_blank_values_are_unset() {
        let env = env_from(&[(TF_ACC, ""), (OS_REGION_NAME, "  ")]);
        assert!(!env.acceptance_enabled);
        assert!(env.region.is_none());
        assert_eq!(env.region(), "");
    }

    #[test]
    fn test_zero_still_enables_acceptance() {
        assert!(env_from(&[(TF_ACC, "0")]).acceptance_enabled);
        assert!(acceptance_flag_enabled(Some("false")));
        assert!(!acceptance_flag_enabled(Some(" ")));
        assert!(!acceptance_flag_enabled(None));
    }

    #[test]
    fn test_provider_env_exports_set_credentials() {
        let env = full_env();
        assert_eq!(
            env.provider_env(),
            vec![
                (OS_REGION_NAME, "eu-west-0".to_string()),
                (OS_PROJECT_ID, "proj123".to_string()),
                (OS_AUTH_TOKEN, "secret_token_value".to_string()),
            ]
        );

        let partial = env_from(&[(OS_REGION_NAME, "eu-west-0")]);
        assert_eq!(
            partial.provider_env(),
            vec![(OS_REGION_NAME, "eu-west-0".to_string())]
        );
    }

    #[test]
    fn test_pre_check_requires_credentials() {
        assert_eq!(pre_check(&full_env()), Ok(()));

        let env = env_from(&[(OS_REGION_NAME, "eu-west-0"), (OS_PROJECT_ID, "p")]);
        assert_eq!(pre_check(&env), Err(PreCheckError::Missing(OS_AUTH_TOKEN)));

        assert_eq!(
            pre_check(&AccEnv::default()),
            Err(PreCheckError::Missing(OS_REGION_NAME))
        );
    }

    #[test]
    fn test_pre_check_eps_id_skips() {
        let err = pre_check_eps_id(&full_env()).unwrap_err();
        assert!(matches!(err, PreCheckError::Skip(_)));

        let mut env = full_env();
        env.enterprise_project_id = Some("eps-1".to_string());
        assert_eq!(pre_check_eps_id(&env), Ok(()));
    }

    #[test]
    fn test_pre_check_charging_mode() {
        let mut env = full_env();
        assert!(matches!(pre_check_charging_mode(&env), Err(PreCheckError::Skip(_))));

        env.charging_mode = Some("postPaid".to_string());
        assert!(pre_check_charging_mode(&env).is_err());

        env.charging_mode = Some(PRE_PAID.to_string());
        assert_eq!(pre_check_charging_mode(&env), Ok(()));
    }

    #[test]
    fn test_provider_config() {
        let mut env = full_env();
        env.enterprise_project_id = Some("eps-1".to_string());
        let config = env.provider_config().unwrap();
        assert_eq!(config.region, "eu-west-0");
        assert_eq!(config.project_id, "proj123");
        assert_eq!(config.cloud, DEFAULT_CLOUD);
        assert_eq!(config.enterprise_project_id.as_deref(), Some("eps-1"));
    }

    #[test]
    fn test_provider_config_missing_token() {
        let mut env = full_env();
        env.auth_token = None;
        assert!(matches!(
            env.provider_config(),
            Err(ConfigError::Missing(OS_AUTH_TOKEN))
        ));
    }

    #[test]
    fn test_debug_does_not_expose_token() {
        let debug_output = format!("{:?}", full_env());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret_token_value"));
    }
}

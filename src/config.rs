use std::collections::BTreeMap;

use thiserror::Error;

use crate::sdk::{SdkError, ServiceClient};

pub const DEFAULT_CLOUD: &str = "prod-cloud-ocb.orange-business.com";

const EVS_SERVICE: &str = "evs";
const ELB_SERVICE: &str = "elb";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("failed to create {service} client: {source}")]
    Client {
        service: &'static str,
        #[source]
        source: SdkError,
    },
}

/// Provider settings shared by every service client.
#[derive(Clone)]
pub struct Config {
    pub region: String,
    pub project_id: String,
    pub cloud: String,
    pub enterprise_project_id: Option<String>,
    token: String,
    endpoints: BTreeMap<String, String>,
}

impl Config {
    pub fn new(region: impl Into<String>, project_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            project_id: project_id.into(),
            cloud: DEFAULT_CLOUD.to_string(),
            enterprise_project_id: None,
            token: token.into(),
            endpoints: BTreeMap::new(),
        }
    }

    pub fn with_cloud(mut self, cloud: impl Into<String>) -> Self {
        self.cloud = cloud.into();
        self
    }

    pub fn with_enterprise_project_id(mut self, id: Option<String>) -> Self {
        self.enterprise_project_id = id.filter(|s| !s.is_empty());
        self
    }

    /// NOTE: Primarily used for testing with mock servers.
    pub fn with_endpoint(mut self, service: &str, url: impl Into<String>) -> Self {
        self.endpoints.insert(service.to_string(), url.into());
        self
    }

    pub fn service_endpoint(&self, service: &str, region: &str) -> String {
        self.endpoints
            .get(service)
            .cloned()
            .unwrap_or_else(|| format!("https://{}.{}.{}/", service, region, self.cloud))
    }

    pub fn block_storage_v2_client(&self, region: &str) -> Result<ServiceClient, ConfigError> {
        let region = required(region, "region")?;
        let project_id = required(&self.project_id, "project_id")?;
        let endpoint = self.service_endpoint(EVS_SERVICE, region);
        let client = self.client(EVS_SERVICE, &endpoint)?;
        let base = format!("{}v2/{}", client.endpoint(), project_id);
        Ok(client.with_resource_base(base))
    }

    pub fn elb_v2_client(&self, region: &str) -> Result<ServiceClient, ConfigError> {
        let region = required(region, "region")?;
        let endpoint = self.service_endpoint(ELB_SERVICE, region);
        let client = self.client(ELB_SERVICE, &endpoint)?;
        let base = format!("{}v2.0", client.endpoint());
        Ok(client.with_resource_base(base))
    }

    fn client(&self, service: &'static str, endpoint: &str) -> Result<ServiceClient, ConfigError> {
        let token = required(&self.token, "auth token")?;
        ServiceClient::new(token, endpoint).map_err(|source| ConfigError::Client { service, source })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("project_id", &self.project_id)
            .field("cloud", &self.cloud)
            .field("enterprise_project_id", &self.enterprise_project_id)
            .field("token", &"[REDACTED]")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(name));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new("eu-west-0", "proj123", "test_token")
    }

    #[test]
    fn test_default_service_endpoint() {
        assert_eq!(
            config().service_endpoint("evs", "eu-west-0"),
            "https://evs.eu-west-0.prod-cloud-ocb.orange-business.com/"
        );
    }

    #[test]
    fn test_custom_cloud_endpoint() {
        let cfg = config().with_cloud("example.net");
        assert_eq!(cfg.service_endpoint("elb", "eu-west-1"), "https://elb.eu-west-1.example.net/");
    }

    #[test]
    fn test_endpoint_override() {
        let cfg = config().with_endpoint("evs", "http://127.0.0.1:8080");
        assert_eq!(cfg.service_endpoint("evs", "eu-west-0"), "http://127.0.0.1:8080");
        assert_eq!(
            cfg.service_endpoint("elb", "eu-west-0"),
            "https://elb.eu-west-0.prod-cloud-ocb.orange-business.com/"
        );
    }

    #[test]
    fn test_block_storage_client_is_project_scoped() {
        let client = config().block_storage_v2_client("eu-west-0").unwrap();
        assert_eq!(
            client.resource_base_url(),
            "https://evs.eu-west-0.prod-cloud-ocb.orange-business.com/v2/proj123/"
        );
    }

    #[test]
    fn test_elb_client_base() {
        let client = config().elb_v2_client("eu-west-0").unwrap();
        assert_eq!(
            client.resource_base_url(),
            "https://elb.eu-west-0.prod-cloud-ocb.orange-business.com/v2.0/"
        );
    }

    #[test]
    fn test_missing_region() {
        let err = config().block_storage_v2_client("").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("region")));
    }

    #[test]
    fn test_missing_project_id() {
        let err = Config::new("eu-west-0", "", "t")
            .block_storage_v2_client("eu-west-0")
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required setting: project_id");
    }

    #[test]
    fn test_missing_token() {
        let err = Config::new("eu-west-0", "p", "").elb_v2_client("eu-west-0").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("auth token")));
    }

    #[test]
    fn test_invalid_token_wrapped_with_service() {
        let err = Config::new("eu-west-0", "p", "bad\ntoken")
            .block_storage_v2_client("eu-west-0")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Client { service: "evs", .. }));
        assert!(err.to_string().starts_with("failed to create evs client"));
    }

    #[test]
    fn test_empty_enterprise_project_is_none() {
        let cfg = config().with_enterprise_project_id(Some(String::new()));
        assert!(cfg.enterprise_project_id.is_none());
    }

    #[test]
    fn test_debug_does_not_expose_token() {
        let cfg = Config::new("eu-west-0", "p", "super_secret_token_12345");
        let debug_output = format!("{:?}", cfg);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token_12345"));
    }
}

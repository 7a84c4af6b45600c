//! Acceptance case for `flexibleengine_lb_whitelist_v2`.

use async_trait::async_trait;

use super::{
    FetchError, ResourceCheck, ResourceFetcher, TestCase, TestStep, check_resource_attr,
    check_resource_attr_pair, compose, pre_check,
};
use crate::config::Config;
use crate::resource::ResourceAddress;
use crate::sdk::whitelists::{self, Whitelist};
use crate::terraform::InstanceState;

pub const RESOURCE_TYPE: &str = "flexibleengine_lb_whitelist_v2";
pub const RESOURCE_NAME: &str = "flexibleengine_lb_whitelist_v2.test";
const LISTENER_NAME: &str = "flexibleengine_lb_listener_v2.test";

#[derive(Debug, Clone, Copy, Default)]
pub struct WhitelistFetcher;

#[async_trait]
impl ResourceFetcher for WhitelistFetcher {
    type Object = Whitelist;

    async fn fetch(&self, config: &Config, state: &InstanceState) -> Result<Whitelist, FetchError> {
        let client = config
            .elb_v2_client(&config.region)
            .map_err(|source| FetchError::Client {
                service: "elb v2",
                source,
            })?;
        Ok(whitelists::get(&client, &state.id).await?)
    }
}

pub fn resource_check() -> ResourceCheck<WhitelistFetcher> {
    ResourceCheck::for_address(ResourceAddress::managed(RESOURCE_TYPE, "test"), WhitelistFetcher)
}

pub fn basic_case(rname: &str) -> TestCase {
    let rc = resource_check();

    TestCase::new("TestAccLBV2Whitelist_basic")
        .parallel()
        .pre_check(pre_check)
        .check_destroy(rc.check_resource_destroy())
        .step(TestStep::apply(
            basic_config(rname, "192.168.11.1,192.168.0.1/24"),
            compose(vec![
                rc.check_resource_exists(),
                check_resource_attr(RESOURCE_NAME, "enable_whitelist", "true"),
                check_resource_attr(RESOURCE_NAME, "whitelist", "192.168.11.1,192.168.0.1/24"),
                check_resource_attr_pair(RESOURCE_NAME, "listener_id", LISTENER_NAME, "id"),
            ]),
        ))
        .step(TestStep::apply(
            basic_config(rname, "192.168.11.12,192.168.0.1/24,192.168.201.18/8"),
            compose(vec![
                rc.check_resource_exists(),
                check_resource_attr(
                    RESOURCE_NAME,
                    "whitelist",
                    "192.168.11.12,192.168.0.1/24,192.168.201.18/8",
                ),
            ]),
        ))
        .step(TestStep::import_verify(RESOURCE_NAME, &[]))
}

pub fn basic_config(rname: &str, whitelist: &str) -> String {
    format!(
        r#"
resource "flexibleengine_vpc_v1" "test" {{
  name = "{rname}"
  cidr = "192.168.0.0/16"
}}

resource "flexibleengine_vpc_subnet_v1" "test" {{
  name       = "{rname}"
  cidr       = "192.168.0.0/24"
  gateway_ip = "192.168.0.1"
  vpc_id     = flexibleengine_vpc_v1.test.id
}}

resource "flexibleengine_lb_loadbalancer_v2" "test" {{
  name          = "{rname}"
  vip_subnet_id = flexibleengine_vpc_subnet_v1.test.ipv4_subnet_id
}}

resource "flexibleengine_lb_listener_v2" "test" {{
  name            = "{rname}"
  protocol        = "HTTP"
  protocol_port   = 8080
  loadbalancer_id = flexibleengine_lb_loadbalancer_v2.test.id
}}

resource "flexibleengine_lb_whitelist_v2" "test" {{
  enable_whitelist = true
  whitelist        = "{whitelist}"
  listener_id      = flexibleengine_lb_listener_v2.test.id
}}
"#,
        rname = rname,
        whitelist = whitelist,
    )
}

//! Acceptance cases for `flexibleengine_evs_volume`.

use async_trait::async_trait;

use super::{
    FetchError, ResourceCheck, ResourceFetcher, TestCase, TestStep, check_resource_attr,
    check_resource_attr_pair, compose, pre_check, pre_check_charging_mode, pre_check_eps_id,
};
use crate::config::Config;
use crate::resource::ResourceAddress;
use crate::sdk::cloudvolumes::{self, Volume};
use crate::terraform::InstanceState;

pub const RESOURCE_TYPE: &str = "flexibleengine_evs_volume";
pub const RESOURCE_NAME: &str = "flexibleengine_evs_volume.test";
pub const AZ_DATA_SOURCE: &str = "data.flexibleengine_availability_zones.test";

/// Looks volumes up through the block storage v2 API.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeFetcher;

#[async_trait]
impl ResourceFetcher for VolumeFetcher {
    type Object = Volume;

    async fn fetch(&self, config: &Config, state: &InstanceState) -> Result<Volume, FetchError> {
        let client = config
            .block_storage_v2_client(&config.region)
            .map_err(|source| FetchError::Client {
                service: "block storage v2",
                source,
            })?;
        Ok(cloudvolumes::get(&client, &state.id).await?)
    }
}

pub fn resource_check() -> ResourceCheck<VolumeFetcher> {
    ResourceCheck::for_address(ResourceAddress::managed(RESOURCE_TYPE, "test"), VolumeFetcher)
}

fn instance(index: u64) -> String {
    format!("{}.{}", RESOURCE_NAME, index)
}

pub fn basic_case(rname: &str) -> TestCase {
    let rc = resource_check();
    let (v1, v2, v3, v4, v5, v6) = (
        instance(0),
        instance(1),
        instance(2),
        instance(3),
        instance(4),
        instance(5),
    );

    TestCase::new("TestAccEvsVolume_basic")
        .parallel()
        .pre_check(pre_check)
        .check_destroy(rc.check_resource_destroy())
        .step(TestStep::apply(
            basic_config(rname),
            compose(vec![
                rc.check_multi_resources_exists(6),
                // Common configuration
                check_resource_attr_pair(&v1, "availability_zone", AZ_DATA_SOURCE, "names.0"),
                check_resource_attr(&v1, "description", "Created by acc test script."),
                check_resource_attr(&v1, "volume_type", "SSD"),
                check_resource_attr(&v1, "size", "100"),
                check_resource_attr(&v1, "tags.foo", "bar"),
                check_resource_attr(&v1, "tags.key", "value"),
                // Personalized configuration
                check_resource_attr(&v1, "name", format!("{}_vbd_normal_volume", rname)),
                check_resource_attr(&v1, "device_type", "VBD"),
                check_resource_attr(&v1, "multiattach", "false"),
                check_resource_attr(&v2, "name", format!("{}_vbd_share_volume", rname)),
                check_resource_attr(&v2, "device_type", "VBD"),
                check_resource_attr(&v2, "multiattach", "true"),
                check_resource_attr(&v3, "name", format!("{}_scsi_normal_volume", rname)),
                check_resource_attr(&v3, "device_type", "SCSI"),
                check_resource_attr(&v3, "multiattach", "false"),
                check_resource_attr(&v4, "name", format!("{}_scsi_share_volume", rname)),
                check_resource_attr(&v4, "device_type", "SCSI"),
                check_resource_attr(&v4, "multiattach", "true"),
                check_resource_attr(&v5, "name", format!("{}_gpssd2_normal_volume", rname)),
                check_resource_attr(&v5, "volume_type", "GPSSD2"),
                check_resource_attr(&v5, "device_type", "SCSI"),
                check_resource_attr(&v5, "multiattach", "false"),
                check_resource_attr(&v5, "iops", "3000"),
                check_resource_attr(&v5, "throughput", "500"),
                check_resource_attr(&v6, "name", format!("{}_essd2_normal_volume", rname)),
                check_resource_attr(&v6, "volume_type", "ESSD2"),
                check_resource_attr(&v6, "device_type", "SCSI"),
                check_resource_attr(&v6, "multiattach", "false"),
                check_resource_attr(&v6, "iops", "3000"),
            ]),
        ))
        .step(TestStep::apply(
            update_config(rname),
            compose(vec![
                rc.check_multi_resources_exists(6),
                // Common configuration
                check_resource_attr_pair(&v1, "availability_zone", AZ_DATA_SOURCE, "names.0"),
                check_resource_attr(&v1, "description", "Updated by acc test script."),
                check_resource_attr(&v1, "volume_type", "SSD"),
                check_resource_attr(&v1, "size", "200"),
                check_resource_attr(&v1, "tags.foo1", "bar"),
                check_resource_attr(&v1, "tags.key", "value1"),
                // Personalized configuration
                check_resource_attr(&v1, "name", format!("{}_vbd_normal_volume_update", rname)),
                check_resource_attr(&v2, "name", format!("{}_vbd_share_volume_update", rname)),
                check_resource_attr(&v3, "name", format!("{}_scsi_normal_volume_update", rname)),
                check_resource_attr(&v4, "name", format!("{}_scsi_share_volume_update", rname)),
                check_resource_attr(&v5, "name", format!("{}_gpssd2_normal_volume_update", rname)),
                check_resource_attr(&v6, "name", format!("{}_essd2_normal_volume_update", rname)),
            ]),
        ))
}

pub fn with_eps_id_case(rname: &str, enterprise_project_id: &str) -> TestCase {
    let rc = resource_check();

    TestCase::new("TestAccEvsVolume_withEpsId")
        .parallel()
        .pre_check(pre_check)
        .pre_check(pre_check_eps_id)
        .check_destroy(rc.check_resource_destroy())
        .step(TestStep::apply(
            eps_id_config(rname, enterprise_project_id),
            compose(vec![
                rc.check_resource_exists(),
                check_resource_attr(RESOURCE_NAME, "name", rname),
                check_resource_attr(RESOURCE_NAME, "enterprise_project_id", enterprise_project_id),
            ]),
        ))
        .step(TestStep::import_verify(RESOURCE_NAME, &["cascade"]))
}

pub fn pre_paid_case(rname: &str) -> TestCase {
    let rc = resource_check();
    let (v1, v2) = (instance(0), instance(1));

    TestCase::new("TestAccEvsVolume_prePaid")
        .parallel()
        .pre_check(pre_check)
        .pre_check(pre_check_charging_mode)
        .check_destroy(rc.check_resource_destroy())
        .step(TestStep::apply(
            pre_paid_config(rname, false),
            compose(vec![
                rc.check_multi_resources_exists(2),
                // Common configuration
                check_resource_attr_pair(&v1, "availability_zone", AZ_DATA_SOURCE, "names.0"),
                check_resource_attr(&v1, "description", "test volume for charging mode"),
                check_resource_attr(&v1, "size", "100"),
                // Personalized configuration
                check_resource_attr(&v1, "volume_type", "SSD"),
                check_resource_attr(&v1, "name", format!("{}_ssd_volume", rname)),
                check_resource_attr(&v1, "charging_mode", "prePaid"),
                check_resource_attr(&v1, "auto_renew", "false"),
                check_resource_attr(&v2, "volume_type", "GPSSD2"),
                check_resource_attr(&v2, "name", format!("{}_gpssd2_volume", rname)),
                check_resource_attr(&v2, "charging_mode", "prePaid"),
                check_resource_attr(&v2, "auto_renew", "false"),
                check_resource_attr(&v2, "iops", "3000"),
                check_resource_attr(&v2, "throughput", "500"),
            ]),
        ))
        .step(TestStep::apply(
            pre_paid_config(rname, true),
            compose(vec![
                rc.check_multi_resources_exists(2),
                check_resource_attr(&v1, "auto_renew", "true"),
                check_resource_attr(&v2, "auto_renew", "true"),
            ]),
        ))
}

const VOLUME_BASE: &str = r#"
variable "volume_configuration" {
  type = list(object({
    suffix      = string
    device_type = string
    volume_type = string
    multiattach = bool
    iops        = number
    throughput  = number
  }))
  default = [
    {
      suffix = "vbd_normal_volume",
      device_type = "VBD",
      volume_type = "SSD",
      multiattach = false,
      iops = 0,
      throughput = 0
    },
    {
      suffix = "vbd_share_volume",
      device_type = "VBD",
      volume_type = "SSD",
      multiattach = true,
      iops = 0,
      throughput = 0
    },
    {
      suffix = "scsi_normal_volume",
      device_type = "SCSI",
      volume_type = "SSD",
      multiattach = false,
      iops = 0,
      throughput = 0
    },
    {
      suffix = "scsi_share_volume",
      device_type = "SCSI",
      volume_type = "SSD",
      multiattach = true,
      iops = 0,
      throughput = 0
    },
    {
      suffix = "gpssd2_normal_volume",
      device_type = "SCSI",
      volume_type = "GPSSD2",
      multiattach = false,
      iops = 3000,
      throughput = 500
    },
    {
      suffix = "essd2_normal_volume",
      device_type = "SCSI",
      volume_type = "ESSD2",
      multiattach = false,
      iops = 3000,
      throughput = 0
    },
  ]
}

data "flexibleengine_availability_zones" "test" {}
"#;

const PRE_PAID_BASE: &str = r#"
variable "volume_configuration" {
  type = list(object({
    suffix      = string
    volume_type = string
    iops        = number
    throughput  = number
  }))
  default = [
    {
      suffix = "ssd_volume",
      volume_type = "SSD",
      iops = 0,
      throughput = 0
    },
    {
      suffix = "gpssd2_volume",
      volume_type = "GPSSD2",
      iops = 3000,
      throughput = 500
    },
  ]
}

data "flexibleengine_availability_zones" "test" {}
"#;

pub fn basic_config(rname: &str) -> String {
    format!(
        r#"
{base}

resource "flexibleengine_evs_volume" "test" {{
  count = length(var.volume_configuration)

  availability_zone = data.flexibleengine_availability_zones.test.names[0]
  name              = "{rname}_${{var.volume_configuration[count.index].suffix}}"
  size              = 100
  description       = "Created by acc test script."
  volume_type       = var.volume_configuration[count.index].volume_type
  device_type       = var.volume_configuration[count.index].device_type
  multiattach       = var.volume_configuration[count.index].multiattach

  tags = {{
    foo = "bar"
    key = "value"
  }}
}}
"#,
        base = VOLUME_BASE,
        rname = rname,
    )
}

pub fn update_config(rname: &str) -> String {
    format!(
        r#"
{base}

resource "flexibleengine_evs_volume" "test" {{
  count = length(var.volume_configuration)

  availability_zone = data.flexibleengine_availability_zones.test.names[0]
  name              = "{rname}_${{var.volume_configuration[count.index].suffix}}_update"
  size              = 200
  description       = "Updated by acc test script."
  volume_type       = var.volume_configuration[count.index].volume_type
  device_type       = var.volume_configuration[count.index].device_type
  multiattach       = var.volume_configuration[count.index].multiattach

  tags = {{
    foo1 = "bar"
    key  = "value1"
  }}
}}
"#,
        base = VOLUME_BASE,
        rname = rname,
    )
}

pub fn eps_id_config(rname: &str, enterprise_project_id: &str) -> String {
    format!(
        r#"
data "flexibleengine_availability_zones" "test" {{}}

resource "flexibleengine_evs_volume" "test" {{
  name                  = "{rname}"
  description           = "test volume for epsID"
  availability_zone     = data.flexibleengine_availability_zones.test.names[0]
  volume_type           = "SSD"
  size                  = 100
  enterprise_project_id = "{eps}"
}}
"#,
        rname = rname,
        eps = enterprise_project_id,
    )
}

pub fn pre_paid_config(rname: &str, auto_renew: bool) -> String {
    format!(
        r#"
{base}

resource "flexibleengine_evs_volume" "test" {{
  count = length(var.volume_configuration)

  name              = "{rname}_${{var.volume_configuration[count.index].suffix}}"
  description       = "test volume for charging mode"
  availability_zone = data.flexibleengine_availability_zones.test.names[0]
  size              = 100
  volume_type       = var.volume_configuration[count.index].volume_type

  charging_mode = "prePaid"
  period_unit   = "month"
  period        = 1
  auto_renew    = "{auto_renew}"
}}
"#,
        base = PRE_PAID_BASE,
        rname = rname,
        auto_renew = auto_renew,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptance::TestStep;

    #[test]
    fn test_basic_config_templates_name() {
        let hcl = basic_config("tf_test_abcde");
        assert!(hcl.contains(r#"name              = "tf_test_abcde_${var.volume_configuration[count.index].suffix}""#));
        assert!(hcl.contains("size              = 100"));
        assert!(hcl.contains("suffix = \"essd2_normal_volume\""));
        assert!(hcl.contains("data \"flexibleengine_availability_zones\" \"test\" {}"));
        assert!(hcl.contains("    foo = \"bar\"\n    key = \"value\"\n  }\n}"));
    }

    #[test]
    fn test_update_config_changes_size_and_tags() {
        let hcl = update_config("tf_test_abcde");
        assert!(hcl.contains("suffix}_update\""));
        assert!(hcl.contains("size              = 200"));
        assert!(hcl.contains("foo1 = \"bar\""));
        assert!(hcl.contains("key  = \"value1\""));
        assert!(hcl.contains("\"Updated by acc test script.\""));
    }

    #[test]
    fn test_eps_id_config() {
        let hcl = eps_id_config("tf_test_abcde", "eps-123");
        assert!(hcl.contains("name                  = \"tf_test_abcde\""));
        assert!(hcl.contains("enterprise_project_id = \"eps-123\""));
        assert!(!hcl.contains("variable"));
    }

    #[test]
    fn test_pre_paid_config_auto_renew() {
        assert!(pre_paid_config("n", false).contains("auto_renew    = \"false\""));
        let hcl = pre_paid_config("n", true);
        assert!(hcl.contains("auto_renew    = \"true\""));
        assert!(hcl.contains("charging_mode = \"prePaid\""));
        assert!(hcl.contains("suffix = \"gpssd2_volume\""));
        assert!(!hcl.contains("device_type"));
    }

    #[test]
    fn test_basic_case_shape() {
        let case = basic_case("tf_test_abcde");
        assert_eq!(case.name, "TestAccEvsVolume_basic");
        assert!(case.parallel);
        assert_eq!(case.steps.len(), 2);
        assert!(case.check_destroy.is_some());
        assert!(case.steps.iter().all(|s| s.kind() == "config"));
    }

    #[test]
    fn test_eps_case_imports_ignoring_cascade() {
        let case = with_eps_id_case("tf_test_abcde", "eps-123");
        assert_eq!(case.pre_checks.len(), 2);
        match &case.steps[1] {
            TestStep::Import {
                resource_name,
                verify,
                verify_ignore,
            } => {
                assert_eq!(resource_name, RESOURCE_NAME);
                assert!(verify);
                assert_eq!(verify_ignore, &vec!["cascade".to_string()]);
            }
            other => panic!("Expected TestStep::Import, got {:?}", other),
        }
    }

    #[test]
    fn test_pre_paid_case_shape() {
        let case = pre_paid_case("tf_test_abcde");
        assert_eq!(case.name, "TestAccEvsVolume_prePaid");
        assert_eq!(case.pre_checks.len(), 2);
        assert_eq!(case.steps.len(), 2);
    }

    #[test]
    fn test_resource_check_address() {
        assert_eq!(resource_check().address().to_string(), RESOURCE_NAME);
    }
}

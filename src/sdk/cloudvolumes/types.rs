use std::collections::BTreeMap;

use serde::Deserialize;

const PASSTHROUGH_KEY: &str = "hw:passthrough";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Vbd,
    Scsi,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Vbd => "VBD",
            DeviceType::Scsi => "SCSI",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provisioned performance value of GPSSD2/ESSD2 volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Performance {
    pub total_val: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub server_id: String,
    #[serde(default)]
    pub device: String,
}

/// EVS block-storage volume as returned by `GET cloudvolumes/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    pub volume_type: String,
    #[serde(default)]
    pub availability_zone: String,
    #[serde(default)]
    pub multiattach: bool,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub enterprise_project_id: Option<String>,
    #[serde(default)]
    pub iops: Option<Performance>,
    #[serde(default)]
    pub throughput: Option<Performance>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Volume {
    pub fn device_type(&self) -> DeviceType {
        match self.metadata.get(PASSTHROUGH_KEY).map(String::as_str) {
            Some("true") => DeviceType::Scsi,
            _ => DeviceType::Vbd,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct VolumeResponse {
    pub volume: Volume,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_deserialization() {
        let json = r#"{
            "id": "591ac654-26d8-41be-bb77-bb4f3a5b2eb5",
            "name": "tf_test_ab12c_gpssd2_normal_volume",
            "status": "available",
            "size": 100,
            "availability_zone": "eu-west-0a",
            "volume_type": "GPSSD2",
            "multiattach": false,
            "bootable": "false",
            "description": "Created by acc test script.",
            "metadata": {"hw:passthrough": "true"},
            "tags": {"foo": "bar", "key": "value"},
            "iops": {"id": "p1", "total_val": 3000, "frozened": false},
            "throughput": {"id": "p2", "total_val": 500, "frozened": false},
            "attachments": [],
            "enterprise_project_id": "0"
        }"#;

        let volume: Volume = serde_json::from_str(json).unwrap();
        assert_eq!(volume.size, 100);
        assert_eq!(volume.volume_type, "GPSSD2");
        assert_eq!(volume.device_type(), DeviceType::Scsi);
        assert_eq!(volume.iops, Some(Performance { total_val: 3000 }));
        assert_eq!(volume.throughput.map(|t| t.total_val), Some(500));
        assert_eq!(volume.tags.get("foo").map(String::as_str), Some("bar"));
        assert_eq!(volume.enterprise_project_id.as_deref(), Some("0"));
    }

    #[test]
    fn test_volume_minimal_fields() {
        let json = r#"{"id": "v1", "size": 10, "volume_type": "SSD"}"#;
        let volume: Volume = serde_json::from_str(json).unwrap();
        assert_eq!(volume.name, "");
        assert!(!volume.multiattach);
        assert!(volume.iops.is_none());
        assert!(volume.attachments.is_empty());
    }

    #[test]
    fn test_device_type_defaults_to_vbd() {
        let json = r#"{"id": "v1", "size": 10, "volume_type": "SSD", "metadata": {"hw:passthrough": "false"}}"#;
        let volume: Volume = serde_json::from_str(json).unwrap();
        assert_eq!(volume.device_type(), DeviceType::Vbd);
        assert_eq!(volume.device_type().to_string(), "VBD");
    }
}

use serde::{Deserialize, Serialize};

/// Access-control list attached to a load-balancer listener.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Whitelist {
    pub id: String,
    #[serde(default)]
    pub tenant_id: String,
    pub listener_id: String,
    #[serde(default)]
    pub enable_whitelist: bool,
    /// Comma separated IP addresses or CIDR blocks.
    #[serde(default)]
    pub whitelist: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub listener_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_whitelist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_whitelist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<String>,
}

/// Filters for listing whitelists. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct ListOpts {
    pub id: Option<String>,
    pub tenant_id: Option<String>,
    pub listener_id: Option<String>,
    pub enable_whitelist: Option<bool>,
    pub whitelist: Option<String>,
    pub limit: Option<u32>,
    pub marker: Option<String>,
}

impl ListOpts {
    pub fn to_query(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(id) = &self.id {
            pairs.push(("id", id.clone()));
        }
        if let Some(tenant_id) = &self.tenant_id {
            pairs.push(("tenant_id", tenant_id.clone()));
        }
        if let Some(listener_id) = &self.listener_id {
            pairs.push(("listener_id", listener_id.clone()));
        }
        if let Some(enabled) = self.enable_whitelist {
            pairs.push(("enable_whitelist", enabled.to_string()));
        }
        if let Some(whitelist) = &self.whitelist {
            pairs.push(("whitelist", whitelist.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(marker) = &self.marker {
            pairs.push(("marker", marker.clone()));
        }

        if pairs.is_empty() {
            return String::new();
        }

        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{}", query)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CreateRequest<'a> {
    pub whitelist: &'a CreateOpts,
}

#[derive(Debug, Serialize)]
pub(super) struct UpdateRequest<'a> {
    pub whitelist: &'a UpdateOpts,
}

#[derive(Debug, Deserialize)]
pub(super) struct WhitelistResponse {
    pub whitelist: Whitelist,
}

#[derive(Debug, Deserialize)]
pub(super) struct WhitelistsResponse {
    #[serde(default)]
    pub whitelists: Vec<Whitelist>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_deserialization() {
        let json = r#"{
            "id": "eabfefa3fd1740a88a47ad98e132d238",
            "listener_id": "eabfefa3fd1740a88a47ad98e132d238",
            "tenant_id": "eabfefa3fd1740a88a47ad98e132d238",
            "enable_whitelist": true,
            "whitelist": "192.168.11.1,192.168.0.1/24,192.168.201.18/8,100.164.0.1/24"
        }"#;

        let whitelist: Whitelist = serde_json::from_str(json).unwrap();
        assert_eq!(whitelist.id, "eabfefa3fd1740a88a47ad98e132d238");
        assert!(whitelist.enable_whitelist);
        assert!(whitelist.whitelist.contains("192.168.0.1/24"));
    }

    #[test]
    fn test_whitelist_missing_optional_fields() {
        let json = r#"{"id": "w1", "listener_id": "l1"}"#;
        let whitelist: Whitelist = serde_json::from_str(json).unwrap();
        assert_eq!(whitelist.tenant_id, "");
        assert!(!whitelist.enable_whitelist);
        assert_eq!(whitelist.whitelist, "");
    }

    #[test]
    fn test_create_request_skips_unset_fields() {
        let opts = CreateOpts {
            listener_id: "l1".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(CreateRequest { whitelist: &opts }).unwrap();
        assert_eq!(body, serde_json::json!({"whitelist": {"listener_id": "l1"}}));
    }

    #[test]
    fn test_update_request_keeps_explicit_false() {
        let opts = UpdateOpts {
            enable_whitelist: Some(false),
            whitelist: None,
        };
        let body = serde_json::to_value(UpdateRequest { whitelist: &opts }).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"whitelist": {"enable_whitelist": false}})
        );
    }

    #[test]
    fn test_list_opts_empty_query() {
        assert_eq!(ListOpts::default().to_query(), "");
    }

    #[test]
    fn test_list_opts_encodes_values() {
        let opts = ListOpts {
            listener_id: Some("l1".to_string()),
            enable_whitelist: Some(true),
            whitelist: Some("10.0.0.0/8,192.168.0.1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            opts.to_query(),
            "?listener_id=l1&enable_whitelist=true&whitelist=10.0.0.0%2F8%2C192.168.0.1"
        );
    }
}

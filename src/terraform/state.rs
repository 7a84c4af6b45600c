//! Terraform state parser for resource checks.
//!
//! Parses tfstate v4 files and flattens instance attributes into the
//! `key.sub.0` / `key.#` / `key.%` form that attribute checks address.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::resource::{InstanceKey, Mode, ResourceAddress};

const SUPPORTED_VERSION: u64 = 4;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to parse state: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported state version {0}, expected 4")]
    UnsupportedVersion(u64),
}

/// One resource instance recorded in state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstanceState {
    pub resource_type: String,
    pub data: bool,
    pub id: String,
    pub attributes: BTreeMap<String, String>,
}

impl InstanceState {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Flat view of a state file, keyed by resource address.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    resources: BTreeMap<String, InstanceState>,
}

impl State {
    pub fn parse(json: &str) -> Result<Self, StateError> {
        let raw: RawState = serde_json::from_str(json)?;
        if raw.version != SUPPORTED_VERSION {
            return Err(StateError::UnsupportedVersion(raw.version));
        }

        let mut resources = BTreeMap::new();
        for resource in raw.resources {
            let mode = match resource.mode.as_str() {
                "data" => Mode::Data,
                _ => Mode::Managed,
            };
            let module = resource
                .module
                .as_deref()
                .map(module_path)
                .unwrap_or_default();

            for instance in resource.instances {
                let address = ResourceAddress {
                    module: module.clone(),
                    mode,
                    resource_type: resource.resource_type.clone(),
                    name: resource.name.clone(),
                    key: instance.index_key.as_ref().and_then(instance_key),
                };

                let mut attributes = BTreeMap::new();
                if let Some(serde_json::Value::Object(fields)) = &instance.attributes {
                    for (key, value) in fields {
                        flatten_into(key, value, &mut attributes);
                    }
                }
                let id = attributes.get("id").cloned().unwrap_or_default();

                resources.insert(
                    address.to_string(),
                    InstanceState {
                        resource_type: resource.resource_type.clone(),
                        data: mode == Mode::Data,
                        id,
                        attributes,
                    },
                );
            }
        }

        Ok(Self { resources })
    }

    pub fn insert(&mut self, address: impl Into<String>, instance: InstanceState) {
        self.resources.insert(address.into(), instance);
    }

    pub fn resource(&self, address: &str) -> Option<&InstanceState> {
        self.resources.get(address)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &InstanceState)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn managed_of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = (&'a str, &'a InstanceState)> {
        self.resources()
            .filter(move |(_, r)| !r.data && r.resource_type == resource_type)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }
}

#[derive(Debug, Deserialize)]
struct RawState {
    version: u64,
    #[serde(default)]
    resources: Vec<RawResource>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default)]
    module: Option<String>,
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    instances: Vec<RawInstance>,
}

#[derive(Debug, Deserialize)]
struct RawInstance {
    #[serde(default)]
    index_key: Option<serde_json::Value>,
    #[serde(default)]
    attributes: Option<serde_json::Value>,
}

// "module.a.module.b[0]" -> ["a", "b[0]"]
fn module_path(module: &str) -> Vec<String> {
    module
        .split("module.")
        .map(|s| s.trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn instance_key(value: &serde_json::Value) -> Option<InstanceKey> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().map(InstanceKey::Index),
        serde_json::Value::String(s) => Some(InstanceKey::Key(s.clone())),
        _ => None,
    }
}

fn flatten_into(prefix: &str, value: &serde_json::Value, out: &mut BTreeMap<String, String>) {
    use serde_json::Value;

    match value {
        Value::Null => {}
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), format_number(n));
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Array(items) => {
            out.insert(format!("{}.#", prefix), items.len().to_string());
            for (i, item) in items.iter().enumerate() {
                flatten_into(&format!("{}.{}", prefix, i), item, out);
            }
        }
        Value::Object(map) => {
            out.insert(format!("{}.%", prefix), map.len().to_string());
            for (k, v) in map {
                flatten_into(&format!("{}.{}", prefix, k), v, out);
            }
        }
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

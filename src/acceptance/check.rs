use async_trait::async_trait;

use super::CheckError;
use crate::config::Config;
use crate::terraform::{InstanceState, State};

/// What a check sees after a step: provider settings and the applied state.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub config: &'a Config,
    pub state: &'a State,
}

impl<'a> CheckContext<'a> {
    pub fn new(config: &'a Config, state: &'a State) -> Self {
        Self { config, state }
    }

    pub fn instance(&self, address: &str) -> Result<&'a InstanceState, CheckError> {
        self.state
            .resource(address)
            .ok_or_else(|| CheckError::ResourceNotFound {
                address: address.to_string(),
            })
    }
}

#[async_trait]
pub trait Check: Send + Sync {
    async fn check(&self, ctx: &CheckContext<'_>) -> Result<(), CheckError>;
}

pub type BoxedCheck = Box<dyn Check>;

/// Runs checks in order and stops at the first failure.
pub fn compose(checks: Vec<BoxedCheck>) -> BoxedCheck {
    Box::new(Composite { checks })
}

pub fn check_resource_attr(address: &str, key: &str, value: impl Into<String>) -> BoxedCheck {
    Box::new(ResourceAttr {
        address: address.to_string(),
        key: key.to_string(),
        value: value.into(),
    })
}

pub fn check_resource_attr_set(address: &str, key: &str) -> BoxedCheck {
    Box::new(ResourceAttrSet {
        address: address.to_string(),
        key: key.to_string(),
    })
}

pub fn check_no_resource_attr(address: &str, key: &str) -> BoxedCheck {
    Box::new(NoResourceAttr {
        address: address.to_string(),
        key: key.to_string(),
    })
}

/// Asserts `first.first_key == second.second_key`, e.g. a resource attribute
/// against a data source output.
pub fn check_resource_attr_pair(
    first: &str,
    first_key: &str,
    second: &str,
    second_key: &str,
) -> BoxedCheck {
    Box::new(ResourceAttrPair {
        first: first.to_string(),
        first_key: first_key.to_string(),
        second: second.to_string(),
        second_key: second_key.to_string(),
    })
}

struct Composite {
    checks: Vec<BoxedCheck>,
}

#[async_trait]
impl Check for Composite {
    async fn check(&self, ctx: &CheckContext<'_>) -> Result<(), CheckError> {
        let total = self.checks.len();
        for (i, check) in self.checks.iter().enumerate() {
            check
                .check(ctx)
                .await
                .map_err(|source| CheckError::Composite {
                    index: i + 1,
                    total,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}

struct ResourceAttr {
    address: String,
    key: String,
    value: String,
}

#[async_trait]
impl Check for ResourceAttr {
    async fn check(&self, ctx: &CheckContext<'_>) -> Result<(), CheckError> {
        let instance = ctx.instance(&self.address)?;
        match lookup(instance, &self.key) {
            Some(actual) if actual == self.value => Ok(()),
            Some(actual) => Err(CheckError::AttributeMismatch {
                address: self.address.clone(),
                key: self.key.clone(),
                expected: self.value.clone(),
                actual: actual.to_string(),
            }),
            None => Err(CheckError::AttributeMissing {
                address: self.address.clone(),
                key: self.key.clone(),
            }),
        }
    }
}

struct ResourceAttrSet {
    address: String,
    key: String,
}

#[async_trait]
impl Check for ResourceAttrSet {
    async fn check(&self, ctx: &CheckContext<'_>) -> Result<(), CheckError> {
        let instance = ctx.instance(&self.address)?;
        match instance.attribute(&self.key) {
            Some(v) if !v.is_empty() => Ok(()),
            _ => Err(CheckError::AttributeMissing {
                address: self.address.clone(),
                key: self.key.clone(),
            }),
        }
    }
}

struct NoResourceAttr {
    address: String,
    key: String,
}

#[async_trait]
impl Check for NoResourceAttr {
    async fn check(&self, ctx: &CheckContext<'_>) -> Result<(), CheckError> {
        let instance = ctx.instance(&self.address)?;
        match instance.attribute(&self.key) {
            None => Ok(()),
            Some("0") if is_count_key(&self.key) => Ok(()),
            Some(actual) => Err(CheckError::AttributeUnexpected {
                address: self.address.clone(),
                key: self.key.clone(),
                actual: actual.to_string(),
            }),
        }
    }
}

struct ResourceAttrPair {
    first: String,
    first_key: String,
    second: String,
    second_key: String,
}

#[async_trait]
impl Check for ResourceAttrPair {
    async fn check(&self, ctx: &CheckContext<'_>) -> Result<(), CheckError> {
        if self.first == self.second && self.first_key == self.second_key {
            return Err(CheckError::AttributePair {
                message: format!(
                    "comparing self: resource {} attribute {}",
                    self.first, self.first_key
                ),
            });
        }

        let first = ctx.instance(&self.first)?;
        let second = ctx.instance(&self.second)?;

        match (lookup(first, &self.first_key), lookup(second, &self.second_key)) {
            (None, None) => Ok(()),
            (Some(a), Some(b)) if a == b => Ok(()),
            (Some(a), Some(b)) => Err(CheckError::AttributePair {
                message: format!(
                    "{}: attribute '{}' expected {:?}, got {:?}",
                    self.first, self.first_key, b, a
                ),
            }),
            (Some(a), None) => Err(CheckError::AttributePair {
                message: format!(
                    "{}: attribute '{}' is {:?}, but '{}' is not set in {}",
                    self.first, self.first_key, a, self.second_key, self.second
                ),
            }),
            (None, Some(b)) => Err(CheckError::AttributePair {
                message: format!(
                    "{}: attribute '{}' is not set, but '{}' is {:?} in {}",
                    self.first, self.first_key, self.second_key, b, self.second
                ),
            }),
        }
    }
}

fn is_count_key(key: &str) -> bool {
    key.ends_with(".#") || key.ends_with(".%")
}

// A missing count key reads as "0"; empty collections are dropped from state.
fn lookup<'a>(instance: &'a InstanceState, key: &str) -> Option<&'a str> {
    match instance.attribute(key) {
        Some(v) => Some(v),
        None if is_count_key(key) => Some("0"),
        None => None,
    }
}

//! flexibleengine-acc - acceptance-test harness for the FlexibleEngine Terraform provider
//!
//! Drives `terraform` through test cases, checks resulting state and verifies
//! resources against the live cloud API through a small service SDK.

pub mod acceptance;
pub mod config;
pub mod resource;
pub mod sdk;
pub mod terraform;
pub mod test_support;

mod error;

pub use config::{Config, ConfigError};
pub use error::AccError;
pub use resource::{AddressError, ResourceAddress};
pub use sdk::{SdkError, ServiceClient};

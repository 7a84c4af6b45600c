//! Minimal FlexibleEngine REST client: the service client plus the
//! volume and load-balancer whitelist APIs the acceptance harness needs.

mod client;
mod error;

pub mod cloudvolumes;
pub mod whitelists;

pub use client::ServiceClient;
pub use error::SdkError;

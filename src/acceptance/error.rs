use thiserror::Error;

use crate::config::ConfigError;
use crate::sdk::SdkError;

/// Failure of a retrieval function.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("error creating flexibleengine {service} client: {source}")]
    Client {
        service: &'static str,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Sdk(#[from] SdkError),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Sdk(e) if e.is_not_found())
    }
}

/// Failure of a single state check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("can not find the resource {address} in state")]
    ResourceNotFound { address: String },

    #[error("no id is set for the resource {address}")]
    MissingId { address: String },

    #[error("error checking {address} exists: {source}")]
    Fetch {
        address: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to destroy resource: {resource_type} {id} still exists")]
    StillExists { resource_type: String, id: String },

    #[error("error checking {resource_type} {id} was destroyed: {source}")]
    DestroyFetch {
        resource_type: String,
        id: String,
        #[source]
        source: FetchError,
    },

    #[error("{address}: attribute '{key}' not found")]
    AttributeMissing { address: String, key: String },

    #[error("{address}: attribute '{key}' expected {expected:?}, got {actual:?}")]
    AttributeMismatch {
        address: String,
        key: String,
        expected: String,
        actual: String,
    },

    #[error("{address}: attribute '{key}' expected not to be set, got {actual:?}")]
    AttributeUnexpected {
        address: String,
        key: String,
        actual: String,
    },

    #[error("{message}")]
    AttributePair { message: String },

    #[error("invalid resource address: {0}")]
    Address(#[from] crate::resource::AddressError),

    #[error("check {index}/{total} error: {source}")]
    Composite {
        index: usize,
        total: usize,
        #[source]
        source: Box<CheckError>,
    },

    #[error("import state verify failed for {address}: {differences}")]
    ImportVerify { address: String, differences: String },
}

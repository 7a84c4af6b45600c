use thiserror::Error;

use crate::acceptance::{CheckError, PreCheckError};
use crate::config::ConfigError;
use crate::terraform::TerraformError;

#[derive(Debug, Error)]
pub enum AccError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Terraform(#[from] TerraformError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("pre-check failed: {0}")]
    PreCheck(#[from] PreCheckError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("after applying this step, the plan was not empty")]
    NonEmptyPlan,

    #[error("import step has no preceding config step")]
    ImportWithoutConfig,

    #[error("step {step}/{total} error: {source}")]
    Step {
        step: usize,
        total: usize,
        #[source]
        source: Box<AccError>,
    },
}

mod driver;
mod state;

pub use driver::{Terraform, TerraformCli, TerraformError};
pub use state::{InstanceState, State, StateError};

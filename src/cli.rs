mod args;

pub use args::{CaseName, Cli, Command, RunArgs};

//! Terminal presentation surface

mod cli;
#[cfg(test)]
mod tests;

pub use cli::{parse_control, Args, Cli, Command, Control, CONTROLS_HELP};

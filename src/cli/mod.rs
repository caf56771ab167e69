//! CLI module: clap definitions and their mapping onto the config types.

mod clap_parser;

pub use clap_parser::{Cli, Command, DbArgs, JiraArgs};

pub mod cli;
pub mod config;
pub mod db;
pub mod export;
pub mod extensions;
pub mod import;
pub mod jira;
pub mod logging;
pub mod matching;
pub mod models;
pub mod orchestrator;
pub mod statements;
pub mod util;

pub mod error;

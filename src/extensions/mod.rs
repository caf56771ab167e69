//! Optional datasets installed next to the search table.

pub mod zip_codes;

use anyhow::Result;
use clap::ValueEnum;
use sqlx::PgPool;

use crate::config::ZipCodeConfig;
use crate::db::ExecutionReport;

#[derive(Copy, Clone, Eq, PartialEq, ValueEnum, Debug)]
pub enum Extension {
    #[value(name = "zip_codes")]
    ZipCodes,
}

impl Extension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZipCodes => "zip_codes",
        }
    }
}

impl std::fmt::Display for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub async fn run_extension(
    pool: &PgPool,
    extension: Extension,
    zip_cfg: &ZipCodeConfig,
) -> Result<ExecutionReport> {
    match extension {
        Extension::ZipCodes => zip_codes::install_zip_codes(pool, zip_cfg).await,
    }
}

use crate::config::{
    DEFAULT_MATCH_CUTOFF, DEFAULT_REPORT_PATH, DEFAULT_ZIP_CODE_URL, DatabaseConfig, JiraConfig,
    RebuildConfig, ReportConfig, ZipCodeConfig,
};
use crate::error::ConfigError;
use crate::extensions::Extension;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "form5500_search",
    version,
    about = "Rebuilds the Form 5500 search table and reports unmatched recordkeepers",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(flatten)]
    pub db: DbArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// DB host (env: DB_HOST)
    #[arg(long = "db-host", env = "DB_HOST", default_value = "127.0.0.1", global = true)]
    pub host: String,
    /// DB port (env: DB_PORT)
    #[arg(long = "db-port", env = "DB_PORT", default_value_t = 5432, global = true)]
    pub port: u16,
    /// DB user (env: DB_USER)
    #[arg(long = "db-user", env = "DB_USER", default_value = "postgres", global = true)]
    pub user: String,
    /// DB password (env: DB_PASSWORD)
    #[arg(
        long = "db-password",
        env = "DB_PASSWORD",
        default_value = "",
        hide_env_values = true,
        global = true
    )]
    pub password: String,
    /// Database name (env: DB_NAME)
    #[arg(long = "db-name", env = "DB_NAME", default_value = "form5500", global = true)]
    pub database: String,
}

impl DbArgs {
    pub fn to_config(&self) -> Result<DatabaseConfig, ConfigError> {
        let cfg = DatabaseConfig {
            username: self.user.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Args, Debug, Clone)]
pub struct JiraArgs {
    /// Jira base URL (env: JIRA_URL)
    #[arg(long = "jira-url", env = "JIRA_URL", default_value = "")]
    pub url: String,
    /// Project key for the ticket (env: JIRA_PROJECT)
    #[arg(long = "jira-project", env = "JIRA_PROJECT", default_value = "")]
    pub project: String,
    /// Account that creates the ticket (env: JIRA_CREATOR)
    #[arg(long = "jira-creator", env = "JIRA_CREATOR")]
    pub creator: Option<String>,
    /// API token of the creator (env: JIRA_TOKEN)
    #[arg(long = "jira-token", env = "JIRA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// User the ticket is assigned to (env: JIRA_ASSIGNEE)
    #[arg(long = "jira-assignee", env = "JIRA_ASSIGNEE")]
    pub assignee: Option<String>,
}

impl JiraArgs {
    pub fn to_config(&self) -> Result<Option<JiraConfig>, ConfigError> {
        JiraConfig::from_parts(
            self.url.clone(),
            self.project.clone(),
            self.creator.clone(),
            self.token.clone(),
            self.assignee.clone(),
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drop and rebuild form_5500_search and its materialized view
    Rebuild {
        /// Dataset section suffix of the yearly tables (e.g. latest, all)
        #[arg(long, default_value = "latest")]
        section: String,
        /// Comma-separated filing years
        #[arg(long, value_delimiter = ',', required = true)]
        years: Vec<String>,
        /// CSV of schedule C provider name to company id
        #[arg(long = "rk-mapping-file", env = "RK_MAPPING_FILE")]
        rk_mapping_file: Option<String>,
        /// Print the statements instead of running them
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Report recordkeeper names without a company id, with suggested matches
    Unmatched {
        #[arg(long = "out", default_value = DEFAULT_REPORT_PATH)]
        out_path: String,
        /// Suggestions are kept only below this edit distance
        #[arg(long, default_value_t = DEFAULT_MATCH_CUTOFF)]
        cutoff: usize,
        /// Score candidates in this process instead of with the database levenshtein()
        #[arg(long = "in-process")]
        in_process: bool,
        #[command(flatten)]
        jira: JiraArgs,
    },
    /// Install an optional reference dataset
    Extension {
        #[arg(value_enum)]
        name: Extension,
        #[arg(long = "zip-url", env = "ZIP_CODE_URL", default_value = DEFAULT_ZIP_CODE_URL)]
        zip_url: String,
        /// Where the downloaded CSV is kept
        #[arg(long = "download-dir", default_value = ".")]
        download_dir: String,
    },
    /// Write a .env template with the supported variables
    EnvTemplate {
        #[arg(long, default_value = ".env.template")]
        path: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rebuild { .. } => "rebuild",
            Self::Unmatched { .. } => "unmatched",
            Self::Extension { .. } => "extension",
            Self::EnvTemplate { .. } => "env-template",
        }
    }

    pub fn rebuild_config(&self) -> Option<RebuildConfig> {
        match self {
            Self::Rebuild {
                section,
                years,
                rk_mapping_file,
                dry_run,
            } => Some(RebuildConfig {
                section: section.clone(),
                years: years.iter().map(|y| y.trim().to_string()).collect(),
                rk_mapping_file: rk_mapping_file.clone(),
                dry_run: *dry_run,
            }),
            _ => None,
        }
    }

    pub fn report_config(&self) -> Option<ReportConfig> {
        match self {
            Self::Unmatched {
                out_path,
                cutoff,
                in_process,
                ..
            } => Some(ReportConfig {
                out_path: out_path.clone(),
                cutoff: *cutoff,
                in_process: *in_process,
            }),
            _ => None,
        }
    }

    pub fn zip_code_config(&self) -> Option<ZipCodeConfig> {
        match self {
            Self::Extension {
                zip_url,
                download_dir,
                ..
            } => Some(ZipCodeConfig {
                url: zip_url.clone(),
                download_dir: download_dir.clone(),
            }),
            _ => None,
        }
    }
}

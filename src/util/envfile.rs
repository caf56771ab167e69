use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Load `.env` from the current working directory into the process
/// environment. Variables that are already set are not overridden.
pub fn load_dotenv_if_present() -> Result<Option<std::path::PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context("Failed to load .env"),
    }
}

const ENV_TEMPLATE: &str = r#"# form5500_search environment configuration template
# Copy this file to .env and fill in your database connection settings.
# Any of these variables can also be provided via the system environment.

# PostgreSQL holding the f_5500_* tables
DB_HOST=127.0.0.1
DB_PORT=5432
DB_USER=postgres
DB_PASSWORD=secret
DB_NAME=form5500

# Recordkeeper mapping CSV used by `rebuild` (optional)
#RK_MAPPING_FILE=rk_mappings.csv

# Ticket for the `unmatched` report (optional; both creator and token are required)
#JIRA_URL=https://yourcompany.atlassian.net
#JIRA_PROJECT=DATA
#JIRA_CREATOR=you@example.com
#JIRA_TOKEN=api-token
#JIRA_ASSIGNEE=username

# Zip code dataset source for `extension zip_codes` (optional)
#ZIP_CODE_URL=https://raw.githubusercontent.com/jdcalvin/form5500-data-sets-import/master/form5500/zipcode.csv

# Connection pool (optional)
#FORM5500_POOL_SIZE=4
#FORM5500_ACQUIRE_MS=30000
#FORM5500_IDLE_MS=60000
#FORM5500_LIFETIME_MS=1800000

# Log level
#RUST_LOG=info
"#;

/// Generate a .env.template file with placeholder values and comments.
pub fn write_env_template(path: &str) -> Result<()> {
    let p = Path::new(path);
    if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut f = fs::File::create(p).with_context(|| format!("Failed to create {}", path))?;
    f.write_all(ENV_TEMPLATE.as_bytes())?;
    Ok(())
}

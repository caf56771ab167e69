use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use form5500_search::cli::{Cli, Command};
use form5500_search::db::make_pool;
use form5500_search::logging::init_logging;
use form5500_search::orchestrator::{self, summary::RunSummary};
use form5500_search::util::envfile::{load_dotenv_if_present, write_env_template};

#[tokio::main]
async fn main() {
    // .env must be in the environment before clap resolves `env = ...` fallbacks.
    let dotenv = load_dotenv_if_present();
    init_logging();
    match dotenv {
        Ok(Some(path)) => info!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut summary = RunSummary::start(cli.command.name());

    match &cli.command {
        Command::Rebuild { .. } => {
            let cfg = cli
                .command
                .rebuild_config()
                .context("rebuild arguments missing")?;
            let plan = orchestrator::plan_rebuild(&cfg, &mut summary)?;
            if cfg.dry_run {
                let stdout = std::io::stdout();
                orchestrator::print_plan(&mut stdout.lock(), &plan)?;
                summary.note(format!("dry run: {} statements printed", plan.len()));
            } else {
                let pool = make_pool(&cli.db.to_config()?).await?;
                orchestrator::rebuild_search_table(&pool, &plan, &mut summary).await?;
                pool.close().await;
            }
        }
        Command::Unmatched { jira, .. } => {
            let cfg = cli
                .command
                .report_config()
                .context("unmatched arguments missing")?;
            let jira_cfg = jira.to_config()?;
            let pool = make_pool(&cli.db.to_config()?).await?;
            orchestrator::find_unmatched_rks(&pool, &cfg, jira_cfg.as_ref(), &mut summary).await?;
            pool.close().await;
        }
        Command::Extension { name, .. } => {
            let zip_cfg = cli
                .command
                .zip_code_config()
                .context("extension arguments missing")?;
            let pool = make_pool(&cli.db.to_config()?).await?;
            orchestrator::install_extension(&pool, *name, &zip_cfg, &mut summary).await?;
            pool.close().await;
        }
        Command::EnvTemplate { path } => {
            write_env_template(path)?;
            info!("Wrote {}", path);
        }
    }

    summary.finish().log();
    Ok(())
}

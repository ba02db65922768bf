//! Airgraph - Provision a Neo4j flight network from CSV files and analyze it.

mod cli;

use airgraph::catalog::Catalog;
use airgraph::config::{Config, ConnectionConfig};
use airgraph::console::Console;
use airgraph::error::{AirgraphError, Result};
use airgraph::pipeline::Pipeline;
use airgraph::{db, logging};
use cli::Cli;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    debug!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let catalog = resolve_catalog(&cli, &config)?;
    let mut console = Console::stdio();

    if cli.list {
        print_catalog(&catalog, &mut console);
        console.flush();
        return Ok(());
    }

    // Connection precedence:
    // 1. CLI arguments (highest)
    // 2. Named connection from config
    // 3. Default connection from config
    // 4. Environment variables
    let connection = resolve_connection(&cli, &config)?;
    let target = connection.display_string();
    info!("Connection: {}", target);

    let client = db::connect(&connection)?;
    let mut pipeline = Pipeline::new(catalog);
    let outcome = pipeline.run(client, &target, &mut console).await;
    console.flush();

    outcome.map(|_| ())
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    let mut connection = match cli.connection_name() {
        Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            AirgraphError::config(format!("Connection '{}' not found in config file", name))
        })?,
        None => config.get_connection(None).cloned().unwrap_or_default(),
    };

    if let Some(overrides) = cli.to_connection_config()? {
        connection.merge(&overrides);
    }

    connection.apply_env_defaults();
    Ok(connection)
}

/// Picks the catalog: `--catalog`, then the config file, then the built-in one.
fn resolve_catalog(cli: &Cli, config: &Config) -> Result<Catalog> {
    let catalog = match cli.catalog.as_ref().or(config.catalog.path.as_ref()) {
        Some(path) => {
            info!("Loading catalog from: {}", path.display());
            Catalog::load_from_file(path)?
        }
        None => Catalog::builtin(),
    };

    if cli.skip_setup {
        Ok(catalog.without_setup())
    } else {
        Ok(catalog)
    }
}

fn print_catalog(catalog: &Catalog, console: &mut Console) {
    let phases = [("SETUP", catalog.setup()), ("ANALYSIS", catalog.analysis())];
    for (name, entries) in phases {
        console.line(format!("{name} ({} statements)", entries.len()));
        for (idx, entry) in entries.iter().enumerate() {
            console.line(format!("  {:>2}. {}", idx + 1, entry.description()));
        }
    }
}

//! gvi - read-only dashboard and CLI for the gvid daemon.

use std::process;
use std::sync::Arc;

use clap::Parser;
use gastown_viewer::cli::{Cli, Commands, ConfigCommands};
use gastown_viewer::client::ApiClient;
use gastown_viewer::commands::{self, Output};
use gastown_viewer::config::{self, ConfigOverrides, ResolvedConfig};
use gastown_viewer::logging::{self, LogTarget};
use gastown_viewer::models::IssueFilter;
use gastown_viewer::Result;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run(cli) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let human = cli.human_readable;
    let command = cli.command.unwrap_or(Commands::Tui { interval: None });

    let mut overrides = ConfigOverrides::new();
    if let Some(path) = cli.config {
        overrides = overrides.with_config_path(path);
    }
    if let Some(url) = cli.url {
        overrides = overrides.with_base_url(url);
    }
    if let Commands::Tui {
        interval: Some(secs),
    }
    | Commands::Watch {
        interval: Some(secs),
        ..
    } = command
    {
        overrides = overrides.with_poll_interval_secs(secs);
    }
    let config = config::resolve_config(&overrides)?;

    // The dashboard owns the terminal, so its logs go to a file.
    let target = match command {
        Commands::Tui { .. } => LogTarget::File(
            logging::default_log_dir()
                .unwrap_or_else(|| std::env::temp_dir().join("gastown-viewer")),
        ),
        _ => LogTarget::Stderr,
    };
    let _log_guard = logging::init(config.log_level(), target)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_command(command, &config, human))
}

async fn run_command(command: Commands, config: &ResolvedConfig, human: bool) -> Result<()> {
    let client = ApiClient::new(config.base_url(), config.request_timeout())?;
    tracing::debug!(url = client.base_url(), "client ready");

    match command {
        Commands::Tui { .. } => run_tui(client, config).await,
        Commands::Watch { cycles, .. } => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let written =
                commands::watch(Arc::new(client), config.poll_interval(), cycles, human, &mut out)
                    .await?;
            tracing::info!(cycles = written, "watch finished");
            Ok(())
        }
        Commands::Health => {
            output(&commands::health(&client).await?, human);
            Ok(())
        }
        Commands::Board => {
            output(&commands::board(&client).await?, human);
            Ok(())
        }
        Commands::Issue { id } => {
            output(&commands::issue(&client, &id).await?, human);
            Ok(())
        }
        Commands::Issues {
            status,
            parent,
            search,
            limit,
            offset,
        } => {
            let filter = IssueFilter {
                status,
                parent,
                search,
                limit,
                offset,
            };
            output(&commands::issues(&client, &filter).await?, human);
            Ok(())
        }
        Commands::Graph { format } => {
            output(&commands::graph(&client, format).await?, human);
            Ok(())
        }
        Commands::Town => {
            output(&commands::town(&client).await?, human);
            Ok(())
        }
        Commands::Status => {
            output(&commands::status(&client).await?, human);
            Ok(())
        }
        Commands::Rigs { name } => {
            output(commands::rigs(&client, name.as_deref()).await?.as_ref(), human);
            Ok(())
        }
        Commands::Agents => {
            output(&commands::agents(&client).await?, human);
            Ok(())
        }
        Commands::Convoys { id } => {
            output(commands::convoys(&client, id.as_deref()).await?.as_ref(), human);
            Ok(())
        }
        Commands::Molecules { id } => {
            output(commands::molecules(&client, id.as_deref()).await?.as_ref(), human);
            Ok(())
        }
        Commands::Mail { address } => {
            output(&commands::mail(&client, &address).await?, human);
            Ok(())
        }
        Commands::Config {
            command: ConfigCommands::Show,
        } => {
            output(config, human);
            Ok(())
        }
    }
}

#[cfg(feature = "tui")]
async fn run_tui(client: ApiClient, config: &ResolvedConfig) -> Result<()> {
    gastown_viewer::tui::run_tui(Arc::new(client), config.base_url(), config.poll_interval()).await
}

#[cfg(not(feature = "tui"))]
async fn run_tui(_client: ApiClient, _config: &ResolvedConfig) -> Result<()> {
    Err(gastown_viewer::Error::Other(
        "gvi was built without the `tui` feature; run a subcommand such as `gvi board`".to_string(),
    ))
}

fn output<T: Output + ?Sized>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

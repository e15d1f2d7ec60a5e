//! CLI argument definitions for Gas Town Viewer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::models::IssueStatus;

/// Version string with the commit and build time baked in by build.rs.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GVI_GIT_COMMIT"),
    ", built ",
    env!("GVI_BUILD_TIMESTAMP"),
    ")"
);

/// Gas Town Viewer - a read-only dashboard for the gvid daemon.
///
/// With no subcommand, opens the interactive dashboard.
#[derive(Parser, Debug)]
#[command(name = "gvi")]
#[command(author, version = LONG_VERSION, about = "Read-only dashboard for Gas Town and its beads board", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// gvid API base URL [default: http://localhost:7070/api/v1].
    /// Can also be set via GVI_URL environment variable.
    #[arg(long = "url", global = true)]
    pub url: Option<String>,

    /// Path to config.kdl.
    /// Can also be set via GVI_CONFIG environment variable.
    #[arg(long = "config", global = true, env = "GVI_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive terminal dashboard (default)
    Tui {
        /// Seconds between refreshes
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Poll without a UI, printing one JSON line per cycle
    Watch {
        /// Seconds between cycles
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
    },

    /// Daemon liveness and version
    Health,

    /// Issue board grouped by status
    Board,

    /// Show one issue in full
    Issue {
        /// Issue ID (e.g., gv-12)
        id: String,
    },

    /// List issues with optional filters
    Issues {
        /// Only issues with this status (pending, in_progress, done, blocked)
        #[arg(long, value_parser = parse_status)]
        status: Option<IssueStatus>,

        /// Only children of this issue
        #[arg(long)]
        parent: Option<String>,

        /// Full-text search
        #[arg(long)]
        search: Option<String>,

        /// Maximum number of issues
        #[arg(long, default_value_t = 100)]
        limit: usize,

        /// Number of issues to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Dependency graph
    Graph {
        /// Output format
        #[arg(long, value_enum, default_value_t = GraphFormat::Json)]
        format: GraphFormat,
    },

    /// Full Gas Town snapshot
    Town,

    /// Gas Town health summary
    Status,

    /// List rigs, or show one rig
    Rigs {
        /// Rig name
        name: Option<String>,
    },

    /// List every agent in the town
    Agents,

    /// List convoys, or show one convoy
    Convoys {
        /// Convoy ID
        id: Option<String>,
    },

    /// List molecules, or show one molecule
    Molecules {
        /// Molecule ID
        id: Option<String>,
    },

    /// Show an agent's mailbox
    Mail {
        /// Agent address (e.g., mayor/, gastown/witness)
        address: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration and where each value came from
    Show,
}

/// Output format for `gvi graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Json,
    Dot,
}

fn parse_status(s: &str) -> Result<IssueStatus, String> {
    IssueStatus::parse(s).ok_or_else(|| {
        format!(
            "invalid status '{}': expected one of pending, in_progress, done, blocked",
            s
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // This will panic if the CLI is misconfigured
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["gvi"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.human_readable);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["gvi", "board", "-H", "--url", "http://gt:7070/api/v1"]).unwrap();
        assert!(cli.human_readable);
        assert_eq!(cli.url.as_deref(), Some("http://gt:7070/api/v1"));
        assert!(matches!(cli.command, Some(Commands::Board)));
    }

    #[test]
    fn test_issues_filters() {
        let cli = Cli::try_parse_from([
            "gvi", "issues", "--status", "in_progress", "--search", "poll", "--limit", "5",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Issues {
                status,
                search,
                limit,
                offset,
                parent,
            }) => {
                assert_eq!(status, Some(IssueStatus::InProgress));
                assert_eq!(search.as_deref(), Some("poll"));
                assert_eq!(limit, 5);
                assert_eq!(offset, 0);
                assert!(parent.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["gvi", "issues", "--status", "open"]).is_err());
    }

    #[test]
    fn test_graph_format() {
        let cli = Cli::try_parse_from(["gvi", "graph", "--format", "dot"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Graph {
                format: GraphFormat::Dot
            })
        ));
    }
}

//! HR portal command-line front end.
//!
//! # Responsibility
//! - Drive the headless portal against a SQLite or in-memory store.
//! - Expose state inspection and the approval workflow for scripting.
//!
//! # Usage
//!
//! ```bash
//! hr_portal --db portal.db render /approvals/pending
//! hr_portal --db portal.db decide a1 approve --note "Budget confirmed"
//! hr_portal --db portal.db get settings.delegates
//! ```

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hr_portal_core::model::approval::Decision;
use hr_portal_core::service::approval_service::ApprovalService;
use hr_portal_core::{
    core_version, default_log_level, init_logging, ping, Clock, FixedClock, KeyValueStorage,
    MemoryStorage, Portal, PortalConfig, SqliteStorage, StateStore, SystemClock,
};
use log::info;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hr_portal")]
#[command(version)]
#[command(about = "Headless HR admin portal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite file holding portal state (in-memory seed data when omitted)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON portal config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start location used by `render` when no route is given
    #[arg(long, global = true)]
    location: Option<String>,

    /// Pin "today" as YYYY-MM-DD
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Absolute directory for rolling log files (logging disabled when omitted)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core linkage info
    Ping,

    /// List registered route keys
    Routes,

    /// Mount a location and print the rendered document
    Render {
        /// Route or fragment, e.g. `/requests/r2` or `#/dashboard?embed=true`
        location: Option<String>,
    },

    /// Print the state value at a dotted path
    Get { path: String },

    /// Write a JSON value at a dotted path
    Set { path: String, json: String },

    /// Record a decision on a pending approval
    Decide {
        approval_id: String,
        /// approve, reject or revise
        decision: String,
        #[arg(long, default_value = "")]
        note: String,
        /// Reviewer name (defaults to the signed-in user)
        #[arg(long)]
        by: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|err| anyhow::anyhow!("{err}"))?;
    }

    match &cli.command {
        Commands::Ping => {
            println!("hr_portal_core ping={}", ping());
            println!("hr_portal_core version={}", core_version());
        }
        Commands::Routes => {
            let portal = open_portal(&cli)?;
            for key in portal.router().table().keys() {
                println!("{key}");
            }
        }
        Commands::Render { location } => {
            let mut portal = open_portal(&cli)?;
            let location = location.as_deref().or(cli.location.as_deref());
            portal.start(location.unwrap_or(""))?;
            print_document(&portal);
        }
        Commands::Get { path } => {
            let store = StateStore::open(open_storage(&cli)?);
            let value = store.get(path, Value::Null);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Set { path, json } => {
            let value: Value =
                serde_json::from_str(json).with_context(|| format!("invalid JSON for `{path}`"))?;
            let mut store = StateStore::open(open_storage(&cli)?);
            store.set(path, value)?;
            info!("event=cli_set module=cli status=ok path={path}");
            println!("ok");
        }
        Commands::Decide {
            approval_id,
            decision,
            note,
            by,
        } => {
            let Some(decision) = Decision::parse(decision) else {
                bail!("unknown decision `{decision}`; use approve, reject or revise");
            };
            let config = load_config(&cli)?;
            let today = clock(&cli).today();
            let mut store = StateStore::open(open_storage(&cli)?);
            let decided_by = match by {
                Some(name) => name.clone(),
                None => store
                    .user()
                    .map(|user| user.name)
                    .unwrap_or_else(|| "Unknown".to_string()),
            };
            let outcome = ApprovalService::new(&mut store, config.approval).decide(
                approval_id,
                decision,
                note,
                &decided_by,
                today,
            )?;
            println!("{}", outcome.message());
            match outcome.request_status {
                Some(status) => println!("request {} is now {status}", outcome.request_id),
                None => println!("request {} no longer exists", outcome.request_id),
            }
        }
    }
    Ok(())
}

fn open_storage(cli: &Cli) -> Result<Box<dyn KeyValueStorage>> {
    Ok(match &cli.db {
        Some(path) => Box::new(
            SqliteStorage::open(path)
                .with_context(|| format!("failed to open `{}`", path.display()))?,
        ),
        None => Box::new(MemoryStorage::new()),
    })
}

fn load_config(cli: &Cli) -> Result<PortalConfig> {
    match &cli.config {
        Some(path) => PortalConfig::load(path)
            .with_context(|| format!("failed to load config `{}`", path.display())),
        None => Ok(PortalConfig::default()),
    }
}

fn clock(cli: &Cli) -> Box<dyn Clock> {
    match cli.today {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    }
}

fn open_portal(cli: &Cli) -> Result<Portal> {
    Ok(Portal::open(open_storage(cli)?, load_config(cli)?, clock(cli))?)
}

fn print_document(portal: &Portal) {
    let document = portal.document();
    println!("title: {}", document.title);
    if document.sidebar_visible {
        print!("{}", portal.sidebar().render());
        println!("---");
    }
    print!("{}", portal.page_text());
    for toast in portal.toasts().visible() {
        println!("[{:?}] {}", toast.kind, toast.message);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn decide_takes_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hr_portal", "decide", "a1", "approve", "--note", "Budget confirmed", "--db", "p.db",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("p.db")));
        match cli.command {
            Commands::Decide {
                approval_id,
                decision,
                note,
                by,
            } => {
                assert_eq!(approval_id, "a1");
                assert_eq!(decision, "approve");
                assert_eq!(note, "Budget confirmed");
                assert_eq!(by, None);
            }
            _ => panic!("expected decide"),
        }
    }

    #[test]
    fn today_must_be_a_calendar_date() {
        assert!(Cli::try_parse_from(["hr_portal", "--today", "2025-05-20", "ping"]).is_ok());
        assert!(Cli::try_parse_from(["hr_portal", "--today", "May 20", "ping"]).is_err());
    }
}

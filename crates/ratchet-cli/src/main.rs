//! ratchet - upgrade-compatibility check CLI
//!
//! The `ratchet` command inspects the checks registered in
//! `ratchet-checks` without a live system under test.
//!
//! ## Commands
//!
//! - `list`: show every check and whether it runs for a base version
//! - `render`: print a check's initialize/manipulate/validate scripts

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ratchet_checks::all_checks;
use ratchet_core::{Check, CheckContext, Script, Version};

#[derive(Parser)]
#[command(name = "ratchet")]
#[command(author = "Ratchet Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Upgrade-compatibility checks for versioned database clusters", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered checks and their eligibility for a base version
    List {
        /// Version the test run would begin at, e.g. 0.47.0
        #[arg(short, long)]
        base_version: String,
    },

    /// Render a check's scripts for a base version
    Render {
        /// Check name (see `list`)
        #[arg(short, long)]
        check: String,

        /// Version the test run would begin at, e.g. 0.47.0
        #[arg(short, long)]
        base_version: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json);

    match cli.command {
        Commands::List { base_version } => cmd_list(&base_version),
        Commands::Render {
            check,
            base_version,
        } => cmd_render(&check, &base_version),
    }
}

/// Wire the CLI's log flags to a subscriber. `RUST_LOG` wins when set;
/// otherwise `--verbose` selects debug over info. Calling this twice is
/// harmless: only the first subscriber installs.
fn init_logging(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().try_init().ok();
    } else {
        builder.try_init().ok();
    }
}

fn parse_version(text: &str) -> Result<Version> {
    Ok(text.parse::<Version>()?)
}

fn cmd_list(base_version: &str) -> Result<()> {
    let base = parse_version(base_version)?;
    println!("{:<24} eligible", "check");
    for check in all_checks() {
        let eligible = if check.can_run(&base) { "yes" } else { "no" };
        println!("{:<24} {eligible}", check.name());
    }
    Ok(())
}

fn cmd_render(name: &str, base_version: &str) -> Result<()> {
    let base = parse_version(base_version)?;
    let Some(check) = all_checks().into_iter().find(|c| c.name() == name) else {
        bail!("unknown check: {name}");
    };

    if !check.can_run(&base) {
        println!("check {name} is ineligible at base version {base}; nothing to render");
        return Ok(());
    }

    let ctx = CheckContext::new(base);
    print_script("initialize", &check.initialize(&ctx));
    for (boundary, script) in check.manipulate(&ctx).iter().enumerate() {
        print_script(&format!("manipulate[{boundary}]"), script);
    }
    print_script("validate", &check.validate(&ctx));
    Ok(())
}

fn print_script(phase: &str, script: &Script) {
    println!("--- {phase} ({} blocks, fingerprint {}) ---", script.len(), script.fingerprint());
    println!("{}", script.render());
    println!();
}

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use rollcall::{date, ledger, Ledger};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::io;
use std::path::PathBuf;

mod shell;

use shell::{Outcome, Shell};

#[derive(Parser, Debug)]
#[command(author, version, about = "Attendance ledger shell")]
struct Args {
    /// Directory holding players.json and log.json
    #[arg(short = 'd', long = "data-dir", value_name = "DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Create empty stores, starting today, when none exist yet
    #[arg(long)]
    init: bool,

    /// Run a shell command instead of prompting; may be repeated
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    commands: Vec<String>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn open_ledger(args: &Args) -> Result<Ledger> {
    let dir = &args.data_dir;
    let fresh = !dir.join(ledger::PLAYER_FILE).exists() && !dir.join(ledger::LOG_FILE).exists();
    if args.init && fresh {
        let ledger = Ledger::new(date::today());
        ledger
            .save(dir)
            .with_context(|| format!("Failed to create a ledger in {}", dir.display()))?;
        log::info!("Created an empty ledger in {}", dir.display());
        return Ok(ledger);
    }

    let ledger = Ledger::load(dir)
        .with_context(|| format!("Failed to load the ledger from {}", dir.display()))?;
    if ledger.players().is_empty() {
        log::warn!("No players in {} yet; use `add` to register some", dir.display());
    }
    Ok(ledger)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let config = ConfigBuilder::new()
        .add_filter_allow_str("rollcall")
        .build();

    TermLogger::init(
        default_level,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    log::trace!("Args {:#?}", args);

    let ledger = open_ledger(&args)?;
    let stdin = io::stdin();
    let mut shell = Shell::new(ledger, args.data_dir.clone(), stdin.lock(), io::stdout());

    if args.commands.is_empty() {
        return shell.run();
    }

    for line in &args.commands {
        if let Outcome::Quit = shell.execute(line)? {
            break;
        }
    }
    shell.save()
}

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use matrestore_core::{RecoveryError, RunId};
use matrestore_runner::{report, Config, Runner, Scan};

#[derive(Parser)]
#[command(name = "matrestore", version, about = "Restore truncated session material from debug snapshots")]
struct Cli {
    /// Application root; relative paths in the config resolve against it
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file (default: <root>/matrestore.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default matrestore.toml under the root
    Init,

    /// Select a candidate snapshot and print it without touching the store
    Scan(Overrides),

    /// Show the current target record
    Inspect {
        #[arg(long)]
        record_id: Option<i64>,
    },

    /// Select a candidate and write it into the target record
    Restore {
        #[command(flatten)]
        overrides: Overrides,

        /// Skip the on-disk audit manifest
        #[arg(long)]
        no_report: bool,
    },
}

#[derive(Args, Default)]
struct Overrides {
    #[arg(long)]
    snapshot_dir: Option<String>,
    #[arg(long)]
    min_chars: Option<usize>,
    #[arg(long)]
    success_chars: Option<usize>,
    #[arg(long)]
    record_id: Option<i64>,
}

impl Overrides {
    fn apply(&self, cfg: &mut Config) {
        if let Some(dir) = &self.snapshot_dir {
            cfg.snapshots.dir = dir.clone();
        }
        if let Some(n) = self.min_chars {
            cfg.thresholds.min_candidate_chars = n;
        }
        if let Some(n) = self.success_chars {
            cfg.thresholds.success_chars = n;
        }
        if let Some(id) = self.record_id {
            cfg.target.record_id = id;
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let cfg_path = cli.config.unwrap_or_else(|| Config::config_path(&root));
    tracing::debug!(root = %root.display(), config = %cfg_path.display(), "resolved paths");
    let mut out = std::io::stdout().lock();

    match cli.cmd {
        Command::Init => {
            let path = Runner::init_root(&root)?;
            writeln!(out, "Config at {}", path.display())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Scan(overrides) => {
            let mut cfg = Config::load_or_default(&cfg_path)?;
            overrides.apply(&mut cfg);
            let runner = Runner::open(root, cfg)?;
            scan(&runner, &mut out)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Inspect { record_id } => {
            let mut cfg = Config::load_or_default(&cfg_path)?;
            Overrides { record_id, ..Default::default() }.apply(&mut cfg);
            let runner = Runner::open(root, cfg)?;
            let store = runner.connect(&runner.credentials()?)?;
            match runner.inspect(&store)? {
                Some(summary) => {
                    report::write_summary(&mut out, "CURRENT DATABASE RECORD", &summary)?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    writeln!(out, "Record {} not found", runner.cfg.record_id())?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Restore { overrides, no_report } => {
            let mut cfg = Config::load_or_default(&cfg_path)?;
            overrides.apply(&mut cfg);
            if no_report {
                cfg.reports.enabled = false;
            }
            restore(root, cfg, &mut out)
        }
    }
}

fn restore(root: PathBuf, cfg: Config, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let runner = Runner::open(root, cfg)?;
    writeln!(out, "=== RESTORING MATERIAL CONTENT FROM SNAPSHOTS ===")?;
    writeln!(out)?;

    let scan = scan(&runner, out)?;
    writeln!(out)?;

    let creds = runner.credentials()?;
    let store = runner.connect(&creds)?;
    writeln!(out, "Connected to database: {}", creds.database)?;
    writeln!(out)?;

    let run_id = RunId::new();
    let restored = runner.restore_with(&scan, &store, &run_id, matrestore_runner::now_unix())?;
    report::write_restore(out, &restored, &runner.cfg.thresholds)?;
    writeln!(out, "Run id: {run_id}")?;

    Ok(if restored.outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Prints the scan. When nothing qualified, the per-file skip lines still go
/// out before the error.
fn scan(runner: &Runner, out: &mut dyn Write) -> anyhow::Result<Scan> {
    match runner.scan() {
        Ok(scan) => {
            report::write_scan(out, &scan)?;
            Ok(scan)
        }
        Err(RecoveryError::NoValidCandidate { scanned }) => {
            report::write_entries(out, scanned.len(), &scanned)?;
            Err(RecoveryError::NoValidCandidate { scanned }.into())
        }
        Err(e) => Err(e.into()),
    }
}

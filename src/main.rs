//! CLI entry point: bisect a store's version history for a key transition.

use clap::{Parser, ValueEnum};
use statebisect::{
    BisectOutcome, DiagnosticSession, Orientation, Result, SessionRequest, SnapshotStore,
    StoreConfig, Version,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "statebisect",
    version,
    about = "Find the version at which a key appeared in (or vanished from) a namespace"
)]
struct Cli {
    /// Root directory of the node; the store is opened at <root>/data.
    root: PathBuf,

    /// Namespace to inspect.
    #[arg(long, short = 'n')]
    namespace: String,

    /// Key as a UTF-8 string.
    #[arg(long, conflicts_with = "key_hex", required_unless_present = "key_hex")]
    key: Option<String>,

    /// Key as hex bytes.
    #[arg(long, required_unless_present = "key")]
    key_hex: Option<String>,

    /// Lower search bound (defaults to the retained floor).
    #[arg(long)]
    low: Option<u64>,

    /// Upper search bound (defaults to the latest committed version).
    #[arg(long)]
    high: Option<u64>,

    /// Whether the key appeared or disappeared over the range.
    #[arg(long, value_enum, default_value_t = Transition::Appeared)]
    transition: Transition,

    /// Hard cap on predicate evaluations.
    #[arg(long)]
    max_probes: Option<u32>,

    /// Emit the full report as JSON instead of progress lines.
    #[arg(long)]
    json: bool,

    /// Verbose logging (also honors RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Transition {
    /// Key is absent early and present late.
    Appeared,
    /// Key is present early and absent late.
    Disappeared,
}

impl From<Transition> for Orientation {
    fn from(t: Transition) -> Self {
        match t {
            Transition::Appeared => Orientation::FalseToTrue,
            Transition::Disappeared => Orientation::TrueToFalse,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "statebisect=debug" } else { "statebisect=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn parse_key(cli: &Cli) -> std::result::Result<Vec<u8>, String> {
    if let Some(hexstr) = &cli.key_hex {
        hex::decode(hexstr).map_err(|e| format!("invalid --key-hex: {}", e))
    } else if let Some(s) = &cli.key {
        Ok(s.clone().into_bytes())
    } else {
        Err("one of --key or --key-hex is required".into())
    }
}

fn run(cli: &Cli, key: Vec<u8>) -> Result<()> {
    let store = SnapshotStore::open(StoreConfig::new(cli.root.join("data")))?;

    let mut request = SessionRequest::new(&cli.namespace, key);
    request.low = cli.low.map(Version);
    request.high = cli.high.map(Version);
    request.orientation = cli.transition.into();
    request.max_probes = cli.max_probes;

    let mut session = DiagnosticSession::new(store);
    let report = session.run_with_observer(&request, |probe| {
        if !cli.json {
            println!(
                "version {}: {}",
                probe.version,
                if probe.result { "present" } else { "absent" }
            );
        }
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report.outcome {
        BisectOutcome::Boundary(boundary) => {
            println!("transition boundary: version {}", boundary);
        }
        BisectOutcome::NoTransition => {
            println!(
                "no transition found in [{}, {}]",
                report.low, report.high
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let key = match parse_key(&cli) {
        Ok(k) => k,
        Err(msg) => {
            eprintln!("error: {}", msg);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, key) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-only

//! Databank verification runner.
//!
//! Exit code is 0 only if every check passes.
//!
//! | Subcommand | What it checks |
//! |------------|----------------|
//! | `compare`  | Two JSON artifacts, computed vs reference |
//! | `run`      | One property battery over registered systems |
//!
//! ```text
//! verify_databank compare Simulations/a/281/apl.json Simulations.2/a/281/apl.json
//! verify_databank run --property apl --expect 86=1 --expect 787=2 --databank-root ~/Databank
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use databank_verify::computation::ScriptComputation;
use databank_verify::config::VerifyConfig;
use databank_verify::logging::init_logging;
use databank_verify::session::{RunReport, Session};
use databank_verify::store::load_json;
use databank_verify::teardown::WipePolicy;
use databank_verify::workflow::DatabankPaths;
use databank_verify::{CompareMode, Comparator, DatabankError, Outcome, Property, SystemId};

#[derive(Parser, Debug)]
#[command(name = "verify_databank", version)]
#[command(about = "Recompute databank properties and compare them against references")]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a computed artifact with its reference
    Compare(CompareArgs),
    /// Run a property computation over systems and check its artifacts
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Freshly computed JSON file
    computed: PathBuf,
    /// Trusted reference JSON file
    reference: PathBuf,
    /// Relative tolerance
    #[arg(long, default_value_t = databank_verify::tolerances::MAX_REL_ERR)]
    tolerance: f64,
    /// Report every divergence instead of the first
    #[arg(long)]
    all: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// apl, order-parameters, maicos or nmr-pca
    #[arg(long)]
    property: Property,
    /// Expected outcome per system, as <id>=<code> (0 skipped, 1 computed, 2 error)
    #[arg(long = "expect", value_parser = parse_expectation, required = true)]
    expectations: Vec<(SystemId, Outcome)>,
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Data root (directory containing Simulations/)
    #[arg(long)]
    data_root: Option<PathBuf>,
    /// Databank checkout holding Scripts/AnalyzeDatabank
    #[arg(long, env = "NMLDB_ROOT")]
    databank_root: PathBuf,
    /// Relative tolerance (overrides the config)
    #[arg(long)]
    tolerance: Option<f64>,
    /// Report every divergence instead of the first
    #[arg(long)]
    all: bool,
    /// Keep computed JSON and trajectories after the run
    #[arg(long)]
    no_wipe: bool,
}

fn parse_expectation(s: &str) -> Result<(SystemId, Outcome), String> {
    let (id, code) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <id>=<code>, got '{s}'"))?;
    let id: SystemId = id
        .trim()
        .parse()
        .map_err(|e| format!("bad system id '{id}': {e}"))?;
    let code: i32 = code
        .trim()
        .parse()
        .map_err(|e| format!("bad outcome code '{code}': {e}"))?;
    let outcome = Outcome::from_code(code).ok_or_else(|| format!("unknown outcome code {code}"))?;
    Ok((id, outcome))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compare(args) => compare_files(&args),
        Commands::Run(args) => run_property(args),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("  ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

fn compare_files(args: &CompareArgs) -> Result<bool, DatabankError> {
    let computed = load_json(&args.computed)?;
    let reference = load_json(&args.reference)?;
    let mode = if args.all {
        CompareMode::CollectAll
    } else {
        CompareMode::FirstDivergence
    };
    let comparator = Comparator::new(args.tolerance).with_mode(mode);
    let divergences = comparator.divergences(&reference, &computed);

    println!(
        "  {} vs {} (tolerance {:e})",
        args.computed.display(),
        args.reference.display(),
        comparator.tolerance()
    );
    if divergences.is_empty() {
        println!("  ✓ equal within tolerance");
        return Ok(true);
    }
    for d in &divergences {
        println!("  ✗ {d}");
    }
    Ok(false)
}

fn run_property(args: RunArgs) -> Result<bool, DatabankError> {
    let mut config = match &args.config {
        Some(path) => VerifyConfig::from_file(path)?,
        None => VerifyConfig::discover(args.data_root.as_deref())?,
    };
    if let (Some(_), Some(root)) = (&args.config, &args.data_root) {
        config.data_root.clone_from(root);
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    config.collect_all |= args.all;

    let computation = ScriptComputation::for_databank(
        args.property,
        &config.python(),
        &DatabankPaths::new(&args.databank_root),
    );
    let policy = if args.no_wipe {
        WipePolicy::keep_all()
    } else {
        WipePolicy::from_env()
    };

    println!("═══════════════════════════════════════════════════════════");
    println!("  Databank verification: {}", args.property);
    println!("  script: {}", computation.script().display());
    println!("═══════════════════════════════════════════════════════════\n");

    let session = Session::open(config)?;
    let report = session.run(&computation, &args.expectations);
    // teardown runs whether or not the checks passed
    let teardown = session.teardown(policy);
    conclude(&mut std::io::stdout(), &report, teardown)
}

/// Write the run summary, then surface any teardown failure.
fn conclude(
    out: &mut impl Write,
    report: &RunReport,
    teardown: Result<Vec<PathBuf>, DatabankError>,
) -> Result<bool, DatabankError> {
    write!(out, "{}", report.format_summary())?;
    let removed = teardown?;
    tracing::info!(files = removed.len(), "teardown complete");
    Ok(report.passed())
}

use std::path::PathBuf;

use relayscope::data::loader;
use relayscope::export;
use relayscope::state::test_run::{TestRun, TestRunFilter};

struct Args {
    files: Vec<PathBuf>,
    out_dir: PathBuf,
    filter: TestRunFilter,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut files = Vec::new();
    let mut out_dir = PathBuf::from(".");
    let mut filter = TestRunFilter::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                out_dir = PathBuf::from(args.next().ok_or("--out requires a directory")?);
            }
            "--pn" => filter.pn = Some(args.next().ok_or("--pn requires a value")?),
            "--plt" => filter.plt = Some(args.next().ok_or("--plt requires a value")?),
            "--application" => {
                filter.application = Some(args.next().ok_or("--application requires a value")?);
            }
            "--help" | "-h" => {
                return Err(usage());
            }
            other if other.starts_with("--") => {
                return Err(format!("Unknown option {other}\n{}", usage()));
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }

    if files.is_empty() {
        return Err(format!("No report files given\n{}", usage()));
    }
    Ok(Args {
        files,
        out_dir,
        filter,
    })
}

fn usage() -> String {
    "Usage: relayscope <report-file>... [--out DIR] [--pn PN] [--plt PLT] [--application APPL]"
        .to_string()
}

fn run(args: Args) -> Result<(), String> {
    std::fs::create_dir_all(&args.out_dir)
        .map_err(|e| format!("Cannot create output directory: {e}"))?;

    let mut runs: Vec<TestRun> = Vec::new();
    for path in &args.files {
        match loader::load_run(path) {
            Ok(run) => runs.push(run),
            Err(e) => tracing::error!("Failed to load {:?}: {e}", path),
        }
    }

    let selected = args.filter.apply(&runs);
    if selected.is_empty() {
        return Err("No runs matched the given filters".to_string());
    }

    for &run in &selected {
        let stem = run.filename.replace(['/', '\\'], "_");
        export::write_chart_feed(run, &args.out_dir.join(format!("{stem}.feed.json")))?;
        export::write_raw_table(run, &args.out_dir.join(format!("{stem}.raw.csv")))?;

        let summary = relayscope::processing::summary::combine(&[run]);
        tracing::info!(
            "{}: {} relays tested, {} passed, yield {}%",
            run.filename,
            summary.relays_tested,
            summary.relays_passed_420,
            summary.yield_pct
        );
    }

    Ok(())
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    match parse_args(std::env::args().skip(1)).and_then(run) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

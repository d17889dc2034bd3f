extern crate clap;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use error_stack::ResultExt;
use log::info;
use rayon::ThreadPoolBuilder;
use serde::Serialize;

use quickrdp::{
    retention_mask, Bound, EdgeOrder, GradientConfig, PeakConfig, Points, Result, RunStats,
    SimplifyError, Strategy,
};

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Single,
    WindowCount,
    PointsPerWindow,
    Curvature,
}

#[derive(Clone, Copy, ValueEnum)]
enum EdgeOrderArg {
    First,
    Second,
}

#[derive(Parser)]
#[command(name = "rdp_simplify", version)]
/// Simplify a polyline stored as CSV (one point per row).
struct Opts {
    /// Path to the input CSV
    input: PathBuf,

    /// Maximum perpendicular deviation
    #[clap(short, long)]
    epsilon: f64,

    /// Window seeding strategy
    #[clap(short, long, value_enum, default_value = "single")]
    strategy: StrategyArg,

    /// Number of initial windows (window-count strategy)
    #[clap(long, default_value = "4")]
    num_windows: usize,

    /// Steps per initial window (points-per-window strategy)
    #[clap(long, default_value = "100")]
    points_per_window: usize,

    /// Minimum spacing between curvature peaks
    #[clap(long)]
    peak_distance: Option<f64>,

    /// Minimum prominence of curvature peaks
    #[clap(long)]
    peak_prominence: Option<f64>,

    /// Boundary difference order for curvature derivatives
    #[clap(long, value_enum, default_value = "first")]
    edge_order: EdgeOrderArg,

    /// Full strategy as JSON; overrides the strategy flags
    #[clap(long)]
    config_json: Option<String>,

    /// Whether the first CSV row is a header
    #[clap(long, default_value = "false")]
    has_header: bool,

    /// Output CSV path (stdout when omitted)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Write JSON with retained indices and run statistics instead of CSV
    #[clap(long, default_value = "false")]
    json: bool,

    /// Number of CPU threads
    #[clap(short, long, default_value = "4")]
    ncpu: usize,
}

#[derive(Serialize)]
struct JsonOutput {
    retained: Vec<usize>,
    points: Vec<Vec<f64>>,
    stats: RunStats,
}

fn strategy_from_opts(opts: &Opts) -> Result<Strategy> {
    if let Some(json) = &opts.config_json {
        return serde_json::from_str(json)
            .change_context(SimplifyError::Parse)
            .attach_printable("--config-json is not a valid strategy");
    }

    Ok(match opts.strategy {
        StrategyArg::Single => Strategy::Single,
        StrategyArg::WindowCount => Strategy::WindowCount { num_windows: opts.num_windows },
        StrategyArg::PointsPerWindow => Strategy::PointsPerWindow { points_per_window: opts.points_per_window },
        StrategyArg::Curvature => Strategy::Curvature {
            gradient: GradientConfig {
                edge_order: match opts.edge_order {
                    EdgeOrderArg::First => EdgeOrder::First,
                    EdgeOrderArg::Second => EdgeOrder::Second,
                },
                ..Default::default()
            },
            peaks: PeakConfig {
                distance: opts.peak_distance,
                prominence: opts.peak_prominence.map(Bound::at_least),
                ..Default::default()
            },
        },
    })
}

fn read_points(path: &Path, has_header: bool) -> Result<Points> {
    let file = File::open(path)
        .change_context(SimplifyError::Io)
        .attach_printable_lazy(|| format!("cannot open {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new().has_headers(has_header).from_reader(file);

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record
            .change_context(SimplifyError::Parse)
            .attach_printable_lazy(|| format!("bad CSV record {}", i))?;
        let row = record
            .iter()
            .map(|field| field.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .change_context(SimplifyError::Parse)
            .attach_printable_lazy(|| format!("non-numeric field in record {}", i))?;
        rows.push(row);
    }
    Points::from_rows(&rows)
}

fn write_csv<W: Write>(out: W, points: &Points) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in points.rows() {
        writer.serialize(row).change_context(SimplifyError::Io)?;
    }
    writer.flush().change_context(SimplifyError::Io)
}

fn run(opts: &Opts) -> Result<()> {
    ThreadPoolBuilder::new()
        .num_threads(opts.ncpu)
        .build_global()
        .change_context(SimplifyError::InvalidParameter)
        .attach_printable("could not size the thread pool")?;

    let strategy = strategy_from_opts(opts)?;
    let points = read_points(&opts.input, opts.has_header)?;
    info!("read {} points of dimension {}", points.len(), points.dim());

    let windows = strategy.seed(&points)?;
    let (mask, stats) = retention_mask(&points, opts.epsilon, &windows)?;
    let simplified = points.select(mask.as_slice())?;
    info!(
        "kept {} of {} points ({} seed windows, {} levels)",
        simplified.len(),
        points.len(),
        windows.len(),
        stats.levels
    );

    let out: Box<dyn Write> = match &opts.output {
        Some(path) => Box::new(
            File::create(path)
                .change_context(SimplifyError::Io)
                .attach_printable_lazy(|| format!("cannot create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    if opts.json {
        let doc = JsonOutput {
            retained: mask.indices(),
            points: simplified.rows().map(|r| r.to_vec()).collect(),
            stats,
        };
        serde_json::to_writer_pretty(out, &doc).change_context(SimplifyError::Io)
    } else {
        write_csv(out, &simplified)
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let opts: Opts = Opts::parse();

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{:?}", report);
            ExitCode::FAILURE
        }
    }
}

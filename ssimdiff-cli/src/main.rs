//! ssimdiff CLI - structural similarity image comparison
//!
//! Compare two images (or two directories of images) and report how similar
//! they are, optionally saving an image with the differences highlighted.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::debug;
use serde::Serialize;
use ssimdiff::batch::{find_pairs, run_batch, PairOutcome, PairingMode};
use ssimdiff::output::{
    batch_diff_name, save_png, write_text, DEFAULT_DIFF_PATH, DEFAULT_OUTPUT_DIR,
};
use ssimdiff::report::{summary, BatchSummary, ReportRecord};
use ssimdiff::{
    compare_files, CompareError, CompareParams, ComparisonResult, DEFAULT_HIGHLIGHT_OPACITY,
    DEFAULT_HIGHLIGHT_THRESHOLD, DEFAULT_WINDOW_SIZE, RgbImage,
};

/// Structural similarity (SSIM) image comparison
///
/// Computes how similar two images are. 100% means structurally identical.
/// Images of different sizes are resized to the smaller width and the
/// smaller height before comparison.
///
/// Rating:
///   100%       - Identical
///   95 - 100%  - Very similar
///   80 - 95%   - Similar
///   50 - 80%   - Different
///   below 50%  - Very different
#[derive(Parser, Debug)]
#[command(name = "ssimdiff")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
#[command(after_help = "EXAMPLES:
    Compare two images:
        ssimdiff before.png after.png

    Save the highlighted difference image:
        ssimdiff --save-diff -o out/diff.png before.png after.png

    CI mode - fail if similarity drops below 98%:
        ssimdiff --min-score 98 before.png after.png

    Compare two directories, pairing files by sorted order:
        ssimdiff batch expected/ actual/

    Output JSON for scripting:
        ssimdiff --format json before.png after.png

EXIT CODES:
    0 - Success (similarity at or above --min-score if specified)
    1 - Similarity below threshold (--min-score)
    2 - Error (file not found, invalid image, etc.)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// First image (the highlight is drawn over this one)
    #[arg(value_name = "IMAGE1", required = true)]
    image1: Option<PathBuf>,

    /// Second image
    #[arg(value_name = "IMAGE2", required = true)]
    image2: Option<PathBuf>,

    /// Save the difference image
    #[arg(long)]
    save_diff: bool,

    /// Where to save the difference image
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_DIFF_PATH)]
    output: PathBuf,

    /// Save both images side by side
    #[arg(long, value_name = "FILE")]
    composite: Option<PathBuf>,

    /// Write a report file (.json, .csv, anything else: key=value lines)
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare corresponding images in two directories
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// First directory
    #[arg(value_name = "DIR1")]
    dir1: PathBuf,

    /// Second directory
    #[arg(value_name = "DIR2")]
    dir2: PathBuf,

    /// Directory for diff_pair_<n>.png files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// How files are matched up
    #[arg(long, value_enum, default_value = "order")]
    pair_by: PairBy,

    /// Do not write difference images
    #[arg(long)]
    no_diffs: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Minimum acceptable similarity in percent (exit code 1 if below)
    #[arg(long, value_name = "PCT")]
    min_score: Option<f64>,

    /// SSIM window the images must hold (odd, at least 3)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_WINDOW_SIZE)]
    window: usize,

    /// Dissimilarity above which a pixel is highlighted (0-1)
    #[arg(long, value_name = "T", default_value_t = DEFAULT_HIGHLIGHT_THRESHOLD)]
    threshold: f32,

    /// Opacity of the red highlight (0-1)
    #[arg(long, value_name = "A", default_value_t = DEFAULT_HIGHLIGHT_OPACITY)]
    opacity: f32,

    /// Control color output
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// Quiet mode - only output the similarity score
    #[arg(short, long)]
    quiet: bool,
}

impl CommonArgs {
    fn params(&self, render_diff: bool, render_composite: bool) -> CompareParams {
        CompareParams::new()
            .with_window_size(self.window)
            .with_highlight_threshold(self.threshold)
            .with_highlight_opacity(self.opacity)
            .with_render_diff(render_diff)
            .with_render_composite(render_composite)
    }

    fn format(&self) -> OutputFormat {
        if self.quiet {
            OutputFormat::Score
        } else {
            self.format
        }
    }

    fn below_threshold(&self, result: &ComparisonResult) -> bool {
        self.min_score
            .is_some_and(|min| result.similarity_percentage() < min)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human readable summary with a rating
    Text,
    /// JSON report
    Json,
    /// CSV header and row(s)
    Csv,
    /// Minimal - just the similarity score (0-1)
    Score,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PairBy {
    /// Position in each sorted listing
    Order,
    /// Same file name in both directories
    Name,
}

impl From<PairBy> for PairingMode {
    fn from(value: PairBy) -> Self {
        match value {
            PairBy::Name => PairingMode::ByName,
            PairBy::Order => PairingMode::ByOrder,
        }
    }
}

#[derive(Serialize)]
struct BatchJsonOutput<'a> {
    results: Vec<ReportRecord>,
    errors: Vec<JsonError>,
    summary: &'a BatchSummary,
}

#[derive(Serialize)]
struct JsonError {
    image_1: String,
    image_2: String,
    stage: &'static str,
    message: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Command::Batch(args)) => {
            setup_colors(args.common.color);
            run_batch_command(args)
        }
        None => {
            setup_colors(cli.common.color);
            run_single(&cli)
        }
    }
}

fn setup_colors(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {
            if !io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

fn print_error(message: &str) {
    eprintln!("{}: {}", "error".red().bold(), message);
}

/// `[stage] message`, naming the inputs when the error itself does not.
fn describe(err: &CompareError, first: &Path, second: &Path) -> String {
    match err {
        CompareError::Load { .. } | CompareError::Dimension { .. } | CompareError::Io { .. } => {
            format!("[{}] {err}", err.stage())
        }
        _ => format!(
            "[{}] {} vs {}: {err}",
            err.stage(),
            first.display(),
            second.display()
        ),
    }
}

fn run_single(cli: &Cli) -> ExitCode {
    let (Some(image1), Some(image2)) = (&cli.image1, &cli.image2) else {
        print_error("two images are required");
        return ExitCode::from(2);
    };
    let common = &cli.common;
    let quiet = common.quiet;

    let params = common.params(cli.save_diff, cli.composite.is_some());
    debug!("{params:?}");
    let result = match compare_files(image1, image2, &params) {
        Ok(result) => result,
        Err(e) => {
            if !quiet {
                print_error(&describe(&e, image1, image2));
            }
            return ExitCode::from(2);
        }
    };

    if let Err(e) = write_artifacts(cli, &result) {
        if !quiet {
            print_error(&e);
        }
        return ExitCode::from(2);
    }

    if let Err(e) = output_single_result(common, &result) {
        if !quiet {
            print_error(&e);
        }
        return ExitCode::from(2);
    }

    if let Some(report) = &cli.report {
        if let Err(e) = write_report(&result, report) {
            if !quiet {
                print_error(&e);
            }
            return ExitCode::from(2);
        }
    }

    if common.below_threshold(&result) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn write_artifacts(cli: &Cli, result: &ComparisonResult) -> Result<(), String> {
    let quiet = cli.common.quiet;
    if cli.save_diff {
        save_artifact(result.difference_image(), &cli.output, "Difference image", quiet)?;
    }
    if let Some(path) = &cli.composite {
        save_artifact(result.side_by_side(), path, "Side-by-side image", quiet)?;
    }
    Ok(())
}

fn save_artifact(
    image: Option<&RgbImage>,
    path: &Path,
    what: &str,
    quiet: bool,
) -> Result<(), String> {
    let Some(image) = image else {
        return Ok(());
    };
    let written = save_png(image, path).map_err(|e| format!("[{}] {e}", e.stage()))?;
    if !quiet {
        eprintln!("{what} saved to: {}", written.display());
    }
    Ok(())
}

fn write_report(result: &ComparisonResult, path: &Path) -> Result<(), String> {
    let record = ReportRecord::from_result(result);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let contents = match extension.as_deref() {
        Some("json") => record
            .to_json()
            .map_err(|e| format!("failed to serialize JSON: {e}"))?,
        Some("csv") => format!("{}\n{}\n", ReportRecord::csv_header(), record.to_csv_row()),
        _ => record.to_key_value(),
    };
    write_text(&contents, path).map_err(|e| format!("[{}] {e}", e.stage()))?;
    Ok(())
}

fn similarity_rating(result: &ComparisonResult) -> (&'static str, colored::Color) {
    use colored::Color;
    let pct = result.similarity_percentage();
    if result.identical() {
        ("identical", Color::Green)
    } else if pct >= 95.0 {
        ("very similar", Color::Green)
    } else if pct >= 80.0 {
        ("similar", Color::Yellow)
    } else if pct >= 50.0 {
        ("different", Color::Red)
    } else {
        ("very different", Color::Red)
    }
}

fn output_single_result(common: &CommonArgs, result: &ComparisonResult) -> Result<(), String> {
    match common.format() {
        OutputFormat::Score => {
            println!("{:.6}", result.similarity_score());
        }
        OutputFormat::Text => {
            let (rating, color) = similarity_rating(result);
            print!("{}", summary(result));
            println!("Rating: {}", rating.color(color).bold());

            if let Some(min) = common.min_score {
                let pct = result.similarity_percentage();
                if pct < min {
                    println!(
                        "{}",
                        format!("Threshold failed: {pct:.2}% < {min}%").red().bold()
                    );
                } else {
                    println!("{}", format!("Threshold passed: {pct:.2}% >= {min}%").green());
                }
            }
        }
        OutputFormat::Json => {
            let json = ReportRecord::from_result(result)
                .to_json()
                .map_err(|e| format!("failed to serialize JSON: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Csv => {
            println!("{}", ReportRecord::csv_header());
            println!("{}", ReportRecord::from_result(result).to_csv_row());
        }
    }
    Ok(())
}

fn run_batch_command(args: &BatchArgs) -> ExitCode {
    let common = &args.common;
    let quiet = common.quiet;

    for dir in [&args.dir1, &args.dir2] {
        if !dir.is_dir() {
            print_error(&format!("[load] '{}' is not a directory", dir.display()));
            return ExitCode::from(2);
        }
    }

    let params = common.params(!args.no_diffs, false);
    if let Err(e) = params.validate() {
        print_error(&format!("[{}] {e}", e.stage()));
        return ExitCode::from(2);
    }

    let pairs = match find_pairs(&args.dir1, &args.dir2, args.pair_by.into()) {
        Ok(pairs) => pairs,
        Err(e) => {
            print_error(&format!("[{}] {e}", e.stage()));
            return ExitCode::from(2);
        }
    };

    if pairs.is_empty() {
        print_error("no matching image files found");
        return ExitCode::from(2);
    }

    let outcomes = run_batch(&pairs, &params);
    let mut had_errors = false;
    let mut threshold_failed = false;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => {
                threshold_failed |= common.below_threshold(result);
                if let Some(diff) = result.difference_image() {
                    let path = args.output_dir.join(batch_diff_name(outcome.index));
                    match save_png(diff, &path) {
                        Ok(written) if !quiet => {
                            eprintln!("Saved diff for pair {}: {}", outcome.index, written.display());
                        }
                        Ok(_) => {}
                        Err(e) => {
                            had_errors = true;
                            print_error(&format!("[{}] {e}", e.stage()));
                        }
                    }
                }
            }
            Err(e) => {
                had_errors = true;
                if !quiet {
                    print_error(&describe(e, &outcome.pair.first, &outcome.pair.second));
                }
            }
        }
    }

    if let Err(e) = output_batch_results(common, &outcomes) {
        print_error(&e);
        return ExitCode::from(2);
    }

    if had_errors {
        ExitCode::from(2)
    } else if threshold_failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("?")
}

fn output_batch_results(common: &CommonArgs, outcomes: &[PairOutcome]) -> Result<(), String> {
    let stats = BatchSummary::from_outcomes(outcomes);

    match common.format() {
        OutputFormat::Json => {
            let mut results = Vec::new();
            let mut errors = Vec::new();
            for outcome in outcomes {
                match &outcome.result {
                    Ok(result) => results.push(ReportRecord::from_result(result)),
                    Err(e) => errors.push(JsonError {
                        image_1: outcome.pair.first.display().to_string(),
                        image_2: outcome.pair.second.display().to_string(),
                        stage: e.stage(),
                        message: e.to_string(),
                    }),
                }
            }
            let output = BatchJsonOutput {
                results,
                errors,
                summary: &stats,
            };
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| format!("failed to serialize JSON: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Csv => {
            println!("{}", ReportRecord::csv_header());
            for outcome in outcomes {
                if let Ok(result) = &outcome.result {
                    println!("{}", ReportRecord::from_result(result).to_csv_row());
                }
            }
        }
        OutputFormat::Score => {
            for outcome in outcomes {
                if let Ok(result) = &outcome.result {
                    println!("{:.6}", result.similarity_score());
                }
            }
        }
        OutputFormat::Text => {
            let name_width = outcomes
                .iter()
                .map(|o| file_name(&o.pair.first).len())
                .max()
                .unwrap_or(20);

            for outcome in outcomes {
                let name = file_name(&outcome.pair.first);
                match &outcome.result {
                    Ok(result) => {
                        let (rating, color) = similarity_rating(result);
                        let score_str = format!("{:.2}%", result.similarity_percentage());
                        let status = if common.min_score.is_some() {
                            if common.below_threshold(result) {
                                "FAIL".red().bold()
                            } else {
                                "PASS".green().bold()
                            }
                        } else {
                            rating.color(color).bold()
                        };
                        println!(
                            "{:>3}  {:width$}  {:>8}  {}",
                            outcome.index,
                            name,
                            score_str.color(color),
                            status,
                            width = name_width
                        );
                    }
                    Err(e) => {
                        println!(
                            "{:>3}  {:width$}  {:>8}  {}",
                            outcome.index,
                            name,
                            "-".dimmed(),
                            format!("ERROR [{}]", e.stage()).red(),
                            width = name_width
                        );
                    }
                }
            }

            println!();
            print!("{}", stats.to_text());
        }
    }

    let _ = io::stdout().flush();
    Ok(())
}

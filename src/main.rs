pub mod cli;
pub mod csv_handler;
pub mod error;
pub mod report;
pub mod taxon;
pub mod transform;

use clap::Parser;
use cli::{Cli, OutputFormat};
use csv_handler::{read_table, write_table, write_table_json};
use error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use report::{top_unmatched, write_unmatched_report};
use std::path::PathBuf;
use std::time::Instant;
use taxon::index::TaxonomyIndex;
use taxon::model::load_taxonomy;
use taxon::normalizer::Normalizer;
use taxon::resolver::{MatchStats, Resolver};
use transform::{RowTransformer, UnmatchedCandidate, prepare_columns, transform_table};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if let Err(e) = env_logger::Builder::from_default_env()
        .format_target(false)
        .format_timestamp_secs()
        .filter_level(level)
        .try_init()
    {
        eprintln!("Failed to initialize logger: {}", e);
    }

    info!("Starting coral taxonomy cleaner...");
    info!("Input file: {:?}", cli.input_file);
    info!("Taxonomy file: {:?}", cli.taxonomy_file);
    info!("Output file: {:?} ({:?})", cli.output_file, cli.format);

    let start_time = Instant::now();
    let summary = match run(&cli, true) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Cleaning failed: {}", e);
            return Err(e);
        }
    };
    let duration = start_time.elapsed();
    info!("Total execution time: {:.2?}", duration);

    print_summary(&summary);
    println!("Execution time: {:.2?}", duration);

    Ok(())
}

/// What a cleaning run did, for the closing report.
#[derive(Debug)]
struct RunSummary {
    rows: usize,
    stats: MatchStats,
    unmatched: Vec<UnmatchedCandidate>,
    output_file: PathBuf,
    unmatched_report: Option<PathBuf>,
}

fn run(cli: &Cli, show_progress: bool) -> Result<RunSummary> {
    // 1. Classification lookup
    info!("Loading taxonomy lookup...");
    let records = load_taxonomy(&cli.taxonomy_file)?;
    let index = TaxonomyIndex::new(&records);
    info!(
        "Indexed {} families, {} genera, {} species.",
        index.family_count(),
        index.genus_count(),
        index.species_count()
    );
    if index.family_count() == 0 {
        warn!("Taxonomy lookup is empty; every candidate will be dropped.");
    }

    // 2. Survey table
    info!("Reading survey table...");
    let mut table = read_table(&cli.input_file)?;
    info!("Read {} rows.", table.rows.len());
    if cli.sort_by_id {
        info!("Sorting rows by id...");
        table.sort_by_id()?;
    }

    // 3. Clean rows
    let columns = cli.columns();
    let layout = prepare_columns(&mut table, &columns)?;
    let normalizer = Normalizer::new(cli.noise_mode);
    let resolver = Resolver::new(&index, cli.match_mode);
    let transformer = RowTransformer::new(&normalizer, &resolver, &columns, layout);

    let pb = if show_progress {
        ProgressBar::new(table.rows.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("Cleaning rows");
    let outcome = transform_table(&mut table, &transformer, |_| pb.inc(1))?;
    pb.finish_with_message("Row cleaning complete.");
    info!(
        "Resolved {} candidates ({} exact, {} typo, {} contained), dropped {}.",
        outcome.stats.candidates() - outcome.stats.unmatched,
        outcome.stats.exact,
        outcome.stats.typo,
        outcome.stats.contained,
        outcome.stats.unmatched
    );

    // 4. Output
    info!("Writing cleaned table to {:?}...", cli.output_file);
    match cli.format {
        OutputFormat::Csv => write_table(&cli.output_file, &table)?,
        OutputFormat::Json => write_table_json(&cli.output_file, &table)?,
    }
    if let Some(report_path) = &cli.unmatched_report {
        info!("Writing unmatched candidates to {:?}...", report_path);
        write_unmatched_report(&outcome.unmatched, report_path)?;
    }

    Ok(RunSummary {
        rows: table.rows.len(),
        stats: outcome.stats,
        unmatched: outcome.unmatched,
        output_file: cli.output_file.clone(),
        unmatched_report: cli.unmatched_report.clone(),
    })
}

fn print_summary(summary: &RunSummary) {
    println!("\n--- Summary Report ---");
    println!("Rows cleaned: {}", summary.rows);
    println!("Candidates examined: {}", summary.stats.candidates());
    println!("  exact matches: {}", summary.stats.exact);
    println!("  typo corrections: {}", summary.stats.typo);
    println!("  contained-name matches: {}", summary.stats.contained);
    println!("  dropped (no match): {}", summary.stats.unmatched);

    let top = top_unmatched(&summary.unmatched, 10);
    if !top.is_empty() {
        println!("\n--- Most frequent unmatched candidates ---");
        for (candidate, count) in top {
            println!("- {} ({})", candidate, count);
        }
    }

    println!("\nCleaned table saved to: {}", summary.output_file.display());
    match &summary.unmatched_report {
        Some(path) => println!("Unmatched candidates saved to: {}", path.display()),
        None if summary.stats.unmatched > 0 => println!(
            "Rerun with --unmatched-report FILE to list dropped candidates for typo-list curation."
        ),
        None => {}
    }
}

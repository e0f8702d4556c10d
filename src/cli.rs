use crate::csv_handler::ColumnConfig;
use crate::taxon::index::MatchMode;
use crate::taxon::normalizer::NoiseMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the (sorted) survey CSV file.
    #[arg(short, long, value_name = "FILE", default_value = "./coral_bleaching-sorted.csv")]
    pub input_file: PathBuf,

    /// Path to the JSON classification lookup.
    #[arg(short, long, value_name = "FILE", default_value = "./classification.json")]
    pub taxonomy_file: PathBuf,

    /// Path to the cleaned output file.
    #[arg(short, long, value_name = "FILE", default_value = "./coral_bleaching-cleaned.csv")]
    pub output_file: PathBuf,

    /// Output format of the cleaned table.
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Which noise tokens are stripped from each cell.
    #[arg(long, value_enum, default_value = "all")]
    pub noise_mode: NoiseMode,

    /// How genus and species names may be found inside a candidate.
    #[arg(long, value_enum, default_value = "substring")]
    pub match_mode: MatchMode,

    #[arg(long, value_name = "NAME", default_value = "CORAL_FAMILY")]
    pub column_family: String,

    #[arg(long, value_name = "NAME", default_value = "CORAL_SPECIES")]
    pub column_species: String,

    /// Genus column; inserted before the species column when absent.
    #[arg(long, value_name = "NAME", default_value = "CORAL_GENUS")]
    pub column_genus: String,

    /// Sort rows by the integer id in the first column before cleaning.
    #[arg(long)]
    pub sort_by_id: bool,

    /// Write every dropped candidate to this TSV file.
    #[arg(long, value_name = "FILE")]
    pub unmatched_report: Option<PathBuf>,

    /// Log every match and dropped candidate.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn columns(&self) -> ColumnConfig {
        ColumnConfig {
            family: self.column_family.clone(),
            species: self.column_species.clone(),
            genus: self.column_genus.clone(),
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values with a header row.
    #[value(name = "csv")]
    Csv,
    /// A JSON array of objects keyed by column name.
    #[value(name = "json")]
    Json,
}

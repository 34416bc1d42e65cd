//! `formfile`: extract and fill PDF forms, and file documents into a GTD tree.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use formfile::{
    extract_fields, fill_pdf, Category, ExtractionResult, FilerConfig, FillStats, FilingRequest,
    FilingResult, GtdFiler, GtdStatus, PdfField, Result,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "formfile", version, about = "Extract, fill and file PDF forms")]
struct Cli {
    /// Configuration file (default: <config dir>/formfile/config.toml)
    #[arg(long, global = true, env = "FORMFILE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the form fields of a PDF
    Extract {
        pdf: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write JSON to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fill a PDF from a JSON profile
    Fill {
        pdf: PathBuf,

        /// Flat JSON object of field name to value
        #[arg(short, long)]
        profile: PathBuf,

        /// Output file (default: <stem>_filled.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File the filled PDF to these backends afterwards
        #[arg(long = "file-to", num_args = 1..)]
        file_to: Vec<String>,

        #[command(flatten)]
        filing: FilingArgs,
    },

    /// File a PDF into the GTD tree
    File {
        pdf: PathBuf,

        /// Backends to file to (default: from configuration)
        #[arg(long = "to", num_args = 1..)]
        to: Vec<String>,

        #[command(flatten)]
        filing: FilingArgs,

        /// Follow-up date (YYYY-MM-DD)
        #[arg(long = "follow-up")]
        follow_up: Option<NaiveDate>,
    },
}

#[derive(Args, Debug)]
struct FilingArgs {
    /// Category (detected when omitted)
    #[arg(short, long)]
    category: Option<Category>,

    /// GTD status (default: from configuration, else reference)
    #[arg(short, long)]
    status: Option<GtdStatus>,

    /// Issuer of the document, e.g. "Blue Cross"
    #[arg(long)]
    source: Option<String>,

    #[arg(long)]
    subcategory: Option<String>,

    /// Extra tag; repeatable
    #[arg(short, long = "tag")]
    tags: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("\x1b[31mError:\x1b[0m {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "formfile=debug" } else { "formfile=warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Only filing reads the configuration.
    let config_path = cli.config;
    let load_config = || FilerConfig::load(config_path.as_deref());

    match cli.command {
        Command::Extract { pdf, format, output } => {
            let result = extract_fields(&pdf)?;
            match (format, output) {
                (_, Some(path)) => {
                    std::fs::write(&path, to_json(&result)?)?;
                    println!("Wrote {} fields to {}", result.total_fields, path.display());
                }
                (OutputFormat::Json, None) => println!("{}", to_json(&result)?),
                (OutputFormat::Table, None) => print_fields(&result),
            }
        }

        Command::Fill {
            pdf,
            profile,
            output,
            file_to,
            filing,
        } => {
            let result = fill_pdf(&pdf, &profile, output.as_deref())?;
            println!(
                "Filled {}/{} fields ({} skipped) -> {}",
                result.fields_filled,
                result.fields_total,
                result.fields_skipped,
                result.output_path.display()
            );

            if !file_to.is_empty() {
                let config = load_config()?;
                let fields = fields_best_effort(&result.output_path);
                let request = filing.into_request(
                    &config,
                    result.output_path.clone(),
                    fields,
                    Some(FillStats::from(&result)),
                    None,
                );
                let filed = filer(&config, &file_to)?.file(&request)?;
                print_filing(&filed);
            }
        }

        Command::File {
            pdf,
            to,
            filing,
            follow_up,
        } => {
            let config = load_config()?;
            let fields = fields_best_effort(&pdf);
            let request = filing.into_request(&config, pdf, fields, None, follow_up);
            let filed = filer(&config, &to)?.file(&request)?;
            print_filing(&filed);
        }
    }
    Ok(())
}

impl FilingArgs {
    fn into_request(
        self,
        config: &FilerConfig,
        document: PathBuf,
        fields: Vec<PdfField>,
        fill_stats: Option<FillStats>,
        follow_up_date: Option<NaiveDate>,
    ) -> FilingRequest {
        FilingRequest {
            document,
            category: self.category,
            status: self.status.unwrap_or_else(|| config.default_status()),
            source: self.source,
            subcategory: self.subcategory,
            fields,
            fill_stats,
            follow_up_date,
            tags: self.tags,
        }
    }
}

fn filer(config: &FilerConfig, names: &[String]) -> Result<GtdFiler> {
    let backends = config.build_backends(names)?;
    Ok(GtdFiler::new(backends).with_filed_by(config.filed_by.clone()))
}

/// Fields for categorization. A document that cannot be parsed is still
/// filed, just without field hints.
fn fields_best_effort(pdf: &Path) -> Vec<PdfField> {
    match extract_fields(pdf) {
        Ok(result) => result.fields,
        Err(e) => {
            tracing::warn!("Could not read form fields of {}: {e}", pdf.display());
            Vec::new()
        }
    }
}

fn to_json(result: &ExtractionResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result).map_err(std::io::Error::from)?)
}

fn print_fields(result: &ExtractionResult) {
    println!("{}: {} field(s)", result.filename, result.total_fields);
    if result.fields.is_empty() {
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let header: Vec<Cell> = ["Name", "Type", "Value", "Page", "Required"]
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header);
    for field in &result.fields {
        let value = match (&field.value, field.options.is_empty()) {
            (Some(v), _) => v.clone(),
            (None, false) => format!("[{}]", field.options.join(", ")),
            (None, true) => String::new(),
        };
        table.add_row(vec![
            Cell::new(&field.name),
            Cell::new(field.field_type),
            Cell::new(value),
            Cell::new(field.page),
            Cell::new(if field.required { "yes" } else { "" }),
        ]);
    }
    println!("{table}");
}

fn print_filing(result: &FilingResult) {
    println!("Filed as {} / {}", result.category, result.status);
    println!("  path:     {}", result.path);
    for destination in &result.destinations {
        println!("  stored:   {destination}");
    }
    if result.metadata_stored {
        println!("  metadata: {}", result.metadata_path);
    } else {
        println!("  metadata: {} (not stored)", result.metadata_path);
    }
}

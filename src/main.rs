use activity_analytics::{summarize, AggregateTable, Dimension, Field, ReportGenerator};
use activity_core::config::ReportVariant;
use activity_core::{ordinal_value_map, AppConfig, Dataset};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "activity-report",
    about = "Aggregate a personal activity log into reports",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/activity-report/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the activity CSV path
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a report
    Report {
        /// Only this person's section
        #[arg(short, long)]
        person: Option<String>,
        /// Panel selection: overview, person-focus, compact, full
        #[arg(long)]
        variant: Option<ReportVariant>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        /// Fail on the first panel that cannot be built
        #[arg(long)]
        strict: bool,
    },

    /// List persons in the log
    Persons,

    /// Print a grouped summary table
    Aggregate {
        /// Comma-separated dimensions: person, date, time, category, mood
        #[arg(long, value_delimiter = ',', default_value = "category")]
        by: Vec<Dimension>,
        #[arg(long, value_enum, default_value_t = FieldArg::Duration)]
        field: FieldArg,
        #[arg(short, long)]
        person: Option<String>,
        #[arg(long, value_enum, default_value_t = TableFormat::Table)]
        format: TableFormat,
    },

    /// Start the HTTP server
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum TableFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    Duration,
    Value,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "activity_report=info,warn".into()),
        )
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config.
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(data) = &cli.data {
        config.data.path = data.clone();
    }
    tracing::debug!(
        "Data file: {}, value scale: {:?}",
        config.data.path.display(),
        config.vocabulary.value_scale
    );

    match cli.command {
        Commands::Report {
            person,
            variant,
            format,
            strict,
        } => {
            let dataset = load_dataset(&config)?;
            let mut generator = ReportGenerator::new(&config)?;
            if let Some(variant) = variant {
                generator = generator.with_variant(variant);
            }

            let report = match person {
                Some(name) => generator
                    .person_report(&dataset, &name)
                    .with_context(|| format!("No records for person {:?}", name))?,
                None if strict => generator.try_report(&dataset)?,
                None => generator.report(&dataset),
            };

            match format {
                OutputFormat::Markdown => print!("{}", report.to_markdown()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Commands::Persons => {
            let dataset = load_dataset(&config)?;
            for person in dataset.persons() {
                println!("{}", person);
            }
        }
        Commands::Aggregate {
            by,
            field,
            person,
            format,
        } => {
            let dataset = load_dataset(&config)?;
            let scale = ordinal_value_map(&config.vocabulary)?;
            let mut records = dataset.view();
            if let Some(name) = &person {
                records = records.for_person(name);
            }
            let field = match field {
                FieldArg::Duration => Field::DurationMinutes,
                FieldArg::Value => Field::ValueToPerson(&scale),
            };

            let table = summarize(&records, &by, field, config.vocabulary.tie_break)?;
            match format {
                TableFormat::Table => print_table(&table),
                TableFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
            }
        }
        Commands::Serve { host, port } => {
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            let dataset = load_dataset(&config)?;
            activity_server::serve(config, dataset).await?;
        }
        Commands::Config { action } => {
            handle_config_command(action, &config)?;
        }
    }

    Ok(())
}

fn load_dataset(config: &AppConfig) -> Result<Dataset> {
    Dataset::load(&config.data.path)
        .with_context(|| format!("Failed to load {}", config.data.path.display()))
}

fn print_table(table: &AggregateTable) {
    let dims: Vec<String> = table.dimensions.iter().map(|d| format!("{:?}", d)).collect();
    println!(
        "{:<36} {:>6} {:>12} {:>10}  Mood",
        dims.join(" / "),
        "Count",
        "Sum",
        "Mean"
    );
    for row in &table.rows {
        println!(
            "{:<36} {:>6} {:>12.2} {:>10.2}  {} ({})",
            row.key.to_string(),
            row.summary.count,
            row.summary.sum,
            row.summary.mean,
            row.summary.mode,
            row.summary.mode_count
        );
    }
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AppConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AppConfig::default_path().display());
        }
    }
    Ok(())
}

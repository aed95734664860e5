use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use fitness_trend::export::{self, ExportFormat};
use fitness_trend::logging::init_logging;
use fitness_trend::table::{self, SortDirection};
use fitness_trend::{
    Activity, AppConfig, AthleteSettings, DateRange, DatedAthleteSettings, DatedSettings,
    DayFitnessTrend, FitnessTrend, FitnessTrendAssembler, FitnessTrendColumn, TrainingZone,
    TrendError,
};

/// Fitness Trend - training load trend CLI
///
/// Computes fitness (CTL), fatigue (ATL), form (TSB) and a smoothed VO2max
/// from logged activities, with a forecast over the coming rest days.
#[derive(Parser)]
#[command(name = "fitness-trend")]
#[command(version)]
#[command(about = "Training load trend CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by the trend-computing commands
#[derive(clap::Args)]
struct TrendInput {
    /// Activities JSON file
    #[arg(short, long)]
    activities: PathBuf,

    /// Athlete settings JSON file (single settings object or dated history)
    #[arg(short = 'A', long)]
    athlete: Option<PathBuf>,

    /// Day the history runs up to (YYYY-MM-DD, default: today)
    #[arg(long)]
    today: Option<String>,

    /// Display period start (YYYY-MM-DD)
    #[arg(short, long)]
    from: Option<String>,

    /// Display period end (YYYY-MM-DD)
    #[arg(short, long)]
    to: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and display the fitness trend
    Trend {
        #[command(flatten)]
        input: TrendInput,

        /// Display format (table, summary, json)
        #[arg(long, default_value = "table")]
        format: String,

        /// Column id to sort the table by
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort direction (asc, desc)
        #[arg(long, default_value = "desc")]
        order: String,

        /// Only show days matching this text
        #[arg(long)]
        search: Option<String>,

        /// Number of rows to show
        #[arg(short, long, default_value = "30")]
        limit: usize,
    },

    /// Export the fitness trend
    Export {
        #[command(flatten)]
        input: TrendInput,

        /// Output file path (default: generated in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (csv, json)
        #[arg(long)]
        format: Option<String>,

        /// Include forecast days
        #[arg(long)]
        include_preview: bool,
    },

    /// Show or create the configuration file
    Config {
        /// Write the current configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;

    match cli.command {
        Commands::Trend {
            input,
            format,
            sort,
            order,
            search,
            limit,
        } => {
            let (trend, range, today) = compute_trend(&config, &input)?;
            let trend = trend.filtered(&range);

            match format.to_lowercase().as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&trend)?),
                "summary" => print_summary(&trend, today),
                "table" => {
                    let columns = table::visible_columns(&config.trend);
                    let mut rows = table::table_rows(trend.days());
                    if let Some(query) = &search {
                        rows = table::filter_rows(rows, &columns, query);
                    }
                    if let Some(column_id) = &sort {
                        let direction: SortDirection =
                            order.parse().map_err(anyhow::Error::msg)?;
                        table::sort_rows(&mut rows, column_id, direction)
                            .map_err(|err| anyhow::anyhow!(err.user_message()))?;
                    }
                    rows.truncate(limit);

                    println!("{}", table::render_table(&rows, &columns));
                    print_summary(&trend, today);
                }
                other => anyhow::bail!("Unsupported display format: {}", other),
            }
        }

        Commands::Export {
            input,
            output,
            format,
            include_preview,
        } => {
            let (trend, range, _) = compute_trend(&config, &input)?;
            let trend = trend.filtered(&range);
            let days = if include_preview {
                trend.days()
            } else {
                trend.active_days()
            };

            let format = match format {
                Some(format) => ExportFormat::from_str(&format)?,
                None => config.export.format,
            };
            let output = output.unwrap_or_else(|| {
                export::default_export_path(&config.export.directory, days, format)
            });

            let columns = table::visible_columns(&config.trend);
            run_export(days, &columns, format, config.export.precision, &output)?;
            println!(
                "{}",
                format!("✓ Exported {} days to {}", days.len(), output.display()).green()
            );
        }

        Commands::Config { init } => {
            let mut config = config;
            if init {
                let path = match &cli.config {
                    Some(path) => {
                        config.save_to_file(path)?;
                        path.clone()
                    }
                    None => config.save_default()?,
                };
                println!("{}", format!("✓ Configuration written to {}", path.display()).green());
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

fn parse_optional_date(value: Option<&String>) -> Result<Option<NaiveDate>> {
    value.map(|value| parse_date(value)).transpose()
}

fn compute_trend(
    config: &AppConfig,
    input: &TrendInput,
) -> Result<(FitnessTrend, DateRange, NaiveDate)> {
    let today = match &input.today {
        Some(today) => parse_date(today)?,
        None => chrono::Local::now().date_naive(),
    };
    let range = DateRange::new(
        parse_optional_date(input.from.as_ref())?,
        parse_optional_date(input.to.as_ref())?,
    );

    let activities = Activity::load_all_from_file(&input.activities)?;
    let athlete = match &input.athlete {
        Some(path) => DatedAthleteSettings::load_from_file(path)?,
        None => DatedAthleteSettings::new(vec![DatedSettings {
            since: None,
            settings: AthleteSettings::default(),
        }])?,
    };
    info!(activities = activities.len(), "Loaded activities");

    let assembler = FitnessTrendAssembler::new(config.trend.clone())?;
    let trend = assembler
        .assemble(&activities, &athlete, today)
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;

    Ok((trend, range, today))
}

fn run_export(
    days: &[DayFitnessTrend],
    columns: &[FitnessTrendColumn],
    format: ExportFormat,
    precision: u32,
    output: &Path,
) -> Result<()> {
    export::export_trend(days, columns, format, precision, output).map_err(|err| {
        let err = TrendError::from(err);
        error!(error = %err, path = %output.display(), "Export failed");
        anyhow::anyhow!(err.user_message())
    })
}

fn zone_colored(zone: TrainingZone) -> ColoredString {
    match zone {
        TrainingZone::Overload => zone.name().red().bold(),
        TrainingZone::Optimal => zone.name().green().bold(),
        TrainingZone::Neutral => zone.name().blue(),
        TrainingZone::Freshness => zone.name().cyan(),
        TrainingZone::Transition => zone.name().yellow(),
    }
}

fn print_summary(trend: &FitnessTrend, today: NaiveDate) {
    let Some(latest) = trend.latest() else {
        println!("{}", "No training data in the selected period".yellow());
        return;
    };

    let delta = |delta: Option<String>| delta.map(|d| format!(" ({})", d)).unwrap_or_default();

    println!("{}", latest.print_date(today).bold());
    println!(
        "  Fitness: {}{}",
        latest.print_fitness(),
        delta(latest.print_delta_fitness()).dimmed()
    );
    println!(
        "  Fatigue: {}{}",
        latest.print_fatigue(),
        delta(latest.print_delta_fatigue()).dimmed()
    );
    println!(
        "  Form:    {}{}",
        latest.print_form(),
        delta(latest.print_delta_form()).dimmed()
    );
    println!(
        "  Vo2 Max: {}{}",
        latest.print_vo2max(),
        delta(latest.print_delta_vo2max()).dimmed()
    );
    println!("  Zone:    {}", zone_colored(latest.training_zone));

    if let Some(last_preview) = trend.preview_days().last() {
        println!(
            "  Resting until {}: fitness {}, form {} ({})",
            last_preview.print_short_date(),
            last_preview.print_fitness(),
            last_preview.print_form(),
            zone_colored(last_preview.training_zone)
        );
    }
}

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use health_whatif::calculator::{compute_effective, sweep, CalculationResult};
use health_whatif::config::{Config, ConfigOverrides};
use health_whatif::dataset::{Dataset, DatasetDraft, DatasetStore};
use health_whatif::ingest::{Ingest, IngestOutcome};
use health_whatif::output::csv::{calculations_to_csv, datasets_to_csv, recommendations_to_csv};
use health_whatif::output::render_json;
use health_whatif::output::table::{
    render_datasets_table, render_ingest_table, render_recommendations_table, render_report,
    render_scenarios_table, render_sweep_table,
};
use health_whatif::recommendations::{rank_raw, RankedRecommendation};
use health_whatif::report::{build_report, ImpactReport};
use health_whatif::scenario::{check_percent, resolve_params, resolve_params_raw, ScenarioId};
use health_whatif::server::run_server;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "health-whatif",
    about = "What-if impact calculator for NZ healthcare metrics"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    db: Option<String>,
    #[arg(long = "upload-dir")]
    upload_dir: Option<String>,
    #[arg(long = "backend-url")]
    backend_url: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List scenarios with their effective parameters
    Scenarios {
        #[arg(long)]
        no_datasets: bool,
    },
    /// Project savings for one improvement percentage
    Calculate {
        #[arg(short, long)]
        scenario: String,
        #[arg(short, long, value_parser = parse_percent)]
        percent: f64,
        #[arg(long)]
        no_datasets: bool,
    },
    /// Project savings across the whole slider range
    Sweep {
        #[arg(short, long)]
        scenario: String,
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(1..=100))]
        step: u8,
        #[arg(long)]
        no_datasets: bool,
    },
    /// Rank the recommendation catalog for a scenario
    Recommend {
        #[arg(short, long)]
        scenario: String,
    },
    Datasets {
        #[command(subcommand)]
        action: DatasetCommand,
    },
    /// Upload a file and preview the extracted fields without saving
    Upload { file: PathBuf },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DatasetCommand {
    List {
        #[arg(long)]
        scenario: Option<String>,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        scenario: String,
        #[arg(long)]
        baseline: Option<String>,
        #[arg(long = "cost-per-unit")]
        cost_per_unit: Option<String>,
        #[arg(long = "total-volume")]
        total_volume: Option<String>,
        #[arg(long = "hours-per-unit")]
        clinician_hours_per_unit: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn parse_percent(raw: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|e| format!("{e}"))?;
    check_percent(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        db_path: cli.db.clone(),
        upload_dir: cli.upload_dir.clone(),
        backend_url: cli.backend_url.clone(),
    });

    match &cli.command {
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            run_server(config, addr).await?;
        }
        Commands::Scenarios { no_datasets } => {
            let datasets = load_datasets(&config, *no_datasets)?;
            let rows = ScenarioId::ALL
                .iter()
                .map(|id| (id.profile(), resolve_params(*id, &datasets)))
                .collect::<Vec<_>>();
            match cli.output {
                OutputFormat::Table => println!("{}", render_scenarios_table(&rows)),
                OutputFormat::Json => {
                    let effective = rows.iter().map(|(_, e)| e).collect::<Vec<_>>();
                    println!("{}", render_json(&effective)?);
                }
                OutputFormat::Csv => {
                    warn!("CSV output for scenarios not implemented, using JSON");
                    let effective = rows.iter().map(|(_, e)| e).collect::<Vec<_>>();
                    println!("{}", render_json(&effective)?);
                }
            }
        }
        Commands::Calculate {
            scenario,
            percent,
            no_datasets,
        } => {
            let datasets = load_datasets(&config, *no_datasets)?;
            let effective = resolve_params_raw(scenario, &datasets);
            match compute_effective(&effective, *percent) {
                Some(result) => {
                    let report = build_report(result, &config.report);
                    print_report(&report, cli.output)?;
                }
                None => println!("No calculation: improvement is 0%."),
            }
        }
        Commands::Sweep {
            scenario,
            step,
            no_datasets,
        } => {
            let datasets = load_datasets(&config, *no_datasets)?;
            let effective = resolve_params_raw(scenario, &datasets);
            let rows = sweep(&effective, *step);
            print_sweep(&rows, effective.scenario, cli.output)?;
        }
        Commands::Recommend { scenario } => {
            let ranked = rank_raw(scenario);
            if ranked.is_empty() {
                warn!("no recommendations for scenario {scenario:?}");
            }
            print_recommendations(&ranked, cli.output)?;
        }
        Commands::Datasets { action } => {
            handle_dataset_command(action, &config, cli.output).await?;
        }
        Commands::Upload { file } => {
            let ingest = Ingest::from_config(&config)?;
            let outcome = ingest.ingest_file(file, DatasetDraft::default()).await?;
            print_ingest(&outcome, cli.output)?;
        }
    }

    Ok(())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn load_datasets(config: &Config, skip: bool) -> Result<Vec<Dataset>> {
    if skip {
        return Ok(Vec::new());
    }
    let store = DatasetStore::open(&config.resolved_db_path())?;
    store.list()
}

async fn handle_dataset_command(
    action: &DatasetCommand,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let store = DatasetStore::open(&config.resolved_db_path())?;
    match action {
        DatasetCommand::List { scenario } => {
            let datasets = match scenario {
                Some(raw) => store.list_for(raw.parse::<ScenarioId>()?)?,
                None => store.list()?,
            };
            print_datasets(&datasets, format)?;
        }
        DatasetCommand::Add {
            name,
            scenario,
            baseline,
            cost_per_unit,
            total_volume,
            clinician_hours_per_unit,
            file,
        } => {
            let mut draft = DatasetDraft {
                name: name.clone(),
                scenario: scenario.clone(),
                ..DatasetDraft::default()
            };
            if let Some(path) = file {
                let ingest = Ingest::from_config(config)?;
                let outcome = ingest.ingest_file(path, draft).await?;
                if outcome.extracted.is_some() {
                    info!("data automatically extracted from {}", outcome.uploaded.name);
                }
                draft = outcome.draft;
            }
            // Explicit flags take precedence over extracted values.
            for (slot, value) in [
                (&mut draft.baseline_value, baseline),
                (&mut draft.cost_per_unit, cost_per_unit),
                (&mut draft.total_volume, total_volume),
                (&mut draft.clinician_hours_per_unit, clinician_hours_per_unit),
            ] {
                if let Some(value) = value {
                    *slot = value.clone();
                }
            }
            let new_dataset = draft.into_new_dataset()?;
            let created = store
                .create(&new_dataset)
                .map_err(|e| anyhow!("failed to save dataset, please try again: {e}"))?;
            print_datasets(std::slice::from_ref(&created), format)?;
        }
    }
    Ok(())
}

fn print_report(report: &ImpactReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_report(report)),
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => println!(
            "{}",
            calculations_to_csv(std::slice::from_ref(&report.result))?
        ),
    }
    Ok(())
}

fn print_sweep(rows: &[CalculationResult], scenario: ScenarioId, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!(
            "{}",
            render_sweep_table(rows, scenario.profile().unit_label)
        ),
        OutputFormat::Json => println!("{}", render_json(rows)?),
        OutputFormat::Csv => println!("{}", calculations_to_csv(rows)?),
    }
    Ok(())
}

fn print_recommendations(items: &[RankedRecommendation], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_recommendations_table(items)),
        OutputFormat::Json => println!("{}", render_json(items)?),
        OutputFormat::Csv => println!("{}", recommendations_to_csv(items)?),
    }
    Ok(())
}

fn print_datasets(datasets: &[Dataset], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_datasets_table(datasets)),
        OutputFormat::Json => println!("{}", render_json(datasets)?),
        OutputFormat::Csv => println!("{}", datasets_to_csv(datasets)?),
    }
    Ok(())
}

fn print_ingest(outcome: &IngestOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_ingest_table(outcome)),
        OutputFormat::Json => println!("{}", render_json(outcome)?),
        OutputFormat::Csv => {
            warn!("CSV output for upload not implemented, using JSON");
            println!("{}", render_json(outcome)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_parser_enforces_slider_bounds() {
        assert_eq!(parse_percent("50").unwrap(), 50.0);
        assert_eq!(parse_percent("0").unwrap(), 0.0);
        assert!(parse_percent("101").is_err());
        assert!(parse_percent("-5").is_err());
        assert!(parse_percent("half").is_err());
    }

    #[test]
    fn cli_parses_calculate_command() {
        let cli = Cli::try_parse_from([
            "health-whatif",
            "--output",
            "json",
            "calculate",
            "--scenario",
            "ASH",
            "--percent",
            "100",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Calculate { ref scenario, percent, .. } if scenario == "ASH" && percent == 100.0
        ));
    }

    #[test]
    fn cli_rejects_out_of_range_step() {
        assert!(Cli::try_parse_from(["health-whatif", "sweep", "-s", "dna", "--step", "0"]).is_err());
    }
}

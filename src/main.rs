use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use recognition_gap::alert::engine::{evaluate_alerts, AlertEvent};
use recognition_gap::alert::rules::AlertEventKind;
use recognition_gap::config::{Config, ConfigOverrides};
use recognition_gap::district::{build_district_report, load_area_rows, UnitAnalysis};
use recognition_gap::gap::history::{record_from_result, summarize_timeline};
use recognition_gap::gap::whatif::{next_reach_plan, simulate_whatif, CountField};
use recognition_gap::gap::{compute_with_table, PerformanceSnapshot};
use recognition_gap::output::csv::{analysis_to_csv, history_to_csv, units_to_csv};
use recognition_gap::output::json::render_json;
use recognition_gap::output::table::{
    render_analysis_table, render_history_table, render_reach_plan, render_report,
    render_thresholds_table, render_whatif_table,
};
use recognition_gap::program::ProgramType;
use recognition_gap::server::run_server;
use recognition_gap::snapshot::store::SnapshotStore;
use recognition_gap::validate::{validate_snapshot, validate_unit_id};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "recognition-gap",
    about = "Area and Division recognition gap analysis"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
    #[arg(long)]
    db: Option<String>,
    /// Ignore club-visit counts when checking area eligibility
    #[arg(long = "no-visit-gate")]
    no_visit_gate: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone)]
struct SnapshotArgs {
    #[arg(short = 'p', long)]
    program: Option<String>,
    #[arg(long = "base")]
    club_base: u32,
    #[arg(long = "paid")]
    paid_clubs: u32,
    #[arg(long = "distinguished")]
    distinguished_clubs: u32,
    #[arg(long = "first-visits", requires = "second_visits")]
    first_visits: Option<u32>,
    #[arg(long = "second-visits", requires = "first_visits")]
    second_visits: Option<u32>,
}

impl SnapshotArgs {
    fn snapshot(&self) -> PerformanceSnapshot {
        let snapshot =
            PerformanceSnapshot::new(self.club_base, self.paid_clubs, self.distinguished_clubs);
        match (self.first_visits, self.second_visits) {
            (Some(first), Some(second)) => snapshot.with_visits(first, second),
            _ => snapshot,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one area or division
    Analyze {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[arg(long)]
        unit: Option<String>,
        /// Store the result in the history database
        #[arg(long, requires = "unit")]
        record: bool,
        #[arg(long = "as-of")]
        as_of: Option<NaiveDate>,
    },
    /// Show the threshold table for a program
    Thresholds {
        #[arg(short = 'p', long)]
        program: Option<String>,
        #[arg(long)]
        base: Option<u32>,
    },
    /// Simulate count changes
    Whatif {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[arg(long = "add-base", allow_hyphen_values = true)]
        add_base: Option<i64>,
        #[arg(long = "add-paid", allow_hyphen_values = true)]
        add_paid: Option<i64>,
        #[arg(long = "add-distinguished", allow_hyphen_values = true)]
        add_distinguished: Option<i64>,
    },
    /// Analyze a district export of area rows (CSV or JSON)
    Report {
        file: PathBuf,
        #[arg(long)]
        record: bool,
        #[arg(long = "as-of")]
        as_of: Option<NaiveDate>,
    },
    History {
        unit: String,
        #[arg(short = 'p', long)]
        program: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
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

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        db_path: cli.db.clone(),
        default_program: None,
        area_visit_gate: cli.no_visit_gate.then_some(false),
    });

    match &cli.command {
        Commands::Analyze {
            snapshot,
            unit,
            record,
            as_of,
        } => {
            let program = resolve_program(&config, snapshot.program.as_deref())?;
            let values = snapshot.snapshot();
            validate_snapshot(&values)?;
            let table = config.table_for(program);
            let result = compute_with_table(&values, &table);
            let unit_id = unit.clone().unwrap_or_else(|| program.to_string());

            if *record {
                validate_unit_id(program, &unit_id)?;
                let unit = UnitAnalysis {
                    unit_id: unit_id.clone(),
                    program,
                    rank: 1,
                    snapshot: values,
                    result: result.clone(),
                };
                record_units(&config, std::slice::from_ref(&unit), *as_of)?;
            }
            print_analysis(&unit_id, &values, &result, &cli)?;
            if matches!(cli.output, OutputFormat::Table) {
                if let Some(plan) = next_reach_plan(&values, &table, &result) {
                    println!("{}", render_reach_plan(&plan));
                }
            }
        }
        Commands::Thresholds { program, base } => {
            let programs = match program {
                Some(raw) => vec![ProgramType::from_str(raw)?],
                None => ProgramType::ALL.to_vec(),
            };
            let tables = programs
                .into_iter()
                .map(|p| config.table_for(p))
                .collect::<Vec<_>>();
            match cli.output {
                OutputFormat::Table => {
                    let rendered = tables
                        .iter()
                        .map(|t| render_thresholds_table(t, *base))
                        .collect::<Vec<_>>();
                    println!("{}", rendered.join("\n\n"));
                }
                OutputFormat::Json => println!("{}", render_json(&tables, cli.compact)?),
                OutputFormat::Csv => {
                    warn!("CSV output for thresholds not implemented, using JSON");
                    println!("{}", render_json(&tables, cli.compact)?);
                }
            }
        }
        Commands::Whatif {
            snapshot,
            add_base,
            add_paid,
            add_distinguished,
        } => {
            let program = resolve_program(&config, snapshot.program.as_deref())?;
            let values = snapshot.snapshot();
            validate_snapshot(&values)?;
            let adjustments = [
                (CountField::ClubBase, *add_base),
                (CountField::PaidClubs, *add_paid),
                (CountField::DistinguishedClubs, *add_distinguished),
            ]
            .into_iter()
            .filter_map(|(field, delta)| delta.map(|d| (field, d)))
            .collect::<Vec<_>>();
            if adjustments.is_empty() {
                return Err(anyhow!(
                    "at least one --add-<count> change is required for whatif"
                ));
            }
            let result = simulate_whatif(&values, &config.table_for(program), &adjustments);
            match cli.output {
                OutputFormat::Table => println!("{}", render_whatif_table(&result)),
                OutputFormat::Json => println!("{}", render_json(&result, cli.compact)?),
                OutputFormat::Csv => {
                    warn!("CSV output for whatif not implemented, using JSON");
                    println!("{}", render_json(&result, cli.compact)?);
                }
            }
        }
        Commands::Report {
            file,
            record,
            as_of,
        } => {
            let report = load_report(&config, file)?;
            if *record {
                let units = report.units().cloned().collect::<Vec<_>>();
                record_units(&config, &units, *as_of)?;
            }
            match cli.output {
                OutputFormat::Table => println!("{}", render_report(&report)),
                OutputFormat::Json => println!("{}", render_json(&report, cli.compact)?),
                OutputFormat::Csv => {
                    let units = report.units().cloned().collect::<Vec<_>>();
                    print!("{}", units_to_csv(&units)?);
                }
            }
        }
        Commands::History {
            unit,
            program,
            limit,
        } => {
            let program_filter = program.as_deref().map(ProgramType::from_str).transpose()?;
            let store = SnapshotStore::open(&config.resolved_db_path())?;
            let history = store.load_history(unit, program_filter, (*limit).max(1))?;
            let summary = summarize_timeline(&history, program_filter);
            match cli.output {
                OutputFormat::Table => {
                    println!("{}", render_history_table(&history));
                    println!("{summary}");
                }
                OutputFormat::Json => println!("{}", render_json(&history, cli.compact)?),
                OutputFormat::Csv => print!("{}", history_to_csv(&history)?),
            }
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
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path, cli.compact)?;
        }
    }

    Ok(())
}

fn handle_config_command(
    init: bool,
    show: bool,
    config: &Config,
    config_path: &Path,
    compact: bool,
) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config, compact)?);
    }
    Ok(())
}

fn resolve_program(config: &Config, raw: Option<&str>) -> Result<ProgramType> {
    match raw {
        Some(raw) => Ok(ProgramType::from_str(raw)?),
        None => Ok(config.analysis.default_program),
    }
}

fn load_report(
    config: &Config,
    file: &Path,
) -> Result<recognition_gap::district::DistrictReport> {
    let rows = load_area_rows(file)?;
    if rows.is_empty() {
        return Err(anyhow!("no area rows in {}", file.display()));
    }
    build_district_report(
        &rows,
        &config.table_for(ProgramType::Area),
        &config.table_for(ProgramType::Division),
    )
    .with_context(|| format!("failed building report from {}", file.display()))
}

/// Compares units against their last stored analysis, emits alerts, then
/// stores the new analyses.
fn record_units(config: &Config, units: &[UnitAnalysis], as_of: Option<NaiveDate>) -> Result<()> {
    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let store = SnapshotStore::open(&config.resolved_db_path())?;

    let mut previous = Vec::new();
    for unit in units {
        if let Some(record) = store.latest_record(&unit.unit_id, unit.program)? {
            previous.push(record);
        }
    }
    let alerts = apply_alert_rules(evaluate_alerts(&previous, units), config);
    if config.alerts.enable_stdout {
        for alert in &alerts {
            println!("[{:?}] {} - {}", alert.kind, alert.title, alert.body);
        }
    }

    for unit in units {
        let record = record_from_result(unit.unit_id.clone(), as_of, &unit.snapshot, &unit.result);
        store.insert_record(&record)?;
    }
    info!("recorded {} analyses as of {as_of}", units.len());
    Ok(())
}

fn apply_alert_rules(alerts: Vec<AlertEvent>, config: &Config) -> Vec<AlertEvent> {
    alerts
        .into_iter()
        .filter(|event| match event.kind {
            AlertEventKind::LevelGained => config.alerts.rules.level_gained,
            AlertEventKind::LevelLost => config.alerts.rules.level_lost,
            AlertEventKind::NetLossEntered | AlertEventKind::NetLossRecovered => {
                config.alerts.rules.net_loss
            }
        })
        .collect()
}

fn print_analysis(
    unit_id: &str,
    snapshot: &PerformanceSnapshot,
    result: &recognition_gap::gap::GapAnalysisResult,
    cli: &Cli,
) -> Result<()> {
    match cli.output {
        OutputFormat::Table => println!("{}", render_analysis_table(snapshot, result)),
        OutputFormat::Json => println!("{}", render_json(result, cli.compact)?),
        OutputFormat::Csv => print!("{}", analysis_to_csv(unit_id, snapshot, result)?),
    }
    Ok(())
}

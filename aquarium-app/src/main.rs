use anyhow::{ensure, Context, Result};
use aquarium_core::{
    alerts::{self, AlertEvaluator},
    dashboard::{self, DashboardStats},
    health::HealthCalculator,
    history::ReadingLogger,
    reminders::{ReminderScheduler, ReminderStore},
};
use aquarium_schemas::{
    parameters::{ParameterReading, WaterParameterSnapshot},
    reminder::ReminderType,
    tank::Tank,
};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{AppConfig, AquariumData, READINGS_FILE};
use log::{error, info};
use report::ConsoleNotifier;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex};
use std::thread;

mod config;
mod plotting;
mod report;

#[derive(Parser)]
#[command(name = "aquarium")]
#[command(about = "Tank health, water-parameter alerts and maintenance reminders", long_about = None)]
struct Cli {
    /// Directory holding the exported tank data
    #[arg(long, global = true, default_value = "./data")]
    data_dir: PathBuf,

    /// Optional YAML file overriding thresholds and watcher settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show parameter alerts for all tanks or one tank
    Alerts {
        #[arg(short, long)]
        tank: Option<String>,

        /// Only show critical alerts
        #[arg(long)]
        critical: bool,
    },

    /// Show health scores
    Health {
        #[arg(short, long)]
        tank: Option<String>,
    },

    /// Summary statistics and daily parameter averages
    Dashboard {
        #[arg(short, long)]
        tank: Option<String>,

        /// Render a parameter trend chart (PNG) for the selected tank
        #[arg(long, requires = "tank")]
        chart: Option<PathBuf>,
    },

    /// Append a water-parameter reading to the history
    LogReading(ReadingArgs),

    /// Manage maintenance reminders
    #[command(subcommand)]
    Reminders(ReminderCommand),

    /// Watch reminders and notify when they fall due (press Enter to stop)
    Watch,
}

#[derive(Args)]
struct ReadingArgs {
    #[arg(short, long)]
    tank: String,
    /// Temperature in °C
    #[arg(long)]
    temp: f64,
    #[arg(long)]
    ph: f64,
    #[arg(long)]
    ammonia: f64,
    #[arg(long)]
    nitrite: f64,
    #[arg(long)]
    nitrate: f64,
    #[arg(long)]
    gh: Option<f64>,
    #[arg(long)]
    kh: Option<f64>,
    #[arg(long)]
    tds: Option<f64>,
    #[arg(long)]
    salinity: Option<f64>,
}

#[derive(Subcommand)]
enum ReminderCommand {
    /// List reminders, creating the defaults for tanks that have none
    List {
        #[arg(short, long)]
        tank: Option<String>,
    },
    Enable { id: String },
    Disable { id: String },
    /// Set the next due date (RFC 3339, or YYYY-MM-DD for 10:00 local time)
    Reschedule { id: String, date: String },
    /// Mark a maintenance task as done and schedule the next one
    Complete {
        #[arg(short, long)]
        tank: String,
        #[arg(long = "type", value_enum)]
        kind: ReminderKind,
    },
    Delete { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReminderKind {
    WaterChange,
    ParameterCheck,
    FilterClean,
}

impl From<ReminderKind> for ReminderType {
    fn from(kind: ReminderKind) -> Self {
        match kind {
            ReminderKind::WaterChange => ReminderType::WaterChange,
            ReminderKind::ParameterCheck => ReminderType::ParameterCheck,
            ReminderKind::FilterClean => ReminderType::FilterClean,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        eprintln!("Fix the problem above and run the command again.");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Alerts { tank, critical } => {
            let data = AquariumData::load(&cli.data_dir)?;
            let tanks = data.select_tanks(tank.as_deref())?;
            let evaluator = AlertEvaluator::new(config.evaluators.alerts.clone());
            let mut found = evaluator.evaluate_all(&tanks, Utc::now());
            if critical {
                found = alerts::critical_only(&found);
            }
            if cli.json {
                report::print_json(&found)?;
            } else {
                report::print_alerts(&found);
            }
        }
        Commands::Health { tank } => {
            let data = AquariumData::load(&cli.data_dir)?;
            let tanks = data.select_tanks(tank.as_deref())?;
            let calculator = HealthCalculator::new(config.evaluators.health.clone());
            let scores = calculator.score_all(&tanks, &data.maintenance_logs, Utc::now());
            if cli.json {
                report::print_json(&scores)?;
            } else {
                report::print_health(&scores);
            }
        }
        Commands::Dashboard { tank, chart } => {
            let data = AquariumData::load(&cli.data_dir)?;
            let tanks = data.select_tanks(tank.as_deref())?;
            let stats = DashboardStats::compute(
                &config.evaluators,
                &tanks,
                &data.maintenance_logs,
                Utc::now(),
            );
            let readings = match tank.as_deref() {
                Some(id) => data.readings_for(id),
                None => data.readings.clone(),
            };
            let days = dashboard::daily_averages(&readings);

            if cli.json {
                report::print_json(&serde_json::json!({ "stats": stats, "dailyAverages": days }))?;
            } else {
                report::print_dashboard(&stats, &days);
            }
            if let (Some(path), Some(tank)) = (chart, tanks.first()) {
                plotting::plot_parameter_trends(&path, &tank.name, &days)?;
            }
        }
        Commands::LogReading(args) => log_reading(&cli.data_dir, &config, args)?,
        Commands::Reminders(command) => run_reminder_command(&cli.data_dir, cli.json, command)?,
        Commands::Watch => watch(&cli.data_dir, &config)?,
    }
    Ok(())
}

fn log_reading(data_dir: &Path, config: &AppConfig, args: ReadingArgs) -> Result<()> {
    let data = AquariumData::load(data_dir)?;
    let tank = data.tank(&args.tank)?;

    let required = [
        ("temp", args.temp),
        ("ph", args.ph),
        ("ammonia", args.ammonia),
        ("nitrite", args.nitrite),
        ("nitrate", args.nitrate),
    ];
    for (name, value) in required {
        ensure!(value >= 0.0, "--{} must not be negative", name);
    }

    let non_negative = |value: Option<f64>| value.filter(|v| *v >= 0.0);
    let reading = ParameterReading {
        tank_id: tank.id.clone(),
        recorded_at: Utc::now(),
        parameters: WaterParameterSnapshot {
            temp_c: args.temp,
            ph: args.ph,
            ammonia: args.ammonia,
            nitrite: args.nitrite,
            nitrate: args.nitrate,
            gh: non_negative(args.gh),
            kh: non_negative(args.kh),
            tds: non_negative(args.tds),
            salinity: non_negative(args.salinity),
        },
    };

    let mut logger = ReadingLogger::open(&data_dir.join(READINGS_FILE))?;
    logger.log_reading(&reading)?;
    println!("Logged reading for {}.", tank.name);

    let mut logged = tank.clone();
    logged.parameters = reading.parameters;
    let evaluator = AlertEvaluator::new(config.evaluators.alerts.clone());
    report::print_alerts(&evaluator.evaluate(&logged));
    Ok(())
}

fn run_reminder_command(data_dir: &Path, json: bool, command: ReminderCommand) -> Result<()> {
    let mut store = ReminderStore::open(data_dir);

    let reminders = match command {
        ReminderCommand::List { tank } => {
            let data = AquariumData::load(data_dir)?;
            let mut listed = Vec::new();
            for tank in data.select_tanks(tank.as_deref())? {
                listed.extend(store.reminders_for_tank(&tank.id, &tank.name, Local::now())?);
            }
            listed
        }
        ReminderCommand::Enable { id } => vec![store.toggle(&id, true)?],
        ReminderCommand::Disable { id } => vec![store.toggle(&id, false)?],
        ReminderCommand::Reschedule { id, date } => {
            vec![store.reschedule(&id, parse_due_date(&date)?)?]
        }
        ReminderCommand::Complete { tank, kind } => {
            match store.complete(&tank, kind.into(), Utc::now())? {
                Some(reminder) => vec![reminder],
                None => {
                    println!(
                        "No enabled {} reminder for tank '{}'.",
                        ReminderType::from(kind),
                        tank
                    );
                    Vec::new()
                }
            }
        }
        ReminderCommand::Delete { id } => {
            let removed = store.delete(&id)?;
            println!("Deleted reminder '{}'.", removed.id);
            Vec::new()
        }
    };

    if json {
        report::print_json(&reminders)?;
    } else if !reminders.is_empty() {
        report::print_reminders(&reminders);
    }
    Ok(())
}

fn parse_due_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("'{}' is neither RFC 3339 nor YYYY-MM-DD", value))?;
    let naive = day
        .and_hms_opt(10, 0, 0)
        .context("10:00 is not a valid time")?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("10:00 on {} does not exist in the local time zone", day))?;
    Ok(local.with_timezone(&Utc))
}

fn watch(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let data = AquariumData::load(data_dir)?;
    let mut store = ReminderStore::open(data_dir);
    let count = seed_reminders(&mut store, &data.tanks, Local::now())?;
    info!("Watching {} reminders across {} tanks", count, data.tanks.len());

    let store = Arc::new(Mutex::new(store));
    let notifier = Arc::new(ConsoleNotifier::new(config.notification_permission));
    let mut scheduler =
        ReminderScheduler::new(store, notifier).with_interval(config.poll_interval());

    scheduler.start();
    println!("Watching reminders in {:?}. Press Enter to stop.", data_dir);

    match wait_for_stop(io::stdin().lock())? {
        StopSignal::Requested => scheduler.stop(),
        StopSignal::Detached => {
            info!("Stdin is closed, watching until the process is killed");
            loop {
                thread::park();
            }
        }
    }
    Ok(())
}

/// Makes sure every tank has its reminders before the first poll. Returns
/// how many reminders the watcher covers.
fn seed_reminders(
    store: &mut ReminderStore,
    tanks: &[Tank],
    now: DateTime<Local>,
) -> Result<usize> {
    let mut count = 0;
    for tank in tanks {
        count += store
            .reminders_for_tank(&tank.id, &tank.name, now)
            .with_context(|| format!("Failed to set up reminders for tank '{}'", tank.id))?
            .len();
    }
    Ok(count)
}

#[derive(Debug, PartialEq)]
enum StopSignal {
    /// A line was entered.
    Requested,
    /// Input is closed (`< /dev/null`, `nohup`, a service unit).
    Detached,
}

fn wait_for_stop<R: BufRead>(mut input: R) -> Result<StopSignal> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read from stdin")?;
    if read == 0 {
        Ok(StopSignal::Detached)
    } else {
        Ok(StopSignal::Requested)
    }
}

//! Console rendering of evaluator results.

use anyhow::Result;
use aquarium_core::{
    alerts::AlertCounts,
    dashboard::{DailyAverage, DashboardStats},
    error::AquariumError,
    reminders::{NotificationPermission, Notifier},
};
use aquarium_schemas::{
    alert::{AlertLevel, ParameterAlert},
    health::TankHealthScore,
    reminder::Reminder,
};
use chrono::Local;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Mutex;

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_alerts(alerts: &[ParameterAlert]) {
    if alerts.is_empty() {
        println!("No alerts. All parameters are within range.");
        return;
    }

    for alert in alerts {
        let marker = match alert.level {
            AlertLevel::Critical => "!!",
            AlertLevel::Warning => "! ",
            AlertLevel::Info => "i ",
        };
        println!(
            "{} [{}] {} - {} ({} = {})",
            marker, alert.level, alert.tank_name, alert.title, alert.parameter, alert.current_value
        );
        println!("     {}", alert.description);
        println!("     Recommended: {}", alert.recommendation);
        for (i, action) in alert.actions.iter().enumerate() {
            println!("       {}. {}", i + 1, action);
        }
    }
    print_alert_counts(&AlertCounts::from_alerts(alerts));
}

fn print_alert_counts(counts: &AlertCounts) {
    println!(
        "----------------------------------------\n{} alerts: {} critical, {} warning, {} info",
        counts.total, counts.critical, counts.warning, counts.info
    );
}

pub fn print_health(scores: &[TankHealthScore]) {
    for score in scores {
        println!("{:<24} {:>3}/100", score.tank_name, score.score);
        for issue in &score.issues {
            println!("  - {}", issue);
        }
        match (score.last_water_change, score.days_until_next_water_change) {
            (Some(last), Some(days)) => println!(
                "  Last water change {} (next due in {} days)",
                last.with_timezone(&Local).format("%Y-%m-%d"),
                days
            ),
            _ => println!("  No water change logged yet"),
        }
    }
}

pub fn print_dashboard(stats: &DashboardStats, days: &[DailyAverage]) {
    println!("\n--- [Dashboard] ---");
    println!("========================================");
    println!("Tanks:           {}", stats.total_tanks);
    println!("Average health:  {:.0}/100", stats.average_health);
    println!(
        "Active alerts:   {} ({} critical, {} warning, {} info)",
        stats.alerts.total, stats.alerts.critical, stats.alerts.warning, stats.alerts.info
    );
    println!("----------------------------------------");
    print_health(&stats.scores);

    if !days.is_empty() {
        println!("\nDaily averages:");
        println!(
            "  {:<10} {:>3} {:>7} {:>5} {:>8} {:>8} {:>8}",
            "date", "n", "temp", "pH", "NH3", "NO2", "NO3"
        );
        for day in days {
            println!(
                "  {:<10} {:>3} {:>7.1} {:>5.2} {:>8.2} {:>8.2} {:>8.1}",
                day.date, day.readings, day.temp_c, day.ph, day.ammonia, day.nitrite, day.nitrate
            );
        }
    }
    println!("========================================");
}

pub fn print_reminders(reminders: &[Reminder]) {
    if reminders.is_empty() {
        println!("No reminders.");
        return;
    }
    for reminder in reminders {
        println!(
            "{:<32} {:<8} {:<16} {:<9} next {}",
            reminder.id,
            if reminder.enabled { "on" } else { "off" },
            reminder.reminder_type.label(),
            format!("{:?}", reminder.frequency).to_lowercase(),
            reminder.next_date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        );
    }
}

/// Prints reminders to the terminal while the watcher runs.
pub struct ConsoleNotifier {
    permission: NotificationPermission,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self::with_writer(permission, Box::new(io::stdout()))
    }

    pub fn with_writer(permission: NotificationPermission, out: Box<dyn Write + Send>) -> Self {
        Self {
            permission,
            out: Mutex::new(out),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), AquariumError> {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(
            out,
            "\x07[{}] {}: {}",
            Local::now().format("%Y-%m-%d %H:%M"),
            title,
            body
        )
        .and_then(|()| out.flush())
        .map_err(|e| AquariumError::NotificationFailed(format!("{}: {}", title, e)))
    }
}

use crate::error::AquariumError;
use aquarium_schemas::reminder::{Frequency, Reminder, ReminderType};
use chrono::{DateTime, Duration, Local, Months, NaiveDate, TimeZone, Utc};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed key the reminder list is persisted under.
pub const STORAGE_KEY: &str = "aquarium_reminders";
/// Key used by older releases for an unrelated notification log.
pub const LEGACY_STORAGE_KEY: &str = "aquarium_notifications";

/// Default reminders are due at this local hour.
const DEFAULT_REMINDER_HOUR: u32 = 10;

/// A due reminder fires only if it became due within this window.
pub fn grace_window() -> Duration {
    Duration::hours(1)
}

/// Locally persisted recurring reminders, one JSON array under [`STORAGE_KEY`].
#[derive(Debug)]
pub struct ReminderStore {
    path: PathBuf,
    reminders: Vec<Reminder>,
}

impl ReminderStore {
    /// Opens the store in `dir`. A missing or unreadable file yields an empty
    /// list rather than an error.
    ///
    /// Every mutating call re-reads the file first and writes it back, so
    /// edits made through another handle on the same directory are kept.
    pub fn open(dir: &Path) -> Self {
        remove_legacy_key(dir);

        let path = dir.join(format!("{}.json", STORAGE_KEY));
        let reminders = read_reminders(&path);
        Self { path, reminders }
    }

    /// Re-reads the persisted list, dropping the in-memory copy. Other
    /// processes may have edited the file since the last read.
    pub fn reload(&mut self) {
        self.reminders = read_reminders(&self.path);
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    /// Returns the tank's reminders, seeding the defaults on first access.
    pub fn reminders_for_tank(
        &mut self,
        tank_id: &str,
        tank_name: &str,
        now: DateTime<Local>,
    ) -> Result<Vec<Reminder>, AquariumError> {
        self.reload();
        if !self.reminders.iter().any(|r| r.tank_id == tank_id) {
            info!("Creating default reminders for tank '{}'", tank_name);
            self.reminders.extend(default_reminders(tank_id, tank_name, now));
            self.save()?;
        }
        Ok(self
            .reminders
            .iter()
            .filter(|r| r.tank_id == tank_id)
            .cloned()
            .collect())
    }

    /// Arms or disarms a reminder without touching its next date.
    pub fn toggle(&mut self, id: &str, enabled: bool) -> Result<Reminder, AquariumError> {
        self.reload();
        let reminder = self.find_mut(id)?;
        reminder.enabled = enabled;
        let updated = reminder.clone();
        self.save()?;
        Ok(updated)
    }

    pub fn reschedule(
        &mut self,
        id: &str,
        next_date: DateTime<Utc>,
    ) -> Result<Reminder, AquariumError> {
        self.reload();
        let reminder = self.find_mut(id)?;
        reminder.next_date = next_date;
        let updated = reminder.clone();
        self.save()?;
        Ok(updated)
    }

    /// Marks the tank's enabled reminder of this type as done and pushes it
    /// forward by its frequency from `now`. Returns `None` when the tank has
    /// no enabled reminder of that type.
    pub fn complete(
        &mut self,
        tank_id: &str,
        reminder_type: ReminderType,
        now: DateTime<Utc>,
    ) -> Result<Option<Reminder>, AquariumError> {
        self.reload();
        let Some(reminder) = self
            .reminders
            .iter_mut()
            .find(|r| r.tank_id == tank_id && r.reminder_type == reminder_type && r.enabled)
        else {
            return Ok(None);
        };
        reminder.next_date = now + reminder.frequency.interval();
        let updated = reminder.clone();
        self.save()?;
        Ok(Some(updated))
    }

    pub fn delete(&mut self, id: &str) -> Result<Reminder, AquariumError> {
        self.reload();
        let index = self
            .reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AquariumError::ReminderNotFound(id.to_string()))?;
        let removed = self.reminders.remove(index);
        self.save()?;
        Ok(removed)
    }

    /// Enabled reminders that became due within the grace window before `now`.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.enabled && r.next_date <= now && now - r.next_date < grace_window())
            .cloned()
            .collect()
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Reminder, AquariumError> {
        self.reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AquariumError::ReminderNotFound(id.to_string()))
    }

    fn save(&self) -> Result<(), AquariumError> {
        let content = serde_json::to_string_pretty(&self.reminders)?;
        fs::write(&self.path, content)
            .map_err(|e| AquariumError::FileIO(self.path.display().to_string(), e))
    }
}

fn read_reminders(path: &Path) -> Vec<Reminder> {
    let reminders = match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Failed to parse reminders from {:?}, starting empty: {}", path, e);
            Vec::new()
        }),
        Err(_) => Vec::new(),
    };
    debug!("Loaded {} reminders from {:?}", reminders.len(), path);
    reminders
}

fn remove_legacy_key(dir: &Path) {
    let legacy = dir.join(format!("{}.json", LEGACY_STORAGE_KEY));
    if legacy.exists() {
        match fs::remove_file(&legacy) {
            Ok(()) => info!("Removed legacy notification store {:?}", legacy),
            Err(e) => debug!("Could not remove legacy notification store {:?}: {}", legacy, e),
        }
    }
}

fn default_reminders(tank_id: &str, tank_name: &str, now: DateTime<Local>) -> Vec<Reminder> {
    let today = now.date_naive();
    let next_week = today + Duration::days(7);
    let next_month = today
        .checked_add_months(Months::new(1))
        .unwrap_or(today + Duration::days(Frequency::Monthly.days()));

    [
        (
            ReminderType::WaterChange,
            Frequency::Weekly,
            next_week,
            format!("Time for a water change in {}", tank_name),
        ),
        (
            ReminderType::ParameterCheck,
            Frequency::Weekly,
            next_week,
            format!("Time to test the water parameters in {}", tank_name),
        ),
        (
            ReminderType::FilterClean,
            Frequency::Monthly,
            next_month,
            format!("Time to clean the filter in {}", tank_name),
        ),
    ]
    .into_iter()
    .map(|(reminder_type, frequency, day, message)| Reminder {
        id: format!("{}-{}", tank_id, type_key(reminder_type)),
        tank_id: tank_id.to_string(),
        tank_name: tank_name.to_string(),
        reminder_type,
        title: format!("{} Reminder", reminder_type.label()),
        message,
        next_date: at_reminder_hour(day, now),
        frequency,
        enabled: false,
    })
    .collect()
}

fn type_key(reminder_type: ReminderType) -> &'static str {
    match reminder_type {
        ReminderType::WaterChange => "water_change",
        ReminderType::ParameterCheck => "parameter_check",
        ReminderType::FilterClean => "filter_clean",
    }
}

/// 10:00 local time on `day`, falling back to the same wall-clock offset as
/// `now` when that local time does not exist.
fn at_reminder_hour(day: NaiveDate, now: DateTime<Local>) -> DateTime<Utc> {
    day.and_hms_opt(DEFAULT_REMINDER_HOUR, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or_else(|| now + (day - now.date_naive()))
        .with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use tempfile::TempDir;

    fn local_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 12, 15, 45, 0).unwrap()
    }

    #[test]
    fn test_defaults_seeded_once() {
        let dir = TempDir::new().unwrap();
        let mut store = ReminderStore::open(dir.path());

        let reminders = store.reminders_for_tank("tank-1", "Community 120", local_now()).unwrap();
        assert_eq!(reminders.len(), 3);
        assert!(reminders.iter().all(|r| !r.enabled));

        let water = &reminders[0];
        assert_eq!(water.id, "tank-1-water_change");
        assert_eq!(water.frequency, Frequency::Weekly);
        let local = water.next_date.with_timezone(&Local);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 19).unwrap());
        assert_eq!(local.hour(), 10);
        assert_eq!(local.minute(), 0);

        let filter = &reminders[2];
        assert_eq!(filter.frequency, Frequency::Monthly);
        assert_eq!(
            filter.next_date.with_timezone(&Local).date_naive(),
            NaiveDate::from_ymd_opt(2024, 4, 12).unwrap()
        );

        // Second access does not duplicate
        let again = store.reminders_for_tank("tank-1", "Community 120", local_now()).unwrap();
        assert_eq!(again, reminders);
        assert_eq!(store.reminders().len(), 3);
    }

    #[test]
    fn test_persists_across_open() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = ReminderStore::open(dir.path());
            store.reminders_for_tank("tank-1", "Community 120", local_now()).unwrap();
            store.toggle("tank-1-water_change", true).unwrap();
        }
        let store = ReminderStore::open(dir.path());
        assert_eq!(store.reminders().len(), 3);
        assert!(store.get("tank-1-water_change").unwrap().enabled);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("aquarium_reminders.json"), "{ not json").unwrap();
        let store = ReminderStore::open(dir.path());
        assert!(store.reminders().is_empty());
    }

    #[test]
    fn test_legacy_key_removed() {
        let dir = TempDir::new().unwrap();
        let legacy = dir.path().join("aquarium_notifications.json");
        fs::write(&legacy, "[]").unwrap();
        ReminderStore::open(dir.path());
        assert!(!legacy.exists());
    }

    #[test]
    fn test_toggle_keeps_next_date() {
        let dir = TempDir::new().unwrap();
        let mut store = ReminderStore::open(dir.path());
        let before = store.reminders_for_tank("tank-1", "Tank", local_now()).unwrap();
        let toggled = store.toggle("tank-1-parameter_check", true).unwrap();
        assert!(toggled.enabled);
        assert_eq!(toggled.next_date, before[1].next_date);
    }

    #[test]
    fn test_reschedule_and_delete() {
        let dir = TempDir::new().unwrap();
        let mut store = ReminderStore::open(dir.path());
        store.reminders_for_tank("tank-1", "Tank", local_now()).unwrap();

        let when = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let updated = store.reschedule("tank-1-filter_clean", when).unwrap();
        assert_eq!(updated.next_date, when);

        store.delete("tank-1-filter_clean").unwrap();
        assert!(store.get("tank-1-filter_clean").is_none());
        assert!(matches!(
            store.delete("tank-1-filter_clean"),
            Err(AquariumError::ReminderNotFound(_))
        ));
        assert!(matches!(
            store.toggle("missing", true),
            Err(AquariumError::ReminderNotFound(_))
        ));
    }

    #[test]
    fn test_complete_advances_by_frequency() {
        let dir = TempDir::new().unwrap();
        let mut store = ReminderStore::open(dir.path());
        store.reminders_for_tank("tank-1", "Tank", local_now()).unwrap();

        let completed_at = Utc.with_ymd_and_hms(2024, 3, 14, 17, 23, 11).unwrap();

        // Disabled reminders are not completed
        let none = store
            .complete("tank-1", ReminderType::WaterChange, completed_at)
            .unwrap();
        assert!(none.is_none());

        store.toggle("tank-1-water_change", true).unwrap();
        let done = store
            .complete("tank-1", ReminderType::WaterChange, completed_at)
            .unwrap()
            .unwrap();
        assert_eq!(done.next_date, completed_at + Duration::hours(7 * 24));

        store.toggle("tank-1-filter_clean", true).unwrap();
        let done = store
            .complete("tank-1", ReminderType::FilterClean, completed_at)
            .unwrap()
            .unwrap();
        assert_eq!(done.next_date, completed_at + Duration::days(30));
    }

    #[test]
    fn test_due_respects_grace_window() {
        let dir = TempDir::new().unwrap();
        let mut store = ReminderStore::open(dir.path());
        store.reminders_for_tank("tank-1", "Tank", local_now()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();

        store.reschedule("tank-1-water_change", now - Duration::minutes(10)).unwrap();
        store.reschedule("tank-1-parameter_check", now - Duration::hours(2)).unwrap();
        store.reschedule("tank-1-filter_clean", now + Duration::minutes(5)).unwrap();

        // Nothing is enabled yet
        assert!(store.due(now).is_empty());

        for id in ["tank-1-water_change", "tank-1-parameter_check", "tank-1-filter_clean"] {
            store.toggle(id, true).unwrap();
        }
        let due = store.due(now);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "tank-1-water_change");
    }

    #[test]
    fn test_two_handles_share_edits() {
        let dir = TempDir::new().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();

        // The watcher opens first, before any reminders exist
        let mut watcher = ReminderStore::open(dir.path());
        let mut cli = ReminderStore::open(dir.path());
        cli.reminders_for_tank("tank-1", "Tank", local_now()).unwrap();
        cli.toggle("tank-1-water_change", true).unwrap();
        cli.reschedule("tank-1-water_change", now - Duration::minutes(1)).unwrap();

        assert!(watcher.due(now).is_empty());
        watcher.reload();
        assert_eq!(watcher.due(now).len(), 1);

        let done = watcher
            .complete("tank-1", ReminderType::WaterChange, now)
            .unwrap()
            .unwrap();
        assert_eq!(done.next_date, now + Duration::days(7));

        // The watcher's write keeps the other handle's enable
        let on_disk = ReminderStore::open(dir.path());
        let reminder = on_disk.get("tank-1-water_change").unwrap();
        assert!(reminder.enabled);
        assert_eq!(reminder.next_date, now + Duration::days(7));

        // And a stale handle does not clobber it on its next write
        cli.toggle("tank-1-filter_clean", true).unwrap();
        let on_disk = ReminderStore::open(dir.path());
        assert_eq!(
            on_disk.get("tank-1-water_change").unwrap().next_date,
            now + Duration::days(7)
        );
        assert!(on_disk.get("tank-1-filter_clean").unwrap().enabled);
    }

    #[test]
    fn test_deleted_tank_reminders_are_reseeded() {
        let dir = TempDir::new().unwrap();
        let mut store = ReminderStore::open(dir.path());
        store.reminders_for_tank("tank-1", "Tank", local_now()).unwrap();
        store.toggle("tank-1-water_change", true).unwrap();

        for id in ["tank-1-water_change", "tank-1-parameter_check", "tank-1-filter_clean"] {
            store.delete(id).unwrap();
        }
        assert!(store.reminders().is_empty());

        let reseeded = store.reminders_for_tank("tank-1", "Tank", local_now()).unwrap();
        assert_eq!(reseeded.len(), 3);
        assert!(reseeded.iter().all(|r| !r.enabled));
        assert_eq!(ReminderStore::open(dir.path()).reminders().len(), 3);

        // Deleting only some keeps the rest without re-seeding
        store.delete("tank-1-filter_clean").unwrap();
        let remaining = store.reminders_for_tank("tank-1", "Tank", local_now()).unwrap();
        assert_eq!(remaining.len(), 2);
    }
}

use super::{
    notifier::{NotificationPermission, Notifier},
    store::ReminderStore,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::{
    mpsc::{self, RecvTimeoutError, Sender},
    Arc, Mutex, MutexGuard,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the watcher checks for due reminders.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Polls the reminder store on a background thread and fires due reminders.
///
/// The scheduler is owned by whoever composes the application. `start` and
/// `stop` are idempotent: starting a running scheduler or stopping an idle
/// one does nothing.
pub struct ReminderScheduler {
    store: Arc<Mutex<ReminderStore>>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    worker: Option<Worker>,
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl ReminderScheduler {
    pub fn new(store: Arc<Mutex<ReminderStore>>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            interval: DEFAULT_POLL_INTERVAL,
            worker: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Checks once immediately, then once per interval until stopped.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            debug!("Reminder scheduler already running");
            return;
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        let interval = self.interval;

        let handle = thread::spawn(move || loop {
            check_due_reminders(&store, notifier.as_ref(), Utc::now());
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        info!("Reminder scheduler started (every {:?})", self.interval);
        self.worker = Some(Worker { stop_tx, handle });
    }

    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // A closed channel also stops the loop, so a failed send is fine.
        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            warn!("Reminder scheduler thread panicked");
        }
        info!("Reminder scheduler stopped");
    }

    /// Runs one polling pass at `now` on the calling thread.
    pub fn tick_at(&self, now: DateTime<Utc>) -> usize {
        check_due_reminders(&self.store, self.notifier.as_ref(), now)
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fires and reschedules every due reminder, one at a time. Returns how many fired.
///
/// The store is re-read from disk first, so edits made by other processes
/// since the last pass are seen. A fired reminder is rescheduled before the
/// next one is looked at, so a single pass never fires the same reminder
/// twice. Reminders that became due more than the grace window ago are skipped
/// for that occurrence.
pub fn check_due_reminders(
    store: &Mutex<ReminderStore>,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> usize {
    let mut store = lock(store);
    store.reload();
    let due = store.due(now);

    for reminder in &due {
        match notifier.permission() {
            NotificationPermission::Granted => {
                if let Err(e) = notifier.notify(&reminder.title, &reminder.message) {
                    warn!("Failed to deliver reminder '{}': {}", reminder.id, e);
                }
            }
            permission => debug!(
                "Notifications not granted ({:?}), skipping '{}'",
                permission, reminder.id
            ),
        }

        if let Err(e) = store.complete(&reminder.tank_id, reminder.reminder_type, now) {
            warn!("Failed to reschedule reminder '{}': {}", reminder.id, e);
        }
    }

    due.len()
}

fn lock(store: &Mutex<ReminderStore>) -> MutexGuard<'_, ReminderStore> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AquariumError;
    use aquarium_schemas::reminder::ReminderType;
    use chrono::{Local, TimeZone};
    use std::time::Instant;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingNotifier {
        permission: Option<NotificationPermission>,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn permission(&self) -> NotificationPermission {
            self.permission.unwrap_or(NotificationPermission::Granted)
        }

        fn notify(&self, title: &str, body: &str) -> Result<(), AquariumError> {
            self.sent.lock().unwrap().push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn seeded_store(dir: &TempDir) -> Arc<Mutex<ReminderStore>> {
        let mut store = ReminderStore::open(dir.path());
        let seeded_at = Local.with_ymd_and_hms(2024, 3, 12, 15, 45, 0).unwrap();
        store.reminders_for_tank("tank-1", "Community 120", seeded_at).unwrap();
        Arc::new(Mutex::new(store))
    }

    #[test]
    fn test_tick_fires_and_reschedules() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        {
            let mut s = store.lock().unwrap();
            s.toggle("tank-1-water_change", true).unwrap();
            s.reschedule("tank-1-water_change", now - chrono::Duration::minutes(1)).unwrap();
        }

        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = ReminderScheduler::new(store.clone(), notifier.clone());

        assert_eq!(scheduler.tick_at(now), 1);
        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![(
                "Water Change Reminder".to_string(),
                "Time for a water change in Community 120".to_string()
            )]
        );

        let next = store.lock().unwrap().get("tank-1-water_change").unwrap().next_date;
        assert_eq!(next, now + chrono::Duration::days(7));

        // Rescheduled, so the next pass is quiet
        assert_eq!(scheduler.tick_at(now + chrono::Duration::minutes(1)), 0);
        assert_eq!(store.lock().unwrap().get("tank-1-water_change").unwrap().next_date, next);
    }

    #[test]
    fn test_without_permission_still_reschedules() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        {
            let mut s = store.lock().unwrap();
            s.toggle("tank-1-parameter_check", true).unwrap();
            s.reschedule("tank-1-parameter_check", now).unwrap();
        }

        let notifier = Arc::new(RecordingNotifier {
            permission: Some(NotificationPermission::Denied),
            ..Default::default()
        });
        let fired = check_due_reminders(&store, notifier.as_ref(), now);
        assert_eq!(fired, 1);
        assert!(notifier.sent.lock().unwrap().is_empty());

        let s = store.lock().unwrap();
        let reminder = s.get("tank-1-parameter_check").unwrap();
        assert_eq!(reminder.reminder_type, ReminderType::ParameterCheck);
        assert_eq!(reminder.next_date, now + chrono::Duration::days(7));
    }

    #[test]
    fn test_start_stop_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let mut scheduler = ReminderScheduler::new(store, Arc::new(RecordingNotifier::default()))
            .with_interval(Duration::from_millis(10));

        scheduler.stop();
        assert!(!scheduler.is_running());

        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_tick_sees_edits_from_another_handle() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Mutex::new(ReminderStore::open(dir.path())));
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = ReminderScheduler::new(store.clone(), notifier.clone());
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();

        assert_eq!(scheduler.tick_at(now), 0);

        let mut cli = ReminderStore::open(dir.path());
        let seeded_at = Local.with_ymd_and_hms(2024, 3, 12, 15, 45, 0).unwrap();
        cli.reminders_for_tank("tank-1", "Community 120", seeded_at).unwrap();
        cli.toggle("tank-1-water_change", true).unwrap();
        cli.reschedule("tank-1-water_change", now - chrono::Duration::minutes(1)).unwrap();

        assert_eq!(scheduler.tick_at(now), 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);

        let on_disk = ReminderStore::open(dir.path());
        let reminder = on_disk.get("tank-1-water_change").unwrap();
        assert!(reminder.enabled);
        assert_eq!(reminder.next_date, now + chrono::Duration::days(7));
    }

    #[test]
    fn test_started_scheduler_fires_on_first_tick() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        {
            let mut s = store.lock().unwrap();
            s.toggle("tank-1-filter_clean", true).unwrap();
            s.reschedule("tank-1-filter_clean", Utc::now() - chrono::Duration::minutes(5))
                .unwrap();
        }

        // Long interval: only the immediate tick can fire
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = ReminderScheduler::new(store.clone(), notifier.clone())
            .with_interval(Duration::from_secs(3600));
        scheduler.start();

        let deadline = Instant::now() + Duration::from_secs(5);
        while notifier.sent.lock().unwrap().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        scheduler.stop();

        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![(
                "Filter Cleaning Reminder".to_string(),
                "Time to clean the filter in Community 120".to_string()
            )]
        );
        let next = store.lock().unwrap().get("tank-1-filter_clean").unwrap().next_date;
        assert!(next > Utc::now() + chrono::Duration::days(29));
    }
}

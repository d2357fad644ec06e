pub mod notifier;
pub mod scheduler;
pub mod store;

pub use notifier::{NotificationPermission, Notifier};
pub use scheduler::ReminderScheduler;
pub use store::ReminderStore;

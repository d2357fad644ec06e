pub mod alert;
pub mod file_formats;
pub mod health;
pub mod maintenance;
pub mod parameters;
pub mod reminder;
pub mod tank;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AquariumError {
    #[error("Invalid tank record: {0}")]
    InvalidRecord(String),

    #[error("Reminder '{0}' not found")]
    ReminderNotFound(String),

    #[error("Notification could not be delivered: {0}")]
    NotificationFailed(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}

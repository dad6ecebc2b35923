use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from pcap library
    #[error("PCAP error: {0}")]
    PcapError(#[from] pcap::Error),

    /// Error from I/O operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from CSV serialization
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Frame could not be decoded into a packet
    #[error("Packet parsing error: {0}")]
    PacketParsingError(String),

    /// Capture source could not be used
    #[error("Capture error: {0}")]
    CaptureError(String),
}

/// Result type for application
pub type AppResult<T> = Result<T, AppError>;

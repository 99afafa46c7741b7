//! Error types for the research laboratory.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level laboratory error.
#[derive(Error, Debug)]
pub enum LabError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Request template error: {0}")]
    Request(#[from] RequestError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Archive parsing and data shape errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Unrecognised archive path: {0}")]
    UnrecognisedPath(PathBuf),

    #[error("Parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Network fetch errors.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP {status} for {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Request to {url} failed after {attempts} attempts: {reason}")]
    Exhausted { url: String, attempts: u32, reason: String },

    #[error("Network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Relational store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database not found at {0}")]
    NotFound(PathBuf),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Detector errors.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Detector not found: {0}")]
    NotFound(String),
}

/// Data request template errors.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Template is missing 'template_type'")]
    MissingType,

    #[error("Unknown template type: '{0}'")]
    UnknownType(String),

    #[error("start_date {start} is after end_date {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Malformed template: {0}")]
    Malformed(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for laboratory operations.
pub type LabResult<T> = Result<T, LabError>;

//! Data request templates.
//!
//! A template describes which archive files to acquire: the data kind, the
//! symbol and an inclusive calendar range. Templates serialise to JSON objects
//! tagged with `template_type` so saved requests can be reloaded without
//! knowing their kind up front.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Interval;
use crate::error::RequestError;

/// Kind of archive data a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Klines,
    Trades,
}

impl DataKind {
    /// Archive directory name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Klines => "klines",
            DataKind::Trades => "trades",
        }
    }
}

/// Request for kline (candle) archives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KlinesRequest {
    pub name: String,
    pub symbol: String,
    pub interval: Interval,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl KlinesRequest {
    /// Create a validated klines request. The symbol is upper-cased.
    pub fn new(
        name: impl Into<String>,
        symbol: &str,
        interval: Interval,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, RequestError> {
        Self {
            name: name.into(),
            symbol: symbol.to_string(),
            interval,
            start_date,
            end_date,
            description: None,
        }
        .normalized()
    }

    /// Attach a free-form description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn normalized(mut self) -> Result<Self, RequestError> {
        self.symbol = normalize_symbol(&self.symbol)?;
        check_range(self.start_date, self.end_date)?;
        Ok(self)
    }
}

/// Request for individual trade archives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradesRequest {
    pub name: String,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TradesRequest {
    /// Create a validated trades request. The symbol is upper-cased.
    pub fn new(
        name: impl Into<String>,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, RequestError> {
        Self {
            name: name.into(),
            symbol: symbol.to_string(),
            start_date,
            end_date,
            description: None,
        }
        .normalized()
    }

    /// Attach a free-form description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn normalized(mut self) -> Result<Self, RequestError> {
        self.symbol = normalize_symbol(&self.symbol)?;
        check_range(self.start_date, self.end_date)?;
        Ok(self)
    }
}

/// A data request of any supported kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "template_type", rename_all = "lowercase")]
pub enum DataRequest {
    Klines(KlinesRequest),
    Trades(TradesRequest),
}

impl DataRequest {
    /// Template type tags understood by [`DataRequest::from_value`].
    pub const TEMPLATE_TYPES: &'static [&'static str] = &["klines", "trades"];

    pub fn kind(&self) -> DataKind {
        match self {
            DataRequest::Klines(_) => DataKind::Klines,
            DataRequest::Trades(_) => DataKind::Trades,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DataRequest::Klines(r) => &r.name,
            DataRequest::Trades(r) => &r.name,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            DataRequest::Klines(r) => &r.symbol,
            DataRequest::Trades(r) => &r.symbol,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        match self {
            DataRequest::Klines(r) => r.start_date,
            DataRequest::Trades(r) => r.start_date,
        }
    }

    pub fn end_date(&self) -> NaiveDate {
        match self {
            DataRequest::Klines(r) => r.end_date,
            DataRequest::Trades(r) => r.end_date,
        }
    }

    /// Every calendar day covered by the request, start and end inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end_date();
        self.start_date().iter_days().take_while(move |d| *d <= end)
    }

    /// Serialise to a JSON object carrying `template_type`.
    pub fn to_value(&self) -> Value {
        // Serialising plain strings, dates and enums into a Value cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Deserialise a JSON object, dispatching on its `template_type`.
    ///
    /// The symbol is normalised and the date range validated exactly as the
    /// constructors do.
    pub fn from_value(value: Value) -> Result<Self, RequestError> {
        let template_type = value
            .get("template_type")
            .ok_or(RequestError::MissingType)?
            .as_str()
            .ok_or(RequestError::MissingType)?;

        if !Self::TEMPLATE_TYPES.contains(&template_type) {
            return Err(RequestError::UnknownType(template_type.to_string()));
        }

        let request: DataRequest =
            serde_json::from_value(value).map_err(|e| RequestError::Malformed(e.to_string()))?;

        Ok(match request {
            DataRequest::Klines(r) => DataRequest::Klines(r.normalized()?),
            DataRequest::Trades(r) => DataRequest::Trades(r.normalized()?),
        })
    }

    /// Parse a JSON document into a request.
    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| RequestError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }
}

impl From<KlinesRequest> for DataRequest {
    fn from(request: KlinesRequest) -> Self {
        DataRequest::Klines(request)
    }
}

impl From<TradesRequest> for DataRequest {
    fn from(request: TradesRequest) -> Self {
        DataRequest::Trades(request)
    }
}

fn normalize_symbol(symbol: &str) -> Result<String, RequestError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(RequestError::EmptySymbol);
    }
    Ok(symbol.to_uppercase())
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), RequestError> {
    if start > end {
        return Err(RequestError::InvalidDateRange { start, end });
    }
    Ok(())
}

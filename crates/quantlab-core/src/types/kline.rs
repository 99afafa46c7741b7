//! Raw archive records: klines and individual trades.

use serde::{Deserialize, Serialize};

use super::{Bar, Interval};

/// One kline row as published in the Binance Vision archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub symbol: String,
    pub interval: Interval,
    /// Open time, Unix milliseconds
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Close time, Unix milliseconds
    pub close_time: i64,
    pub quote_asset_volume: f64,
    pub number_of_trades: i64,
    pub taker_buy_base_asset_volume: f64,
    pub taker_buy_quote_asset_volume: f64,
}

impl Kline {
    /// Project the kline onto the compact bar used by indicators.
    pub fn to_bar(&self) -> Bar {
        Bar::new(
            self.open_time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }
}

/// One executed trade from the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub trade_id: i64,
    pub price: f64,
    pub qty: f64,
    pub quote_qty: f64,
    /// Trade time, Unix milliseconds
    pub trade_time: i64,
    pub is_buyer_maker: bool,
    pub is_best_match: bool,
}

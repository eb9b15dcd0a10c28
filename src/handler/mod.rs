pub mod company_historical_data;
pub mod company_master;
pub mod error;
pub mod gtt_prediction;
pub mod historical_data;
pub mod market_data;
pub mod ohlcv;
pub mod prediction;
pub mod rewrite;
pub mod sentiment;
pub mod watchlist;

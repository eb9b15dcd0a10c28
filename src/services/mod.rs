pub mod ohlcv_fetcher;
pub mod ohlcv_service;
pub mod prediction_service;
pub mod sentiment_service;
pub mod tick_data_service;

pub mod company_historical_data;
pub mod company_master;
pub mod prediction;
pub mod stock_price;
pub mod watchlist;

pub use company_historical_data::{CompanyHistoricalData, NewCompanyHistoricalData};
pub use company_master::{CompanyMaster, NewCompanyMaster};
pub use prediction::{NewPrediction, Prediction};
pub use stock_price::NewStockPrice;
pub use watchlist::{NewWatchlist, Watchlist};

pub mod company_historical_data;
pub mod company_master;
pub mod prediction;
pub mod stock_price;
pub mod watchlist;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

pub mod bigdecimal_parser;
pub mod config;
pub mod logging;
pub mod middleware;
pub mod ticker;
pub mod time;
pub mod upstream;

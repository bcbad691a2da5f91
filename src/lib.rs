pub mod config;
pub mod recv;
pub mod server;
pub mod utils;

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod recommendations;
pub mod seed;

pub use connection::Database;

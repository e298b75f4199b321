//! Database initialization and the report store

pub mod init;
pub mod reports;

pub use init::*;
pub use reports::*;

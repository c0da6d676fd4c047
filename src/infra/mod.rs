//! Infrastructure: database connectivity and repositories.

pub mod db;
pub mod repositories;

pub use db::Database;

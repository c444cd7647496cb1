//! Database implementations

pub mod manager;
pub mod rep_repository;
pub mod sales_repository;

pub use manager::*;
pub use rep_repository::*;
pub use sales_repository::*;

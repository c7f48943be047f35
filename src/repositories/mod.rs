//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM operations
//! for database entities.

pub mod call_log;

pub use call_log::CallLogRepository;

//! # Call Intake Library
//!
//! Webhook receivers for CallRail and Twilio call events: payload decoding,
//! phone normalization, marketing-source attribution, an audit trail and a
//! shared call log.

pub mod attribution;
pub mod audit_log;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod intake;
pub mod models;
pub mod normalization;
pub mod payload;
pub mod providers;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub use migration;

//! # Tenders API Library
//!
//! Tender lifecycle and approval workflow service: status state machine,
//! checklist gating, manager assignment, milestone timelines, and the
//! append-only approval and audit records, exposed over HTTP.

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub mod workflow;
pub use migration;

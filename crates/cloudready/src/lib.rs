//! Cloud readiness gateway: backend client, proxy routes, job polling and
//! the score reconciliation shared by every consumer.

pub mod analysis;
pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod jobs;
pub mod readiness;
pub mod settings;
pub mod telemetry;

//! WeSign test report aggregator library.
//!
//! Collects the artifacts a test run leaves in a workspace, parses TRX,
//! Newman and Playwright reports into common metrics, scores the run and
//! exports, archives or reports the resulting summary.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

//! Integration test suite for the report aggregator.
//!
//! Run with: cargo test --test integration

mod fixtures;

mod test_aggregator;
mod test_cli;

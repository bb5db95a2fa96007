//! Aggregation services.

pub mod aggregator;
pub mod artifacts;
pub mod export;
pub mod parsers;
pub mod qa_intelligence;
pub mod scoring;

pub use aggregator::ReportAggregator;
pub use qa_intelligence::QaIntelligenceReporter;

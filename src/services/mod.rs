pub mod adapters;
pub mod aggregator;
pub mod charts;
pub mod csv_parser;
pub mod hierarchy;
pub mod loader;
pub mod navigator;
pub mod trend;

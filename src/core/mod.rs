pub mod accumulator;
pub mod aggregator;
pub mod command;
pub mod daemon;
pub mod log;
pub mod scheduler;
pub mod splitter;
pub mod tracker;

pub mod aggregator;
pub mod dashboard;
pub mod fetcher;
pub mod filter;
pub mod parser;
pub mod revenue;
pub mod tariffs;

#[cfg(test)]
mod tariffs_test;

pub mod config;
pub mod fetch;
pub mod market;
pub mod output;
pub mod portfolio;
pub mod scoring;

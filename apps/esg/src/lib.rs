//! # esg
//!
//! Command-line front end of the ESG maturity engine.
//!
//! - `cli`: clap commands wiring JSON files and the store to `esg-core`
//! - `config`: TOML config file and setting precedence

pub mod cli;
pub mod config;

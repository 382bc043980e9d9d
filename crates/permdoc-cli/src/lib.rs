//! # permdoc-cli
//!
//! Command-line front end for the permdoc diagnostics engine.
//!
//! ## Features
//!
//! - **check**: full diagnosis of a path or command with remediation steps
//! - **which**: command resolution, including shadowed matches
//! - **path**: search path audit and clean-up
//! - **Educational mode**: `--explain` describes each check before running it
//! - **Multiple output formats**: coloured, plain text, JSON, YAML

pub mod cli;
pub mod config;
pub mod education;
pub mod output;

pub use cli::run;

//! resoscan library: command-line configuration and dispatch for the
//! `resoscan` binary.

pub mod app;
pub mod config;
pub mod errors;

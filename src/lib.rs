pub mod app;
pub mod classify;
pub mod config;
pub mod domain;
pub mod error;
pub mod fasta;
pub mod kraken;
pub mod output;
pub mod partition;
pub mod stats;

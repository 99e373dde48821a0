#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod util;

#![deny(unsafe_code)]
#![deny(unused_must_use)]
#![deny(unexpected_cfgs)]

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;

//! Core building blocks shared by every Slackline crate: the process
//! configuration, the error taxonomy, and local log-file access (path
//! confinement + tail reading).

pub mod config;
pub mod error;
pub mod logfile;

pub use config::{ServerConfig, Transport};
pub use error::{Error, Result};

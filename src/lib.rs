// Public API - only expose the runner module
pub mod runner;

// Internal modules - organized by subsystem
mod config;
mod ddl;
mod error;
mod formats;
mod io;
mod resolver;
mod telemetry;

//! tidecast-cli: configuration, startup and HTTP serving for the
//! sea-level projection pipeline in `tidecast-models`.
pub mod config;
pub mod server;
pub mod startup;

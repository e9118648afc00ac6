//! Clients for public detector data

pub mod gwosc;

pub use gwosc::{GwoscClient, EVENT_CATALOG};

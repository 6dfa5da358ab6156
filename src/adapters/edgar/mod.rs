//! EDGAR filing registry adapter.

pub mod client;

pub use client::EdgarClient;

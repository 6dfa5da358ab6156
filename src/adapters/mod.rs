//! Adapters: concrete implementations of the domain ports.

pub mod backends;
pub mod edgar;
pub mod notify;
pub mod sqlite;

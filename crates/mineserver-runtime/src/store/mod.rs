//! Settings persistence adapters.

mod json;

pub use json::JsonConfigStore;

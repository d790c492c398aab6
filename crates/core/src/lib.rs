//! Core business logic for Pep-Talk.

pub mod services;

pub use services::*;

//! Application form: multi-step form state, validation, and drafts.

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod store;

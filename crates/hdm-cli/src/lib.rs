//! CLI library components for the healthcare data mapper.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;

pub mod args;
pub mod commands;
pub mod error;
pub mod report;
pub mod result;

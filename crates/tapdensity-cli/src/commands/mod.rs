//! CLI command implementations.

pub mod common;
pub mod compensate;
pub mod config;
pub mod groups;
pub mod recommend;
pub mod scenarios;
pub mod sweep;

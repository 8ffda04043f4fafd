//! Macro Tracker Library
//!
//! Daily macro-nutrient logging, goals and progress aggregation.

pub mod aggregate;
pub mod build_info;
pub mod config;
pub mod context;
pub mod db;
pub mod mcp;
pub mod models;
pub mod tools;

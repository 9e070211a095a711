//! Core translation engine module

pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod translator;

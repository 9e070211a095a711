//! HTTP API service

pub mod api;

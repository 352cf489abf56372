//! Sourcing Co-pilot: scripted recruiter chat panel.

pub mod channels;
pub mod config;
pub mod copilot;
pub mod error;
pub mod model;
pub mod repository;

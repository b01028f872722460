//! API handlers

pub mod download;
pub mod health;
pub mod process;

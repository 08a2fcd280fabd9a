//! Library crate for courtsync: session-plan scheduling and live-session
//! presentation for coached court sessions.

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod live;
pub mod plan;
pub mod services;

//! Wire payload types exchanged with the remote session store.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod attendance;
pub mod common;
pub mod drill;
pub mod live;
pub mod plan;
pub mod validation;

/// Render a timestamp as RFC 3339 for wire payloads.
pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

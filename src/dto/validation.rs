//! Field validators applied at the wire boundary.

use validator::ValidationError;

use crate::plan::time::parse_time_str;

/// Require a well-formed "HH:MM" wall-clock string.
pub fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    if parse_time_str(value).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("clock_time")
            .with_message("expected a wall-clock time formatted as HH:MM".into()))
    }
}

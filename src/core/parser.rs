//! Parser for `GET /events` responses
//!
//! The collector returns a JSON array. Entries that do not decode as an
//! [`Event`] are skipped with a warning so one bad posting cannot stall the
//! whole poll cycle.

use serde_json::Value;
use tracing::{trace, warn};

use super::events::Event;
use crate::error::{Error, Result};

/// Parse a poll response body into events, in server order
pub fn parse_events(body: &str) -> Result<Vec<Event>> {
    trace!(len = body.len(), "Parsing events response");

    let json: Value = serde_json::from_str(body)?;
    let Value::Array(entries) = json else {
        return Err(Error::transport("events response is not a JSON array"));
    };

    let mut events = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Event>(entry) {
            Ok(event) => events.push(event),
            Err(e) => warn!(idx, error = %e, "Skipping malformed event"),
        }
    }
    Ok(events)
}

use serde::{Deserialize, Serialize};

/// Flattened view of an emitted event, ready to be logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub event_index: usize,
    pub from_address: String,
    /// First key of the event, the selector of its name.
    pub event_key: String,
    pub keys: Vec<String>,
    pub data: Vec<String>,
}

use crate::{
    basic_elements::felt::{felt_to_hex, felt_to_padded_hex, selector_from_name},
    error::{Error, Result},
    types::{Event, EventDetails, TransactionReceipt},
};

/// Flattens one receipt event for logging.
pub fn extract_event_details(event_index: usize, event: &Event) -> Result<EventDetails> {
    let event_key = event
        .keys
        .first()
        .ok_or_else(|| Error::transport(format!("event #{} has no keys", event_index)))?;

    Ok(EventDetails {
        event_index,
        from_address: felt_to_padded_hex(&event.from_address),
        event_key: felt_to_hex(event_key),
        keys: event.keys.iter().map(felt_to_hex).collect(),
        data: event.data.iter().map(felt_to_hex).collect(),
    })
}

/// Events of `receipt` whose first key is the selector of `event_name`.
pub fn events_named(receipt: &TransactionReceipt, event_name: &str) -> Result<Vec<EventDetails>> {
    let selector = selector_from_name(event_name)?;

    receipt
        .events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.keys.first() == Some(&selector))
        .map(|(index, event)| extract_event_details(index, event))
        .collect()
}

use crate::position::{decode_position, PositionField};
use crate::{Callsign, Fault};
use chrono::{DateTime, Utc};
use core::fmt;

pub const MAX_ITEM_NAME_LEN: usize = 9;
/// Shortest payload that can hold a name, flag and position.
pub const MIN_ITEM_LEN: usize = 19;

/// `)NAME!` (or `_` when killed) followed by a position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemField {
    pub name: String,
    pub live: bool,
    pub position: PositionField,
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = if self.live { '!' } else { '_' };
        write!(f, "){}{flag}{}", self.name, self.position.position)
    }
}

pub fn decode_item(
    payload: &[u8],
    destination: &Callsign,
    now: DateTime<Utc>,
) -> Result<(ItemField, usize), Fault> {
    if payload.len() < MIN_ITEM_LEN {
        return Err(Fault::new(format!(
            "item payload of {} bytes is too short",
            payload.len()
        )));
    }
    let search = &payload[1..payload.len().min(MAX_ITEM_NAME_LEN + 2)];
    let Some(name_len) = search
        .iter()
        .position(|b| *b == b'!' || *b == b'_')
        .filter(|len| *len > 0)
    else {
        return Err(Fault::new("Invalid ITEM packet, missing '!' or '_'."));
    };
    let flag = 1 + name_len;
    let name = String::from_utf8_lossy(&payload[1..flag]).into_owned();
    let live = payload[flag] == b'!';

    let (position, cursor) = decode_position(payload, flag + 1, destination, now);
    Ok((
        ItemField {
            name,
            live,
            position,
        },
        cursor,
    ))
}

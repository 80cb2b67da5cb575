//! JSON body encoding with a size guard.

use serde::{Serialize, de::DeserializeOwned};

use crate::MAX_BODY_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

/// Encodes a payload as a JSON body.
pub fn encode_body<T: Serialize>(payload: &T) -> ProtocolResult<Vec<u8>> {
    let json = serde_json::to_vec(payload)?;
    if json.len() > MAX_BODY_SIZE {
        return Err(ProtocolError::BodyTooLarge {
            size: json.len(),
            max: MAX_BODY_SIZE,
        });
    }
    Ok(json)
}

/// Decodes a JSON body.
///
/// Rejects empty and oversized bodies before parsing.
pub fn decode_body<T: DeserializeOwned>(data: &[u8]) -> ProtocolResult<T> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(ProtocolError::EmptyBody);
    }
    if data.len() > MAX_BODY_SIZE {
        return Err(ProtocolError::BodyTooLarge {
            size: data.len(),
            max: MAX_BODY_SIZE,
        });
    }
    Ok(serde_json::from_slice(data)?)
}

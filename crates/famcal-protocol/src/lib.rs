//! Wire payloads for the famcal REST backend.
//!
//! The rescheduling flow talks to two endpoints:
//!
//! - conflict check: [`ConflictCheckRequest`] → [`ConflictCheckResponse`]
//! - event mutation: [`MutationRequest`] → [`UpdatedEvent`]
//!
//! Bodies are JSON with camelCase field names. Error responses carry an
//! [`ErrorBody`].
//!
//! # Example
//!
//! ```rust
//! use famcal_protocol::{decode_body, encode_body, ConflictCheckResponse};
//!
//! let bytes = encode_body(&ConflictCheckResponse::clear()).unwrap();
//! let decoded: ConflictCheckResponse = decode_body(&bytes).unwrap();
//! assert!(!decoded.has_conflicts());
//! ```

mod codec;
mod error;
mod types;

pub use codec::{decode_body, encode_body};
pub use error::{ProtocolError, ProtocolResult};
pub use types::{
    ConflictCheckRequest, ConflictCheckResponse, ConflictDescriptor, ErrorBody, MutationRequest,
    UpdatedEvent,
};

/// Largest response body the client accepts (1 MB).
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

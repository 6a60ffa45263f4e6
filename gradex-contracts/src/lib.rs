//! Wire contracts for the Gradex assessment protocol.
//!
//! One request/response shape is shared between the inbound signed endpoint
//! and the outbound dispatch client, so a Gradex instance can stand on
//! either side of `POST /v1/exercises/{exerciseId}/automatic-assessment`.

use serde::{Deserialize, Serialize};

/// Signed assessment request envelope.
///
/// `signature` is the lowercase hex HMAC-SHA256 over the undelimited
/// concatenation of exercise id, submission, and decimal timestamp. The
/// construction is kept as-is for wire compatibility; changing it requires
/// a protocol version bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessRequest {
    pub submission: String,
    /// Unix timestamp in seconds at signing time.
    pub timestamp: i64,
    pub signature: String,
}

/// Assessment reply: integer grade and free-form feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessResponse {
    pub grade: i32,
    pub feedback: String,
}

//! ID and timestamp utilities.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a unique conversation ID.
///
/// Returns a UUID v4 string prefixed with "conv_".
///
/// # Example
///
/// ```rust
/// use hubchat_core::identifier::generate_conversation_id;
///
/// let id = generate_conversation_id();
/// assert!(id.starts_with("conv_"));
/// assert_eq!(id.len(), 37);
/// ```
#[must_use]
pub fn generate_conversation_id() -> String {
    format!("conv_{}", Uuid::new_v4().simple())
}

/// Generate a unique send ID, used to correlate log lines of one send.
#[must_use]
pub fn generate_send_id() -> String {
    format!("send_{}", Uuid::new_v4().simple())
}

/// Get the current UTC timestamp.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(generate_conversation_id(), generate_conversation_id());
        assert!(generate_send_id().starts_with("send_"));
    }

    #[test]
    fn test_now_is_monotonic_enough() {
        let a = now_utc();
        let b = now_utc();
        assert!(b >= a);
    }
}

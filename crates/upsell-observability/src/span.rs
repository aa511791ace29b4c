//! Session span.

use tracing::{info_span, Span};
use upsell_commerce::SessionId;

/// Span covering one upsell session.
///
/// The driver enters it for its whole event loop so that every log line of
/// the session carries the session id and collection handle.
pub fn session_span(session_id: &SessionId, collection_handle: &str) -> Span {
    info_span!(
        "upsell_session",
        session_id = %session_id,
        collection = collection_handle
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_span_builds_without_subscriber() {
        let id = SessionId::new("upsell_test");
        let span = session_span(&id, "Merchandise");
        let _guard = span.enter();
    }
}

//! Session lifecycle events.
//!
//! Session expiry and logout are surfaced as explicit events rather
//! than handled inside the client: the hosting application subscribes
//! to the receiver and decides how to route the user.

use tokio::sync::mpsc;

/// Session transitions the hosting application should react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected the credential (HTTP 401); the store has
    /// already been cleared. The host should route to a login boundary.
    Expired,

    /// The user logged out explicitly; the store has been cleared.
    LoggedOut,
}

/// Sending half handed to the client and auth service.
pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receiving half held by the hosting application.
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Create the session event channel.
#[must_use]
pub fn session_event_channel() -> (SessionEventSender, SessionEventReceiver) {
    mpsc::unbounded_channel()
}

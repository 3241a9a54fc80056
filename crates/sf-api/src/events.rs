/// Session changes a UI may want to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was established for `host`.
    Connected { host: String },
    /// The server rejected a token that had been persisted for `host`.
    /// The session was dropped; the user needs to sign in again.
    TokenRejected { host: String, message: String },
    /// The user logged out of `host`.
    LoggedOut { host: String },
}

impl SessionEvent {
    /// The host the event is about.
    pub fn host(&self) -> &str {
        match self {
            SessionEvent::Connected { host }
            | SessionEvent::TokenRejected { host, .. }
            | SessionEvent::LoggedOut { host } => host,
        }
    }
}

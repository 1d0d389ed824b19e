use std::fmt;

/// Telemetry channel lifecycle.
///
/// A fresh open always passes through `Connecting`; once the connection
/// drops the channel stays `Disconnected` until the consuming view is
/// remounted (no automatic reconnect).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ChannelState {
    pub fn is_connected(self) -> bool {
        self == ChannelState::Connected
    }

    /// Legal transitions: Disconnected -> Connecting on open,
    /// Connecting -> Connected on handshake success, and anything active
    /// -> Disconnected on close, error, or failed handshake.
    pub fn can_transition_to(self, next: ChannelState) -> bool {
        use ChannelState::*;
        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
        )
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ChannelState::Disconnected => "disconnected",
            ChannelState::Connecting => "connecting",
            ChannelState::Connected => "connected",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::ChannelState::*;

    #[test]
    fn only_legal_edges_are_allowed() {
        assert!(Disconnected.can_transition_to(Connecting));
        assert!(Connecting.can_transition_to(Connected));
        assert!(Connecting.can_transition_to(Disconnected));
        assert!(Connected.can_transition_to(Disconnected));

        // opening never skips the handshake state
        assert!(!Disconnected.can_transition_to(Connected));
        assert!(!Connected.can_transition_to(Connecting));
        assert!(!Connected.can_transition_to(Connected));
        assert!(!Disconnected.can_transition_to(Disconnected));
    }

    #[test]
    fn connected_flag() {
        assert!(Connected.is_connected());
        assert!(!Connecting.is_connected());
        assert!(!Disconnected.is_connected());
    }
}

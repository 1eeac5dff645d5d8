/// Lifecycle states of a crawl item
///
/// This module defines every state an item can pass through between being
/// discovered and reaching a terminal state.
use std::fmt;

/// Represents the current state of an item in the crawl pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    // ===== Active States =====
    /// URL has been pushed onto the frontier
    Discovered,

    /// URL passed the acceptor chain and is waiting to be fetched
    Accepted,

    /// URL is being probed and fetched
    Fetching,

    /// Response received; waiting to be routed by content kind
    Fetched,

    /// Hypertext body is being scanned for links
    Extracting,

    /// Downloadable body is being handed to the download handlers
    Persisting,

    /// The fetch failed; the item only awaits its visit
    FetchFailed,

    // ===== Terminal States =====
    /// Visitor chain ran; the item is done
    Visited,

    /// An acceptor rejected the URL (or it could not be parsed)
    Rejected,
}

impl ItemState {
    /// Returns true if no further processing happens in this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Visited | Self::Rejected)
    }

    /// Returns true if the pipeline may move an item from `self` to `next`
    pub fn can_transition_to(&self, next: ItemState) -> bool {
        use ItemState::*;

        matches!(
            (self, next),
            (Discovered, Accepted)
                | (Discovered, Rejected)
                | (Accepted, Fetching)
                | (Fetching, FetchFailed)
                | (Fetching, Fetched)
                | (Fetched, Extracting)
                | (Fetched, Persisting)
                | (Fetched, Visited)
                | (Extracting, Visited)
                | (Persisting, Visited)
                | (FetchFailed, Visited)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Accepted => "accepted",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::Extracting => "extracting",
            Self::Persisting => "persisting",
            Self::FetchFailed => "fetch_failed",
            Self::Visited => "visited",
            Self::Rejected => "rejected",
        }
    }

    /// Returns all possible item states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Discovered,
            Self::Accepted,
            Self::Fetching,
            Self::Fetched,
            Self::Extracting,
            Self::Persisting,
            Self::FetchFailed,
            Self::Visited,
            Self::Rejected,
        ]
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(ItemState::Visited.is_terminal());
        assert!(ItemState::Rejected.is_terminal());

        assert!(!ItemState::Discovered.is_terminal());
        assert!(!ItemState::Accepted.is_terminal());
        assert!(!ItemState::Fetching.is_terminal());
        assert!(!ItemState::FetchFailed.is_terminal());
        assert!(!ItemState::Extracting.is_terminal());
    }

    #[test]
    fn test_terminal_states_have_no_successors() {
        for terminal in [ItemState::Visited, ItemState::Rejected] {
            for next in ItemState::all_states() {
                assert!(
                    !terminal.can_transition_to(next),
                    "{} -> {} must be illegal",
                    terminal,
                    next
                );
            }
        }
    }

    #[test]
    fn test_every_active_state_reaches_a_terminal() {
        for state in ItemState::all_states() {
            if state.is_terminal() {
                continue;
            }
            assert!(
                ItemState::all_states()
                    .into_iter()
                    .any(|next| state.can_transition_to(next)),
                "{} has no successor",
                state
            );
        }
    }

    #[test]
    fn test_fetched_routes() {
        assert!(ItemState::Fetched.can_transition_to(ItemState::Extracting));
        assert!(ItemState::Fetched.can_transition_to(ItemState::Persisting));
        assert!(ItemState::Fetched.can_transition_to(ItemState::Visited));
        assert!(!ItemState::Fetched.can_transition_to(ItemState::Rejected));
    }

    #[test]
    fn test_no_revisit() {
        assert!(!ItemState::Visited.can_transition_to(ItemState::Fetching));
        assert!(!ItemState::Extracting.can_transition_to(ItemState::Fetching));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ItemState::Discovered), "discovered");
        assert_eq!(format!("{}", ItemState::FetchFailed), "fetch_failed");
    }
}

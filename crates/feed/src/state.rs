use std::collections::HashSet;

use crate::source::FeedMessage;

/// Messages currently on screen.
///
/// Sorted newest first and unique by id. Messages that showed up for the
/// first time in the most recent poll are highlighted; the initial backlog
/// loaded by the first poll is not.
#[derive(Debug, Default)]
pub struct FeedState {
    messages: Vec<FeedMessage>,
    seen: HashSet<String>,
    highlighted: HashSet<String>,
    polls: u64,
    stale: bool,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one poll result and returns how many messages were new.
    pub fn apply(&mut self, batch: Vec<FeedMessage>) -> usize {
        let first_poll = self.polls == 0;
        self.polls += 1;
        let had_highlights = !self.highlighted.is_empty();
        self.highlighted.clear();

        let mut added = 0;
        for message in batch {
            if !self.seen.insert(message.id.clone()) {
                continue;
            }
            if !first_poll {
                self.highlighted.insert(message.id.clone());
            }
            self.messages.push(message);
            added += 1;
        }

        if added > 0 {
            self.messages.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
        }
        if first_poll || added > 0 || had_highlights {
            self.stale = true;
        }
        added
    }

    /// Whether the last drawn frame no longer matches the state: new
    /// messages arrived, highlights expired, or nothing was drawn yet.
    pub fn needs_redraw(&self) -> bool {
        self.stale
    }

    pub fn mark_drawn(&mut self) {
        self.stale = false;
    }

    pub fn messages(&self) -> &[FeedMessage] {
        &self.messages
    }

    pub fn is_highlighted(&self, message: &FeedMessage) -> bool {
        self.highlighted.contains(&message.id)
    }

    pub fn highlighted_count(&self) -> usize {
        self.highlighted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn message(id: &str, minute: i64) -> FeedMessage {
        FeedMessage {
            id: id.into(),
            display_name: "fan".into(),
            content: format!("message {id}"),
            payment: 10,
            paid: false,
            created_at: Utc.with_ymd_and_hms(2025, 3, 7, 21, 0, 0).unwrap()
                + Duration::minutes(minute),
        }
    }

    fn ids(state: &FeedState) -> Vec<&str> {
        state.messages().iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn first_poll_loads_backlog_without_highlights() {
        let mut state = FeedState::new();
        assert_eq!(state.apply(vec![message("a", 0), message("b", 1)]), 2);
        assert_eq!(ids(&state), vec!["b", "a"]);
        assert_eq!(state.highlighted_count(), 0);
    }

    #[test]
    fn later_polls_highlight_only_new_messages() {
        let mut state = FeedState::new();
        state.apply(vec![message("a", 0)]);

        assert_eq!(state.apply(vec![message("c", 2), message("a", 0)]), 1);
        assert_eq!(ids(&state), vec!["c", "a"]);
        assert!(state.is_highlighted(&state.messages()[0]));
        assert!(!state.is_highlighted(&state.messages()[1]));

        // Highlights only last for one poll.
        assert_eq!(state.apply(vec![message("c", 2), message("a", 0)]), 0);
        assert_eq!(state.highlighted_count(), 0);
    }

    #[test]
    fn redraw_is_due_when_highlights_expire() {
        let mut state = FeedState::new();
        assert!(!state.needs_redraw());

        state.apply(Vec::new());
        assert!(state.needs_redraw(), "an empty show still gets a first frame");
        state.mark_drawn();

        state.apply(vec![message("a", 0)]);
        assert!(state.needs_redraw());
        state.mark_drawn();

        state.apply(vec![message("a", 0)]);
        assert!(state.needs_redraw(), "highlight on `a` has to be cleared");
        state.mark_drawn();

        state.apply(vec![message("a", 0)]);
        assert!(!state.needs_redraw());
    }

    #[test]
    fn duplicates_within_a_batch_are_dropped() {
        let mut state = FeedState::new();
        assert_eq!(state.apply(vec![message("a", 0), message("a", 0)]), 1);
        assert_eq!(state.messages().len(), 1);
    }
}

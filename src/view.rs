//! Per-view fetch bookkeeping. A view is mounted, issues its fetches once and
//! may be torn down before they resolve; results tagged with an older mount
//! are dropped instead of being applied.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    epoch: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum Snapshot<T> {
    Loading,
    Loaded(T),
    /// `stale` holds whatever was on screen before the failed fetch
    Failed { stale: Option<T>, message: String },
}

#[derive(Debug)]
pub struct ViewState<T> {
    epoch: u64,
    mounted: bool,
    snapshot: Snapshot<T>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            epoch: 0,
            mounted: true,
            snapshot: Snapshot::Loading,
        }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> FetchTicket {
        FetchTicket { epoch: self.epoch }
    }

    pub fn unmount(&mut self) {
        self.epoch += 1;
        self.mounted = false;
    }

    /// Replaces the current mount with a fresh one. Tickets issued before the
    /// call are discarded and the previous data is dropped.
    pub fn remount(&mut self) {
        self.unmount();
        self.mounted = true;
        self.snapshot = Snapshot::Loading;
    }

    /// Applies a fetch result. Returns false when the result was discarded
    /// because the view was unmounted after the ticket was issued.
    pub fn complete<E: Display>(&mut self, ticket: FetchTicket, result: Result<T, E>) -> bool {
        if !self.mounted || ticket.epoch != self.epoch {
            tracing::debug!(
                ticket = ticket.epoch,
                current = self.epoch,
                "discarding result for unmounted view"
            );
            return false;
        }

        self.snapshot = match result {
            Ok(data) => Snapshot::Loaded(data),
            Err(e) => {
                let previous = std::mem::replace(&mut self.snapshot, Snapshot::Loading);
                let stale = match previous {
                    Snapshot::Loaded(data) => Some(data),
                    Snapshot::Failed { stale, .. } => stale,
                    Snapshot::Loading => None,
                };
                Snapshot::Failed {
                    stale,
                    message: e.to_string(),
                }
            }
        };
        true
    }

    /// Fresh data, or the stale data kept across a failure
    pub fn data(&self) -> Option<&T> {
        match &self.snapshot {
            Snapshot::Loaded(data) => Some(data),
            Snapshot::Failed { stale, .. } => stale.as_ref(),
            Snapshot::Loading => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.snapshot {
            Snapshot::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_applied_while_mounted() {
        let mut view: ViewState<Vec<u32>> = ViewState::new();
        let ticket = view.begin();

        assert!(view.complete::<String>(ticket, Ok(vec![1, 2])));
        assert_eq!(view.data(), Some(&vec![1, 2]));
        assert!(view.error().is_none());
    }

    #[test]
    fn test_result_after_unmount_is_discarded() {
        let mut view: ViewState<Vec<u32>> = ViewState::new();
        let ticket = view.begin();
        view.unmount();

        assert!(!view.complete::<String>(ticket, Ok(vec![1])));
        assert!(view.data().is_none());
        assert!(view.error().is_none());
    }

    #[test]
    fn test_remount_discards_tickets_from_the_previous_mount() {
        let mut view: ViewState<Vec<u32>> = ViewState::new();
        let first = view.begin();
        view.complete::<String>(first, Ok(vec![1, 2, 3]));
        let in_flight = view.begin();

        view.remount();
        assert!(view.data().is_none());

        assert!(!view.complete::<String>(in_flight, Ok(vec![9])));
        assert!(view.data().is_none());

        let fresh = view.begin();
        assert!(view.complete::<String>(fresh, Ok(vec![1, 3])));
        assert_eq!(view.data(), Some(&vec![1, 3]));
    }

    #[test]
    fn test_failure_keeps_previous_data_as_stale() {
        let mut view: ViewState<Vec<u32>> = ViewState::new();
        let first = view.begin();
        view.complete::<String>(first, Ok(vec![7]));

        let second = view.begin();
        view.complete(second, Err("store unreachable"));

        assert_eq!(view.data(), Some(&vec![7]));
        assert_eq!(view.error(), Some("store unreachable"));

        let third = view.begin();
        view.complete(third, Err("still unreachable"));
        assert_eq!(view.data(), Some(&vec![7]));
    }

    #[test]
    fn test_failure_on_first_load_has_no_data() {
        let mut view: ViewState<Vec<u32>> = ViewState::new();
        let ticket = view.begin();
        view.complete(ticket, Err("boom"));
        assert!(view.data().is_none());
    }
}

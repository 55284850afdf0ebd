//! # In-flight invocation tracker.
//!
//! Records which async invocations are currently running so a drain that hits
//! its deadline can report the listeners that were still busy.
//!
//! ```text
//! worker ──► InFlight::enter(inv) ──► guard ──(drop)──► entry removed
//!                                        │
//!                       drain timeout ──►└── snapshot() → ["mailer", ...]
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// One running invocation.
#[derive(Debug, Clone)]
struct Entry {
    listener: String,
    event_seq: u64,
}

#[derive(Default)]
struct State {
    next: u64,
    running: HashMap<u64, Entry>,
}

/// Thread-safe set of running invocations.
#[derive(Default)]
pub(crate) struct InFlight {
    state: Mutex<State>,
}

impl InFlight {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Marks an invocation as running until the returned guard is dropped.
    pub(crate) fn enter(self: &Arc<Self>, listener: &str, event_seq: u64) -> InFlightGuard {
        let mut st = self.state.lock();
        let id = st.next;
        st.next += 1;
        st.running.insert(
            id,
            Entry {
                listener: listener.to_owned(),
                event_seq,
            },
        );
        InFlightGuard {
            owner: Arc::clone(self),
            id,
        }
    }

    /// Number of running invocations.
    pub(crate) fn len(&self) -> usize {
        self.state.lock().running.len()
    }

    /// Sorted `listener#event_seq` labels of running invocations.
    pub(crate) fn snapshot(&self) -> Vec<String> {
        let st = self.state.lock();
        let mut names: Vec<String> = st
            .running
            .values()
            .map(|e| format!("{}#{}", e.listener, e.event_seq))
            .collect();
        names.sort_unstable();
        names
    }
}

/// Removes its entry on drop (including when the worker is aborted).
pub(crate) struct InFlightGuard {
    owner: Arc<InFlight>,
    id: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owner.state.lock().running.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_scopes_entry() {
        let t = InFlight::new();
        let a = t.enter("mailer", 3);
        {
            let _b = t.enter("audit", 4);
            assert_eq!(t.len(), 2);
            assert_eq!(t.snapshot(), ["audit#4", "mailer#3"]);
        }
        assert_eq!(t.snapshot(), ["mailer#3"]);
        drop(a);
        assert_eq!(t.len(), 0);
    }
}

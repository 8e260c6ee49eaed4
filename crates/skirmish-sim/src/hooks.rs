//! One-shot host callbacks for notable simulation events.
//!
//! A hook runs once, the first time a matching event is dispatched, and is
//! then dropped. Every event also appears in the snapshot, so hooks are an
//! optional convenience for hosts that prefer push notification.

use std::fmt;

use skirmish_core::events::SimEvent;

/// Events a host may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    HostileDeath,
    AllWavesComplete,
    MissionComplete,
    DialogComplete,
}

impl HookKind {
    /// The hook kind an event triggers, if any.
    pub fn of(event: &SimEvent) -> Option<HookKind> {
        match event {
            SimEvent::HostileDied { .. } => Some(HookKind::HostileDeath),
            SimEvent::AllWavesComplete => Some(HookKind::AllWavesComplete),
            SimEvent::MissionComplete => Some(HookKind::MissionComplete),
            SimEvent::DialogComplete { .. } => Some(HookKind::DialogComplete),
            _ => None,
        }
    }
}

pub type Hook = Box<dyn FnOnce(&SimEvent) + Send>;

#[derive(Default)]
pub struct EventHooks {
    pending: Vec<(HookKind, Hook)>,
}

impl fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHooks")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl EventHooks {
    /// Register a closure to run on the next event of `kind`.
    pub fn register(&mut self, kind: HookKind, hook: impl FnOnce(&SimEvent) + Send + 'static) {
        self.pending.push((kind, Box::new(hook)));
    }

    /// Run and drop every hook matched by `events`, in event order.
    pub fn dispatch(&mut self, events: &[SimEvent]) {
        if self.pending.is_empty() {
            return;
        }
        for event in events {
            let Some(kind) = HookKind::of(event) else {
                continue;
            };
            let (matched, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|(k, _)| *k == kind);
            self.pending = rest;
            for (_, hook) in matched {
                hook(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn hook_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut hooks = EventHooks::default();
        let c = calls.clone();
        hooks.register(HookKind::AllWavesComplete, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        hooks.dispatch(&[SimEvent::AllWavesComplete, SimEvent::AllWavesComplete]);
        hooks.dispatch(&[SimEvent::AllWavesComplete]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(hooks.is_empty());
    }

    #[test]
    fn unrelated_events_keep_hook() {
        let mut hooks = EventHooks::default();
        hooks.register(HookKind::MissionComplete, |_| {});
        hooks.dispatch(&[SimEvent::AllWavesComplete]);
        assert_eq!(hooks.len(), 1);
    }
}

//! Recording upper-layer client.

use crate::hal::critical;
use crate::mac::{BackoffClient, RxTxHooks};
use std::cell::RefCell;

/// A callback delivered to the upper layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    Rollover,
    Trigger,
    RxHaltCleanup,
    StartQueuedFrame,
}

/// Upper layer that records each callback together with whether it ran
/// inside a critical section.
#[derive(Debug, Default)]
pub struct SimClient {
    events: RefCell<Vec<(ClientEvent, bool)>>,
}

impl SimClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.borrow().iter().map(|(event, _)| *event).collect()
    }

    /// Events paired with "interrupts were disabled when it was delivered".
    pub fn events_with_context(&self) -> Vec<(ClientEvent, bool)> {
        self.events.borrow().clone()
    }

    pub fn count(&self, event: ClientEvent) -> usize {
        self.events.borrow().iter().filter(|(e, _)| *e == event).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: ClientEvent) {
        let in_critical = critical::interrupts_disabled();
        self.events.borrow_mut().push((event, in_critical));
    }
}

impl BackoffClient for SimClient {
    fn rollover(&self) {
        self.record(ClientEvent::Rollover);
    }

    fn trigger(&self) {
        self.record(ClientEvent::Trigger);
    }
}

impl RxTxHooks for SimClient {
    fn rx_halt_cleanup(&self) {
        self.record(ClientEvent::RxHaltCleanup);
    }

    fn start_queued_frame(&self) {
        self.record(ClientEvent::StartQueuedFrame);
    }
}

//! Queue-based signalling between components.
//!
//! Trackers and triggers never call into a sequencer directly. Each leaf
//! holds a `SignalSender` cloned from the sequencer's `SignalQueue`, pushes
//! while the world is being advanced, and the sequencer drains at the start
//! of its own tick. Delivery order within a tick is push order.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Receiving half. Owned by the component that reacts to the signals.
#[derive(Debug)]
pub struct SignalQueue<T> {
    inner: Rc<RefCell<VecDeque<T>>>,
}

/// Sending half, freely cloneable into leaf components.
#[derive(Debug)]
pub struct SignalSender<T> {
    inner: Rc<RefCell<VecDeque<T>>>,
}

impl<T> SignalQueue<T> {
    pub fn new() -> Self {
        SignalQueue {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn sender(&self) -> SignalSender<T> {
        SignalSender {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Takes everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl<T> Default for SignalQueue<T> {
    fn default() -> Self {
        SignalQueue::new()
    }
}

impl<T> SignalSender<T> {
    pub fn send(&self, signal: T) {
        self.inner.borrow_mut().push_back(signal);
    }
}

impl<T> Clone for SignalSender<T> {
    fn clone(&self) -> Self {
        SignalSender {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// External request to play a script line, queued by triggers and UI
/// buttons. `force` bypasses the chapter 1 strict-order gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayRequest {
    pub index: usize,
    pub force: bool,
}

impl PlayRequest {
    pub fn ordered(index: usize) -> Self {
        PlayRequest {
            index,
            force: false,
        }
    }

    pub fn forced(index: usize) -> Self {
        PlayRequest { index, force: true }
    }
}

/// World-state notifications chapter 1 reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ch1Signal {
    /// A seed landed in the pot with this id for the first time.
    SeedPlaced(usize),
    /// The watering step completed.
    WateringDone,
}

/// World-state notifications chapter 3 reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ch3Signal {
    /// A membership pot crossed its satisfied/unsatisfied edge.
    PotStatusChanged { pot: usize, satisfied: bool },
    /// A dosing pot's running total reached its requirement. Fired once;
    /// the total never decrements.
    DoseSatisfied { pot: usize },
    /// The ruler has been snapped to all measurement zones at least once.
    AllZonesMeasured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_send_order() {
        let queue = SignalQueue::new();
        let a = queue.sender();
        let b = queue.sender();
        a.send(PlayRequest::ordered(1));
        b.send(PlayRequest::forced(2));
        a.send(PlayRequest::ordered(3));
        assert_eq!(
            queue.drain(),
            vec![
                PlayRequest::ordered(1),
                PlayRequest::forced(2),
                PlayRequest::ordered(3),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn senders_outlive_drains() {
        let queue = SignalQueue::new();
        let sender = queue.sender();
        sender.send(Ch1Signal::WateringDone);
        assert_eq!(queue.drain(), vec![Ch1Signal::WateringDone]);
        sender.send(Ch1Signal::SeedPlaced(4));
        assert_eq!(queue.drain(), vec![Ch1Signal::SeedPlaced(4)]);
    }
}

#![forbid(unsafe_code)]

//! Fire-and-forget notification bus.
//!
//! # Design
//!
//! A [`Notifier<E>`] is a cloneable handle to a shared subscriber list
//! (`Rc<RefCell<..>>`). Components that change observable state hold a
//! clone and call [`Notifier::emit`]; external panels call
//! [`Notifier::subscribe`] and keep the returned [`Subscription`] alive for
//! as long as they want to hear about changes.
//!
//! # Invariants
//!
//! 1. Subscribers are called in registration order.
//! 2. A dropped [`Subscription`] is never called again; its slot is pruned
//!    lazily on the next `emit`.
//! 3. `emit` holds no borrow while callbacks run, so a callback may
//!    subscribe or emit re-entrantly.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use plotgrid_core::GridCoordinate;
use tracing::trace;

use crate::router::SurfaceId;

type CallbackRc<E> = Rc<dyn Fn(&E)>;
type CallbackWeak<E> = Weak<dyn Fn(&E)>;

/// Everything the runtime tells the outside world about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The committed selection changed; `count` is the new size.
    SelectionChanged { count: usize },
    /// A surface was pushed onto the router's stack.
    SurfaceOpened { id: SurfaceId },
    /// A surface was removed from the router's stack.
    SurfaceClosed { id: SurfaceId },
    /// Escape was pressed with no active surface to dismiss.
    DefaultMenuRequested,
    /// A bound action key was pressed.
    ActionRequested {
        action: String,
        targets: Vec<GridCoordinate>,
    },
}

impl Notification {
    /// Short label for tracing fields.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SelectionChanged { .. } => "selection_changed",
            Self::SurfaceOpened { .. } => "surface_opened",
            Self::SurfaceClosed { .. } => "surface_closed",
            Self::DefaultMenuRequested => "default_menu_requested",
            Self::ActionRequested { .. } => "action_requested",
        }
    }
}

/// Shared subscriber list for events of type `E`.
///
/// Cloning a `Notifier` creates a new handle to the **same** subscribers.
pub struct Notifier<E> {
    subscribers: Rc<RefCell<Vec<CallbackWeak<E>>>>,
}

impl<E> Clone for Notifier<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<E: 'static> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl<E: 'static> Notifier<E> {
    /// A notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It is called for every event until the returned
    /// guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let strong: CallbackRc<E> = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Deliver `event` to every live subscriber.
    pub fn emit(&self, event: E) {
        let callbacks: Vec<CallbackRc<E>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|w| w.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        trace!(subscribers = callbacks.len(), "notify");
        for cb in &callbacks {
            cb(&event);
        }
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<E: Clone + 'static> Notifier<E> {
    /// Subscribe a recorder that keeps a copy of every event.
    #[must_use]
    pub fn recorder(&self) -> Recorder<E> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let subscription = self.subscribe(move |event: &E| sink.borrow_mut().push(event.clone()));
        Recorder {
            log,
            _subscription: subscription,
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping it makes the callback unreachable: the only strong `Rc` goes
/// away and the notifier's `Weak` stops upgrading.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

/// Collects every event delivered while it is alive.
pub struct Recorder<E> {
    log: Rc<RefCell<Vec<E>>>,
    _subscription: Subscription,
}

impl<E: Clone> Recorder<E> {
    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<E> {
        self.log.borrow().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }
}

impl<E> fmt::Debug for Recorder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("len", &self.log.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn debug_reports_subscriber_count() {
        let notifier = Notifier::<Notification>::new();
        let _sub = notifier.subscribe(|_| {});
        assert_eq!(format!("{notifier:?}"), "Notifier { subscriber_count: 1 }");
    }

    #[test]
    fn subscribers_called_in_order() {
        let notifier = Notifier::<u32>::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&order);
        let b = Rc::clone(&order);
        let _s1 = notifier.subscribe(move |v| a.borrow_mut().push(("a", *v)));
        let _s2 = notifier.subscribe(move |v| b.borrow_mut().push(("b", *v)));
        notifier.emit(7);
        assert_eq!(*order.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn dropped_subscription_is_pruned() {
        let notifier = Notifier::<u32>::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = notifier.subscribe(move |_| h.set(h.get() + 1));
        notifier.emit(1);
        drop(sub);
        notifier.emit(2);
        assert_eq!(hits.get(), 1);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn clones_share_subscribers() {
        let notifier = Notifier::<Notification>::new();
        let rec = notifier.recorder();
        let other = notifier.clone();
        other.emit(Notification::DefaultMenuRequested);
        assert_eq!(rec.events(), vec![Notification::DefaultMenuRequested]);
    }

    #[test]
    fn reentrant_emit_does_not_panic() {
        let notifier = Notifier::<u32>::new();
        let inner = notifier.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = notifier.subscribe(move |v| {
            s.borrow_mut().push(*v);
            if *v == 0 {
                inner.emit(1);
            }
        });
        notifier.emit(0);
        assert_eq!(*seen.borrow(), vec![0, 1]);
    }

    #[test]
    fn recorder_take_drains() {
        let notifier = Notifier::<u8>::new();
        let rec = notifier.recorder();
        notifier.emit(1);
        notifier.emit(2);
        assert_eq!(rec.take(), vec![1, 2]);
        assert!(rec.is_empty());
    }
}

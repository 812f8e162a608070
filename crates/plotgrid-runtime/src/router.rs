#![forbid(unsafe_code)]

//! Layered input routing.
//!
//! The [`InputRouter`] owns a [`SurfaceStack`] of overlay surfaces (modal
//! panels, shell shortcuts) and a default consumer (normally the grid).
//! Every event is claimed by exactly one layer or falls through.
//!
//! # Dispatch order
//!
//! 1. `Resize` and `FocusLost` go straight to the default consumer, which
//!    owns the layout and the drag session.
//! 2. An Escape press is a stack operation: the topmost *active* surface is
//!    popped. With none active, [`Notification::DefaultMenuRequested`] fires.
//!    Escape repeats and releases are swallowed; no layer sees them.
//! 3. Otherwise active surfaces are offered the event top-down; the first
//!    to return [`Handled::Consumed`] wins.
//! 4. Unclaimed events go to the default consumer; if it declines, the
//!    event is [`Dispatch::Unhandled`] and belongs to the host's background.
//!
//! # Invariants
//!
//! 1. A surface id appears in the stack at most once.
//! 2. `push` and `pop` emit one notification each, and only when they change
//!    the stack.
//! 3. A surface that is already borrowed elsewhere is skipped, never
//!    double-borrowed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use plotgrid_core::event::InputEvent;
use tracing::{debug, debug_span, trace, warn};

use crate::notify::{Notification, Notifier};

/// Stable identity of an input surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SurfaceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Whether a layer claimed an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Handled {
    Consumed,
    Ignored,
}

impl Handled {
    #[inline]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

impl From<bool> for Handled {
    fn from(consumed: bool) -> Self {
        if consumed { Self::Consumed } else { Self::Ignored }
    }
}

/// One input-claiming layer.
pub trait InputSurface {
    /// Identity used for stack uniqueness and notifications.
    fn id(&self) -> &SurfaceId;

    /// Inactive surfaces stay on the stack but see no input and are skipped
    /// by Escape.
    fn is_active(&self) -> bool {
        true
    }

    /// Offer `event`; return [`Handled::Consumed`] to claim it.
    fn handle(&mut self, event: &InputEvent) -> Handled;

    /// Called after Escape removed this surface from the stack.
    fn dismissed(&mut self) {}

    /// Called when another layer takes over input (e.g. a surface opens on
    /// top). Transient interaction state should be dropped.
    fn interrupt(&mut self) {}
}

/// Shared handle to a stacked surface.
pub type SurfaceHandle = Rc<RefCell<dyn InputSurface>>;

/// Ordered overlay surfaces; the last pushed is checked first.
#[derive(Default)]
pub struct SurfaceStack {
    entries: Vec<(SurfaceId, SurfaceHandle)>,
}

impl fmt::Debug for SurfaceStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|(id, _)| id)).finish()
    }
}

impl SurfaceStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `surface` under `id`. Returns `false` if `id` is present.
    pub fn push(&mut self, id: SurfaceId, surface: SurfaceHandle) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.entries.push((id, surface));
        true
    }

    /// Remove the surface with `id`.
    pub fn remove(&mut self, id: &SurfaceId) -> Option<SurfaceHandle> {
        let pos = self.entries.iter().position(|(entry, _)| entry == id)?;
        Some(self.entries.remove(pos).1)
    }

    #[must_use]
    pub fn contains(&self, id: &SurfaceId) -> bool {
        self.entries.iter().any(|(entry, _)| entry == id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids bottom to top.
    pub fn ids(&self) -> impl Iterator<Item = &SurfaceId> {
        self.entries.iter().map(|(id, _)| id)
    }

    /// Id of the highest active surface.
    #[must_use]
    pub fn topmost_active(&self) -> Option<SurfaceId> {
        self.entries
            .iter()
            .rev()
            .find(|(_, surface)| is_active(surface))
            .map(|(id, _)| id.clone())
    }

    /// Whether any surface is active.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.entries.iter().any(|(_, surface)| is_active(surface))
    }

    /// Handles top to bottom, cloned so surfaces can be borrowed freely.
    fn top_down(&self) -> Vec<(SurfaceId, SurfaceHandle)> {
        self.entries
            .iter()
            .rev()
            .map(|(id, surface)| (id.clone(), Rc::clone(surface)))
            .collect()
    }
}

fn is_active(surface: &SurfaceHandle) -> bool {
    surface.try_borrow().is_ok_and(|s| s.is_active())
}

/// Result of routing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Escape popped this surface.
    Dismissed(SurfaceId),
    /// Escape found no active surface; the default menu was requested.
    MenuRequested,
    /// An Escape repeat or release. Escape is never routed, so nothing
    /// happened.
    Swallowed,
    /// A stacked surface claimed the event.
    Surface(SurfaceId),
    /// The default consumer claimed the event.
    Default,
    /// Nobody claimed the event.
    Unhandled,
}

impl Dispatch {
    /// Whether some layer of the router claimed the event.
    #[inline]
    #[must_use]
    pub const fn consumed(&self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

/// Routes input through the surface stack to a default consumer.
pub struct InputRouter<D> {
    stack: SurfaceStack,
    default: D,
    notifier: Notifier<Notification>,
}

impl<D: fmt::Debug> fmt::Debug for InputRouter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputRouter")
            .field("stack", &self.stack)
            .field("default", &self.default)
            .finish()
    }
}

impl<D: InputSurface> InputRouter<D> {
    /// A router with an empty stack in front of `default`.
    pub fn new(default: D, notifier: Notifier<Notification>) -> Self {
        Self {
            stack: SurfaceStack::new(),
            default,
            notifier,
        }
    }

    /// Push `surface` on top. A no-op returning `false` if its id is
    /// already stacked.
    ///
    /// Opening a surface interrupts the default consumer.
    pub fn push(&mut self, surface: SurfaceHandle) -> bool {
        let Ok(id) = surface.try_borrow().map(|s| s.id().clone()) else {
            warn!("surface borrowed during push; ignored");
            return false;
        };
        if self.stack.contains(&id) {
            debug!(%id, "surface already open");
            return false;
        }
        self.default.interrupt();
        self.stack.push(id.clone(), surface);
        debug!(%id, depth = self.stack.len(), "surface opened");
        self.notifier.emit(Notification::SurfaceOpened { id });
        true
    }

    /// Remove the surface `id`. A no-op returning `false` if absent.
    pub fn pop(&mut self, id: &SurfaceId) -> bool {
        self.close(id).is_some()
    }

    fn close(&mut self, id: &SurfaceId) -> Option<SurfaceHandle> {
        let surface = self.stack.remove(id)?;
        debug!(%id, depth = self.stack.len(), "surface closed");
        self.notifier
            .emit(Notification::SurfaceClosed { id: id.clone() });
        Some(surface)
    }

    /// Route `event` to exactly one layer.
    pub fn dispatch(&mut self, event: &InputEvent) -> Dispatch {
        let _span = debug_span!("input.dispatch", event = event.label()).entered();

        if event.is_lifecycle() {
            return self.to_default(event);
        }

        if event.is_escape_press() {
            return match self.stack.topmost_active() {
                Some(id) => {
                    if let Some(surface) = self.close(&id) {
                        let dismissed = surface.try_borrow_mut().map(|mut s| s.dismissed());
                        if dismissed.is_err() {
                            warn!(%id, "surface borrowed during dismiss");
                        }
                    }
                    Dispatch::Dismissed(id)
                }
                None => {
                    debug!("escape with no overlay; default menu requested");
                    self.notifier.emit(Notification::DefaultMenuRequested);
                    Dispatch::MenuRequested
                }
            };
        }
        if event.is_escape() {
            trace!("escape repeat swallowed");
            return Dispatch::Swallowed;
        }

        for (id, surface) in self.stack.top_down() {
            let Ok(mut s) = surface.try_borrow_mut() else {
                warn!(%id, "surface borrowed during dispatch; skipped");
                continue;
            };
            if s.is_active() && s.handle(event).is_consumed() {
                return Dispatch::Surface(id);
            }
        }

        self.to_default(event)
    }

    fn to_default(&mut self, event: &InputEvent) -> Dispatch {
        if self.default.handle(event).is_consumed() {
            Dispatch::Default
        } else {
            Dispatch::Unhandled
        }
    }

    /// Whether any stacked surface is active.
    #[must_use]
    pub fn is_overlay_active(&self) -> bool {
        self.stack.any_active()
    }

    #[must_use]
    pub fn stack(&self) -> &SurfaceStack {
        &self.stack
    }

    #[must_use]
    pub fn default_consumer(&self) -> &D {
        &self.default
    }

    pub fn default_consumer_mut(&mut self) -> &mut D {
        &mut self.default
    }

    /// The bus this router reports to.
    #[must_use]
    pub fn notifier(&self) -> &Notifier<Notification> {
        &self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotgrid_core::event::{KeyCode, KeyEvent, KeyEventKind, PointerEvent};
    use plotgrid_core::ScreenPoint;

    struct Panel {
        id: SurfaceId,
        active: bool,
        claims: bool,
        seen: usize,
        dismissed: usize,
        interrupted: usize,
    }

    impl Panel {
        fn new(id: &str, claims: bool) -> Self {
            Self {
                id: SurfaceId::new(id),
                active: true,
                claims,
                seen: 0,
                dismissed: 0,
                interrupted: 0,
            }
        }

        fn shared(self) -> Rc<RefCell<Panel>> {
            Rc::new(RefCell::new(self))
        }
    }

    impl InputSurface for Panel {
        fn id(&self) -> &SurfaceId {
            &self.id
        }
        fn is_active(&self) -> bool {
            self.active
        }
        fn handle(&mut self, _event: &InputEvent) -> Handled {
            self.seen += 1;
            self.claims.into()
        }
        fn dismissed(&mut self) {
            self.dismissed += 1;
        }
        fn interrupt(&mut self) {
            self.interrupted += 1;
        }
    }

    fn escape() -> InputEvent {
        InputEvent::Key(KeyEvent::new(KeyCode::Escape))
    }

    fn click() -> InputEvent {
        InputEvent::Pointer(PointerEvent::tap(ScreenPoint::new(1.0, 1.0)))
    }

    fn router(default_claims: bool) -> (InputRouter<Panel>, crate::notify::Recorder<Notification>) {
        let notifier = Notifier::new();
        let rec = notifier.recorder();
        (InputRouter::new(Panel::new("grid", default_claims), notifier), rec)
    }

    #[test]
    fn push_is_idempotent() {
        let (mut r, rec) = router(true);
        let menu = Panel::new("menu", true).shared();
        assert!(r.push(menu.clone()));
        assert!(!r.push(menu));
        assert_eq!(r.stack().len(), 1);
        assert_eq!(
            rec.events(),
            vec![Notification::SurfaceOpened { id: "menu".into() }]
        );
        assert_eq!(r.default_consumer().interrupted, 1);
    }

    #[test]
    fn pop_absent_is_noop() {
        let (mut r, rec) = router(true);
        assert!(!r.pop(&"nothing".into()));
        assert!(rec.is_empty());
    }

    #[test]
    fn pop_emits_without_dismiss_hook() {
        let (mut r, rec) = router(true);
        let menu = Panel::new("menu", true).shared();
        r.push(menu.clone());
        rec.take();
        assert!(r.pop(&"menu".into()));
        assert_eq!(rec.events(), vec![Notification::SurfaceClosed { id: "menu".into() }]);
        assert_eq!(menu.borrow().dismissed, 0);
    }

    #[test]
    fn top_surface_claims_first() {
        let (mut r, _rec) = router(true);
        let lower = Panel::new("lower", true).shared();
        let upper = Panel::new("upper", true).shared();
        r.push(lower.clone());
        r.push(upper.clone());
        assert_eq!(r.dispatch(&click()), Dispatch::Surface("upper".into()));
        assert_eq!(lower.borrow().seen, 0);
        assert_eq!(r.default_consumer().seen, 0);
    }

    #[test]
    fn declining_surfaces_fall_through() {
        let (mut r, _rec) = router(true);
        let passive = Panel::new("hud", false).shared();
        r.push(passive.clone());
        assert_eq!(r.dispatch(&click()), Dispatch::Default);
        assert_eq!(passive.borrow().seen, 1);
    }

    #[test]
    fn unclaimed_event_is_unhandled() {
        let (mut r, _rec) = router(false);
        let d = r.dispatch(&click());
        assert_eq!(d, Dispatch::Unhandled);
        assert!(!d.consumed());
    }

    #[test]
    fn inactive_surfaces_are_skipped() {
        let (mut r, rec) = router(true);
        let mut hidden = Panel::new("hidden", true);
        hidden.active = false;
        let hidden = hidden.shared();
        r.push(hidden.clone());
        assert!(!r.is_overlay_active());
        assert_eq!(r.dispatch(&click()), Dispatch::Default);
        assert_eq!(hidden.borrow().seen, 0);

        rec.take();
        assert_eq!(r.dispatch(&escape()), Dispatch::MenuRequested);
        assert_eq!(r.stack().len(), 1);
        assert_eq!(rec.events(), vec![Notification::DefaultMenuRequested]);
    }

    #[test]
    fn escape_pops_topmost_active_only() {
        let (mut r, rec) = router(true);
        let a = Panel::new("a", true).shared();
        let b = Panel::new("b", true).shared();
        r.push(a.clone());
        r.push(b.clone());
        rec.take();

        assert_eq!(r.dispatch(&escape()), Dispatch::Dismissed("b".into()));
        assert_eq!(b.borrow().dismissed, 1);
        assert_eq!(b.borrow().seen, 0);
        assert_eq!(a.borrow().dismissed, 0);
        assert_eq!(r.stack().ids().cloned().collect::<Vec<_>>(), vec![SurfaceId::new("a")]);
        assert_eq!(rec.events(), vec![Notification::SurfaceClosed { id: "b".into() }]);
    }

    #[test]
    fn held_escape_is_swallowed() {
        let (mut r, rec) = router(true);
        let menu = Panel::new("menu", true).shared();
        r.push(menu.clone());
        rec.take();

        for kind in [KeyEventKind::Repeat, KeyEventKind::Release] {
            let held = InputEvent::Key(KeyEvent::new(KeyCode::Escape).with_kind(kind));
            assert_eq!(r.dispatch(&held), Dispatch::Swallowed);
        }
        assert_eq!(r.stack().len(), 1);
        assert_eq!(menu.borrow().seen, 0);
        assert_eq!(menu.borrow().dismissed, 0);
        assert_eq!(r.default_consumer().seen, 0);
        assert!(rec.is_empty());

        r.pop(&"menu".into());
        rec.take();
        let repeat = InputEvent::Key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Repeat));
        assert_eq!(r.dispatch(&repeat), Dispatch::Swallowed);
        assert!(rec.is_empty());
    }

    #[test]
    fn lifecycle_events_bypass_stack() {
        let (mut r, _rec) = router(true);
        let modal = Panel::new("modal", true).shared();
        r.push(modal.clone());
        assert_eq!(r.dispatch(&InputEvent::FocusLost), Dispatch::Default);
        assert_eq!(
            r.dispatch(&InputEvent::Resize {
                width: 10.0,
                height: 10.0
            }),
            Dispatch::Default
        );
        assert_eq!(modal.borrow().seen, 0);
    }

    #[test]
    fn borrowed_surface_is_skipped() {
        let (mut r, _rec) = router(true);
        let busy = Panel::new("busy", true).shared();
        r.push(busy.clone());
        let guard = busy.borrow_mut();
        assert_eq!(r.dispatch(&click()), Dispatch::Default);
        drop(guard);
        assert_eq!(busy.borrow().seen, 0);
    }

    #[test]
    fn handled_from_bool() {
        assert!(Handled::from(true).is_consumed());
        assert!(!Handled::from(false).is_consumed());
    }
}

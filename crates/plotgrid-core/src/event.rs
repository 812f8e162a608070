#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Host platforms translate their native input into these events before
//! handing them to the router. All events derive `Clone` and `PartialEq` for
//! use in tests and pattern matching.
//!
//! # Design Notes
//!
//! - Pointer events carry a [`DeviceOrigin`] so touch-emulated mouse input can
//!   be told apart from real pointer input.
//! - A platform "click" (or a touch tap) is a separate [`PointerKind::Tap`];
//!   press/move/release describe the gesture itself.
//! - `KeyEventKind` defaults to `Press` when not available from the platform.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

use crate::geometry::ScreenPoint;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A pointer or touch event.
    Pointer(PointerEvent),

    /// A keyboard event.
    Key(KeyEvent),

    /// Viewport was resized.
    Resize {
        /// New viewport width.
        width: f32,
        /// New viewport height.
        height: f32,
    },

    /// The window lost input focus.
    FocusLost,
}

impl InputEvent {
    /// Short label for tracing fields.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pointer(p) => p.kind.label(),
            Self::Key(_) => "key",
            Self::Resize { .. } => "resize",
            Self::FocusLost => "focus_lost",
        }
    }

    /// Whether this is a key press of [`KeyCode::Escape`].
    #[must_use]
    pub fn is_escape_press(&self) -> bool {
        matches!(
            self,
            Self::Key(KeyEvent {
                code: KeyCode::Escape,
                kind: KeyEventKind::Press,
                ..
            })
        )
    }

    /// Whether this is any key event of [`KeyCode::Escape`] (press, repeat,
    /// or release).
    #[must_use]
    pub fn is_escape(&self) -> bool {
        matches!(
            self,
            Self::Key(KeyEvent {
                code: KeyCode::Escape,
                ..
            })
        )
    }

    /// Lifecycle events are not claimed by surfaces; they always reach the
    /// grid consumer.
    #[must_use]
    pub const fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Resize { .. } | Self::FocusLost)
    }
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

/// Which device produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceOrigin {
    /// Mouse, pen, or trackpad.
    #[default]
    Pointer,
    /// A real touch contact.
    Touch,
    /// Mouse input the platform synthesized from a touch contact.
    SyntheticFromTouch,
}

/// The phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Button pressed or finger down.
    Press,
    /// Pointer moved (with or without a button held).
    Move,
    /// Button released or finger lifted.
    Release,
    /// A click or tap delivered after a press/release pair, or on its own by
    /// touch platforms.
    Tap,
}

impl PointerKind {
    /// Short label for tracing fields.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Move => "move",
            Self::Release => "release",
            Self::Tap => "tap",
        }
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The gesture phase.
    pub kind: PointerKind,

    /// Position in viewport space.
    pub point: ScreenPoint,

    /// Which device produced it.
    pub origin: DeviceOrigin,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event from a regular pointer device.
    #[must_use]
    pub const fn new(kind: PointerKind, point: ScreenPoint) -> Self {
        Self {
            kind,
            point,
            origin: DeviceOrigin::Pointer,
            modifiers: Modifiers::NONE,
        }
    }

    /// Press at `point`.
    #[must_use]
    pub const fn press(point: ScreenPoint) -> Self {
        Self::new(PointerKind::Press, point)
    }

    /// Move to `point`.
    #[must_use]
    pub const fn moved(point: ScreenPoint) -> Self {
        Self::new(PointerKind::Move, point)
    }

    /// Release at `point`.
    #[must_use]
    pub const fn release(point: ScreenPoint) -> Self {
        Self::new(PointerKind::Release, point)
    }

    /// Tap/click at `point`.
    #[must_use]
    pub const fn tap(point: ScreenPoint) -> Self {
        Self::new(PointerKind::Tap, point)
    }

    /// Set the device origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: DeviceOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Set modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The logical key.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Logical key identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Delete key.
    Delete,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_press_detection() {
        let esc = InputEvent::Key(KeyEvent::new(KeyCode::Escape));
        assert!(esc.is_escape_press());

        let esc_release =
            InputEvent::Key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Release));
        assert!(!esc_release.is_escape_press());
        assert!(esc_release.is_escape());

        let esc_repeat =
            InputEvent::Key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Repeat));
        assert!(!esc_repeat.is_escape_press());
        assert!(esc_repeat.is_escape());

        let enter = InputEvent::Key(KeyEvent::new(KeyCode::Enter));
        assert!(!enter.is_escape_press());
        assert!(!enter.is_escape());
    }

    #[test]
    fn pointer_builders_default_to_pointer_origin() {
        let ev = PointerEvent::press(ScreenPoint::new(1.0, 2.0));
        assert_eq!(ev.kind, PointerKind::Press);
        assert_eq!(ev.origin, DeviceOrigin::Pointer);
        assert_eq!(ev.modifiers, Modifiers::NONE);

        let touch = ev.with_origin(DeviceOrigin::Touch);
        assert_eq!(touch.origin, DeviceOrigin::Touch);
    }

    #[test]
    fn lifecycle_events() {
        assert!(InputEvent::FocusLost.is_lifecycle());
        assert!(
            InputEvent::Resize {
                width: 10.0,
                height: 10.0
            }
            .is_lifecycle()
        );
        assert!(!InputEvent::Key(KeyEvent::new(KeyCode::Enter)).is_lifecycle());
    }

    #[test]
    fn modifiers_combine() {
        let key = KeyEvent::new(KeyCode::Char('z')).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(key.ctrl());
        assert!(key.shift());
    }
}

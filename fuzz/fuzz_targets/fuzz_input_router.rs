#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use plotgrid_core::event::{
    DeviceOrigin, InputEvent, KeyCode, KeyEvent, KeyEventKind, PointerEvent, PointerKind,
};
use plotgrid_core::{GridCoordinate, ScreenPoint, Size};
use plotgrid_layout::{ClusterParams, LayoutConfig};
use plotgrid_runtime::{
    Dispatch, GridSurface, Handled, InputRouter, InputSurface, Notification, Notifier, SurfaceId,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Press(u8),
    Move(u8),
    Release,
    Tap(u8),
    SyntheticTap(u8),
    Key(u8),
    Escape,
    EscapeRepeat,
    Resize(u16, u16),
    FocusLost,
    Push(u8),
    Pop(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    cells: u8,
    clusters: u8,
    ops: Vec<Op>,
}

struct Overlay {
    id: SurfaceId,
}

impl InputSurface for Overlay {
    fn id(&self) -> &SurfaceId {
        &self.id
    }

    fn handle(&mut self, event: &InputEvent) -> Handled {
        matches!(event, InputEvent::Pointer(_)).into()
    }
}

const KEYS: [KeyCode; 8] = [
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Enter,
    KeyCode::Backspace,
    KeyCode::Char('z'),
    KeyCode::Char('a'),
];

fuzz_target!(|input: Input| {
    let cells = i32::from(input.cells % 48) + 1;
    let clusters = i32::from(input.clusters % 4) + 1;

    let mut layout = LayoutConfig::new(Size::new(1280.0, 720.0));
    for k in 0..clusters {
        layout = layout.with_cluster(
            format!("c{k}"),
            ClusterParams::new(ScreenPoint::new((k as f32 - 1.5) * 320.0, 0.0), 1.0),
        );
    }
    for i in 0..cells {
        let name = format!("c{}", i % clusters);
        layout = layout.assign(GridCoordinate::new(i, 0), Some(&name));
    }

    let notifier = Notifier::new();
    let rec = notifier.recorder();
    let mut grid = GridSurface::new(notifier.clone());
    if grid.configure(layout).is_err() {
        return;
    }
    let mut router = InputRouter::new(grid, notifier);

    let point_of = |router: &InputRouter<GridSurface>, n: u8| {
        let coord = GridCoordinate::new(i32::from(n) % (cells + 2) - 1, 0);
        router
            .default_consumer()
            .position_of(coord)
            .unwrap_or(ScreenPoint::new(-1.0, -1.0))
    };

    for op in input.ops.into_iter().take(256) {
        let event = match op {
            Op::Press(n) => InputEvent::Pointer(PointerEvent::press(point_of(&router, n))),
            Op::Move(n) => InputEvent::Pointer(PointerEvent::moved(point_of(&router, n))),
            Op::Release => InputEvent::Pointer(PointerEvent::release(ScreenPoint::ZERO)),
            Op::Tap(n) => InputEvent::Pointer(PointerEvent::tap(point_of(&router, n))),
            Op::SyntheticTap(n) => InputEvent::Pointer(
                PointerEvent::new(PointerKind::Tap, point_of(&router, n))
                    .with_origin(DeviceOrigin::SyntheticFromTouch),
            ),
            Op::Key(k) => InputEvent::Key(KeyEvent::new(KEYS[usize::from(k) % KEYS.len()])),
            Op::Escape => InputEvent::Key(KeyEvent::new(KeyCode::Escape)),
            Op::EscapeRepeat => {
                InputEvent::Key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Repeat))
            }
            Op::Resize(w, h) => InputEvent::Resize {
                width: f32::from(w),
                height: f32::from(h),
            },
            Op::FocusLost => InputEvent::FocusLost,
            Op::Push(n) => {
                let overlay = Rc::new(RefCell::new(Overlay {
                    id: SurfaceId::new(format!("overlay{}", n % 4)),
                }));
                let before = router.stack().len();
                let pushed = router.push(overlay);
                assert_eq!(router.stack().len(), before + usize::from(pushed));
                assert!(!router.default_consumer().is_dragging());
                continue;
            }
            Op::Pop(n) => {
                let before = router.stack().len();
                let popped = router.pop(&SurfaceId::new(format!("overlay{}", n % 4)));
                assert_eq!(router.stack().len() + usize::from(popped), before);
                continue;
            }
        };

        let overlay_before = router.is_overlay_active();
        let depth_before = router.stack().len();
        let dispatch = router.dispatch(&event);
        if event.is_escape_press() {
            // Escape pops exactly one surface, or none and asks for the menu.
            match dispatch {
                Dispatch::Dismissed(_) => {
                    assert!(overlay_before);
                    assert_eq!(router.stack().len() + 1, depth_before);
                }
                Dispatch::MenuRequested => {
                    assert!(!overlay_before);
                    assert_eq!(router.stack().len(), depth_before);
                }
                other => panic!("escape routed as {other:?}"),
            }
        } else if event.is_escape() {
            // Held Escape never reaches a layer.
            assert_eq!(dispatch, Dispatch::Swallowed);
            assert_eq!(router.stack().len(), depth_before);
        }

        // Every selected coordinate is laid out.
        let grid = router.default_consumer();
        let snapshot = grid.snapshot();
        for coord in grid.selected_coordinates() {
            assert!(snapshot.contains(coord), "selected {coord} missing from layout");
        }
    }

    // The last selection notification always matches the final count.
    let last = rec
        .events()
        .into_iter()
        .rev()
        .find_map(|n| match n {
            Notification::SelectionChanged { count } => Some(count),
            _ => None,
        });
    if let Some(count) = last {
        assert_eq!(count, router.default_consumer().selected_count());
    }
});

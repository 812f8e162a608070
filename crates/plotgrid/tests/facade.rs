//! The facade wires a full grid from configuration.

use plotgrid::prelude::*;

fn farm() -> GridConfig {
    GridConfig {
        layout: LayoutConfig::new(Size::new(1280.0, 720.0))
            .with_cluster("Forest", ClusterParams::new(ScreenPoint::new(-300.0, 0.0), 1.0))
            .with_cluster("Marsh", ClusterParams::new(ScreenPoint::new(300.0, 0.0), 1.0))
            .assign_all((0..5).map(|x| GridCoordinate::new(x, 0)), "Forest")
            .assign_all((0..5).map(|x| GridCoordinate::new(x, 1)), "Marsh"),
        runtime: plotgrid::RuntimeConfig::default(),
    }
}

#[test]
fn router_from_config_is_ready() {
    plotgrid::core::logging::init_test_logging();
    let (router, result) = plotgrid::router(farm(), Notifier::new());
    assert!(result.is_ok());
    let grid = router.default_consumer();
    assert!(grid.layout_ready());
    assert_eq!(grid.snapshot().len(), 10);
    assert!(!router.is_overlay_active());
}

#[test]
fn zero_viewport_recovers_on_resize() {
    let mut config = farm();
    config.layout.viewport = Size::new(0.0, 0.0);
    let (mut router, result) = plotgrid::router(config, Notifier::new());
    assert_eq!(
        result.map_err(|e| e.degradation()),
        Err(plotgrid::Degradation::ReusePreviousLayout)
    );
    assert!(!router.default_consumer().layout_ready());

    let resize = InputEvent::Resize {
        width: 1280.0,
        height: 720.0,
    };
    assert_eq!(router.dispatch(&resize), Dispatch::Default);
    assert!(router.default_consumer().layout_ready());
}

#[test]
fn keyboard_walks_between_clusters() {
    let (mut router, _result) = plotgrid::router(farm(), Notifier::new());
    let key = |code| InputEvent::Key(KeyEvent::new(code));

    let _ = router.dispatch(&key(KeyCode::Right));
    let start = router.default_consumer().focus().expect("focus seeded");
    assert_eq!(
        router.default_consumer().snapshot().cluster_of(start),
        Some("Forest")
    );

    // Walking right far enough lands in the marsh.
    for _ in 0..10 {
        let _ = router.dispatch(&key(KeyCode::Right));
    }
    let end = router.default_consumer().focus().expect("focus kept");
    assert_eq!(router.default_consumer().snapshot().cluster_of(end), Some("Marsh"));
}

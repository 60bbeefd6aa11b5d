use chart_overlay_wasm::domain::chart::{PixelPos, Viewport, ViewportBridge};
use chart_overlay_wasm::domain::drawing::{
    Geometry, GestureState, HitTester, InteractionController, Point, PointerOutcome, Shape, ShapeId, ShapeStore,
    Tool,
};
use quickcheck_macros::quickcheck;

/// Time 0..1000 over 1000px, price 0..100 over 100px: `time = x`, `price = 100 - y`.
fn unit_bridge() -> ViewportBridge {
    ViewportBridge::new(Viewport {
        start_time: 0.0,
        end_time: 1000.0,
        min_price: 0.0,
        max_price: 100.0,
        width: 1000.0,
        height: 100.0,
    })
}

fn px(x: f64, y: f64) -> PixelPos {
    PixelPos::new(x, y)
}

fn controller(tool: Tool, store: &mut ShapeStore) -> InteractionController {
    let mut controller = InteractionController::new(HitTester::default());
    controller.set_tool(tool, store);
    controller
}

#[test]
fn level_is_created_on_pointer_down() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    let mut ctl = controller(Tool::Level, &mut store);

    let PointerOutcome::Created(id) = ctl.pointer_down(px(10.0, 30.0), &bridge, &mut store, 5) else {
        panic!("level not created");
    };
    assert!(ctl.is_idle());
    assert_eq!(ctl.selected(), Some(&id));
    let shape = store.get(&id).unwrap();
    assert_eq!(shape.geometry, Geometry::Level { price: 70.0 });
    assert_eq!(shape.created_at, 5);

    assert_eq!(ctl.pointer_up(px(10.0, 30.0), &bridge, &mut store), PointerOutcome::Ignored);
    assert_eq!(store.len(), 1);
}

#[test]
fn trendline_is_drafted_then_committed() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    let mut ctl = controller(Tool::Trendline, &mut store);

    assert_eq!(ctl.pointer_down(px(100.0, 50.0), &bridge, &mut store, 1), PointerOutcome::DraftStarted);
    assert!(store.is_empty());
    assert_eq!(
        ctl.draft().unwrap().geometry,
        Geometry::Trendline { a: Point::new(100.0, 50.0), b: Point::new(100.0, 50.0) }
    );

    assert_eq!(ctl.pointer_move(px(200.0, 40.0), &bridge, &mut store), PointerOutcome::DraftUpdated);
    assert_eq!(
        ctl.draft().unwrap().geometry,
        Geometry::Trendline { a: Point::new(100.0, 50.0), b: Point::new(200.0, 60.0) }
    );

    let PointerOutcome::Committed(id) = ctl.pointer_up(px(250.0, 30.0), &bridge, &mut store) else {
        panic!("draft not committed");
    };
    assert!(ctl.is_idle());
    assert!(ctl.draft().is_none());
    assert_eq!(ctl.selected(), Some(&id));
    assert_eq!(
        store.get(&id).unwrap().geometry,
        Geometry::Trendline { a: Point::new(100.0, 50.0), b: Point::new(250.0, 70.0) }
    );
}

#[test]
fn zero_length_zone_is_legal() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    let mut ctl = controller(Tool::Zone, &mut store);

    ctl.pointer_down(px(300.0, 20.0), &bridge, &mut store, 1);
    let PointerOutcome::Committed(id) = ctl.pointer_up(px(300.0, 20.0), &bridge, &mut store) else {
        panic!("zone not committed");
    };
    let point = Point::new(300.0, 80.0);
    assert_eq!(store.get(&id).unwrap().geometry, Geometry::Zone { a: point, b: point });
}

#[test]
fn off_domain_events_leave_the_gesture_untouched() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    let mut ctl = controller(Tool::Zone, &mut store);

    assert_eq!(ctl.pointer_down(px(-5.0, 10.0), &bridge, &mut store, 1), PointerOutcome::Ignored);
    assert!(ctl.is_idle());

    ctl.pointer_down(px(100.0, 10.0), &bridge, &mut store, 1);
    ctl.pointer_move(px(200.0, 20.0), &bridge, &mut store);
    let before = ctl.state().clone();

    assert_eq!(ctl.pointer_move(px(200.0, 150.0), &bridge, &mut store), PointerOutcome::Ignored);
    assert_eq!(ctl.pointer_move(px(1200.0, 20.0), &bridge, &mut store), PointerOutcome::Ignored);
    assert_eq!(ctl.state(), &before);

    // Releasing outside the plot commits the last mapped draft.
    let PointerOutcome::Committed(id) = ctl.pointer_up(px(1200.0, 150.0), &bridge, &mut store) else {
        panic!("draft not committed");
    };
    assert_eq!(
        store.get(&id).unwrap().geometry,
        Geometry::Zone { a: Point::new(100.0, 90.0), b: Point::new(200.0, 80.0) }
    );
}

#[test]
fn select_miss_clears_the_selection() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    store.add(Shape::new(Geometry::Level { price: 50.0 }, 1).with_id(ShapeId::from("lvl")));
    let mut ctl = controller(Tool::Select, &mut store);

    assert!(ctl.select(&ShapeId::from("lvl"), &store));
    assert_eq!(ctl.pointer_down(px(500.0, 90.0), &bridge, &mut store, 2), PointerOutcome::SelectionCleared);
    assert!(ctl.selected().is_none());
    assert!(ctl.is_idle());
}

#[test]
fn selecting_an_unknown_id_is_refused() {
    let store = ShapeStore::in_memory();
    let mut ctl = InteractionController::default();
    assert!(!ctl.select(&ShapeId::from("ghost"), &store));
    assert!(ctl.selected().is_none());
}

#[test]
fn level_drag_moves_price_only() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    store.add(Shape::new(Geometry::Level { price: 50.0 }, 1).with_id(ShapeId::from("lvl")));
    let mut ctl = controller(Tool::Select, &mut store);

    let id = ShapeId::from("lvl");
    assert_eq!(ctl.pointer_down(px(500.0, 52.0), &bridge, &mut store, 2), PointerOutcome::DragStarted(id.clone()));
    assert_eq!(ctl.pointer_move(px(900.0, 42.0), &bridge, &mut store), PointerOutcome::Dragged(id.clone()));
    assert_eq!(store.get(&id).unwrap().geometry, Geometry::Level { price: 60.0 });
    assert_eq!(ctl.pointer_up(px(900.0, 42.0), &bridge, &mut store), PointerOutcome::DragEnded(id.clone()));
    assert_eq!(ctl.selected(), Some(&id));
}

#[quickcheck]
fn zone_drag_lands_on_the_total_delta(corners: (u8, u8, u8, u8), path: Vec<(u16, u8)>) -> bool {
    let bridge = unit_bridge();
    let t0 = 100.0 + f64::from(corners.0 % 200);
    let t1 = 100.0 + f64::from(corners.1 % 200);
    let p0 = 20.0 + f64::from(corners.2 % 60);
    let p1 = 20.0 + f64::from(corners.3 % 60);
    let original = Geometry::Zone { a: Point::new(t0, p0), b: Point::new(t1, p1) };

    let mut store = ShapeStore::in_memory();
    store.add(Shape::new(original, 1).with_id(ShapeId::from("zone")));
    let mut ctl = controller(Tool::Select, &mut store);

    // Grab the zone at its center, wander, then release 10 time units right
    // and 2 price units down.
    let grab = px((t0 + t1) / 2.0, 100.0 - (p0 + p1) / 2.0);
    let release = px(grab.x + 10.0, grab.y + 2.0);
    if !matches!(ctl.pointer_down(grab, &bridge, &mut store, 2), PointerOutcome::DragStarted(_)) {
        return false;
    }
    for (x, y) in path {
        ctl.pointer_move(px(f64::from(x % 1001), f64::from(y % 101)), &bridge, &mut store);
    }
    ctl.pointer_move(release, &bridge, &mut store);
    ctl.pointer_up(release, &bridge, &mut store);

    let moved = store.get(&ShapeId::from("zone")).map(|shape| shape.geometry);
    moved == Some(Geometry::Zone { a: Point::new(t0 + 10.0, p0 - 2.0), b: Point::new(t1 + 10.0, p1 - 2.0) })
}

#[test]
fn cancelling_a_drag_restores_the_original() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    let original = Geometry::Trendline { a: Point::new(100.0, 50.0), b: Point::new(300.0, 50.0) };
    store.add(Shape::new(original, 1).with_id(ShapeId::from("line")));
    let mut ctl = controller(Tool::Select, &mut store);

    ctl.pointer_down(px(200.0, 50.0), &bridge, &mut store, 2);
    ctl.pointer_move(px(260.0, 30.0), &bridge, &mut store);
    assert_ne!(store.get(&ShapeId::from("line")).unwrap().geometry, original);

    assert!(ctl.cancel(&mut store));
    assert!(ctl.is_idle());
    assert_eq!(store.get(&ShapeId::from("line")).unwrap().geometry, original);
    assert!(!ctl.cancel(&mut store));
}

#[test]
fn pointer_down_during_a_gesture_is_ignored() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    let mut ctl = controller(Tool::Trendline, &mut store);

    ctl.pointer_down(px(100.0, 50.0), &bridge, &mut store, 1);
    assert_eq!(ctl.pointer_down(px(400.0, 10.0), &bridge, &mut store, 2), PointerOutcome::Ignored);
    assert!(matches!(ctl.state(), GestureState::Drawing { anchor, .. } if *anchor == Point::new(100.0, 50.0)));
}

#[test]
fn cancelled_draft_does_not_leak_into_the_next_gesture() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    let mut ctl = controller(Tool::Trendline, &mut store);

    ctl.pointer_down(px(10.0, 10.0), &bridge, &mut store, 1);
    ctl.pointer_move(px(900.0, 90.0), &bridge, &mut store);
    assert!(ctl.cancel(&mut store));
    assert!(ctl.draft().is_none());

    assert_eq!(ctl.pointer_down(px(200.0, 50.0), &bridge, &mut store, 2), PointerOutcome::DraftStarted);
    let PointerOutcome::Committed(id) = ctl.pointer_up(px(300.0, 40.0), &bridge, &mut store) else {
        panic!("trendline not committed");
    };
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.get(&id).unwrap().geometry,
        Geometry::Trendline { a: Point::new(200.0, 50.0), b: Point::new(300.0, 60.0) }
    );
}

#[test]
fn switching_tools_abandons_the_draft() {
    let bridge = unit_bridge();
    let mut store = ShapeStore::in_memory();
    let mut ctl = controller(Tool::Level, &mut store);
    ctl.pointer_down(px(10.0, 10.0), &bridge, &mut store, 1);
    assert!(ctl.selected().is_some());

    ctl.set_tool(Tool::Zone, &mut store);
    assert!(ctl.selected().is_none());
    ctl.pointer_down(px(100.0, 10.0), &bridge, &mut store, 2);
    assert!(ctl.draft().is_some());

    ctl.set_tool(Tool::Select, &mut store);
    assert_eq!(ctl.tool(), Tool::Select);
    assert!(ctl.is_idle());
    assert_eq!(store.len(), 1);
}

#[test]
fn tool_names_parse_from_lowercase() {
    assert_eq!("trendline".parse::<Tool>().unwrap(), Tool::Trendline);
    assert_eq!(Tool::Zone.to_string(), "zone");
    assert!("circle".parse::<Tool>().is_err());
    assert_eq!(Tool::default(), Tool::Select);
}

use chart_overlay_wasm::application::ChartOverlay;
use chart_overlay_wasm::domain::chart::{PixelPos, Viewport};
use chart_overlay_wasm::domain::drawing::{HitTester, PointerOutcome, ShapeId, ShapeStore, Tool};
use chart_overlay_wasm::domain::market_data::Symbol;
use serde_json::json;

fn overlay() -> ChartOverlay {
    let mut overlay = ChartOverlay::new(ShapeStore::in_memory(), HitTester::default(), 1000);
    overlay.set_viewport(Viewport {
        start_time: 0.0,
        end_time: 1000.0,
        min_price: 0.0,
        max_price: 100.0,
        width: 1000.0,
        height: 100.0,
    });
    overlay
}

fn commit_levels(overlay: &mut ChartOverlay, count: usize) -> Vec<ShapeId> {
    overlay.set_tool(Tool::Level);
    (0..count)
        .map(|i| match overlay.pointer_down(PixelPos::new(10.0, 10.0 + i as f64)) {
            PointerOutcome::Created(id) => id,
            other => panic!("unexpected outcome {other:?}"),
        })
        .collect()
}

#[test]
fn undo_drops_only_the_most_recent_user_shape() {
    let mut overlay = overlay();
    let ticket = overlay.switch_symbol(Symbol::from("EURUSD"));
    overlay
        .apply_engine_annotations(&ticket, &json!({"levels": [{"price": 1.0}, {"price": 2.0}]}))
        .unwrap();
    let engine_before = overlay.engine_shapes().to_vec();

    let ids = commit_levels(&mut overlay, 4);
    for expected in ids.iter().rev() {
        let removed = overlay.undo().unwrap();
        assert_eq!(&removed.id, expected);
        assert_eq!(overlay.engine_shapes(), engine_before.as_slice());
    }
    assert!(overlay.undo().is_none());
    assert_eq!(overlay.engine_shapes(), engine_before.as_slice());
}

#[test]
fn undo_forgets_a_selection_that_was_removed() {
    let mut overlay = overlay();
    let ids = commit_levels(&mut overlay, 2);
    assert_eq!(overlay.selected(), Some(&ids[1]));

    overlay.undo();
    assert!(overlay.selected().is_none());
    assert!(overlay.select(&ids[0]));
}

#[test]
fn undo_mid_draft_discards_the_draft_first() {
    let mut overlay = overlay();
    let ids = commit_levels(&mut overlay, 1);
    overlay.set_tool(Tool::Trendline);
    overlay.pointer_down(PixelPos::new(100.0, 50.0));
    assert!(overlay.controller().draft().is_some());

    let removed = overlay.undo().unwrap();
    assert_eq!(removed.id, ids[0]);
    assert!(overlay.controller().is_idle());
    assert!(overlay.user_shapes().is_empty());
}

#[test]
fn clear_all_keeps_the_engine_layer() {
    let mut overlay = overlay();
    let ticket = overlay.switch_symbol(Symbol::from("EURUSD"));
    overlay.apply_engine_annotations(&ticket, &json!({"levels": [{"price": 1.0}]})).unwrap();
    commit_levels(&mut overlay, 3);

    overlay.clear_all();
    assert!(overlay.user_shapes().is_empty());
    assert!(overlay.selected().is_none());
    assert_eq!(overlay.engine_shapes().len(), 1);
}

#[test]
fn switching_symbols_keeps_user_drawings() {
    let mut overlay = overlay();
    let first = overlay.switch_symbol(Symbol::from("EURUSD"));
    overlay.apply_engine_annotations(&first, &json!({"levels": [{"price": 1.0}]})).unwrap();
    commit_levels(&mut overlay, 2);

    overlay.switch_symbol(Symbol::from("GBPUSD"));
    assert!(overlay.engine_shapes().is_empty());
    assert_eq!(overlay.user_shapes().len(), 2);
}

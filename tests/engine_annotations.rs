use chart_overlay_wasm::application::ChartOverlay;
use chart_overlay_wasm::domain::drawing::{
    EngineTone, FALLBACK_SPAN_SECS, Geometry, HitTester, Point, ShapeStore, SignalSetup, adapt_engine_annotations,
    build_setup_drawings, build_signal_annotations,
};
use chart_overlay_wasm::domain::market_data::{Candle, Ohlc, Symbol, Timestamp};
use serde_json::json;

fn candle(time: i64) -> Candle {
    Candle::new(Timestamp::from_secs(time), Ohlc::new(1.0, 1.2, 0.9, 1.1))
}

fn span(first: i64, last: i64) -> Option<(Timestamp, Timestamp)> {
    Some((Timestamp::from_secs(first), Timestamp::from_secs(last)))
}

#[test]
fn levels_and_zones_anchor_to_the_loaded_range() {
    let payload = json!({"levels": [{"price": 1.2345}], "zones": [{"priceFrom": 1.0, "priceTo": 1.1}]});
    let adaptation = adapt_engine_annotations(&payload, span(1000, 2000), 5000.0, 7);

    assert_eq!(adaptation.skipped, 0);
    assert_eq!(adaptation.shapes.len(), 2);

    let level = &adaptation.shapes[0];
    assert_eq!(level.shape.geometry, Geometry::Level { price: 1.2345 });
    assert_eq!(level.tone, EngineTone::Gold);
    assert!(level.readonly());

    let zone = &adaptation.shapes[1];
    assert_eq!(zone.shape.geometry, Geometry::Zone { a: Point::new(1000.0, 1.0), b: Point::new(2000.0, 1.1) });
    assert_eq!(zone.tone, EngineTone::Green);
    assert_eq!(zone.shape.created_at, 7);
}

#[test]
fn fibo_zones_use_gold() {
    let payload = json!({"fiboZones": [{"priceFrom": 1.3, "priceTo": 1.25, "label": "0.618"}]});
    let adaptation = adapt_engine_annotations(&payload, span(10, 20), 0.0, 0);

    let fibo = &adaptation.shapes[0];
    assert_eq!(fibo.tone, EngineTone::Gold);
    assert_eq!(fibo.shape.id.as_str(), "engine:fibo:0");
    assert_eq!(fibo.shape.label.as_deref(), Some("0.618"));
    assert_eq!(fibo.shape.geometry, Geometry::Zone { a: Point::new(10.0, 1.3), b: Point::new(20.0, 1.25) });
}

#[test]
fn zones_fall_back_to_the_last_hour_without_candles() {
    let payload = json!({"zones": [{"priceFrom": 1.0, "priceTo": 2.0}]});
    let adaptation = adapt_engine_annotations(&payload, None, 10_000.0, 0);
    assert_eq!(
        adaptation.shapes[0].shape.geometry,
        Geometry::Zone { a: Point::new(10_000.0 - FALLBACK_SPAN_SECS, 1.0), b: Point::new(10_000.0, 2.0) }
    );
}

#[test]
fn malformed_items_are_skipped_one_by_one() {
    let payload = json!({
        "levels": [{"price": 1.0}, {"price": "high"}, {"label": "no price"}, {"price": 2.0, "label": "R1"}],
        "zones": [{"priceFrom": 1.0, "priceTo": null}, 17],
        "fiboZones": [{"priceFrom": 1.0, "priceTo": 1.5}]
    });
    let adaptation = adapt_engine_annotations(&payload, span(0, 60), 0.0, 0);

    assert_eq!(adaptation.skipped, 4);
    let ids: Vec<&str> = adaptation.shapes.iter().map(|engine| engine.shape.id.as_str()).collect();
    assert_eq!(ids, ["engine:level:0", "engine:level:3", "engine:fibo:0"]);
}

#[test]
fn absent_arrays_read_as_empty() {
    for payload in [json!({}), json!({"levels": null}), json!({"zones": "n/a"}), json!(null)] {
        let adaptation = adapt_engine_annotations(&payload, span(0, 60), 0.0, 0);
        assert!(adaptation.shapes.is_empty(), "payload {payload}");
        assert_eq!(adaptation.skipped, 0);
    }
}

#[test]
fn each_sync_replaces_the_engine_layer() {
    let mut overlay = ChartOverlay::new(ShapeStore::in_memory(), HitTester::default(), 1000);
    let ticket = overlay.switch_symbol(Symbol::from("eurusd"));
    assert!(overlay.apply_history(&ticket, vec![candle(2000), candle(1000), candle(1500)]));

    let first = json!({"levels": [{"price": 1.0}, {"price": 2.0}], "zones": [{"priceFrom": 1.0, "priceTo": 1.1}]});
    overlay.apply_engine_annotations(&ticket, &first).unwrap();
    assert_eq!(overlay.engine_shapes().len(), 3);
    assert_eq!(
        overlay.engine_shapes()[2].shape.geometry,
        Geometry::Zone { a: Point::new(1000.0, 1.0), b: Point::new(2000.0, 1.1) }
    );

    let second = json!({"levels": [{"price": 3.0}]});
    overlay.apply_engine_annotations(&ticket, &second).unwrap();
    assert_eq!(overlay.engine_shapes().len(), 1);
    assert_eq!(overlay.engine_shapes()[0].shape.geometry, Geometry::Level { price: 3.0 });
}

#[test]
fn responses_for_a_previous_symbol_are_discarded() {
    let mut overlay = ChartOverlay::new(ShapeStore::in_memory(), HitTester::default(), 1000);
    let stale = overlay.switch_symbol(Symbol::from("EURUSD"));
    let current = overlay.switch_symbol(Symbol::from("GBPUSD"));

    let payload = json!({"levels": [{"price": 1.0}]});
    assert!(overlay.apply_engine_annotations(&stale, &payload).is_none());
    assert!(overlay.engine_shapes().is_empty());

    assert!(overlay.apply_engine_annotations(&current, &payload).is_some());
    overlay.teardown();
    assert!(overlay.apply_engine_annotations(&current, &payload).is_none());
    assert!(overlay.engine_shapes().is_empty());
    assert!(overlay.begin_sync().is_none());
}

#[test]
fn signal_setup_becomes_entry_stop_and_target() {
    let signal = json!({
        "direction": "long",
        "entry": "1.1000",
        "sl": 1.05,
        "tp": 1.2,
        "rr": 2,
        "evidence": {"entry_zone": {"low": 1.11, "high": 1.09}}
    });
    let annotations = build_signal_annotations(&SignalSetup::from_value(&signal));

    let labels: Vec<&str> = annotations.levels.iter().filter_map(|level| level.label.as_deref()).collect();
    assert_eq!(labels, ["ENTRY LONG", "SL", "TP (RR 2.00)"]);
    assert_eq!(annotations.levels[0].price, 1.1);
    assert_eq!(annotations.zones.len(), 1);
    assert_eq!(annotations.zones[0].price_from, 1.09);
    assert_eq!(annotations.zones[0].price_to, 1.11);
    assert!(annotations.fibo_zones.is_empty());
}

#[test]
fn signal_without_prices_yields_an_empty_payload() {
    let signal = json!({"direction": "short", "entry": "n/a", "entryZone": {"from": 1.0, "to": 1.0}});
    let annotations = build_signal_annotations(&SignalSetup::from_value(&signal));
    assert!(annotations.levels.is_empty());
    assert!(annotations.zones.is_empty());
}

#[test]
fn built_payload_feeds_the_adapter() {
    let signal = json!({"direction": "short", "entry": 1.3, "tp": 1.2});
    let payload = serde_json::to_value(build_signal_annotations(&SignalSetup::from_value(&signal))).unwrap();
    let adaptation = adapt_engine_annotations(&payload, span(0, 60), 0.0, 0);
    assert_eq!(adaptation.shapes.len(), 2);
    assert_eq!(adaptation.shapes[0].shape.label.as_deref(), Some("ENTRY SHORT"));
}

#[test]
fn setup_drawings_add_risk_and_target_boxes() {
    let signal = json!({
        "direction": "long",
        "entry": 1.1,
        "sl": 1.15,
        "tp": 1.0,
        "entryZone": {"low": 1.09, "high": 1.11}
    });
    let drawings = build_setup_drawings(&SignalSetup::from_value(&signal));

    let zones: Vec<(&str, f64, f64)> = drawings
        .zones
        .iter()
        .map(|zone| (zone.label.as_deref().unwrap_or_default(), zone.price_from, zone.price_to))
        .collect();
    assert_eq!(zones, [("Entry zone", 1.09, 1.11), ("Risk", 1.1, 1.15), ("Target", 1.0, 1.1)]);
    assert_eq!(drawings.levels.len(), 3);
}

#[test]
fn setup_boxes_need_two_distinct_prices() {
    let signal = json!({"direction": "short", "entry": 1.2, "sl": 1.2});
    assert!(build_setup_drawings(&SignalSetup::from_value(&signal)).zones.is_empty());

    let signal = json!({"direction": "short", "tp": 1.0});
    assert!(build_setup_drawings(&SignalSetup::from_value(&signal)).zones.is_empty());
}

#[test]
fn zones_follow_the_trimmed_candle_range() {
    let mut overlay = ChartOverlay::new(ShapeStore::in_memory(), HitTester::default(), 2);
    let ticket = overlay.switch_symbol(Symbol::from("EURUSD"));
    overlay.apply_history(&ticket, vec![candle(1000), candle(1500)]);
    overlay.apply_update(&ticket, candle(2000));

    let payload = json!({"zones": [{"priceFrom": 1.0, "priceTo": 1.1}]});
    overlay.apply_engine_annotations(&ticket, &payload).unwrap();
    assert_eq!(
        overlay.engine_shapes()[0].shape.geometry,
        Geometry::Zone { a: Point::new(1500.0, 1.0), b: Point::new(2000.0, 1.1) }
    );
}

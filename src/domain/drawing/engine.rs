//! Server analysis annotations: the wire payload, the adapter turning it into
//! read-only shapes, and the builder deriving a payload from a trade setup.

use super::shapes::{EngineShape, EngineTone, Geometry, Shape, ShapeId};
use crate::domain::chart::Point;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::Timestamp;
use crate::log_warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Width of the fallback anchor window when no candles are loaded.
pub const FALLBACK_SPAN_SECS: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineLevel {
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineZone {
    pub price_from: f64,
    pub price_to: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Annotation payload returned by the sync endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineAnnotations {
    #[serde(default)]
    pub levels: Vec<EngineLevel>,
    #[serde(default)]
    pub zones: Vec<EngineZone>,
    #[serde(default)]
    pub fibo_zones: Vec<EngineZone>,
}

/// Shapes produced by one sync, plus how many payload items were unusable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineAdaptation {
    pub shapes: Vec<EngineShape>,
    pub skipped: usize,
}

/// Convert an annotation payload into engine shapes.
///
/// Zones span the loaded candle range `span`, or the hour up to `now_secs`
/// when nothing is loaded. Items that fail to parse or carry non-finite
/// numbers are skipped individually; a missing or non-array field reads as
/// empty.
pub fn adapt_engine_annotations(
    payload: &Value,
    span: Option<(Timestamp, Timestamp)>,
    now_secs: f64,
    now_ms: i64,
) -> EngineAdaptation {
    let (start, end) = span
        .map(|(first, last)| (first.as_f64(), last.as_f64()))
        .unwrap_or((now_secs - FALLBACK_SPAN_SECS, now_secs));
    let mut out = EngineAdaptation::default();

    for (index, level) in items::<EngineLevel>(payload, "levels", &mut out.skipped) {
        if !level.price.is_finite() {
            out.skipped += 1;
            continue;
        }
        let geometry = Geometry::Level { price: level.price };
        let shape = engine_shape(format!("engine:level:{index}"), geometry, level.label, now_ms);
        out.shapes.push(EngineShape::new(shape, EngineTone::Gold));
    }

    let zone_groups = [("zones", "zone", EngineTone::Green), ("fiboZones", "fibo", EngineTone::Gold)];
    for (field, prefix, tone) in zone_groups {
        for (index, zone) in items::<EngineZone>(payload, field, &mut out.skipped) {
            if !(zone.price_from.is_finite() && zone.price_to.is_finite()) {
                out.skipped += 1;
                continue;
            }
            let geometry = Geometry::Zone {
                a: Point::new(start, zone.price_from),
                b: Point::new(end, zone.price_to),
            };
            let shape = engine_shape(format!("engine:{prefix}:{index}"), geometry, zone.label, now_ms);
            out.shapes.push(EngineShape::new(shape, tone));
        }
    }

    if out.skipped > 0 {
        log_warn!(LogComponent::Domain("EngineAdapter"), "skipped {} malformed annotation items", out.skipped);
    }
    out
}

fn items<T: DeserializeOwned>(payload: &Value, field: &str, skipped: &mut usize) -> Vec<(usize, T)> {
    let Some(entries) = payload.get(field).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::deserialize(entry) {
            Ok(item) => Some((index, item)),
            Err(_) => {
                *skipped += 1;
                None
            }
        })
        .collect()
}

fn engine_shape(id: String, geometry: Geometry, label: Option<String>, now_ms: i64) -> Shape {
    Shape { id: ShapeId::new(id), created_at: now_ms, label, geometry }
}

/// Trade setup emitted by the signal detector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSetup {
    pub direction: String,
    pub entry: Option<f64>,
    pub sl: Option<f64>,
    pub tp: Option<f64>,
    pub rr: Option<f64>,
    /// Raw entry-zone object; bounds are read from `price_from|from|low`
    /// and `price_to|to|high`.
    pub entry_zone: Option<Value>,
}

impl SignalSetup {
    /// Lenient read of a signal document. Numbers may be JSON numbers or
    /// numeric strings; the entry zone is looked up at the top level and
    /// under `evidence`.
    pub fn from_value(value: &Value) -> Self {
        let entry_zone = value
            .get("entryZone")
            .or_else(|| value.get("entry_zone"))
            .or_else(|| value.get("evidence").and_then(|evidence| evidence.get("entry_zone")))
            .filter(|zone| zone.is_object())
            .cloned();
        Self {
            direction: value.get("direction").and_then(Value::as_str).unwrap_or_default().to_string(),
            entry: number(value.get("entry")),
            sl: number(value.get("sl")),
            tp: number(value.get("tp")),
            rr: number(value.get("rr")),
            entry_zone,
        }
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn first_number(object: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| number(object.get(key)).filter(|value| *value != 0.0))
}

/// Derive an annotation payload from a trade setup.
///
/// Produces `ENTRY <DIR>`, `SL` and `TP` levels for whichever prices are
/// present and an `Entry zone` when both bounds exist and differ.
/// `fiboZones` is always empty.
pub fn build_signal_annotations(setup: &SignalSetup) -> EngineAnnotations {
    let direction = setup.direction.trim().to_uppercase();
    let mut levels = Vec::new();
    if let Some(price) = setup.entry {
        levels.push(EngineLevel { price, label: Some(format!("ENTRY {direction}").trim().to_string()) });
    }
    if let Some(price) = setup.sl {
        levels.push(EngineLevel { price, label: Some("SL".to_string()) });
    }
    if let Some(price) = setup.tp {
        let label = match setup.rr {
            Some(rr) => format!("TP (RR {rr:.2})"),
            None => "TP".to_string(),
        };
        levels.push(EngineLevel { price, label: Some(label) });
    }

    let zones = setup
        .entry_zone
        .as_ref()
        .and_then(|zone| {
            let from = first_number(zone, &["price_from", "priceFrom", "from", "low"]);
            let to = first_number(zone, &["price_to", "priceTo", "to", "high"]);
            price_box(from, to, "Entry zone")
        })
        .into_iter()
        .collect();

    EngineAnnotations { levels, zones, fibo_zones: Vec::new() }
}

fn price_box(a: Option<f64>, b: Option<f64>, label: &str) -> Option<EngineZone> {
    let (a, b) = (a?, b?);
    let (low, high) = (a.min(b), a.max(b));
    (low != high).then(|| EngineZone { price_from: low, price_to: high, label: Some(label.to_string()) })
}

/// [`build_signal_annotations`] plus a `Risk` zone spanning entry to stop
/// and a `Target` zone spanning entry to take-profit, each only when both
/// prices exist and differ.
pub fn build_setup_drawings(setup: &SignalSetup) -> EngineAnnotations {
    let mut annotations = build_signal_annotations(setup);
    annotations.zones.extend(price_box(setup.entry, setup.sl, "Risk"));
    annotations.zones.extend(price_box(setup.entry, setup.tp, "Target"));
    annotations
}

use super::shapes::{Geometry, Shape, ShapeId};
use crate::domain::chart::Point;
use crate::domain::errors::{AppError, StorageResult};
use crate::domain::logging::{LogComponent, get_logger};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Version tag of the persisted drawing envelope. Any other value reads as absent.
pub const DRAWINGS_VERSION: u32 = 1;

pub const DEFAULT_STORAGE_KEY: &str = "chart-overlay:drawings";

/// Durable string key-value store (browser storage in production).
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    version: u32,
    saved_at: i64,
    shapes: Vec<ShapeRecord>,
}

/// Stored form of a user shape, tagged by `kind`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
enum ShapeRecord {
    Level {
        id: String,
        created_at: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        price: f64,
    },
    Trendline {
        id: String,
        created_at: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        a: Point,
        b: Point,
    },
    Zone {
        id: String,
        created_at: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        a: Point,
        b: Point,
    },
}

impl From<&Shape> for ShapeRecord {
    fn from(shape: &Shape) -> Self {
        let id = shape.id.to_string();
        let created_at = shape.created_at;
        let label = shape.label.clone();
        match shape.geometry {
            Geometry::Level { price } => ShapeRecord::Level { id, created_at, label, price },
            Geometry::Trendline { a, b } => ShapeRecord::Trendline { id, created_at, label, a, b },
            Geometry::Zone { a, b } => ShapeRecord::Zone { id, created_at, label, a, b },
        }
    }
}

impl ShapeRecord {
    /// Structural validation on top of what serde already enforces.
    fn into_shape(self) -> Option<Shape> {
        let (id, created_at, label, geometry) = match self {
            ShapeRecord::Level { id, created_at, label, price } => {
                (id, created_at, label, Geometry::Level { price })
            }
            ShapeRecord::Trendline { id, created_at, label, a, b } => {
                (id, created_at, label, Geometry::Trendline { a, b })
            }
            ShapeRecord::Zone { id, created_at, label, a, b } => {
                (id, created_at, label, Geometry::Zone { a, b })
            }
        };
        if id.trim().is_empty() || !geometry.is_finite() {
            return None;
        }
        Some(Shape { id: ShapeId::new(id), created_at, label, geometry })
    }
}

/// Serialize shapes into the versioned envelope.
pub fn encode_drawings(shapes: &[Shape], saved_at: i64) -> Result<String, AppError> {
    let envelope = Envelope {
        version: DRAWINGS_VERSION,
        saved_at,
        shapes: shapes.iter().map(ShapeRecord::from).collect(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a stored envelope. Never fails: anything unreadable yields an empty
/// list and malformed entries are dropped one by one. Duplicate ids keep the
/// first occurrence.
pub fn decode_drawings(raw: &str) -> Vec<Shape> {
    let Ok(document) = serde_json::from_str::<Value>(raw) else {
        get_logger().debug(LogComponent::Domain("Persistence"), "stored drawings are not JSON");
        return Vec::new();
    };
    if document.get("version").and_then(Value::as_u64) != Some(u64::from(DRAWINGS_VERSION)) {
        return Vec::new();
    }
    let Some(entries) = document.get("shapes").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut shapes = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let shape = ShapeRecord::deserialize(entry).ok().and_then(ShapeRecord::into_shape);
        match shape {
            Some(shape) if seen.insert(shape.id.clone()) => shapes.push(shape),
            Some(shape) => get_logger().debug(
                LogComponent::Domain("Persistence"),
                &format!("dropping duplicate stored shape {}", shape.id),
            ),
            None => get_logger().debug(
                LogComponent::Domain("Persistence"),
                &format!("dropping malformed stored shape at index {index}"),
            ),
        }
    }
    shapes
}

/// Reads and writes the user's drawings under one fixed key.
pub struct DrawingRepository {
    storage: Box<dyn KeyValueStorage>,
    key: String,
}

impl DrawingRepository {
    pub fn new(storage: Box<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, shapes: &[Shape], saved_at: i64) -> StorageResult<()> {
        let payload = encode_drawings(shapes, saved_at)?;
        self.storage.set(&self.key, &payload)
    }

    /// Stored drawings, or an empty list when nothing readable is stored.
    pub fn load(&self) -> Vec<Shape> {
        match self.storage.get(&self.key) {
            Ok(Some(raw)) => decode_drawings(&raw),
            Ok(None) => Vec::new(),
            Err(error) => {
                get_logger().warn(
                    LogComponent::Domain("Persistence"),
                    &format!("reading stored drawings failed: {error}"),
                );
                Vec::new()
            }
        }
    }
}

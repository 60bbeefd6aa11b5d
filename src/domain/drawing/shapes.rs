use crate::domain::chart::{CoordinateBridge, PixelPos, PixelRect, Point};
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Value Object - unique shape identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier for a user-drawn shape.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShapeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShapeKind {
    #[display(fmt = "level")]
    Level,
    #[display(fmt = "trendline")]
    Trendline,
    #[display(fmt = "zone")]
    Zone,
}

/// Geometry of a shape, anchored in domain space.
///
/// This is the single dispatch point per kind: hit-testing, rendering and
/// drag translation all go through [`Geometry::project`] and
/// [`Geometry::translated`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Horizontal line across the full plot width.
    Level { price: f64 },
    Trendline { a: Point, b: Point },
    /// Rectangle spanned by two opposite corners, in either order.
    Zone { a: Point, b: Point },
}

/// A geometry mapped into pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projected {
    HLine { y: f64 },
    Segment { a: PixelPos, b: PixelPos },
    Rect(PixelRect),
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Level { .. } => ShapeKind::Level,
            Geometry::Trendline { .. } => ShapeKind::Trendline,
            Geometry::Zone { .. } => ShapeKind::Zone,
        }
    }

    /// Two-point geometry of `kind` collapsed onto `point`, the start of a draft.
    pub fn anchored(kind: ShapeKind, point: Point) -> Self {
        match kind {
            ShapeKind::Level => Geometry::Level { price: point.price },
            ShapeKind::Trendline => Geometry::Trendline { a: point, b: point },
            ShapeKind::Zone => Geometry::Zone { a: point, b: point },
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Geometry::Level { price } => price.is_finite(),
            Geometry::Trendline { a, b } | Geometry::Zone { a, b } => a.is_finite() && b.is_finite(),
        }
    }

    /// Move by a domain delta. Levels have no time component and ignore `dt`.
    pub fn translated(&self, dt: f64, dp: f64) -> Self {
        match *self {
            Geometry::Level { price } => Geometry::Level { price: price + dp },
            Geometry::Trendline { a, b } => {
                Geometry::Trendline { a: a.translated(dt, dp), b: b.translated(dt, dp) }
            }
            Geometry::Zone { a, b } => Geometry::Zone { a: a.translated(dt, dp), b: b.translated(dt, dp) },
        }
    }

    /// Replace the free endpoint `b` of a two-point geometry.
    pub fn with_endpoint(&self, point: Point) -> Self {
        match *self {
            Geometry::Level { .. } => Geometry::Level { price: point.price },
            Geometry::Trendline { a, .. } => Geometry::Trendline { a, b: point },
            Geometry::Zone { a, .. } => Geometry::Zone { a, b: point },
        }
    }

    pub fn project(&self, bridge: &dyn CoordinateBridge) -> Option<Projected> {
        match *self {
            Geometry::Level { price } => Some(Projected::HLine { y: bridge.price_to_y(price)? }),
            Geometry::Trendline { a, b } => {
                Some(Projected::Segment { a: bridge.to_pixel(a)?, b: bridge.to_pixel(b)? })
            }
            Geometry::Zone { a, b } => {
                Some(Projected::Rect(PixelRect::from_corners(bridge.to_pixel(a)?, bridge.to_pixel(b)?)))
            }
        }
    }
}

/// Domain entity - a shape with identity
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub label: Option<String>,
    pub geometry: Geometry,
}

/// Shapes owned by the user: persisted, selectable and draggable.
pub type UserShape = Shape;

impl Shape {
    pub fn new(geometry: Geometry, created_at: i64) -> Self {
        Self { id: ShapeId::generate(), created_at, label: None, geometry }
    }

    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn translated(&self, dt: f64, dp: f64) -> Self {
        Self { geometry: self.geometry.translated(dt, dp), ..self.clone() }
    }
}

/// Palette tag of a server-derived shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineTone {
    #[display(fmt = "gold")]
    Gold,
    #[display(fmt = "green")]
    Green,
}

/// Read-only shape computed by the analysis service. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineShape {
    pub shape: Shape,
    pub tone: EngineTone,
}

impl EngineShape {
    pub fn new(shape: Shape, tone: EngineTone) -> Self {
        Self { shape, tone }
    }

    pub fn readonly(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_translation_ignores_time() {
        let level = Geometry::Level { price: 10.0 };
        assert_eq!(level.translated(500.0, -2.0), Geometry::Level { price: 8.0 });
    }

    #[test]
    fn endpoint_update_keeps_anchor() {
        let start = Point::new(1.0, 2.0);
        let draft = Geometry::anchored(ShapeKind::Zone, start);
        assert_eq!(
            draft.with_endpoint(Point::new(5.0, 6.0)),
            Geometry::Zone { a: start, b: Point::new(5.0, 6.0) }
        );
    }

    #[test]
    fn kind_strings_are_lowercase() {
        assert_eq!(ShapeKind::Trendline.to_string(), "trendline");
        assert_eq!("zone".parse::<ShapeKind>().unwrap(), ShapeKind::Zone);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(ShapeId::generate(), ShapeId::generate());
    }
}

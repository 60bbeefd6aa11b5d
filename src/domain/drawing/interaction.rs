//! Pointer gesture state machine.
//!
//! Pointer events arrive in pixel space and are mapped through the current
//! [`CoordinateBridge`]. An event whose position has no domain mapping is
//! ignored and the gesture in flight is left untouched.

use super::hit_test::HitTester;
use super::shapes::{Geometry, Shape, ShapeId, ShapeKind};
use super::store::ShapeStore;
use crate::domain::chart::{CoordinateBridge, PixelPos, Point};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

/// Active drawing tool.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tool {
    #[default]
    #[display(fmt = "select")]
    Select,
    #[display(fmt = "level")]
    Level,
    #[display(fmt = "trendline")]
    Trendline,
    #[display(fmt = "zone")]
    Zone,
}

impl Tool {
    /// Shape kind this tool creates, `None` for the select tool.
    pub fn creates(&self) -> Option<ShapeKind> {
        match self {
            Tool::Select => None,
            Tool::Level => Some(ShapeKind::Level),
            Tool::Trendline => Some(ShapeKind::Trendline),
            Tool::Zone => Some(ShapeKind::Zone),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// Defining a two-point shape; `draft.a` is the anchor.
    Drawing { anchor: Point, draft: Shape },
    /// Moving a committed shape. Every move re-applies the total delta to `original`.
    Dragging { shape_id: ShapeId, anchor: Point, original: Shape },
}

/// What a pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// No state change: no mapping, wrong state, or nothing to do.
    Ignored,
    /// A level was committed directly on pointer-down.
    Created(ShapeId),
    DraftStarted,
    DraftUpdated,
    /// A draft was committed on pointer-up.
    Committed(ShapeId),
    DragStarted(ShapeId),
    Dragged(ShapeId),
    DragEnded(ShapeId),
    SelectionCleared,
}

impl PointerOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, PointerOutcome::Ignored)
    }
}

#[derive(Debug, Default)]
pub struct InteractionController {
    tool: Tool,
    state: GestureState,
    selected: Option<ShapeId>,
    hit_tester: HitTester,
}

impl InteractionController {
    pub fn new(hit_tester: HitTester) -> Self {
        Self { hit_tester, ..Default::default() }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Uncommitted shape of an in-progress drawing gesture.
    pub fn draft(&self) -> Option<&Shape> {
        match &self.state {
            GestureState::Drawing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<&ShapeId> {
        self.selected.as_ref()
    }

    /// Select a stored shape. Returns `false` if `id` is not in the store.
    pub fn select(&mut self, id: &ShapeId, store: &ShapeStore) -> bool {
        if !store.contains(id) {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Forget a selection whose shape has left the store.
    pub fn prune(&mut self, store: &ShapeStore) {
        if self.selected.as_ref().is_some_and(|id| !store.contains(id)) {
            self.selected = None;
        }
    }

    /// Switch tools, abandoning any gesture in flight.
    pub fn set_tool(&mut self, tool: Tool, store: &mut ShapeStore) {
        self.cancel(store);
        self.tool = tool;
        if tool != Tool::Select {
            self.selected = None;
        }
    }

    /// Abort the current gesture: a draft is discarded, a drag is rolled back
    /// to the shape it started from. Returns `true` if a gesture was active.
    pub fn cancel(&mut self, store: &mut ShapeStore) -> bool {
        match std::mem::take(&mut self.state) {
            GestureState::Idle => false,
            GestureState::Drawing { .. } => true,
            GestureState::Dragging { original, .. } => {
                store.replace(original);
                true
            }
        }
    }

    pub fn pointer_down(
        &mut self,
        pos: PixelPos,
        bridge: &dyn CoordinateBridge,
        store: &mut ShapeStore,
        now_ms: i64,
    ) -> PointerOutcome {
        if !self.is_idle() {
            return PointerOutcome::Ignored;
        }

        match self.tool.creates() {
            Some(ShapeKind::Level) => {
                let Some(point) = bridge.to_point(pos) else {
                    return PointerOutcome::Ignored;
                };
                let shape = Shape::new(Geometry::Level { price: point.price }, now_ms);
                let id = shape.id.clone();
                store.add(shape);
                self.selected = Some(id.clone());
                PointerOutcome::Created(id)
            }
            Some(kind) => {
                let Some(anchor) = bridge.to_point(pos) else {
                    return PointerOutcome::Ignored;
                };
                let draft = Shape::new(Geometry::anchored(kind, anchor), now_ms);
                self.state = GestureState::Drawing { anchor, draft };
                PointerOutcome::DraftStarted
            }
            None => {
                let Some(anchor) = bridge.to_point(pos) else {
                    return PointerOutcome::Ignored;
                };
                match self.hit_tester.topmost(store.shapes(), pos, bridge) {
                    Some(hit) => {
                        let shape_id = hit.id.clone();
                        self.selected = Some(shape_id.clone());
                        self.state = GestureState::Dragging {
                            shape_id: shape_id.clone(),
                            anchor,
                            original: hit.clone(),
                        };
                        PointerOutcome::DragStarted(shape_id)
                    }
                    None => {
                        self.selected = None;
                        PointerOutcome::SelectionCleared
                    }
                }
            }
        }
    }

    pub fn pointer_move(
        &mut self,
        pos: PixelPos,
        bridge: &dyn CoordinateBridge,
        store: &mut ShapeStore,
    ) -> PointerOutcome {
        if self.is_idle() {
            return PointerOutcome::Ignored;
        }
        let Some(point) = bridge.to_point(pos) else {
            return PointerOutcome::Ignored;
        };
        self.track(point, store)
    }

    /// Finish the gesture. Off-domain releases commit the last mapped state.
    pub fn pointer_up(
        &mut self,
        pos: PixelPos,
        bridge: &dyn CoordinateBridge,
        store: &mut ShapeStore,
    ) -> PointerOutcome {
        if let Some(point) = bridge.to_point(pos) {
            self.track(point, store);
        }

        match std::mem::take(&mut self.state) {
            GestureState::Idle => PointerOutcome::Ignored,
            GestureState::Drawing { draft, .. } => {
                let id = draft.id.clone();
                store.add(draft);
                self.selected = Some(id.clone());
                PointerOutcome::Committed(id)
            }
            GestureState::Dragging { shape_id, .. } => PointerOutcome::DragEnded(shape_id),
        }
    }

    fn track(&mut self, point: Point, store: &mut ShapeStore) -> PointerOutcome {
        match &mut self.state {
            GestureState::Idle => PointerOutcome::Ignored,
            GestureState::Drawing { draft, .. } => {
                draft.geometry = draft.geometry.with_endpoint(point);
                PointerOutcome::DraftUpdated
            }
            GestureState::Dragging { shape_id, anchor, original } => {
                let moved = original.translated(point.time - anchor.time, point.price - anchor.price);
                store.replace(moved);
                PointerOutcome::Dragged(shape_id.clone())
            }
        }
    }
}

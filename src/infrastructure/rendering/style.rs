use crate::domain::chart::Color;
use crate::domain::drawing::EngineTone;
use serde::{Deserialize, Serialize};

/// Visual settings of the overlay. Colors are `#rrggbb` strings in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Stroke of user shapes.
    pub user_color: Color,
    /// Stroke of the selected shape.
    pub highlight_color: Color,
    pub gold: Color,
    pub green: Color,
    pub engine_fill_alpha: f32,
    pub user_fill_alpha: f32,
    pub line_width: f64,
    pub highlight_line_width: f64,
    /// Dash pattern of the draft shape.
    pub draft_dash: Vec<f64>,
    pub label_font: String,
    pub label_padding: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            user_color: Color::from_hex(0x9aa4b2),
            highlight_color: Color::from_hex(0x4da3ff),
            gold: Color::from_hex(0xffd700),
            green: Color::from_hex(0x26a69a),
            engine_fill_alpha: 0.15,
            user_fill_alpha: 0.2,
            line_width: 1.0,
            highlight_line_width: 2.0,
            draft_dash: vec![6.0, 4.0],
            label_font: "12px sans-serif".to_string(),
            label_padding: 4.0,
        }
    }
}

impl OverlayStyle {
    pub fn tone_color(&self, tone: EngineTone) -> Color {
        match tone {
            EngineTone::Gold => self.gold,
            EngineTone::Green => self.green,
        }
    }
}

//! Entity and frame snapshots
//!
//! A frame is published once per simulation tick. Entities carry the fields
//! the viewer draws (`pos`, `radius`, `color`); anything else the simulation
//! serializes (legacy `mass`, `vel`, ...) lands in [`Entity::extra`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Position in logical surface units, serialized as `[x, y]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Position {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [f64; 2] {
    fn from(pos: Position) -> Self {
        [pos.x, pos.y]
    }
}

/// Extra attribute attached to an entity.
///
/// Renderers never read these; they are kept so newer servers can add fields
/// without breaking older viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attribute {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Attribute {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Attribute::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A positioned, drawable simulation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "pos")]
    pub position: Position,
    pub radius: f64,
    pub color: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Attribute>,
}

impl Entity {
    pub fn new(position: Position, radius: f64, color: impl Into<String>) -> Self {
        Self {
            position,
            radius,
            color: color.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Attribute) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.extra.get(name)
    }
}

/// One state snapshot
///
/// `npcs` and `food` are in back-to-front render order. The simulation does
/// not always publish an agent, so it is optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameData {
    #[serde(default)]
    pub agent: Option<Entity>,
    #[serde(default)]
    pub npcs: Vec<Entity>,
    #[serde(default)]
    pub food: Vec<Entity>,
}

impl FrameData {
    /// Number of entities the draw pass paints.
    pub fn drawable_count(&self) -> usize {
        self.npcs.len() + self.food.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_wire_format() {
        let entity: Entity = serde_json::from_value(json!({
            "pos": [10.0, 12.5],
            "radius": 5.0,
            "color": "green",
            "mass": 25.0,
            "kind": "food",
        }))
        .expect("decode entity");

        assert_eq!(entity.position, Position::new(10.0, 12.5));
        assert_eq!(entity.radius, 5.0);
        assert_eq!(entity.color, "green");
        assert_eq!(entity.attribute("mass").and_then(Attribute::as_f64), Some(25.0));
        assert_eq!(entity.attribute("kind").and_then(Attribute::as_str), Some("food"));
    }

    #[test]
    fn test_entity_keeps_nested_extras() {
        let entity: Entity = serde_json::from_value(json!({
            "pos": [0, 0],
            "radius": 1,
            "color": "#fff",
            "vel": [1.0, -1.0],
        }))
        .expect("decode entity");

        assert_eq!(
            entity.attribute("vel"),
            Some(&Attribute::Other(json!([1.0, -1.0])))
        );
    }

    #[test]
    fn test_entity_requires_drawn_fields() {
        let missing_color = json!({ "pos": [0.0, 0.0], "radius": 1.0 });
        assert!(serde_json::from_value::<Entity>(missing_color).is_err());

        let bad_pos = json!({ "pos": [0.0], "radius": 1.0, "color": "red" });
        assert!(serde_json::from_value::<Entity>(bad_pos).is_err());
    }

    #[test]
    fn test_position_serializes_as_pair() {
        let entity = Entity::new(Position::new(3.0, 4.0), 2.0, "red")
            .with_attribute("mass", Attribute::Number(4.0));
        let value = serde_json::to_value(&entity).expect("encode entity");

        assert_eq!(
            value,
            json!({ "pos": [3.0, 4.0], "radius": 2.0, "color": "red", "mass": 4.0 })
        );
    }

    #[test]
    fn test_frame_tolerates_missing_agent_and_unknown_fields() {
        let frame: FrameData = serde_json::from_value(json!({
            "npcs": [{ "pos": [1, 2], "radius": 8, "color": "blue" }],
            "food": [],
            "elapsed": 42,
        }))
        .expect("decode frame");

        assert!(frame.agent.is_none());
        assert_eq!(frame.npcs.len(), 1);
        assert!(frame.food.is_empty());
        assert_eq!(frame.drawable_count(), 1);
    }

    #[test]
    fn test_empty_frame() {
        let frame: FrameData = serde_json::from_value(json!({})).expect("decode frame");
        assert_eq!(frame, FrameData::default());
    }
}

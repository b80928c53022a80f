//! Aura records: light and vision sources attached to shapes.
//!
//! Two shapes of the same record exist. [`Aura`] is the engine form
//! (camelCase when serialized) and carries an engine-only `temporary` flag.
//! [`ServerAura`] is the wire form (snake_case) and carries the owning shape
//! id, which the caller supplies on export and which is not read back on
//! import. Field mapping is otherwise 1:1.

#[cfg(test)]
#[path = "aura_test.rs"]
mod aura_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shape::ShapeId;

/// Unique identifier for an aura.
pub type AuraId = Uuid;

/// Engine-side aura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aura {
    pub uuid: AuraId,
    pub active: bool,
    /// Whether this aura reveals fog for its owners.
    pub vision_source: bool,
    /// Whether players who don't own the shape see it.
    pub visible: bool,
    pub name: String,
    /// Full-light radius in game units.
    pub value: f64,
    /// Falloff radius beyond `value`, in game units.
    pub dim: f64,
    pub colour: String,
    pub border_colour: String,
    /// Cone width in degrees; 360 or more is a full circle.
    pub angle: f64,
    /// Cone facing in degrees.
    pub direction: f64,
    /// Local-only aura that is never synced.
    #[serde(default)]
    pub temporary: bool,
}

impl Aura {
    /// Full-light radius with non-positive and NaN values mapped to 0.
    #[must_use]
    pub fn light_radius(&self) -> f64 {
        normalize_radius(self.value)
    }

    /// Falloff radius with non-positive and NaN values mapped to 0.
    #[must_use]
    pub fn dim_radius(&self) -> f64 {
        normalize_radius(self.dim)
    }

    /// Whether the aura is limited to a cone rather than the full circle.
    #[must_use]
    pub fn is_cone(&self) -> bool {
        self.angle < 360.0
    }
}

/// Map non-positive and non-numeric radii to zero.
#[must_use]
pub fn normalize_radius(r: f64) -> f64 {
    if r > 0.0 && r.is_finite() { r } else { 0.0 }
}

/// Wire-side aura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerAura {
    pub uuid: AuraId,
    pub active: bool,
    pub vision_source: bool,
    pub visible: bool,
    pub name: String,
    pub value: f64,
    pub dim: f64,
    pub colour: String,
    pub border_colour: String,
    pub angle: f64,
    pub direction: f64,
    /// Owning shape.
    pub shape: ShapeId,
}

/// Sparse engine-side update. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialAura {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<AuraId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_source: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<f64>,
}

/// Sparse wire-side update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialServerAura {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<AuraId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_source: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<f64>,
}

/// Import wire auras. `temporary` is always false on import.
#[must_use]
pub fn auras_from_server(auras: &[ServerAura]) -> Vec<Aura> {
    auras
        .iter()
        .map(|a| Aura {
            uuid: a.uuid,
            active: a.active,
            vision_source: a.vision_source,
            visible: a.visible,
            name: a.name.clone(),
            value: a.value,
            dim: a.dim,
            colour: a.colour.clone(),
            border_colour: a.border_colour.clone(),
            angle: a.angle,
            direction: a.direction,
            temporary: false,
        })
        .collect()
}

/// Export auras owned by `shape`. `temporary` is dropped.
#[must_use]
pub fn auras_to_server(shape: ShapeId, auras: &[Aura]) -> Vec<ServerAura> {
    auras
        .iter()
        .map(|a| ServerAura {
            uuid: a.uuid,
            active: a.active,
            vision_source: a.vision_source,
            visible: a.visible,
            name: a.name.clone(),
            value: a.value,
            dim: a.dim,
            colour: a.colour.clone(),
            border_colour: a.border_colour.clone(),
            angle: a.angle,
            direction: a.direction,
            shape,
        })
        .collect()
}

#[must_use]
pub fn partial_aura_to_server(aura: &PartialAura) -> PartialServerAura {
    PartialServerAura {
        uuid: aura.uuid,
        active: aura.active,
        vision_source: aura.vision_source,
        visible: aura.visible,
        name: aura.name.clone(),
        value: aura.value,
        dim: aura.dim,
        colour: aura.colour.clone(),
        border_colour: aura.border_colour.clone(),
        angle: aura.angle,
        direction: aura.direction,
    }
}

#[must_use]
pub fn partial_aura_from_server(aura: &PartialServerAura) -> PartialAura {
    PartialAura {
        uuid: aura.uuid,
        active: aura.active,
        vision_source: aura.vision_source,
        visible: aura.visible,
        name: aura.name.clone(),
        value: aura.value,
        dim: aura.dim,
        colour: aura.colour.clone(),
        border_colour: aura.border_colour.clone(),
        angle: aura.angle,
        direction: aura.direction,
    }
}

impl PartialAura {
    /// Apply the present fields to `aura`.
    pub fn apply(&self, aura: &mut Aura) {
        if let Some(v) = self.uuid {
            aura.uuid = v;
        }
        if let Some(v) = self.active {
            aura.active = v;
        }
        if let Some(v) = self.vision_source {
            aura.vision_source = v;
        }
        if let Some(v) = self.visible {
            aura.visible = v;
        }
        if let Some(ref v) = self.name {
            aura.name.clone_from(v);
        }
        if let Some(v) = self.value {
            aura.value = v;
        }
        if let Some(v) = self.dim {
            aura.dim = v;
        }
        if let Some(ref v) = self.colour {
            aura.colour.clone_from(v);
        }
        if let Some(ref v) = self.border_colour {
            aura.border_colour.clone_from(v);
        }
        if let Some(v) = self.angle {
            aura.angle = v;
        }
        if let Some(v) = self.direction {
            aura.direction = v;
        }
    }
}

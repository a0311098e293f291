//! Scene light registry
//!
//! Light components own a slot in the registry and write their world
//! position (and spot direction) into it every update. Slots are never
//! reused within a level; releasing one just switches the light off.

use serde::{Deserialize, Serialize};

use crate::core::config::SceneConfig;
use crate::foundation::math::Vec3;

/// Distance falloff of point and spot lights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub exp: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            exp: 0.0,
        }
    }
}

/// Omnidirectional light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    /// RGB color
    pub color: Vec3,
    /// Ambient contribution
    pub ambient_intensity: f32,
    /// Diffuse contribution
    pub diffuse_intensity: f32,
    /// World position, written by the owning component
    pub position: Vec3,
    /// Distance falloff
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Vec3::repeat(1.0),
            ambient_intensity: 0.0,
            diffuse_intensity: 1.0,
            position: Vec3::zeros(),
            attenuation: Attenuation::default(),
        }
    }
}

/// Cone light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotLight {
    /// Shared point light parameters
    pub base: PointLight,
    /// World direction, written by the owning component
    pub direction: Vec3,
    /// Cone half angle in degrees
    pub cutoff: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            base: PointLight::default(),
            direction: Vec3::new(0.0, -1.0, 0.0),
            cutoff: 20.0,
        }
    }
}

/// Scene-wide directional light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    /// RGB color
    pub color: Vec3,
    /// Ambient contribution
    pub ambient_intensity: f32,
    /// Diffuse contribution
    pub diffuse_intensity: f32,
    /// Light direction
    pub direction: Vec3,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::repeat(1.0),
            ambient_intensity: 0.2,
            diffuse_intensity: 0.8,
            direction: Vec3::new(1.0, -1.0, 0.0).normalize(),
        }
    }
}

/// Slot owned by one light component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightSlot {
    /// Index into the point lights
    Point(usize),
    /// Index into the spot lights
    Spot(usize),
}

/// All lights of the current scene
#[derive(Debug, Clone)]
pub struct SceneLights {
    point_lights: Vec<Option<PointLight>>,
    spot_lights: Vec<Option<SpotLight>>,
    ambient: Option<AmbientLight>,
    max_point_lights: usize,
    max_spot_lights: usize,
}

impl Default for SceneLights {
    fn default() -> Self {
        Self::new(&SceneConfig::default())
    }
}

impl SceneLights {
    /// Empty registry with the configured limits
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
            ambient: None,
            max_point_lights: config.max_point_lights,
            max_spot_lights: config.max_spot_lights,
        }
    }

    /// Register a point light
    pub fn add_point(&mut self, light: PointLight) -> LightSlot {
        if self.active_point_lights().count() >= self.max_point_lights {
            log::warn!(
                "More than {} point lights; the renderer may ignore some",
                self.max_point_lights
            );
        }
        self.point_lights.push(Some(light));
        LightSlot::Point(self.point_lights.len() - 1)
    }

    /// Register a spot light
    pub fn add_spot(&mut self, light: SpotLight) -> LightSlot {
        if self.active_spot_lights().count() >= self.max_spot_lights {
            log::warn!(
                "More than {} spot lights; the renderer may ignore some",
                self.max_spot_lights
            );
        }
        self.spot_lights.push(Some(light));
        LightSlot::Spot(self.spot_lights.len() - 1)
    }

    /// Move a light; `direction` is ignored for point lights
    pub fn place(&mut self, slot: LightSlot, position: Vec3, direction: Vec3) {
        match slot {
            LightSlot::Point(i) => {
                if let Some(Some(light)) = self.point_lights.get_mut(i) {
                    light.position = position;
                }
            }
            LightSlot::Spot(i) => {
                if let Some(Some(light)) = self.spot_lights.get_mut(i) {
                    light.base.position = position;
                    light.direction = direction;
                }
            }
        }
    }

    /// Switch off a light
    pub fn release(&mut self, slot: LightSlot) {
        match slot {
            LightSlot::Point(i) => {
                if let Some(light) = self.point_lights.get_mut(i) {
                    *light = None;
                }
            }
            LightSlot::Spot(i) => {
                if let Some(light) = self.spot_lights.get_mut(i) {
                    *light = None;
                }
            }
        }
    }

    /// Point light in a slot, `None` when released or not a point slot
    pub fn point(&self, slot: LightSlot) -> Option<&PointLight> {
        match slot {
            LightSlot::Point(i) => self.point_lights.get(i)?.as_ref(),
            LightSlot::Spot(_) => None,
        }
    }

    /// Spot light in a slot, `None` when released or not a spot slot
    pub fn spot(&self, slot: LightSlot) -> Option<&SpotLight> {
        match slot {
            LightSlot::Spot(i) => self.spot_lights.get(i)?.as_ref(),
            LightSlot::Point(_) => None,
        }
    }

    /// Point lights that are switched on
    pub fn active_point_lights(&self) -> impl Iterator<Item = &PointLight> {
        self.point_lights.iter().flatten()
    }

    /// Spot lights that are switched on
    pub fn active_spot_lights(&self) -> impl Iterator<Item = &SpotLight> {
        self.spot_lights.iter().flatten()
    }

    /// Turn the ambient light on or off
    pub fn set_ambient(&mut self, ambient: Option<AmbientLight>) {
        self.ambient = ambient;
    }

    /// Ambient light when enabled
    pub fn ambient(&self) -> Option<&AmbientLight> {
        self.ambient.as_ref()
    }

    /// Remove every light
    pub fn clear(&mut self) {
        self.point_lights.clear();
        self.spot_lights.clear();
        self.ambient = None;
    }
}

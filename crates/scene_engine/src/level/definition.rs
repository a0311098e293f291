//! Level and entity descriptions
//!
//! Levels are RON or TOML documents listing entity definitions. Each
//! definition names an archetype, a spawn transform and free-form properties
//! that gameplay code can query by element and attribute.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backend::{CollisionFlags, CollisionShape, SoundParams};
use crate::config::Config;
use crate::ecs::{Camera, LightSource, SoundSource};
use crate::foundation::math::Vec3;
use crate::scene::AmbientLight;

fn one() -> Vec3 {
    Vec3::repeat(1.0)
}

fn yes() -> bool {
    true
}

/// Physics body of a mesh archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionDefinition {
    /// Body shape
    pub shape: CollisionShape,
    /// Radius for round shapes
    pub radius: f32,
    /// Height for capsules, cones and cylinders
    pub height: f32,
    /// Raw [`CollisionFlags`] bits
    pub flags: u32,
}

impl Default for CollisionDefinition {
    fn default() -> Self {
        Self {
            shape: CollisionShape::Box,
            radius: 0.5,
            height: 1.0,
            flags: 0,
        }
    }
}

impl CollisionDefinition {
    /// Flags with unknown bits dropped
    pub fn collision_flags(&self) -> CollisionFlags {
        CollisionFlags::from_bits_truncate(self.flags)
    }
}

/// What an entity is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Archetype {
    /// Collision root with a rigid mesh child
    StaticMesh {
        /// Mesh file
        mesh: String,
        /// Physics body
        #[serde(default)]
        collision: CollisionDefinition,
        /// Drawn in the shadow pass
        #[serde(default = "yes")]
        casts_shadow: bool,
    },
    /// Collision root with a skinned mesh child
    SkeletalMesh {
        /// Mesh file
        mesh: String,
        /// Clip to play
        #[serde(default)]
        clip: usize,
        /// Physics body
        #[serde(default)]
        collision: CollisionDefinition,
        /// Drawn in the shadow pass
        #[serde(default = "yes")]
        casts_shadow: bool,
    },
    /// Positional sound
    Sound {
        /// Sound file and kind
        source: SoundSource,
        /// Play immediately with these parameters
        #[serde(default)]
        autoplay: Option<SoundParams>,
    },
    /// Point or spot light
    Light(LightSource),
    /// View point
    Camera {
        /// Lens and initial direction
        #[serde(default)]
        camera: Camera,
        /// Render the scene through this camera
        #[serde(default)]
        player: bool,
    },
    /// Bare transform
    Empty,
}

/// One entity of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Entity name
    pub name: String,
    /// What to build
    pub archetype: Archetype,
    /// Spawn position
    #[serde(default)]
    pub position: Vec3,
    /// Spawn rotation in degrees
    #[serde(default)]
    pub rotation: Vec3,
    /// Spawn scale
    #[serde(default = "one")]
    pub scale: Vec3,
    /// Rendered when true
    #[serde(default = "yes")]
    pub visible: bool,
    /// Free-form `element -> attribute -> value` properties
    #[serde(default)]
    pub properties: BTreeMap<String, BTreeMap<String, String>>,
}

impl EntityDefinition {
    /// Definition with the default spawn transform
    pub fn new(name: impl Into<String>, archetype: Archetype) -> Self {
        Self {
            name: name.into(),
            archetype,
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: one(),
            visible: true,
            properties: BTreeMap::new(),
        }
    }

    /// Set a property
    pub fn set_property(
        &mut self,
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.properties
            .entry(element.into())
            .or_default()
            .insert(attribute.into(), value.into());
    }

    fn raw(&self, element: &str, attribute: &str) -> Option<&str> {
        let value = self
            .properties
            .get(element)
            .and_then(|attributes| attributes.get(attribute))
            .map(String::as_str);
        if value.is_none() {
            log::warn!("Entity '{}' has no property {element}.{attribute}", self.name);
        }
        value
    }

    fn parsed<T: std::str::FromStr + Default>(&self, element: &str, attribute: &str) -> T {
        let Some(raw) = self.raw(element, attribute) else {
            return T::default();
        };
        raw.trim().parse().unwrap_or_else(|_| {
            log::warn!(
                "Entity '{}' property {element}.{attribute} = '{raw}' is not a {}",
                self.name,
                std::any::type_name::<T>()
            );
            T::default()
        })
    }

    /// String property, empty when missing
    pub fn get_string(&self, element: &str, attribute: &str) -> String {
        self.raw(element, attribute).map(str::to_string).unwrap_or_default()
    }

    /// Boolean property, accepting `true`/`false` and `1`/`0`; false when missing
    pub fn get_bool(&self, element: &str, attribute: &str) -> bool {
        match self.raw(element, attribute).map(str::trim) {
            Some("1") => true,
            Some("0") | None => false,
            Some(other) => other.eq_ignore_ascii_case("true"),
        }
    }

    /// Integer property, zero when missing or malformed
    pub fn get_int(&self, element: &str, attribute: &str) -> i32 {
        self.parsed(element, attribute)
    }

    /// Float property, zero when missing or malformed
    pub fn get_float(&self, element: &str, attribute: &str) -> f32 {
        self.parsed(element, attribute)
    }
}

/// A level file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDefinition {
    /// Level name
    pub name: String,
    /// Scene-wide directional light, off when absent
    pub ambient: Option<AmbientLight>,
    /// Entities in spawn order
    pub entities: Vec<EntityDefinition>,
}

impl Config for LevelDefinition {}

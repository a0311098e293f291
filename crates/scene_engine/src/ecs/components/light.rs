//! Light component
//!
//! Registers a point or spot light with the scene on init and keeps the
//! registry slot at the node's world position. Spot lights aim along the
//! node's world rotation applied to their initial direction.

use serde::{Deserialize, Serialize};

use crate::ecs::component::{ComponentBehavior, ComponentContext, ComponentError, ComponentServices};
use crate::foundation::math::{Mat4Ext, Vec3};
use crate::scene::{LightSlot, PointLight, SpotLight};

/// Light parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightSource {
    /// Omnidirectional light
    Point(PointLight),
    /// Cone light
    Spot(SpotLight),
}

/// Light attached to a node
#[derive(Debug, Clone)]
pub struct LightComponent {
    source: LightSource,
    slot: Option<LightSlot>,
}

impl LightComponent {
    /// Light with the given parameters
    pub fn new(source: LightSource) -> Self {
        Self { source, slot: None }
    }

    /// Light parameters as created
    pub fn source(&self) -> &LightSource {
        &self.source
    }

    /// Registry slot, once initialised
    pub fn slot(&self) -> Option<LightSlot> {
        self.slot
    }

    fn place(&self, cx: &mut ComponentContext<'_, '_>) {
        let (Some(slot), Some(world)) = (self.slot, cx.world_matrix()) else {
            return;
        };

        let position = world.translation();
        let direction = match &self.source {
            LightSource::Point(_) => Vec3::zeros(),
            LightSource::Spot(spot) => {
                let aimed = world.transform_vector(&spot.direction);
                if aimed.norm_squared() > f32::EPSILON {
                    aimed.normalize()
                } else {
                    spot.direction
                }
            }
        };
        cx.services.lights.place(slot, position, direction);
    }
}

impl ComponentBehavior for LightComponent {
    fn init(&mut self, cx: &mut ComponentContext<'_, '_>) -> Result<(), ComponentError> {
        if let Some(old) = self.slot.take() {
            cx.services.lights.release(old);
        }
        self.slot = Some(match self.source {
            LightSource::Point(point) => cx.services.lights.add_point(point),
            LightSource::Spot(spot) => cx.services.lights.add_spot(spot),
        });
        self.place(cx);
        Ok(())
    }

    fn update(&mut self, cx: &mut ComponentContext<'_, '_>, _delta_ms: f32) {
        self.place(cx);
    }

    fn destroy(&mut self, services: &mut ComponentServices<'_>) {
        if let Some(slot) = self.slot.take() {
            services.lights.release(slot);
        }
    }
}

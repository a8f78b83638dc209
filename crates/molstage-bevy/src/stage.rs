//! Stage.
//!
//! The render context of the viewer: the camera rig bound to the primary
//! window, the list of loaded structure components and the most recent scene
//! bounds. One stage per app.

use bevy::prelude::{Component, Entity, Resource, Transform, Vec2, Vec3};

/// Marker for the viewer camera spawned by the stage bootstrap.
#[derive(Component)]
pub struct StageCamera;

/// Opaque camera snapshot, captured and restored as a unit so a reload can
/// keep the viewpoint the user left off at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation(pub Transform);

impl Orientation {
    pub fn capture(transform: &Transform) -> Self {
        Orientation(*transform)
    }

    pub fn restore(&self, transform: &mut Transform) {
        *transform = self.0;
    }
}

/// Bookkeeping for the loaded scene. Components are whole structures; their
/// representation meshes hang off them as children and are never tracked
/// individually here.
#[derive(Resource, Default)]
pub struct Stage {
    components: Vec<Entity>,
    viewport: Vec2,
    bounds: Option<(Vec3, f32)>,
}

impl Stage {
    pub fn components(&self) -> &[Entity] {
        &self.components
    }

    pub(crate) fn register_component(&mut self, entity: Entity) {
        self.components.push(entity);
    }

    /// Drain all components for a wholesale reset.
    pub(crate) fn take_components(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.components)
    }

    /// Last seen viewport extent, updated by the resize handler.
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub(crate) fn set_viewport(&mut self, size: Vec2) {
        self.viewport = size;
    }

    /// Bounding sphere of the most recent load, if any.
    pub fn bounds(&self) -> Option<(Vec3, f32)> {
        self.bounds
    }

    pub(crate) fn set_bounds(&mut self, center: Vec3, radius: f32) {
        self.bounds = Some((center, radius));
    }
}

/// Reposition the camera along its current view direction so a bounding
/// sphere fills the frustum. Keeps the direction the user was looking from,
/// only the distance changes.
pub fn fit_transform(current: &Transform, center: Vec3, radius: f32, fovy: f32, padding: f32) -> Transform {
    let radius = radius.max(1.0);
    let distance = radius / (fovy / 2.0).sin() * padding;
    let forward = current.forward();
    let eye = center - forward * distance;
    Transform::from_translation(eye).looking_at(center, Vec3::Y)
}

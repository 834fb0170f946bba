//! Rigid-body arena for the simulation.
//!
//! Every body lives in a `hecs::World` owned by [`PhysicsWorld`]. Actors only hold
//! [`BodyHandle`]s and [`TemplateHandle`]s; a handle to a despawned body is rejected with
//! [`PhysicsError::UnknownBody`] and never aliases a newer body.

use crate::domain::tuning::orb::OrbTemplate;
use glam::Vec2;

/// Generational index of a body in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(hecs::Entity);

impl BodyHandle {
    /// Stable numeric id used on the wire.
    pub fn id(self) -> u64 {
        self.0.to_bits().get()
    }
}

/// Index of a registered orb template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    UnknownBody(BodyHandle),
    UnknownTemplate(TemplateHandle),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub position: Vec2,
    /// Radians, counter-clockwise from +X.
    pub rotation: f32,
    pub velocity: Vec2,
    /// Radians per second.
    pub angular_velocity: f32,
    pub mass: f32,
    pub linear_drag: f32,
    /// Force accumulated since the last integration step.
    pub force: Vec2,
}

impl RigidBody {
    pub fn at(position: Vec2, rotation: f32, mass: f32) -> Self {
        Self {
            position,
            rotation,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass,
            linear_drag: 0.0,
            force: Vec2::ZERO,
        }
    }

    pub fn with_linear_drag(mut self, linear_drag: f32) -> Self {
        self.linear_drag = linear_drag;
        self
    }

    /// Unit vector the body is facing (its local +X axis in world space).
    pub fn facing(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }
}

/// Renderable bounds used for camera visibility checks.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub radius: f32,
}

/// Seconds left before an instantiated orb is despawned.
#[derive(Debug, Clone, Copy)]
struct Lifetime(f32);

/// Marks bodies created from an orb template.
#[derive(Debug, Clone, Copy)]
struct Orb;

#[derive(Default)]
pub struct PhysicsWorld {
    bodies: hecs::World,
    templates: Vec<OrbTemplate>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_template(&mut self, template: OrbTemplate) -> TemplateHandle {
        self.templates.push(template);
        TemplateHandle(self.templates.len() - 1)
    }

    pub fn template(&self, handle: TemplateHandle) -> Result<&OrbTemplate, PhysicsError> {
        self.templates
            .get(handle.0)
            .ok_or(PhysicsError::UnknownTemplate(handle))
    }

    pub fn spawn_body(&mut self, body: RigidBody, radius: f32) -> BodyHandle {
        BodyHandle(self.bodies.spawn((body, Bounds { radius })))
    }

    /// Spawns a new orb from `template` at `position`. The caller owns any further placement.
    pub fn instantiate(
        &mut self,
        template: TemplateHandle,
        position: Vec2,
        rotation: f32,
    ) -> Result<BodyHandle, PhysicsError> {
        let template = *self.template(template)?;
        let body = RigidBody::at(position, rotation, template.mass);
        let entity = self.bodies.spawn((
            body,
            Bounds {
                radius: template.radius,
            },
            Lifetime(template.life_time),
            Orb,
        ));
        Ok(BodyHandle(entity))
    }

    pub fn despawn(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.bodies
            .despawn(handle.0)
            .map_err(|_| PhysicsError::UnknownBody(handle))
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// Copy of the body's current state.
    pub fn body(&self, handle: BodyHandle) -> Result<RigidBody, PhysicsError> {
        self.bodies
            .get::<&RigidBody>(handle.0)
            .map(|body| *body)
            .map_err(|_| PhysicsError::UnknownBody(handle))
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies
            .query_one_mut::<&mut RigidBody>(handle.0)
            .map_err(|_| PhysicsError::UnknownBody(handle))
    }

    pub fn bounds(&self, handle: BodyHandle) -> Result<Bounds, PhysicsError> {
        self.bodies
            .get::<&Bounds>(handle.0)
            .map(|bounds| *bounds)
            .map_err(|_| PhysicsError::UnknownBody(handle))
    }

    pub fn add_force(&mut self, handle: BodyHandle, force: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.add_force(force);
        Ok(())
    }

    pub fn set_angular_velocity(
        &mut self,
        handle: BodyHandle,
        angular_velocity: f32,
    ) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.angular_velocity = angular_velocity;
        Ok(())
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.velocity = velocity;
        Ok(())
    }

    pub fn translate(&mut self, handle: BodyHandle, offset: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.position += offset;
        Ok(())
    }

    /// Advances every body by `dt` seconds and clears accumulated forces.
    pub fn integrate(&mut self, dt: f32) {
        for (_entity, body) in self.bodies.query_mut::<&mut RigidBody>() {
            if body.mass > 0.0 {
                body.velocity += body.force / body.mass * dt;
            }
            if body.linear_drag > 0.0 {
                body.velocity *= 1.0 / (1.0 + body.linear_drag * dt);
            }
            body.position += body.velocity * dt;
            body.rotation += body.angular_velocity * dt;
            body.force = Vec2::ZERO;
        }
    }

    /// Counts down orb lifetimes and despawns the ones that ran out.
    pub fn expire(&mut self, dt: f32) -> Vec<BodyHandle> {
        let mut expired = Vec::new();
        for (entity, lifetime) in self.bodies.query_mut::<&mut Lifetime>() {
            lifetime.0 -= dt;
            if lifetime.0 <= 0.0 {
                expired.push(BodyHandle(entity));
            }
        }

        for handle in &expired {
            let _ = self.bodies.despawn(handle.0);
        }
        expired
    }

    /// All live orbs with their current body state.
    pub fn orbs(&self) -> Vec<(BodyHandle, RigidBody)> {
        let mut query = self.bodies.query::<(&RigidBody, &Orb)>();
        query
            .iter()
            .map(|(entity, (body, _))| (BodyHandle(entity), *body))
            .collect()
    }

    pub fn orb_count(&self) -> usize {
        self.bodies.query::<&Orb>().iter().count()
    }
}

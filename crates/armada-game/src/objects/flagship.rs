//! The player's flagship.
//!
//! Ship-style movement: W accelerates along the current heading, A/D turn.
//! Turning without thrust rotates the ship in place at reduced speed.
//! Velocity and turn rate decay through drag when their keys are released.
//!
//! The physics integration lives in [`ShipPhysics`], which knows nothing
//! about input or rendering, so it can be stepped directly in tests.

use std::sync::Arc;

use glam::{Vec2, Vec3};

use armada_engine::graphics::{Drawable, RenderData, Texture};
use armada_engine::input::{InputState, Key};
use armada_engine::paint::Color;

// Turn dynamics, degrees/second.
const MAX_ROTATION_SPEED: f32 = 15.0;
const MIN_ROTATION_SPEED: f32 = 5.0;
const ROTATION_ACCELERATION: f32 = 10.0;
const ROTATION_DRAG: f32 = 10.0;

// Forward dynamics, world units/second.
const MAX_VELOCITY: f32 = 50.0;
const MIN_VELOCITY: f32 = 0.0;
const ACCELERATION: f32 = 17.0;
const DRAG: f32 = 17.0;

// Rotate-in-place dynamics.
const MAX_ROTATE_IN_PLACE_VELOCITY: f32 = 15.0;
const MIN_ROTATE_IN_PLACE_VELOCITY: f32 = 0.0;
const ROTATE_IN_PLACE_ACCELERATION: f32 = 9.0;

/// Held-control snapshot consumed by one physics step.
#[derive(Debug, Copy, Clone, Default)]
pub struct ShipControls {
    pub thrust: bool,
    pub port: bool,
    pub starboard: bool,
}

impl ShipControls {
    fn poll(input: &InputState) -> Self {
        Self {
            thrust: input.key_down(Key::W),
            port: input.key_down(Key::A),
            starboard: input.key_down(Key::D),
        }
    }
}

/// Pure ship movement state.
#[derive(Debug, Clone)]
pub struct ShipPhysics {
    pub position: Vec3,
    /// Heading in degrees; 90 points up.
    pub rotation: f32,

    rotation_speed: f32,
    velocity: f32,
}

impl ShipPhysics {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: 90.0,
            rotation_speed: 0.0,
            velocity: 0.0,
        }
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Integrates one step.
    pub fn step(&mut self, dt: f32, controls: ShipControls) {
        let rotate_in_place = !controls.thrust && (controls.port || controls.starboard);

        // Turn rate: accelerate while a turn key is held, decay otherwise.
        if controls.port {
            self.rotation_speed += ROTATION_ACCELERATION * dt;
        } else if controls.starboard {
            self.rotation_speed -= ROTATION_ACCELERATION * dt;
        } else if self.rotation_speed > 0.0 {
            self.rotation_speed -= ROTATION_DRAG * dt;
        } else if self.rotation_speed < 0.0 {
            self.rotation_speed += ROTATION_DRAG * dt;
        }

        // Forward speed: thrust, gentle rotate-in-place creep, or drag.
        if controls.thrust {
            self.velocity += ACCELERATION * dt;
        } else if rotate_in_place {
            self.velocity += ROTATE_IN_PLACE_ACCELERATION * dt;
        } else {
            self.velocity -= DRAG * dt;
        }

        if rotate_in_place {
            self.rotation_speed = self
                .rotation_speed
                .clamp(-MIN_ROTATION_SPEED, MIN_ROTATION_SPEED);
            self.velocity = self
                .velocity
                .clamp(MIN_ROTATE_IN_PLACE_VELOCITY, MAX_ROTATE_IN_PLACE_VELOCITY);
        } else {
            self.rotation_speed = self
                .rotation_speed
                .clamp(-MAX_ROTATION_SPEED, MAX_ROTATION_SPEED);
            self.velocity = self.velocity.clamp(MIN_VELOCITY, MAX_VELOCITY);
        }

        self.rotation += (self.rotation_speed * dt) % 360.0;

        let heading = self.rotation.to_radians();
        self.position.x += self.velocity * heading.cos() * dt;
        self.position.y += self.velocity * heading.sin() * dt;
    }
}

/// The flagship: physics plus its sprite.
pub struct Flagship {
    physics: ShipPhysics,
    scale: Vec2,
    color: Color,
    texture: Arc<Texture>,
}

impl Flagship {
    pub fn new(position: Vec3, scale: Vec2, color: Color, texture: Arc<Texture>) -> Self {
        Self {
            physics: ShipPhysics::new(position),
            scale,
            color,
            texture,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.physics.position
    }

    pub fn rotation(&self) -> f32 {
        self.physics.rotation
    }

    /// Steps ship physics from the held keys.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        self.physics.step(dt, ShipControls::poll(input));
    }

    pub fn drawable(&self) -> Drawable {
        Drawable::Sprite {
            data: RenderData {
                position: self.physics.position,
                scale: self.scale,
                color: self.color,
                rotation: self.physics.rotation,
            },
            texture: self.texture.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRUST: ShipControls = ShipControls {
        thrust: true,
        port: false,
        starboard: false,
    };

    const PORT: ShipControls = ShipControls {
        thrust: false,
        port: true,
        starboard: false,
    };

    #[test]
    fn ship_starts_heading_up_at_rest() {
        let ship = ShipPhysics::new(Vec3::ZERO);
        assert_eq!(ship.rotation, 90.0);
        assert_eq!(ship.velocity(), 0.0);
    }

    #[test]
    fn thrust_moves_along_heading() {
        let mut ship = ShipPhysics::new(Vec3::ZERO);

        for _ in 0..60 {
            ship.step(1.0 / 60.0, THRUST);
        }

        // Heading 90 degrees: movement is straight up.
        assert!(ship.position.y > 0.0);
        assert!(ship.position.x.abs() < 1e-3);
        assert!(ship.velocity() > 0.0);
    }

    #[test]
    fn velocity_clamps_at_max() {
        let mut ship = ShipPhysics::new(Vec3::ZERO);

        for _ in 0..600 {
            ship.step(1.0 / 60.0, THRUST);
        }

        assert!(ship.velocity() <= MAX_VELOCITY);
    }

    #[test]
    fn drag_brings_ship_to_rest() {
        let mut ship = ShipPhysics::new(Vec3::ZERO);

        for _ in 0..120 {
            ship.step(1.0 / 60.0, THRUST);
        }
        for _ in 0..600 {
            ship.step(1.0 / 60.0, ShipControls::default());
        }

        assert_eq!(ship.velocity(), 0.0);
    }

    #[test]
    fn port_turn_increases_heading() {
        let mut ship = ShipPhysics::new(Vec3::ZERO);

        for _ in 0..60 {
            ship.step(1.0 / 60.0, PORT);
        }

        assert!(ship.rotation > 90.0);
    }

    #[test]
    fn rotate_in_place_caps_turn_rate_and_speed() {
        let mut ship = ShipPhysics::new(Vec3::ZERO);

        for _ in 0..600 {
            ship.step(1.0 / 60.0, PORT);
        }

        assert!(ship.velocity() <= MAX_ROTATE_IN_PLACE_VELOCITY);
        assert!(ship.rotation_speed <= MIN_ROTATION_SPEED);
    }
}

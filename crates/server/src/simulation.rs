use std::f64::consts::{FRAC_PI_4, TAU};

use glam::DVec2;

use enkinet::{Color, Entity, PhysicalObject, Robot, Thymio2, Walls, World};

const RING_LEDS: usize = 8;
const RING_PULSE_HZ: f64 = 0.5;
const SBOT_DRIFT_PER_SEC: f64 = 0.05;

/// Kinematic stepper for the served world. No collisions between objects.
#[derive(Debug, Default)]
pub struct Simulation {
    elapsed: f64,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, world: &mut World, dt: f64) {
        self.elapsed += dt;
        let walls = world.walls;
        for entity in world.objects_mut() {
            if let Some(robot) = entity.robot_mut() {
                drive(robot, dt);
                clamp_to_walls(&mut robot.body, &walls);
            }
            match entity {
                Entity::Thymio2(thymio) => pulse_ring(thymio, self.elapsed),
                Entity::Sbot(robot) => robot.body.color = drift(robot.body.color, dt),
                _ => {}
            }
        }
    }
}

/// Differential drive: advance by the mean wheel speed, turn by the wheel
/// speed difference over the axle.
pub fn drive(robot: &mut Robot, dt: f64) {
    let axle = (2.0 * robot.body.shape.bounding_radius()).max(f64::EPSILON);
    let forward = 0.5 * (robot.left_speed + robot.right_speed);
    let turn = (robot.right_speed - robot.left_speed) / axle;

    let body = &mut robot.body;
    body.position += body.heading() * forward * dt;
    body.angle = (body.angle + turn * dt).rem_euclid(TAU);
}

pub fn clamp_to_walls(body: &mut PhysicalObject, walls: &Walls) {
    let radius = body.shape.bounding_radius();
    match *walls {
        Walls::Square { width, height } => {
            let min = DVec2::splat(radius);
            let max = DVec2::new(width - radius, height - radius).max(min);
            body.position = body.position.clamp(min, max);
        }
        Walls::Circular { radius: wall } => {
            let limit = (wall - radius).max(0.0);
            if body.position.length() > limit {
                body.position = body.position.normalize_or_zero() * limit;
            }
        }
        Walls::None => {}
    }
}

fn pulse_ring(thymio: &mut Thymio2, elapsed: f64) {
    for i in 0..RING_LEDS {
        let phase = elapsed * RING_PULSE_HZ * TAU + i as f64 * FRAC_PI_4;
        let index = Thymio2::LED_RING + i;
        if let Some(mut led) = thymio.led(index) {
            led.a = 0.5 + 0.5 * phase.sin();
            thymio.set_led(index, led);
        }
    }
}

fn drift(color: Color, dt: f64) -> Color {
    let step = SBOT_DRIFT_PER_SEC * dt;
    Color::new(
        (color.r + step).rem_euclid(1.0),
        (color.g + step * 0.5).rem_euclid(1.0),
        color.b,
        color.a,
    )
}

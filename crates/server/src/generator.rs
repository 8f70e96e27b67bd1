use std::f64::consts::TAU;

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use enkinet::{
    Color, Entity, EntityType, GroundTexture, Hull, Part, PhysicalObject, Texture,
    Thymio2, Walls, World, registry,
};

use crate::config::GeneratorConfig;

const SQUARE_SIDE: (f64, f64) = (50.0, 300.0);
const RADIUS: (f64, f64) = (50.0, 200.0);
const MAX_SPEED: f64 = 10.0;

/// Seeded source of random worlds and objects.
pub struct WorldGenerator {
    rng: StdRng,
    seed: u64,
    max_hull_parts: usize,
}

impl WorldGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            max_hull_parts: 10,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("world generator seed: {}", seed);
        Self {
            max_hull_parts: config.max_hull_parts.max(1),
            ..Self::new(seed)
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// An empty world: square or circular walls, a color and, half of the
    /// time, a ground texture.
    pub fn world(&mut self) -> World {
        let color = self.color();
        let textured = self.rng.gen_bool(0.5);

        let walls = if self.rng.gen_bool(0.5) {
            Walls::Square {
                width: self.rng.gen_range(SQUARE_SIDE.0..SQUARE_SIDE.1).floor(),
                height: self.rng.gen_range(SQUARE_SIDE.0..SQUARE_SIDE.1).floor(),
            }
        } else {
            Walls::Circular {
                radius: self.rng.gen_range(RADIUS.0..RADIUS.1).floor(),
            }
        };

        let ground_texture = match walls {
            _ if !textured => GroundTexture::default(),
            Walls::Square { width, height } => {
                self.ground_texture((width / 4.0) as u32, (height / 4.0) as u32)
            }
            Walls::Circular { radius } => {
                let side = (radius / 4.0) as u32;
                self.ground_texture(side, side)
            }
            Walls::None => GroundTexture::default(),
        };

        World::new(walls, color, ground_texture)
    }

    /// A world populated as `config` asks.
    pub fn populated(&mut self, config: &GeneratorConfig) -> World {
        let mut world = self.world();
        for _ in 0..config.objects {
            let object = self.physical_object(&world.walls);
            world.add_object(object);
        }
        for _ in 0..config.robots {
            let robot = self.robot(&world.walls, None);
            world.add_object(robot);
        }
        log::info!(
            "generated world with {} objects ({:?})",
            world.object_count(),
            world.walls
        );
        world
    }

    /// A cylinder or a hull of up to `max_hull_parts` parts.
    pub fn physical_object(&mut self, walls: &Walls) -> PhysicalObject {
        let object = if self.rng.gen_bool(0.5) {
            PhysicalObject::cylinder(
                self.rng.gen_range(1.0..5.0),
                self.rng.gen_range(1.0..5.0),
                self.rng.gen_range(1.0..5.0),
            )
        } else {
            let parts = self.rng.gen_range(1..=self.max_hull_parts);
            let hull = self.hull(parts);
            PhysicalObject::with_hull(hull, self.rng.gen_range(1..=50) as f64)
        };

        let position = self.point(walls);
        let angle = self.rng.gen_range(0.0..TAU);
        object.with_color(self.color()).at(position, angle)
    }

    /// A robot of `entity_type`, or of a random robot type when `None`.
    pub fn robot(&mut self, walls: &Walls, entity_type: Option<EntityType>) -> Entity {
        let entity_type = entity_type
            .filter(|t| t.is_robot())
            .unwrap_or_else(|| {
                let robots: Vec<EntityType> =
                    EntityType::ALL.into_iter().filter(|t| t.is_robot()).collect();
                robots[self.rng.gen_range(0..robots.len())]
            });

        let mut entity = registry::create(entity_type);
        let position = self.point(walls);
        let angle = self.rng.gen_range(0.0..TAU);
        let body = entity.body_mut();
        body.position = position;
        body.angle = angle;

        if matches!(entity_type, EntityType::Sbot | EntityType::Marxbot) {
            entity.body_mut().color = self.color();
        }
        if let Some(robot) = entity.robot_mut() {
            let left = self.rng.gen_range(0.0..MAX_SPEED);
            let right = self.rng.gen_range(0.0..MAX_SPEED);
            robot.set_speeds(left, right);
        }
        if let Some(thymio) = entity.as_thymio_mut() {
            self.light_up(thymio);
        }
        entity
    }

    fn light_up(&mut self, thymio: &mut Thymio2) {
        for index in [Thymio2::LED_TOP, Thymio2::LED_BOTTOM_LEFT, Thymio2::LED_BOTTOM_RIGHT] {
            let color = self.color();
            thymio.set_led(index, color);
        }
        for index in Thymio2::LED_BOTTOM_RIGHT + 1..Thymio2::LED_COUNT {
            let intensity = self.rng.gen_range(0.0..=1.0);
            thymio.set_led(index, Color::new(0.0, 0.0, 0.0, intensity));
        }
    }

    pub fn hull(&mut self, parts: usize) -> Hull {
        let complex = self.rng.gen_bool(0.5);
        (0..parts)
            .map(|_| {
                if complex {
                    self.complex_part()
                } else {
                    self.rectangle_part()
                }
            })
            .collect()
    }

    fn complex_part(&mut self) -> Part {
        let sides = self.rng.gen_range(3..=10);
        let shape = self.convex_polygon(sides);
        let height = self.rng.gen_range(1.0..5.0);
        if self.rng.gen_bool(0.5) {
            let textures = (0..shape.len()).map(|_| self.texture()).collect();
            Part::textured(shape, height, textures)
        } else {
            Part::new(shape, height)
        }
    }

    fn rectangle_part(&mut self) -> Part {
        let size = DVec2::new(self.rng.gen_range(1.0..15.0), self.rng.gen_range(1.0..15.0));
        Part::rectangle(DVec2::ZERO, size, self.rng.gen_range(1.0..15.0))
    }

    /// Points on a circle at sorted random angles, so the polygon is convex.
    fn convex_polygon(&mut self, sides: usize) -> Vec<DVec2> {
        let mut angles: Vec<f64> = (0..sides.max(3))
            .map(|_| self.rng.gen_range(0.0..TAU))
            .collect();
        angles.sort_by(f64::total_cmp);

        let radius = self.rng.gen_range(1..=7) as f64;
        angles
            .into_iter()
            .map(|a| DVec2::from_angle(a) * radius)
            .collect()
    }

    fn texture(&mut self) -> Texture {
        let colors = self.rng.gen_range(1..=5);
        Texture((0..colors).map(|_| self.color()).collect())
    }

    fn ground_texture(&mut self, width: u32, height: u32) -> GroundTexture {
        let (width, height) = (width.max(1), height.max(1));
        let data = (0..width * height).map(|_| self.color().to_packed()).collect();
        GroundTexture::new(width, height, data).unwrap_or_default()
    }

    /// A point inside `walls`; unbounded worlds use a 100 unit square.
    pub fn point(&mut self, walls: &Walls) -> DVec2 {
        match *walls {
            Walls::Square { width, height } => DVec2::new(
                self.rng.gen_range(0.0..=width),
                self.rng.gen_range(0.0..=height),
            ),
            Walls::Circular { radius } => loop {
                let p = DVec2::new(
                    self.rng.gen_range(-radius..=radius),
                    self.rng.gen_range(-radius..=radius),
                );
                if p.length_squared() <= radius * radius {
                    break p;
                }
            },
            Walls::None => DVec2::new(
                self.rng.gen_range(0.0..100.0),
                self.rng.gen_range(0.0..100.0),
            ),
        }
    }

    /// Alpha stays above 0.6 so objects remain visible.
    pub fn color(&mut self) -> Color {
        Color::new(
            self.rng.gen_range(0.0..=1.0),
            self.rng.gen_range(0.0..=1.0),
            self.rng.gen_range(0.0..=1.0),
            self.rng.gen_range(0.6..=1.0),
        )
    }
}

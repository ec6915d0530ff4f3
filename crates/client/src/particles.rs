//! Decorative particle field drawn behind the page.
//!
//! The field is simulated here and rendered elsewhere: each [`ParticleField::step`] moves
//! the particles and returns a [`Frame`] of circles and lines to draw.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_PARTICLE_COUNT: usize = 100;
pub const DEFAULT_POINTER_RADIUS: f64 = 120.0;
pub const DEFAULT_CONNECT_DISTANCE: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(...)` notation.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

const PARTICLE_COLOR: Rgba = Rgba::new(255, 255, 255, 0.8);
const FAINT_LINE: Rgba = Rgba::new(255, 255, 255, 0.05);
const MESH_LINE: Rgba = Rgba::new(100, 181, 246, 0.1);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldConfig {
    pub count: usize,
    pub width: f64,
    pub height: f64,
    pub pointer_radius: f64,
    pub connect_distance: f64,
}

impl FieldConfig {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            count: DEFAULT_PARTICLE_COUNT,
            width,
            height,
            pointer_radius: DEFAULT_POINTER_RADIUS,
            connect_distance: DEFAULT_CONNECT_DISTANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub vx: f64,
    pub vy: f64,
    pub near_pointer: bool,
}

impl Particle {
    fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub color: Rgba,
    pub width: f64,
}

/// Everything to draw for one animation frame, in draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub circles: Vec<Circle>,
    pub lines: Vec<Line>,
}

pub struct ParticleField {
    config: FieldConfig,
    particles: Vec<Particle>,
    pointer: Option<(f64, f64)>,
    running: bool,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(config: FieldConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic field for a given seed.
    pub fn seeded(config: FieldConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: FieldConfig, rng: StdRng) -> Self {
        let mut field = Self {
            config,
            particles: Vec::with_capacity(config.count),
            pointer: None,
            running: true,
            rng,
        };
        field.respawn();
        field
    }

    fn respawn(&mut self) {
        let FieldConfig {
            count,
            width,
            height,
            ..
        } = self.config;
        self.particles.clear();
        for _ in 0..count {
            let size = self.rng.gen::<f64>() * 3.0 + 1.0;
            let x = self.rng.gen::<f64>() * (width - size * 2.0).max(0.0) + size;
            let y = self.rng.gen::<f64>() * (height - size * 2.0).max(0.0) + size;
            let vx = (self.rng.gen::<f64>() - 0.5) * 0.5;
            let vy = (self.rng.gen::<f64>() - 0.5) * 0.5;
            self.particles.push(Particle {
                x,
                y,
                size,
                vx,
                vy,
                near_pointer: false,
            });
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Pointer position, or `None` once it leaves the canvas.
    pub fn set_pointer(&mut self, pointer: Option<(f64, f64)>) {
        self.pointer = pointer;
    }

    /// New canvas size; the pool is re-seeded inside the new bounds.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.width = width;
        self.config.height = height;
        self.respawn();
    }

    /// Starts or stops the animation. Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        tracing::debug!("particle animation running: {}", self.running);
        self.running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances one frame. A stopped field produces nothing.
    pub fn step(&mut self) -> Option<Frame> {
        if !self.running {
            return None;
        }

        let FieldConfig {
            width,
            height,
            pointer_radius,
            ..
        } = self.config;

        let mut frame = Frame::default();
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            if p.x > width || p.x < 0.0 {
                p.vx = -p.vx;
            }
            if p.y > height || p.y < 0.0 {
                p.vy = -p.vy;
            }
            p.near_pointer = self
                .pointer
                .is_some_and(|(px, py)| p.distance_to(px, py) < pointer_radius);
            frame.circles.push(Circle {
                x: p.x,
                y: p.y,
                radius: p.size,
                color: PARTICLE_COLOR,
            });
        }

        self.connect(&mut frame);
        Some(frame)
    }

    fn connect(&self, frame: &mut Frame) {
        let radius = self.config.pointer_radius;
        let connect = self.config.connect_distance;
        let particles = &self.particles;

        for (i, p) in particles.iter().enumerate() {
            let pointer_distance = self
                .pointer
                .map(|(px, py)| (px, py, p.distance_to(px, py)))
                .filter(|&(_, _, d)| d < radius);

            match pointer_distance {
                Some((px, py, d)) => {
                    frame.lines.push(Line {
                        from: (p.x, p.y),
                        to: (px, py),
                        color: Rgba::new(255, 255, 255, 1.0 - d / radius),
                        width: 1.0,
                    });
                    for (j, other) in particles.iter().enumerate() {
                        let d2 = p.distance_to(other.x, other.y);
                        if i != j && d2 < connect / 2.0 {
                            frame.lines.push(Line {
                                from: (p.x, p.y),
                                to: (other.x, other.y),
                                color: Rgba::new(255, 255, 255, 0.5 - d2 / (connect * 2.0)),
                                width: 1.0,
                            });
                        }
                    }
                }
                None => {
                    for (j, other) in particles.iter().enumerate() {
                        if i != j && p.distance_to(other.x, other.y) < connect {
                            frame.lines.push(Line {
                                from: (p.x, p.y),
                                to: (other.x, other.y),
                                color: FAINT_LINE,
                                width: 1.0,
                            });
                        }
                    }
                }
            }
        }

        for (i, a) in particles.iter().enumerate() {
            for b in &particles[i + 1..] {
                if !a.near_pointer
                    && !b.near_pointer
                    && a.distance_to(b.x, b.y) < connect
                {
                    frame.lines.push(Line {
                        from: (a.x, a.y),
                        to: (b.x, b.y),
                        color: MESH_LINE,
                        width: 0.5,
                    });
                }
            }
        }
    }
}

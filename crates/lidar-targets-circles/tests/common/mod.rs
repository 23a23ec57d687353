//! Synthetic sweeps of a four-hole board seen by a 64-ring sensor.
#![allow(dead_code)]

use lidar_targets_circles::{CalibrationConfig, FramePair, PatternParams};
use lidar_targets_core::{LidarPoint, PointCloud};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const RINGS: u16 = 64;
pub const RING_SPACING: f64 = 0.0155;
pub const RADIUS: f64 = 0.12;
pub const HALF_WIDTH: f64 = 0.6;
pub const HOLES: [(f64, f64); 4] = [(0.3, 0.25), (-0.3, 0.25), (-0.3, -0.25), (0.3, -0.25)];

/// Board plane `x = depth + 0.02 y + 0.01 z`, spanning |y| <= 0.6.
#[derive(Clone, Debug)]
pub struct BoardScene {
    pub depth: f64,
    /// Holes taped over; they read as plain board.
    pub covered: [bool; 4],
    /// Intensity of interior board points.
    pub interior_intensity: f32,
}

impl Default for BoardScene {
    fn default() -> Self {
        Self {
            depth: 3.0,
            covered: [false; 4],
            interior_intensity: 0.0,
        }
    }
}

impl BoardScene {
    pub fn board_x(&self, y: f64, z: f64) -> f64 {
        self.depth + 0.02 * y + 0.01 * z
    }

    /// Hole centers in the sensor frame, on the board plane.
    pub fn truth_centers(&self) -> Vec<Point3<f64>> {
        HOLES
            .iter()
            .zip(self.covered)
            .filter(|(_, covered)| !covered)
            .map(|(&(y, z), _)| Point3::new(self.board_x(y, z), y, z))
            .collect()
    }

    fn open_holes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        HOLES
            .iter()
            .zip(self.covered)
            .filter(|(_, covered)| !covered)
            .map(|(&h, _)| h)
    }

    fn board_point(&self, y: f64, z: f64, ring: u16, intensity: f32, rng: &mut StdRng) -> LidarPoint {
        let y = y + rng.gen_range(-0.001..0.001);
        let z = z + rng.gen_range(-0.001..0.001);
        let x = self.board_x(y, z) + rng.gen_range(-0.002..0.002);
        LidarPoint::new(x, y, z)
            .with_intensity(intensity)
            .with_ring(ring)
    }

    /// One sweep. Edge points carry intensity 1, interior board points
    /// `interior_intensity`; returns through the holes hit a wall at x = 8.
    pub fn sweep(&self, seed: u64) -> FramePair {
        let mut rng = StdRng::seed_from_u64(seed);
        let holes: Vec<(f64, f64)> = self.open_holes().collect();
        let mut board = PointCloud::default();
        let mut background = PointCloud::default();

        for ring in 0..RINGS {
            let z = (ring as f64 - 31.5) * RING_SPACING;
            let inside = |y: f64| {
                holes
                    .iter()
                    .any(|&(cy, cz)| (y - cy).powi(2) + (z - cz).powi(2) < RADIUS * RADIUS)
            };

            board.push(self.board_point(-HALF_WIDTH, z, ring, 1.0, &mut rng));
            board.push(self.board_point(HALF_WIDTH, z, ring, 1.0, &mut rng));
            let mut y = -HALF_WIDTH + 0.015;
            while y < HALF_WIDTH - 0.01 {
                if !inside(y) {
                    board.push(self.board_point(y, z, ring, self.interior_intensity, &mut rng));
                }
                y += 0.015;
            }

            for &(cy, cz) in &holes {
                let dz = z - cz;
                if dz.abs() >= RADIUS {
                    continue;
                }
                let half = (RADIUS * RADIUS - dz * dz).sqrt();
                board.push(self.board_point(cy - half, z, ring, 1.0, &mut rng));
                board.push(self.board_point(cy + half, z, ring, 1.0, &mut rng));

                // Rays through the hole continue to the wall behind.
                let mut yh = cy - half + 0.02;
                while yh < cy + half - 0.01 {
                    let scale = 8.0 / self.board_x(yh, z);
                    background.push(
                        LidarPoint::new(8.0 + rng.gen_range(-0.01..0.01), yh * scale, z * scale)
                            .with_intensity(1.0)
                            .with_ring(ring),
                    );
                    yh += 0.03;
                }
            }
        }

        let full = board.iter().chain(background.iter()).copied().collect();
        FramePair { full, board }
    }
}

pub fn pattern_params() -> PatternParams {
    PatternParams::for_sensor(RINGS)
}

pub fn calibration_config() -> CalibrationConfig {
    CalibrationConfig {
        pattern: pattern_params(),
        ..CalibrationConfig::default()
    }
}

/// Index of the truth center closest to `p`, with the distance.
pub fn closest_truth(truth: &[Point3<f64>], p: &Point3<f64>) -> (usize, f64) {
    truth
        .iter()
        .enumerate()
        .map(|(i, t)| (i, (t - p).norm()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .expect("non-empty truth")
}

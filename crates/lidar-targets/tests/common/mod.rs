#![allow(dead_code)]

use std::path::Path;

use lidar_targets::circles::write_frames_jsonl;
use lidar_targets::{CalibrationConfig, FramePair, LidarPoint, PointCloud};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HOLES: [(f64, f64); 4] = [(0.3, 0.25), (-0.3, 0.25), (-0.3, -0.25), (0.3, -0.25)];
const RADIUS: f64 = 0.12;

/// Sweep of a board at x ~ 3 m with four 12 cm holes, 64 rings.
pub fn board_sweep(seed: u64) -> FramePair {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut point = |y: f64, z: f64, ring: u16, intensity: f32| {
        let y = y + rng.gen_range(-0.001..0.001);
        let z = z + rng.gen_range(-0.001..0.001);
        let x = 3.0 + 0.02 * y + rng.gen_range(-0.002..0.002);
        LidarPoint::new(x, y, z).with_intensity(intensity).with_ring(ring)
    };

    let mut board = PointCloud::default();
    for ring in 0..64u16 {
        let z = (ring as f64 - 31.5) * 0.0155;
        board.push(point(-0.6, z, ring, 1.0));
        board.push(point(0.6, z, ring, 1.0));
        let mut y = -0.585;
        while y < 0.59 {
            let inside = HOLES
                .iter()
                .any(|&(cy, cz)| (y - cy).powi(2) + (z - cz).powi(2) < RADIUS * RADIUS);
            if !inside {
                board.push(point(y, z, ring, 0.0));
            }
            y += 0.015;
        }
        for &(cy, cz) in &HOLES {
            let dz = z - cz;
            if dz.abs() < RADIUS {
                let half = (RADIUS * RADIUS - dz * dz).sqrt();
                board.push(point(cy - half, z, ring, 1.0));
                board.push(point(cy + half, z, ring, 1.0));
            }
        }
    }
    FramePair {
        full: board.clone(),
        board,
    }
}

pub fn config() -> CalibrationConfig {
    let mut cfg = CalibrationConfig::default();
    cfg.pattern.ring_count = 64;
    cfg
}

pub fn write_frames(path: &Path, n: u64) {
    let frames: Vec<FramePair> = (0..n).map(|i| board_sweep(20 + i)).collect();
    let file = std::fs::File::create(path).expect("create frames file");
    write_frames_jsonl(std::io::BufWriter::new(file), &frames).expect("write frames");
}

//! Static scene data: starfield layout and character eye sizing

use serde::{Deserialize, Serialize};

/// (size, x fraction, y fraction) of each background star
const STARS: [(f64, f64, f64); 10] = [
    (12.0, 0.7, 0.1),
    (25.0, 0.8, 0.2),
    (12.0, 0.6, 0.29),
    (12.0, 0.55, 0.32),
    (25.0, 0.25, 0.4),
    (46.0, 0.6, 0.6),
    (25.0, 0.8, 0.65),
    (12.0, 0.15, 0.7),
    (25.0, 0.25, 0.8),
    (12.0, 0.8, 0.85),
];

const EYE_SCALE: f64 = 300.0;
const MIN_EYE_HEIGHT: f64 = 5.0;

/// One round star in play-area points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
    pub corner_radius: f64,
}

/// Lay the starfield out over a play area of the given size
pub fn starfield(width: f64, height: f64) -> Vec<Star> {
    STARS
        .iter()
        .map(|&(size, fx, fy)| Star {
            x: width * fx,
            y: height * fy,
            diameter: size / 2.0,
            corner_radius: size / 4.0,
        })
        .collect()
}

/// Character eye height for an eye-gap signal, never below a sliver
pub fn character_eye_height(eye_gap: f64) -> f64 {
    (eye_gap * EYE_SCALE).max(MIN_EYE_HEIGHT)
}

//! Math utilities and types for the simulation.
//!
//! This module provides the vector type used throughout the game logic, plus
//! helper functions for angle handling.
//!
//! # Module Organization
//!
//! - [`vec`] module contains all vector operations
//! - Utility functions like heading conversions are provided at root level

pub mod vec;

use std::f32::consts::PI;

/// Converts a pursuit heading (`atan2(dz, dx)`) into the yaw a model needs to
/// face along that heading.
///
/// Model meshes face down +Z at yaw 0, while pursuit headings are measured
/// from the +X axis, hence the quarter-turn offset. A heading straight down
/// +X becomes a quarter turn of yaw.
pub fn fixed_rotation_angle(heading: f32) -> f32 {
    (PI / 2.0) - heading
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn heading_along_positive_z_needs_no_yaw() {
        // atan2(1, 0) = pi/2, which cancels the offset exactly.
        assert_relative_eq!(fixed_rotation_angle(PI / 2.0), 0.0);
    }

    #[test]
    fn heading_along_positive_x_is_a_quarter_turn() {
        assert_relative_eq!(fixed_rotation_angle(0.0), PI / 2.0);
    }
}

//! Plane-aligned coordinate frame.
//!
//! The frame rotates the board normal onto `(0, 0, -1)`. In it every board
//! point has the same z (the canonical elevation), so circle fitting works on
//! `(x, y)` alone.

use std::f64::consts::PI;

use lidar_targets_core::Plane;
use nalgebra::{Point2, Point3, Rotation3, Vector3};

#[derive(Clone, Debug)]
pub struct PlaneFrame {
    plane: Plane,
    rotation: Rotation3<f64>,
    elevation: f64,
}

impl PlaneFrame {
    pub fn new(plane: Plane) -> Self {
        let target = -Vector3::z();
        let rotation = Rotation3::rotation_between(&plane.normal, &target)
            .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), PI));
        let elevation = (rotation * plane.foot_point()).z;
        Self {
            plane,
            rotation,
            elevation,
        }
    }

    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    #[inline]
    pub fn rotation(&self) -> &Rotation3<f64> {
        &self.rotation
    }

    /// z of every on-plane point after rotation.
    #[inline]
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    /// Sensor frame to plane frame.
    #[inline]
    pub fn rotate(&self, p: &Point3<f64>) -> Point3<f64> {
        self.rotation * p
    }

    /// In-plane coordinates of a sensor-frame point.
    #[inline]
    pub fn flatten(&self, p: &Point3<f64>) -> Point2<f64> {
        let r = self.rotate(p);
        Point2::new(r.x, r.y)
    }

    /// Map an in-plane point back to the sensor frame, exactly onto the plane.
    ///
    /// After undoing the rotation, the coordinate along the normal's dominant
    /// component is re-solved from the plane equation.
    pub fn back_project(&self, q: &Point2<f64>) -> Point3<f64> {
        let lifted = Point3::new(q.x, q.y, self.elevation);
        let mut p = self.rotation.inverse_transform_point(&lifted);
        let n = &self.plane.normal;
        let k = self.plane.dominant_axis();
        let rest: f64 = (0..3).filter(|&j| j != k).map(|j| n[j] * p[j]).sum();
        p[k] = -(self.plane.d + rest) / n[k];
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn on_plane(plane: &Plane, y: f64, z: f64) -> Point3<f64> {
        let n = plane.normal;
        Point3::new(-(n.y * y + n.z * z + plane.d) / n.x, y, z)
    }

    #[test]
    fn normal_maps_to_canonical_axis() {
        let plane = Plane::from_coefficients([0.98, 0.15, 0.05, -3.1]).unwrap();
        let frame = PlaneFrame::new(plane);
        assert_relative_eq!(frame.rotation() * plane.normal, -Vector3::z(), epsilon = 1e-12);
        for (y, z) in [(0.3, 0.2), (-0.5, 0.1), (0.0, -0.4)] {
            let p = on_plane(&plane, y, z);
            assert_relative_eq!(frame.rotate(&p).z, frame.elevation(), epsilon = 1e-12);
        }
    }

    #[test]
    fn flatten_then_back_project_recovers_on_plane_points() {
        let plane = Plane::from_coefficients([1.0, -0.1, 0.2, -4.0]).unwrap();
        let frame = PlaneFrame::new(plane);
        for (y, z) in [(0.3, 0.25), (-0.3, -0.25), (0.05, 0.6)] {
            let p = on_plane(&plane, y, z);
            let back = frame.back_project(&frame.flatten(&p));
            assert_relative_eq!(back, p, epsilon = 1e-9);
            assert_relative_eq!(plane.distance(&back), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn back_projection_snaps_onto_plane() {
        let plane = Plane::from_coefficients([0.0, 1.0, 0.1, -2.0]).unwrap();
        let frame = PlaneFrame::new(plane);
        let p = frame.back_project(&Point2::new(0.4, -0.7));
        assert_relative_eq!(plane.signed_distance(&p), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn anti_parallel_normal_uses_half_turn() {
        let plane = Plane::from_coefficients([0.0, 0.0, 1.0, 2.0]).unwrap();
        let frame = PlaneFrame::new(plane);
        assert_relative_eq!(frame.rotation() * plane.normal, -Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(frame.elevation(), 2.0, epsilon = 1e-12);
        let p = Point3::new(0.7, -0.2, -2.0);
        assert_relative_eq!(frame.back_project(&frame.flatten(&p)), p, epsilon = 1e-12);
    }
}

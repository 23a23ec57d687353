use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// One return of a multi-beam range sensor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LidarPoint {
    pub position: Point3<f64>,
    /// Return strength, or a per-point range discontinuity value computed
    /// upstream. Zero when the sensor does not provide one.
    #[serde(default)]
    pub intensity: f32,
    /// Scan-line (ring) index of the beam that produced this return.
    #[serde(default)]
    pub ring: Option<u16>,
}

impl LidarPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            intensity: 0.0,
            ring: None,
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_ring(mut self, ring: u16) -> Self {
        self.ring = Some(ring);
        self
    }

    #[inline]
    pub fn coords(&self) -> [f64; 3] {
        [self.position.x, self.position.y, self.position.z]
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
    }
}

/// Ordered point container. Point order is the sensor's scan order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<LidarPoint>,
}

impl PointCloud {
    pub fn new(points: Vec<LidarPoint>) -> Self {
        Self { points }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: LidarPoint) {
        self.points.push(point);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LidarPoint> {
        self.points.iter()
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub fn coords(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(LidarPoint::coords).collect()
    }

    /// Copy of the cloud restricted to `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> PointCloud {
        PointCloud {
            points: indices.iter().map(|&i| self.points[i]).collect(),
        }
    }

    /// Drop points with NaN or infinite coordinates. Returns how many were removed.
    pub fn retain_finite(&mut self) -> usize {
        let before = self.points.len();
        self.points.retain(LidarPoint::is_finite);
        before - self.points.len()
    }

    pub fn centroid(&self) -> Option<Point3<f64>> {
        centroid(self.points.iter().map(|p| p.position))
    }
}

impl FromIterator<LidarPoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = LidarPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a LidarPoint;
    type IntoIter = std::slice::Iter<'a, LidarPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Arithmetic mean of a set of positions; `None` for an empty set.
pub fn centroid<I>(points: I) -> Option<Point3<f64>>
where
    I: IntoIterator<Item = Point3<f64>>,
{
    let mut acc = nalgebra::Vector3::zeros();
    let mut n = 0usize;
    for p in points {
        acc += p.coords;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(Point3::from(acc / n as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retain_finite_drops_nan_points() {
        let mut cloud = PointCloud::new(vec![
            LidarPoint::new(1.0, 2.0, 3.0),
            LidarPoint::new(f64::NAN, 0.0, 0.0),
            LidarPoint::new(0.0, f64::INFINITY, 0.0),
            LidarPoint::new(-1.0, 0.5, 0.0),
        ]);
        assert_eq!(cloud.retain_finite(), 2);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points[1].position, Point3::new(-1.0, 0.5, 0.0));
    }

    #[test]
    fn point_json_defaults_missing_fields() {
        let p: LidarPoint = serde_json::from_str(r#"{"position":[1.0,2.0,3.0]}"#).unwrap();
        assert_eq!(p.intensity, 0.0);
        assert_eq!(p.ring, None);
    }

    #[test]
    fn centroid_of_empty_set_is_none() {
        assert!(PointCloud::default().centroid().is_none());
        let c = PointCloud::new(vec![LidarPoint::new(0.0, 0.0, 0.0), LidarPoint::new(2.0, 4.0, 6.0)])
            .centroid()
            .unwrap();
        assert_eq!(c, Point3::new(1.0, 2.0, 3.0));
    }
}

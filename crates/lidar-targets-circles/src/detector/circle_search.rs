//! Iterative, centroid-gated circle search.
//!
//! Candidate indices live in two partitions. `remaining` is what the next fit
//! samples from. `quarantine` holds inliers of circles that sat too close to
//! the pattern centroid; those points often belong to a real cut-out that the
//! bad fit swallowed, so every accepted circle releases the quarantined points
//! near its outline back into `remaining`.

use lidar_targets_core::{fit_circle_ransac, Circle2};
use nalgebra::{distance, Point2};

use super::result::{CircleAttempt, CircleVerdict};
use crate::params::CircleParams;

/// Number of cut-outs on the board.
pub const PATTERN_CIRCLES: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AcceptedCircle {
    pub circle: Circle2,
    pub inliers: Vec<usize>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CircleSearch {
    pub accepted: Vec<AcceptedCircle>,
    pub attempts: Vec<CircleAttempt>,
}

pub(crate) fn search_circles(
    points: &[Point2<f64>],
    centroid: &Point2<f64>,
    params: &CircleParams,
    seed: u64,
) -> CircleSearch {
    let limits = params.radius_limits();
    let mut out = CircleSearch::default();
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut quarantine: Vec<usize> = Vec::new();
    let mut in_fit = vec![false; points.len()];

    while out.accepted.len() < PATTERN_CIRCLES
        && !remaining.is_empty()
        && remaining.len() + quarantine.len() >= 3
        && out.attempts.len() < params.max_attempts
    {
        let subset: Vec<Point2<f64>> = remaining.iter().map(|&i| points[i]).collect();
        let ransac = params.ransac(seed.wrapping_add(out.attempts.len() as u64));
        let Some(fit) = fit_circle_ransac(&subset, limits, &ransac) else {
            log::debug!("no circle left in {} points", remaining.len());
            break;
        };
        let inliers: Vec<usize> = fit.inliers.iter().map(|&k| remaining[k]).collect();
        let circle = fit.circle;
        let centroid_distance = distance(&circle.center, centroid);

        let verdict = if centroid_distance < params.centroid_distance_min {
            quarantine.extend_from_slice(&inliers);
            CircleVerdict::TooCentral
        } else if centroid_distance > params.centroid_distance_max {
            CircleVerdict::TooFar
        } else if out
            .accepted
            .iter()
            .any(|a| distance(&a.circle.center, &circle.center) < params.duplicate_distance)
        {
            CircleVerdict::Duplicate
        } else {
            let gate = params.reclaim_distance();
            let (released, kept): (Vec<usize>, Vec<usize>) = std::mem::take(&mut quarantine)
                .into_iter()
                .partition(|&i| distance(&points[i], &circle.center) < gate);
            quarantine = kept;
            let reclaimed = released.len();
            remaining.extend(released);
            out.accepted.push(AcceptedCircle {
                circle,
                inliers: inliers.clone(),
            });
            CircleVerdict::Accepted { reclaimed }
        };
        log::debug!(
            "circle ({:.3}, {:.3}) r={:.3} with {} inliers, centroid distance {:.3}: {:?}",
            circle.center.x,
            circle.center.y,
            circle.radius,
            inliers.len(),
            centroid_distance,
            verdict
        );

        for &i in &inliers {
            in_fit[i] = true;
        }
        remaining.retain(|&i| !in_fit[i]);
        for &i in &inliers {
            in_fit[i] = false;
        }
        remaining.sort_unstable();

        out.attempts.push(CircleAttempt {
            circle,
            centroid_distance,
            verdict,
            inliers,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn arc(cx: f64, cy: f64, r: f64, n: usize, start_deg: f64) -> Vec<Point2<f64>> {
        let step = 2.0 * PI / n as f64;
        let start = start_deg.to_radians();
        (0..n)
            .map(|k| {
                let t = start + step * k as f64;
                Point2::new(cx + r * t.cos(), cy + r * t.sin())
            })
            .collect()
    }

    fn params() -> CircleParams {
        CircleParams {
            centroid_distance_min: 0.1,
            centroid_distance_max: 0.6,
            ..CircleParams::default()
        }
    }

    #[test]
    fn four_cut_outs_are_all_accepted() {
        let mut pts = Vec::new();
        for (cx, cy) in [(0.3, 0.25), (-0.3, 0.25), (-0.3, -0.25), (0.3, -0.25)] {
            pts.extend(arc(cx, cy, 0.12, 24, 5.0));
        }
        let search = search_circles(&pts, &Point2::origin(), &params(), 42);
        assert_eq!(search.accepted.len(), 4);
        for a in &search.accepted {
            assert_relative_eq!(a.circle.radius, 0.12, epsilon = 1e-6);
            assert_relative_eq!(a.circle.center.x.abs(), 0.3, epsilon = 1e-6);
            assert_relative_eq!(a.circle.center.y.abs(), 0.25, epsilon = 1e-6);
            assert_eq!(a.inliers.len(), 24);
        }
        assert!(search
            .attempts
            .iter()
            .all(|a| matches!(a.verdict, CircleVerdict::Accepted { reclaimed: 0 })));
    }

    #[test]
    fn nearby_second_circle_is_a_duplicate() {
        let mut pts = arc(0.4, 0.0, 0.12, 40, 2.0);
        pts.extend(arc(0.4, 0.1, 0.12, 24, 7.0));
        let search = search_circles(&pts, &Point2::origin(), &params(), 42);
        assert_eq!(search.accepted.len(), 1);
        // A few points of the second circle sit on the first outline and pull the refit slightly.
        assert_relative_eq!(search.accepted[0].circle.center.y, 0.0, epsilon = 0.01);
        let verdicts: Vec<CircleVerdict> = search.attempts.iter().map(|a| a.verdict).collect();
        assert_eq!(
            verdicts,
            vec![CircleVerdict::Accepted { reclaimed: 0 }, CircleVerdict::Duplicate]
        );
    }

    #[test]
    fn far_circle_is_discarded() {
        let pts = arc(1.0, 0.0, 0.12, 30, 0.0);
        let search = search_circles(&pts, &Point2::origin(), &params(), 42);
        assert!(search.accepted.is_empty());
        assert_eq!(search.attempts.len(), 1);
        assert_eq!(search.attempts[0].verdict, CircleVerdict::TooFar);
        assert_eq!(search.attempts[0].inliers.len(), 30);
    }

    #[test]
    fn quarantined_points_near_an_accepted_circle_are_reclaimed() {
        // Central circle fitted first, then a valid circle next to it whose
        // reclaim gate reaches four quarantined points.
        let mut pts = arc(0.05, 0.0, 0.12, 50, 3.6);
        pts.extend(arc(0.3, 0.0, 0.12, 30, 6.0));
        let search = search_circles(&pts, &Point2::origin(), &params(), 42);

        let verdicts: Vec<CircleVerdict> = search.attempts.iter().map(|a| a.verdict).collect();
        assert_eq!(
            verdicts,
            vec![
                CircleVerdict::TooCentral,
                CircleVerdict::Accepted { reclaimed: 4 },
                CircleVerdict::TooCentral,
            ]
        );
        assert_eq!(search.attempts[0].inliers.len(), 50);
        assert_eq!(search.attempts[2].inliers.len(), 4);
        assert_eq!(search.accepted.len(), 1);
        assert_relative_eq!(search.accepted[0].circle.center.x, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn attempts_are_capped() {
        let pts = arc(1.0, 0.0, 0.12, 30, 0.0);
        let p = CircleParams {
            max_attempts: 0,
            ..params()
        };
        assert!(search_circles(&pts, &Point2::origin(), &p, 1).attempts.is_empty());
    }

    #[test]
    fn fewer_than_three_points_stop_immediately() {
        let pts = vec![Point2::new(0.3, 0.0), Point2::new(0.4, 0.1)];
        assert!(search_circles(&pts, &Point2::origin(), &params(), 1).attempts.is_empty());
    }
}

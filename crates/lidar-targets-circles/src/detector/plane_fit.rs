use lidar_targets_core::{fit_plane_ransac, AxisConstraint, PlaneFit, PointCloud, RansacParams};

use super::PatternError;

/// Segment the board plane from the board-segmented cloud.
pub(crate) fn extract_board_plane(
    board: &PointCloud,
    constraint: &AxisConstraint,
    ransac: &RansacParams,
) -> Result<PlaneFit, PatternError> {
    let fit = fit_plane_ransac(&board.positions(), constraint, ransac)
        .filter(|fit| !fit.inliers.is_empty())
        .ok_or(PatternError::PlaneNotFound)?;
    log::debug!(
        "board plane {:?} with {}/{} inliers",
        fit.plane.coefficients(),
        fit.inliers.len(),
        board.len()
    );
    Ok(fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lidar_targets_core::{AxisMode, LidarPoint};
    use nalgebra::Vector3;

    #[test]
    fn empty_board_has_no_plane() {
        let constraint = AxisConstraint::new(Vector3::z(), 0.3, AxisMode::PlaneParallel).unwrap();
        let err = extract_board_plane(&PointCloud::default(), &constraint, &RansacParams::default())
            .unwrap_err();
        assert_eq!(err, PatternError::PlaneNotFound);
    }

    #[test]
    fn floor_is_rejected_for_vertical_constraint() {
        let board: PointCloud = (0..100)
            .map(|i| LidarPoint::new((i % 10) as f64 * 0.1, (i / 10) as f64 * 0.1 + 0.003 * (i % 10) as f64, -1.5))
            .collect();
        let constraint = AxisConstraint::new(Vector3::z(), 0.3, AxisMode::PlaneParallel).unwrap();
        assert_eq!(
            extract_board_plane(&board, &constraint, &RansacParams::default()).unwrap_err(),
            PatternError::PlaneNotFound
        );
    }
}

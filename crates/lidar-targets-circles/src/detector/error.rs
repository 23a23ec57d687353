/// Reasons a sweep is dropped before any circle is fitted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("no board plane satisfies the axis constraint")]
    PlaneNotFound,
    #[error("no pattern edges detected")]
    NoEdges,
    #[error("no scan line carries enough edge points")]
    NoCandidates,
    #[error("too many outliers ({candidates} candidates, limit {limit})")]
    TooManyOutliers { candidates: usize, limit: usize },
    #[error("no pattern cluster among the candidates")]
    NoPatternCluster,
}

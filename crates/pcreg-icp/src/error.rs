/// Errors raised by the registration estimators.
#[derive(Debug, thiserror::Error)]
pub enum IcpError {
    /// The source or the target cloud has no points.
    #[error("Cannot register an empty point cloud")]
    EmptyPointCloud,

    /// Too few correspondences survived the distance threshold.
    #[error("Found {found} correspondences, at least {required} are required")]
    NotEnoughCorrespondences {
        /// Number of correspondences found.
        found: usize,
        /// Minimum number required by the rigid fit.
        required: usize,
    },

    /// A configuration value is outside its valid range.
    #[error("Invalid ICP config `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the configuration field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

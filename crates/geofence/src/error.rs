//! Error types for the geofence core.

use crate::codec::CodecError;
use crate::types::RegionError;
use thiserror::Error;

/// Result type for core operations that cross a platform or storage seam.
pub type Result<T> = std::result::Result<T, GeofenceError>;

/// Errors surfaced by the platform and persistence seams.
///
/// None of these are fatal: callers log them and degrade to a no-op.
#[derive(Debug, Error)]
pub enum GeofenceError {
    /// A region or coordinate violated its invariants.
    #[error("invalid region: {0}")]
    Region(#[from] RegionError),

    /// A region blob could not be decoded.
    #[error("region encoding error: {0}")]
    Codec(#[from] CodecError),

    /// The platform geofencing or location service reported a failure.
    #[error("platform adapter failed: {0}")]
    Adapter(String),

    /// The persistence backend reported a failure.
    #[error("storage failed: {0}")]
    Storage(String),
}

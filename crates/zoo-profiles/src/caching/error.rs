use std::error::Error;

use thiserror::Error;

/// An error that happens when fetching profile data from the remote API.
///
/// Every variant is fully absorbed inside the profile cache and normalized
/// into the settled value. Which variants are logged on the way is decided at
/// the use site: expected absence stays silent, everything else warns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The resource does not exist at the remote source.
    ///
    /// Covers both 404 and 400 responses, which the API uses interchangeably
    /// for unknown users and profiles.
    #[error("not found")]
    NotFound,
    /// The resource could not be fetched due to a transport problem or an
    /// unexpected status code.
    ///
    /// The attached string contains the root cause.
    #[error("download failed: {0}")]
    Download(String),
    /// The resource was fetched successfully, but its body is not the
    /// expected JSON shape.
    #[error("malformed: {0}")]
    Malformed(String),
    /// The API flagged the fetched profile as invalid.
    #[error("invalid profile")]
    Invalid,
}

impl FetchError {
    fn download_error(mut error: &dyn Error) -> Self {
        while let Some(source) = error.source() {
            error = source;
        }

        Self::Download(error.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::download_error(&error)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

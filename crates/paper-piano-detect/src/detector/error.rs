/// Errors returned by the paper detector.
///
/// Failing to find a sheet or markers is not an error; those cases produce
/// an empty [`super::DetectionResult`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidFrame { width: u32, height: u32 },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl DetectError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

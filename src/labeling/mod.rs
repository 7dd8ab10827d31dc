mod vision;

use std::fmt;

use async_trait::async_trait;

pub use self::vision::VisionLabeler;

#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("labeling API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("labeling failed for image: {0}")]
    Annotation(String),
}

/// The image handed to a labeler.
#[derive(Debug, Clone, Copy)]
pub struct ImageSource<'a> {
    /// Location reported by the object store
    pub uri: &'a str,
    pub content: &'a [u8],
}

/// How likely the first detected face is to be showing joy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Joy {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Joy {
    /// Parse the service's likelihood name (`VERY_LIKELY` etc.).
    /// Anything unrecognised is `Unknown`.
    pub fn from_likelihood(name: &str) -> Self {
        match name {
            "VERY_UNLIKELY" => Joy::VeryUnlikely,
            "UNLIKELY" => Joy::Unlikely,
            "POSSIBLE" => Joy::Possible,
            "LIKELY" => Joy::Likely,
            "VERY_LIKELY" => Joy::VeryLikely,
            _ => Joy::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Joy::Unknown => "Unknown",
            Joy::VeryUnlikely => "Very Unlikely",
            Joy::Unlikely => "Unlikely",
            Joy::Possible => "Possible",
            Joy::Likely => "Likely",
            Joy::VeryLikely => "Very Likely",
        }
    }
}

impl fmt::Display for Joy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image analysis backed by a vision service.
#[async_trait]
pub trait Labeler: Send + Sync {
    /// Descriptive text labels for the image, most relevant first.
    async fn detect_labels(&self, image: ImageSource<'_>) -> Result<Vec<String>, LabelError>;

    /// Joy likelihood of the first face found; `Unknown` when there is none.
    async fn detect_joy(&self, image: ImageSource<'_>) -> Result<Joy, LabelError>;
}

/// Labeler used when no labeling service is configured.
pub struct NoopLabeler;

#[async_trait]
impl Labeler for NoopLabeler {
    async fn detect_labels(&self, image: ImageSource<'_>) -> Result<Vec<String>, LabelError> {
        tracing::debug!("Labeling disabled, skipping {}", image.uri);
        Ok(Vec::new())
    }

    async fn detect_joy(&self, image: ImageSource<'_>) -> Result<Joy, LabelError> {
        tracing::debug!("Face detection disabled, skipping {}", image.uri);
        Ok(Joy::Unknown)
    }
}

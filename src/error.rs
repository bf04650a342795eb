use kornia::image::ImageError;

/// Errors that can occur while locating dishes and counting colonies.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    /// The circle search produced nothing to seed the dish list with.
    #[error("no circle candidates found, cannot locate any dish")]
    EmptyCandidates,

    #[error("shape mismatch: expected {expected:?} (width, height), found {found:?}")]
    InvalidShape {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("pixel buffer holds {found} values, expected {expected}")]
    PixelCount { expected: usize, found: usize },

    #[error("image has zero width or height")]
    EmptyImage,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("kornia image error: {0}")]
    Kornia(#[from] ImageError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("render error: {0}")]
    Render(String),
}

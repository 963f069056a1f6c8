use core::fmt;

/// Configuration rejected before any device was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The backend selection was left at `BackendKind::Unknown`.
    InvalidBackend,
    /// A strip needs at least one pixel.
    InvalidPixelCount,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBackend => write!(f, "no transmission backend selected"),
            Self::InvalidPixelCount => write!(f, "strip needs at least one pixel"),
        }
    }
}

/// Failure while applying one color command to a strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError<E> {
    /// Staging the pixel color failed.
    Write(E),
    /// Pushing the frame to the hardware failed.
    Refresh(E),
}

impl<E: fmt::Debug> fmt::Display for RenderError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write(err) => write!(f, "pixel write failed: {err:?}"),
            Self::Refresh(err) => write!(f, "strip refresh failed: {err:?}"),
        }
    }
}

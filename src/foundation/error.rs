/// Result alias used throughout the crate.
pub type MemeResult<T> = Result<T, MemeError>;

/// Every failure a [`crate::Session`] or one of its collaborators can report.
#[derive(thiserror::Error, Debug)]
pub enum MemeError {
    /// A random draw was requested from a catalog with no templates.
    #[error("empty catalog: no templates to choose from")]
    EmptyCatalog,

    /// The template catalog could not be fetched or had an unexpected shape.
    #[error("catalog load error: {0}")]
    CatalogLoad(String),

    /// A user-supplied file could not be used as a base image.
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    /// Rasterizing or encoding the meme failed.
    #[error("composition error: {0}")]
    Composition(String),

    /// A second export was started while one is still in flight.
    #[error("export already in progress")]
    ExportInProgress,

    /// Caller input was rejected.
    #[error("validation error: {0}")]
    Validation(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of [`MemeError`], cheap to copy into notices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`MemeError::EmptyCatalog`].
    EmptyCatalog,
    /// See [`MemeError::CatalogLoad`].
    CatalogLoad,
    /// See [`MemeError::UnsupportedImage`].
    UnsupportedImage,
    /// See [`MemeError::Composition`].
    Composition,
    /// See [`MemeError::ExportInProgress`].
    ExportInProgress,
    /// See [`MemeError::Validation`].
    Validation,
    /// See [`MemeError::Other`].
    Other,
}

impl MemeError {
    /// Build a [`MemeError::CatalogLoad`].
    pub fn catalog_load(msg: impl Into<String>) -> Self {
        Self::CatalogLoad(msg.into())
    }

    /// Build a [`MemeError::UnsupportedImage`].
    pub fn unsupported_image(msg: impl Into<String>) -> Self {
        Self::UnsupportedImage(msg.into())
    }

    /// Build a [`MemeError::Composition`].
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`MemeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCatalog => ErrorKind::EmptyCatalog,
            Self::CatalogLoad(_) => ErrorKind::CatalogLoad,
            Self::UnsupportedImage(_) => ErrorKind::UnsupportedImage,
            Self::Composition(_) => ErrorKind::Composition,
            Self::ExportInProgress => ErrorKind::ExportInProgress,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// `false` when the session can never recover without a restart.
    ///
    /// A failed catalog load leaves the session without templates for its whole lifetime;
    /// there is no retry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CatalogLoad(_))
    }
}

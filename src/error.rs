use thiserror::Error;

/// Fatal extraction failures. Per-field misses are absorbed by the
/// extractors and fall back to the documented defaults; only an
/// unrecognized page shape surfaces as an error.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The activity detail page has no `<dl>` container block at all.
    #[error("activity detail block not found in page")]
    DetailBlockMissing,
}

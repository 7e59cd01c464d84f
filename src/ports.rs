use color_eyre::eyre::Result;

use crate::lidarr::AddOutcome;

/// Port trait wrapping the Lidarr API capabilities used by the pipeline.
///
/// Implementation lives in `lidarr` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArtistLibrary: Send + Sync {
    /// All artist display names currently in the library, in API order,
    /// not deduplicated.
    async fn list_artists(&self) -> Result<Vec<String>>;

    async fn add_artist(&self, guid: &str, name: &str) -> Result<AddOutcome>;
}

/// Port trait for the recommendation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArtistRecommender: Send + Sync {
    /// Candidate artist names based on the given roster, already
    /// deduplicated. Order is unspecified.
    async fn recommend(&self, roster: &[String]) -> Result<Vec<String>>;
}

/// Port trait for resolving an artist name to its MusicBrainz identifier.
///
/// `Ok(None)` means no match was found; `Err` is reserved for transport
/// failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArtistResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Option<String>>;
}

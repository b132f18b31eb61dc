pub mod claims;
pub mod notifications;
pub mod payments;
pub mod quotes;

/// Error enumeration for repository failures, shared by every workflow store.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

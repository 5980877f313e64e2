use thiserror::Error;

/// Collaborator failures never surface here: reads fall back and writes
/// retry in the background, both logged.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no layout loaded: an authenticated user is required")]
    NotLoaded,
}

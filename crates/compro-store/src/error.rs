use thiserror::Error;

/// Errors from the `query` generator's external collaborator.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("no {kind} named '{name}' ({api_version})")]
    NotFound {
        api_version: String,
        kind: String,
        name: String,
    },
    #[error("object store request failed: {0}")]
    Other(String),
}

/// Errors from the `request` generator's external collaborator.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("GET {url} returned a body that could not be decoded as JSON: {detail}")]
    Decode { url: String, detail: String },
    #[error("GET {url} failed: {detail}")]
    Transport { url: String, detail: String },
}

//! Interfaces for the comprehension evaluator's two external collaborators
//! (spec.md §1): the object-store client used by the `query` generator, and
//! the HTTP fetcher used by the `request` generator. Both the reconciler
//! loop that supplies real implementations, and the cluster/HTTP services
//! on the other end, are out of scope — this crate only owns the contract,
//! a `reqwest`-backed default, and in-memory test doubles.

pub mod client;
pub mod error;
pub mod http;

pub use client::{InMemoryStore, ObjectStoreClient};
pub use error::{HttpError, ObjectStoreError};
pub use http::{HttpFetcher, ReqwestFetcher, ScriptedFetcher};

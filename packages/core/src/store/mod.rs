//! Document Store Layer
//!
//! - [`DocumentStore`] - async boundary to the collaborative backend
//! - [`InMemoryDocumentStore`] - local implementation used by the stdio server and tests
//! - [`Mutation`] / [`Delta`] - staged changes and their incremental encoding

mod delta;
mod document_store;
mod memory_store;

pub use delta::{Delta, DeltaAck, DeltaOp, Mutation};
pub use document_store::{DocRef, DocumentStore};
pub use memory_store::InMemoryDocumentStore;

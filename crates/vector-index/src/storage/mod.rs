//! # Storage Module
//!
//! Vector storage behind the indices.
//!
//! Trees and brute-force ranking read coordinates through the
//! [`VectorStorage`] trait, so the same search code runs over the index's own
//! append-only [`VectorStore`] or over any externally managed buffer (for
//! instance a projected copy of the data).
//!
//! ```text
//! add(vector) ──→ VectorStore (contiguous, append-only)
//!                      │
//!                      └──→ storage[i] ──→ KD tree / ball tree / flat scan
//! ```

mod store;
mod traits;

pub use store::VectorStore;
pub use traits::VectorStorage;

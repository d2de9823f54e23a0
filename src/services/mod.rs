//! Operations behind the HTTP handlers. Each takes the store as a trait
//! object so tests can run them over the in-memory store.

pub mod production;
pub mod quotes;

pub use production::{build_board, load_snapshot, BoardColumn, HeadlineCounts};

//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract behind the graph store.
//! - Provide in-memory and SQLite-backed implementations of that contract.
//!
//! # Invariants
//! - Each repository call is atomic with respect to concurrent callers.
//! - Node removal and its edge cascade are one indivisible step.
//! - Edge endpoint existence is checked in the same critical section as
//!   the write that depends on it.

pub mod graph_repo;
pub mod memory_repo;
pub mod sqlite_repo;

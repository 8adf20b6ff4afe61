//! Core use-case services.
//!
//! # Responsibility
//! - Enforce input validation before any repository mutation.
//! - Keep transport and client layers decoupled from storage details.

pub mod graph_service;

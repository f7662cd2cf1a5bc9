//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and renumbering calls into caller-facing APIs.
//! - Keep UI layers decoupled from storage details.

pub mod document_service;
pub mod renumber_service;

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and repository calls into board-level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod contact_service;

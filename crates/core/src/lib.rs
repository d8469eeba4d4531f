//! Core logic for Roster.
//!
//! This crate contains storage-agnostic logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `hydration` - Batch hydration of independent to-many associations
//! - `audit` - Acting principal lookup for created-by/modified-by attribution

pub mod audit;
pub mod hydration;

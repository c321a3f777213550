//! # CareFlow Core
//!
//! Domain types shared by the storage, sync and HTTP layers: the error
//! taxonomy, the wire models for clients and appointments, field validation
//! and pagination arithmetic.

pub mod errors;
pub mod models;
pub mod pagination;
pub mod validation;

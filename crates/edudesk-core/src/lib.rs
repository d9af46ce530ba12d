//! # edudesk Core
//!
//! Core types, errors, and utilities for the edudesk API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Pagination and search parameters for list endpoints
//! - [`serde`]: Lenient deserializers for query strings and form-like bodies
//!
//! # Example
//!
//! ```ignore
//! use edudesk_core::errors::AppError;
//! use edudesk_core::pagination::{ListParams, PaginationMeta};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student not found"));
//!
//! let params = ListParams::default();
//! let meta = PaginationMeta::for_params(&params.pagination, 42);
//! ```

pub mod errors;
pub mod pagination;
pub mod serde;

pub use errors::{AppError, ErrorResponse};
pub use pagination::{ListParams, PaginationMeta, PaginationParams};

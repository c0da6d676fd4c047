//! Shared types used across the API layer.

mod pagination;

pub use pagination::{Paginated, PaginationMeta, PaginationParams};

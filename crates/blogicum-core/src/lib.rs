//! # Blogicum Core
//!
//! The domain layer of Blogicum: entities, the visibility and ownership
//! policy, and the ports that infrastructure implements.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;

pub use error::{DomainError, RepoError};
pub use policy::{PostFilter, PostQuery, Viewer, can_mutate, is_live, is_visible, list_visible_posts};

//! SeaORM entities mirroring the tables created by the migration crate.

pub mod category;
pub mod comment;
pub mod post;
pub mod user;

//! SeaORM entities, one module per table.

pub mod author;
pub mod category;
pub mod comment;
pub mod post;
pub mod post_category;
pub mod subscriber;
pub mod user;

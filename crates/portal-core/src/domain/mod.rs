//! Domain entities - the core business objects.

mod author;
mod category;
mod comment;
mod post;
mod subscriber;
mod user;
mod vote;

pub use author::{Author, AuthorProfile};
pub use category::{CATEGORY_NAME_MAX_LEN, Category, PostCategory};
pub use comment::Comment;
pub use post::{Post, PostKind};
pub use subscriber::Subscriber;
pub use user::{User, mask_email};
pub use vote::Vote;

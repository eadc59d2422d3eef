//! Domain types shared by the client, the decision strategies and the scheduler.

pub mod action;
pub mod post;

pub use action::{Action, ActionKind};
pub use post::{Post, PostsResponse};

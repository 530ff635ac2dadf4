//! Resource services.
//!
//! Each service receives the acting identity as `Option<&AuthUser>` and
//! performs its own authorization, independent of which router layer it is
//! reached through.

pub mod comments;
pub mod posts;
pub mod users;

pub use comments::CommentService;
pub use posts::PostService;
pub use users::UserService;

//! Resource services
//!
//! Handlers stay thin: they extract the request and hand it to one of these.

pub mod jobs;
pub mod users;

pub use jobs::JobService;
pub use users::UserService;

//! Database access shared by handlers, the auth pipeline and startup seeding.
//! Multi-statement writes open their own transaction.

pub mod asset;
pub mod project;
pub mod session;
pub mod user;

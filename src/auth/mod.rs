//! Accounts, sessions and role checks.
//!
//! Sessions are opaque bearer tokens stored hashed; roles come from the
//! user's profile row.

pub mod extract;
pub mod password;
pub mod session;

pub use extract::{AdminUser, CurrentUser, MaybeUser, SessionInfo, StaffUser};

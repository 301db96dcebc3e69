//! Middleware and extractors shared by every route.
//!
//! # Modules
//!
//! - [`auth`]: token authentication, user lookup and permission gates
//! - [`language`]: request language resolution
//!
//! # Request Flow
//!
//! 1. [`auth::authenticate`] reads the token cookie (or `Authorization: Bearer`),
//!    validates or refreshes it and stores an [`Identity`](crate::context::Identity)
//! 2. [`language::localize`] resolves the language, writes it to the session and
//!    stores the [`RequestContext`](crate::context::RequestContext)
//! 3. Gate extractors turn anonymous or under-privileged requests into redirects
//! 4. The handler runs
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{Authenticated, RequireEditProjects};
//!
//! // Any logged-in user
//! async fn dashboard(Authenticated(user): Authenticated) -> impl IntoResponse {
//!     // ...
//! }
//!
//! // Redirects to /403 without the edit_projects bit
//! async fn save_project(RequireEditProjects(user): RequireEditProjects) -> impl IntoResponse {
//!     // ...
//! }
//! ```

pub mod auth;
pub mod language;

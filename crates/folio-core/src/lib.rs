//! # Folio Core
//!
//! Foundational types shared by every Folio crate:
//!
//! - [`errors`]: [`AppError`], the HTTP-aware error type
//! - [`permissions`]: permission flags, the [`PermissionSet`] bitmask and role rows
//! - [`password`]: bcrypt password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use folio_core::{AppError, Permission, PermissionSet};
//!
//! let set = PermissionSet::from_permissions(&[Permission::ViewProjects]);
//! if !set.contains(Permission::EditProjects) {
//!     return Err(AppError::forbidden("edit_projects required".to_string()));
//! }
//! ```

pub mod errors;
pub mod password;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use password::{hash_password, verify_password};
pub use permissions::{Permission, PermissionSet, RolePermissions};

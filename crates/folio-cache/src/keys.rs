//! Cache key builders.
//!
//! Keys are plain strings; the file cache turns them into file names.
//! Prefix helpers are meant for [`FileCache::clear`](crate::FileCache::clear).

use std::time::Duration;

/// Role permission rows live for a day.
pub const ROLE_PERMISSION_TTL: Duration = Duration::from_secs(86_400);

/// Resolved user records live for ten minutes.
pub const USER_INFO_TTL: Duration = Duration::from_secs(600);

pub const AVAILABLE_LANGUAGES_TTL: Duration = Duration::from_secs(3_600);

pub const TRANSLATIONS_TTL: Duration = Duration::from_secs(3_600);

pub fn role_permission(role_id: i64) -> String {
    format!("role_permission_{role_id}")
}

pub fn user_permissions(user_id: i64, role_id: i64) -> String {
    format!("user_permissions_{user_id}_{role_id}")
}

/// Prefix matching every cached record of one user, whatever the role.
pub fn user_permissions_prefix(user_id: i64) -> String {
    format!("user_permissions_{user_id}_")
}

pub fn available_languages() -> String {
    "available_languages".to_string()
}

pub fn translations(language: &str) -> String {
    format!("translations_{language}")
}

pub const TRANSLATIONS_PREFIX: &str = "translations_";

//! Per-request identity and locale.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use folio_core::{AppError, Permission, PermissionSet};

use crate::middleware::language::ResolvedFrom;

/// Profile and permissions of an authenticated user, as cached under
/// `user_permissions_{user}_{role}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub user_name: String,
    pub first_name: String,
    #[serde(rename = "permission_integer")]
    pub permissions: PermissionSet,
    pub role_id: i64,
    pub profile_picture_url: String,
    pub email: Option<String>,
}

impl UserInfo {
    /// Identity used when a token names a user that no longer exists.
    pub fn unknown(user_id: i64, role_id: i64) -> Self {
        Self {
            user_id,
            user_name: "Unknown".to_string(),
            first_name: "Unknown".to_string(),
            permissions: PermissionSet::EMPTY,
            role_id,
            profile_picture_url: String::new(),
            email: None,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }
}

/// Identity produced by the authentication middleware.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<UserInfo>);

/// Everything the middleware chain resolved for one request.
///
/// Built by [`localize`](crate::middleware::language::localize) from the
/// [`Identity`] and the resolved language, then left untouched.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub user: Option<UserInfo>,
    pub language: String,
    pub language_source: ResolvedFrom,
}

impl RequestContext {
    pub fn new(identity: Identity, language: String, language_source: ResolvedFrom) -> Self {
        Self {
            user: identity.0,
            language,
            language_source,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|user| user.user_id)
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.user_name.as_str())
    }

    pub fn role_id(&self) -> Option<i64> {
        self.user.as_ref().map(|user| user.role_id)
    }

    /// Permission bitmask; empty for anonymous requests.
    pub fn permissions(&self) -> PermissionSet {
        self.user
            .as_ref()
            .map(|user| user.permissions)
            .unwrap_or_default()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(permission)
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::internal_error("Request context missing".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(bits: u32) -> UserInfo {
        UserInfo {
            user_id: 7,
            user_name: "npolette".to_string(),
            first_name: "Nathan".to_string(),
            permissions: PermissionSet::from_bits(bits),
            role_id: 2,
            profile_picture_url: "/assets/img/me.jpg".to_string(),
            email: Some("n@example.com".to_string()),
        }
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = RequestContext::new(Identity(None), "fr".to_string(), ResolvedFrom::Default);
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.user_id(), None);
        assert!(ctx.permissions().is_empty());
        assert!(!ctx.has_permission(Permission::ViewProjects));
        assert_eq!(ctx.language(), "fr");
    }

    #[test]
    fn test_authenticated_context() {
        let ctx = RequestContext::new(
            Identity(Some(user(0b1011))),
            "en".to_string(),
            ResolvedFrom::Query,
        );
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.user_id(), Some(7));
        assert_eq!(ctx.role_id(), Some(2));
        assert_eq!(ctx.user_name(), Some("npolette"));
        assert!(ctx.has_permission(Permission::EditProjects));
        assert!(!ctx.has_permission(Permission::ManageUsers));
    }

    #[test]
    fn test_user_info_cache_shape() {
        let json = serde_json::to_value(user(11)).unwrap();
        assert_eq!(json["permission_integer"], 11);
        assert_eq!(json["user_id"], 7);

        let back: UserInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back.permissions.bits(), 11);
    }

    #[test]
    fn test_unknown_user() {
        let info = UserInfo::unknown(99, 4);
        assert_eq!(info.user_name, "Unknown");
        assert!(info.permissions.is_empty());
        assert_eq!(info.role_id, 4);
    }
}

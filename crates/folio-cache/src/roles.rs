//! Role permission rows.
//!
//! Roles are fixed for the site, so the table is built in. The cache keeps
//! the row around for a day so a later move to a database-backed table only
//! changes the miss path.

use tracing::debug;

use folio_core::RolePermissions;

use crate::{FileCache, keys};

fn row(id: i64, name: &str, flags: [bool; 6]) -> RolePermissions {
    let [
        view_projects,
        edit_projects,
        delete_projects,
        view_personal_info,
        edit_personal_info,
        manage_users,
    ] = flags;

    RolePermissions {
        id,
        name: name.to_string(),
        view_projects,
        edit_projects,
        delete_projects,
        view_personal_info,
        edit_personal_info,
        manage_users,
    }
}

/// Built-in permission row for `role_id`. Unknown ids get an "Unknown" row
/// with nothing granted.
pub fn builtin_role_permissions(role_id: i64) -> RolePermissions {
    match role_id {
        1 => row(1, "Admin", [true, true, true, true, true, true]),
        2 => row(2, "Manager", [true, true, false, true, false, false]),
        3 => row(3, "Editor", [true, true, false, true, true, false]),
        4 => row(4, "User", [true, false, false, true, false, false]),
        5 => row(5, "Student", [true, false, false, true, false, false]),
        other => RolePermissions::unknown(other),
    }
}

impl FileCache {
    /// Permission row for `role_id`, cached for 24 hours.
    pub async fn role_permission(&self, role_id: i64) -> RolePermissions {
        let key = keys::role_permission(role_id);

        if let Some(cached) = self.get::<RolePermissions>(&key).await {
            return cached;
        }

        let permissions = builtin_role_permissions(role_id);
        debug!(role_id, role = %permissions.name, "Role permissions loaded from built-in table");
        self.set(&key, &permissions, Some(keys::ROLE_PERMISSION_TTL))
            .await;

        permissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Permission;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_masks() {
        assert_eq!(builtin_role_permissions(1).permission_set().bits(), 0b11_1111);
        assert_eq!(builtin_role_permissions(2).permission_set().bits(), 0b00_1011);
        assert_eq!(builtin_role_permissions(3).permission_set().bits(), 0b01_1011);
        assert_eq!(builtin_role_permissions(4).permission_set().bits(), 0b00_1001);
        assert_eq!(builtin_role_permissions(5).permission_set().bits(), 0b00_1001);
    }

    #[test]
    fn test_unknown_roles_get_nothing() {
        for role_id in [0, 6, -1, 999] {
            let row = builtin_role_permissions(role_id);
            assert_eq!(row.id, role_id);
            assert_eq!(row.name, "Unknown");
            assert!(row.permission_set().is_empty());
        }
    }

    #[tokio::test]
    async fn test_role_permission_is_cached() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(60));

        let first = cache.role_permission(3).await;
        assert!(first.granted(Permission::EditPersonalInfo));
        assert!(cache.path_for("role_permission_3").exists());

        let cached: Option<RolePermissions> = cache.get("role_permission_3").await;
        assert_eq!(cached, Some(first));
    }

    #[tokio::test]
    async fn test_cached_row_wins_over_builtin() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(60));
        let custom = RolePermissions {
            name: "Custom".to_string(),
            manage_users: true,
            ..RolePermissions::unknown(4)
        };
        cache.set("role_permission_4", &custom, None).await;

        assert_eq!(cache.role_permission(4).await, custom);
    }

    #[tokio::test]
    async fn test_disabled_cache_still_answers() {
        let cache = FileCache::disabled();
        assert_eq!(cache.role_permission(2).await.name, "Manager");
    }
}

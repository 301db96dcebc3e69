use folio::context::UserInfo;
use folio::folio_cache::{FileCache, builtin_role_permissions, keys};
use folio::folio_core::{Permission, PermissionSet};
use std::time::Duration;
use tempfile::TempDir;

fn user_with_role(role_id: i64) -> UserInfo {
    UserInfo {
        permissions: builtin_role_permissions(role_id).permission_set(),
        ..UserInfo::unknown(1, role_id)
    }
}

#[test]
fn test_admin_has_every_permission() {
    let admin = user_with_role(1);

    for permission in Permission::ALL {
        assert!(admin.has_permission(permission), "{permission}");
    }
}

#[test]
fn test_user_role_is_read_only() {
    let user = user_with_role(4);

    assert!(user.has_permission(Permission::ViewProjects));
    assert!(user.has_permission(Permission::ViewPersonalInfo));
    assert!(!user.has_permission(Permission::EditProjects));
    assert!(!user.has_permission(Permission::ManageUsers));
}

#[test]
fn test_unknown_role_has_nothing() {
    let row = builtin_role_permissions(42);

    assert_eq!(row.name, "Unknown");
    assert_eq!(row.permission_set(), PermissionSet::EMPTY);
}

#[test]
fn test_mask_matches_flag_sum() {
    for role_id in 1..=5 {
        let row = builtin_role_permissions(role_id);
        let flags: Vec<bool> = Permission::ALL
            .iter()
            .map(|permission| row.granted(*permission))
            .collect();

        assert_eq!(row.permission_set(), PermissionSet::from_flags(&flags));
    }
}

#[tokio::test]
async fn test_role_permissions_are_cached() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path(), Duration::from_secs(60));

    let row = cache.role_permission(2).await;
    assert_eq!(row.name, "Manager");
    assert!(cache.path_for(&keys::role_permission(2)).exists());
    assert_eq!(cache.role_permission(2).await, row);
}

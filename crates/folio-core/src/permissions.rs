//! Permission flags and the bitmask they encode.
//!
//! Every capability has a fixed bit. The table is explicit so adding a new
//! permission never shifts the meaning of an existing bit:
//!
//! | bit | permission |
//! |-----|------------|
//! | 0 | [`Permission::ViewProjects`] |
//! | 1 | [`Permission::EditProjects`] |
//! | 2 | [`Permission::DeleteProjects`] |
//! | 3 | [`Permission::ViewPersonalInfo`] |
//! | 4 | [`Permission::EditPersonalInfo`] |
//! | 5 | [`Permission::ManageUsers`] |
//!
//! # Example
//!
//! ```
//! use folio_core::permissions::{Permission, PermissionSet};
//!
//! let set = PermissionSet::from_permissions(&[Permission::ViewProjects, Permission::ManageUsers]);
//! assert_eq!(set.bits(), 0b10_0001);
//! assert!(set.contains(Permission::ManageUsers));
//! ```

use serde::{Deserialize, Serialize};

/// A single back-office capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewProjects,
    EditProjects,
    DeleteProjects,
    ViewPersonalInfo,
    EditPersonalInfo,
    ManageUsers,
}

impl Permission {
    /// All permissions, in bit order.
    pub const ALL: [Permission; 6] = [
        Permission::ViewProjects,
        Permission::EditProjects,
        Permission::DeleteProjects,
        Permission::ViewPersonalInfo,
        Permission::EditPersonalInfo,
        Permission::ManageUsers,
    ];

    /// Bit position of this permission inside a [`PermissionSet`].
    pub const fn bit(self) -> u32 {
        match self {
            Permission::ViewProjects => 0,
            Permission::EditProjects => 1,
            Permission::DeleteProjects => 2,
            Permission::ViewPersonalInfo => 3,
            Permission::EditPersonalInfo => 4,
            Permission::ManageUsers => 5,
        }
    }

    pub const fn mask(self) -> u32 {
        1 << self.bit()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Permission::ViewProjects => "view_projects",
            Permission::EditProjects => "edit_projects",
            Permission::DeleteProjects => "delete_projects",
            Permission::ViewPersonalInfo => "view_personal_info",
            Permission::EditPersonalInfo => "edit_personal_info",
            Permission::ManageUsers => "manage_users",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer bitmask of granted permissions.
///
/// Serialises as a bare integer so cached user records keep the
/// `permission_integer` shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(u32);

impl PermissionSet {
    pub const EMPTY: PermissionSet = PermissionSet(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn from_permissions(permissions: &[Permission]) -> Self {
        permissions
            .iter()
            .fold(Self::EMPTY, |set, permission| set.with(*permission))
    }

    /// Builds a mask from a positional flag array: `Σ 2^i` over every true
    /// flag at index `i`. Flags past bit 31 are ignored.
    pub fn from_flags(flags: &[bool]) -> Self {
        let bits = flags
            .iter()
            .take(u32::BITS as usize)
            .enumerate()
            .filter(|(_, granted)| **granted)
            .fold(0u32, |acc, (index, _)| acc | (1 << index));
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, permission: Permission) -> bool {
        self.0 & permission.mask() != 0
    }

    /// True when every bit of `bits` is granted.
    pub const fn contains_bits(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    #[must_use]
    pub const fn with(self, permission: Permission) -> Self {
        Self(self.0 | permission.mask())
    }

    pub fn iter(self) -> impl Iterator<Item = Permission> {
        Permission::ALL
            .into_iter()
            .filter(move |permission| self.contains(*permission))
    }
}

/// Permission row for a role, as stored in the role table and the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissions {
    pub id: i64,
    pub name: String,
    pub view_projects: bool,
    pub edit_projects: bool,
    pub delete_projects: bool,
    pub view_personal_info: bool,
    pub edit_personal_info: bool,
    pub manage_users: bool,
}

impl RolePermissions {
    /// Row granted to role ids that are not in the table.
    pub fn unknown(id: i64) -> Self {
        Self {
            id,
            name: "Unknown".to_string(),
            view_projects: false,
            edit_projects: false,
            delete_projects: false,
            view_personal_info: false,
            edit_personal_info: false,
            manage_users: false,
        }
    }

    pub fn granted(&self, permission: Permission) -> bool {
        match permission {
            Permission::ViewProjects => self.view_projects,
            Permission::EditProjects => self.edit_projects,
            Permission::DeleteProjects => self.delete_projects,
            Permission::ViewPersonalInfo => self.view_personal_info,
            Permission::EditPersonalInfo => self.edit_personal_info,
            Permission::ManageUsers => self.manage_users,
        }
    }

    pub fn permission_set(&self) -> PermissionSet {
        Permission::ALL
            .into_iter()
            .filter(|permission| self.granted(*permission))
            .fold(PermissionSet::EMPTY, PermissionSet::with)
    }
}

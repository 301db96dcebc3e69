use serde::{Deserialize, Serialize};
use validator::Validate;

use folio_core::Permission;

use crate::context::UserInfo;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub welcome: String,
    pub user: UserInfo,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct ProjectsOverview {
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Draft of a portfolio project submitted from the back office.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProjectDraft {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: String,
    #[serde(default)]
    #[validate(url(message = "Invalid project URL"))]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedDraft {
    pub draft: ProjectDraft,
    pub submitted_by: i64,
}

#[derive(Debug, Serialize)]
pub struct PersonalInfoResponse {
    pub user: UserInfo,
    pub can_edit: bool,
}

/// Changes to the owner's public profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PersonalInfoUpdate {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(url(message = "Invalid profile picture URL"))]
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedPersonalInfo {
    pub update: PersonalInfoUpdate,
    pub submitted_by: i64,
}

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info, instrument};

use folio_core::{AppError, Permission};

use crate::context::RequestContext;
use crate::middleware::auth::{
    Authenticated, RequireDeleteProjects, RequireEditPersonalInfo, RequireEditProjects,
    RequireManageUsers, RequireViewPersonalInfo, RequireViewProjects,
};
use crate::modules::users::UserSummary;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    AcceptedDraft, AcceptedPersonalInfo, DashboardResponse, PersonalInfoResponse,
    PersonalInfoUpdate, ProjectDraft, ProjectsOverview,
};

#[instrument(skip(state, ctx, user), fields(user_id = user.user_id))]
pub async fn dashboard(
    State(state): State<AppState>,
    ctx: RequestContext,
    Authenticated(user): Authenticated,
) -> Json<DashboardResponse> {
    let welcome = state
        .translations
        .translate(ctx.language(), "admin.welcome", &[("name", user.first_name.as_str())])
        .await;

    Json(DashboardResponse {
        welcome,
        permissions: user.permissions.iter().collect(),
        user,
    })
}

#[instrument(skip(user), fields(user_id = user.user_id))]
pub async fn list_projects(RequireViewProjects(user): RequireViewProjects) -> Json<ProjectsOverview> {
    Json(ProjectsOverview {
        can_edit: user.has_permission(Permission::EditProjects),
        can_delete: user.has_permission(Permission::DeleteProjects),
    })
}

#[instrument(skip(user, draft), fields(user_id = user.user_id))]
pub async fn submit_project(
    RequireEditProjects(user): RequireEditProjects,
    ValidatedJson(draft): ValidatedJson<ProjectDraft>,
) -> (StatusCode, Json<AcceptedDraft>) {
    info!(title = %draft.title, "Project draft submitted");
    (
        StatusCode::ACCEPTED,
        Json(AcceptedDraft {
            draft,
            submitted_by: user.user_id,
        }),
    )
}

#[instrument(skip(user), fields(user_id = user.user_id))]
pub async fn delete_project(
    RequireDeleteProjects(user): RequireDeleteProjects,
    Path(project_id): Path<i64>,
) -> StatusCode {
    info!(project_id, "Project deletion requested");
    StatusCode::NO_CONTENT
}

#[instrument(skip(user), fields(user_id = user.user_id))]
pub async fn personal_info(
    RequireViewPersonalInfo(user): RequireViewPersonalInfo,
) -> Json<PersonalInfoResponse> {
    Json(PersonalInfoResponse {
        can_edit: user.has_permission(Permission::EditPersonalInfo),
        user,
    })
}

#[instrument(skip(user, update), fields(user_id = user.user_id))]
pub async fn update_personal_info(
    RequireEditPersonalInfo(user): RequireEditPersonalInfo,
    ValidatedJson(update): ValidatedJson<PersonalInfoUpdate>,
) -> (StatusCode, Json<AcceptedPersonalInfo>) {
    info!("Personal info update submitted");
    (
        StatusCode::ACCEPTED,
        Json(AcceptedPersonalInfo {
            update,
            submitted_by: user.user_id,
        }),
    )
}

#[instrument(skip(state, _user))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireManageUsers(_user): RequireManageUsers,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

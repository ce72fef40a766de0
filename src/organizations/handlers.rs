use axum::{
    extract::Path,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateOrganizationRequest, PatchOrganizationRequest},
    repo_types::{Organization, OrganizationChanges},
};
use crate::{
    error::{ApiError, ApiJson, ApiResult},
    middleware::context::{AuthUser, CurrentStore},
    state::AppState,
};

pub fn organization_routes() -> Router<AppState> {
    Router::new()
        .route("/organization", post(create_organization))
        .route(
            "/organization/:id",
            get(get_organization).patch(patch_organization),
        )
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation(format!("invalid id: {raw}")))
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_organization(
    CurrentStore(store): CurrentStore,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateOrganizationRequest>,
) -> ApiResult<Json<Organization>> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    let org = Organization::new(
        payload.name,
        payload.address,
        payload.contact_info,
        payload.organization_type,
        OffsetDateTime::now_utc(),
    );
    let org = store.organizations.create(&org).await?;
    info!(organization_id = %org.id, "organization created");
    Ok(Json(org))
}

#[instrument(skip_all, fields(user_id = %user.user_id, id = %id))]
pub async fn get_organization(
    CurrentStore(store): CurrentStore,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Organization>> {
    let id = parse_id(&id)?;
    let org = store
        .organizations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("organization {id} not found")))?;
    Ok(Json(org))
}

#[instrument(skip_all, fields(user_id = %user.user_id, id = %id))]
pub async fn patch_organization(
    CurrentStore(store): CurrentStore,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<PatchOrganizationRequest>,
) -> ApiResult<Json<Organization>> {
    let id = parse_id(&id)?;
    let changes = OrganizationChanges {
        updated_at: OffsetDateTime::now_utc(),
        name: non_empty(payload.name),
        unique_url: non_empty(payload.unique_url),
        address: non_empty(payload.address),
        contact_info: non_empty(payload.contact_info),
        organization_type: payload.organization_type,
    };
    if changes.is_empty() {
        return Err(ApiError::Validation("nothing to update".into()));
    }
    let org = store.organizations.update(id, &changes).await?;
    Ok(Json(org))
}

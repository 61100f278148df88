use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::TransactionTrait;
use tracing::instrument;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::blueprint::*;
use crate::models::configuration::{BlueprintConfigKey, BlueprintConfiguration, BlueprintRef};
use crate::state::AppState;
use crate::store::{BlueprintStore, NewBlueprint, StoreError};

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_blueprint, list_blueprints))
        .routes(routes!(get_blueprint, delete_blueprint))
        .routes(routes!(list_configurations, add_configuration))
        .routes(routes!(get_configuration))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Blueprints",
    operation_id = "createBlueprint",
    summary = "Create a blueprint",
    description = "Creates a blueprint together with its configuration groups. Each configuration value must be a JSON object and is stored as JSON text. Returns 409 if a blueprint with the same name exists.",
    request_body = CreateBlueprintRequest,
    responses(
        (status = 201, description = "Blueprint created", body = BlueprintResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Blueprint already exists (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(blueprint = %payload.blueprint_name))]
pub async fn create_blueprint(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBlueprintRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_blueprint(&payload)?;

    let name = payload.blueprint_name.trim().to_string();
    let new = NewBlueprint {
        blueprint_name: name.clone(),
        stack_name: payload.stack_name.trim().to_string(),
        stack_version: payload.stack_version.trim().to_string(),
    };
    let configurations = payload
        .configurations
        .into_iter()
        .map(|(type_name, properties)| (type_name.trim().to_string(), properties.to_string()));

    let txn = state.db.begin().await?;
    let created = BlueprintStore::new(&txn)
        .create_blueprint(new, configurations)
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => {
                AppError::Conflict(format!("Blueprint '{name}' already exists"))
            }
            other => other.into(),
        })?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(BlueprintResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Blueprints",
    operation_id = "listBlueprints",
    summary = "List blueprints",
    description = "Returns all blueprints ordered by name, without their configurations.",
    responses(
        (status = 200, description = "List of blueprints", body = Vec<BlueprintSummary>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_blueprints(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlueprintSummary>>, AppError> {
    let items = BlueprintStore::new(&state.db)
        .list_blueprints()
        .await?
        .into_iter()
        .map(BlueprintSummary::from)
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/{name}",
    tag = "Blueprints",
    operation_id = "getBlueprint",
    summary = "Get a blueprint",
    description = "Returns the blueprint and all of its configuration groups, ordered by type name.",
    params(("name" = String, Path, description = "Blueprint name")),
    responses(
        (status = 200, description = "Blueprint details", body = BlueprintResponse),
        (status = 404, description = "Blueprint not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_blueprint(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BlueprintResponse>, AppError> {
    let found = BlueprintStore::new(&state.db)
        .find_blueprint_with_configurations(&name)
        .await?
        .ok_or_else(|| blueprint_not_found(&name))?;

    Ok(Json(BlueprintResponse::from(found)))
}

#[utoipa::path(
    delete,
    path = "/{name}",
    tag = "Blueprints",
    operation_id = "deleteBlueprint",
    summary = "Delete a blueprint",
    description = "Permanently deletes a blueprint and cascade-deletes its configuration groups.",
    params(("name" = String, Path, description = "Blueprint name")),
    responses(
        (status = 204, description = "Blueprint deleted"),
        (status = 404, description = "Blueprint not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_blueprint(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existed = BlueprintStore::new(&txn).delete_blueprint(&name).await?;
    if !existed {
        return Err(blueprint_not_found(&name));
    }
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{name}/configurations",
    tag = "Blueprint Configurations",
    operation_id = "listBlueprintConfigurations",
    summary = "List configuration groups of a blueprint",
    params(("name" = String, Path, description = "Blueprint name")),
    responses(
        (status = 200, description = "Configuration groups", body = Vec<ConfigurationResponse>),
        (status = 404, description = "Blueprint not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_configurations(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ConfigurationResponse>>, AppError> {
    let store = BlueprintStore::new(&state.db);
    if store.find_blueprint(&name).await?.is_none() {
        return Err(blueprint_not_found(&name));
    }

    let items = store
        .list_configurations(&name)
        .await?
        .into_iter()
        .map(ConfigurationResponse::from)
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/{name}/configurations",
    tag = "Blueprint Configurations",
    operation_id = "addBlueprintConfiguration",
    summary = "Add a configuration group to a blueprint",
    description = "Inserts one configuration group. Existing groups cannot be replaced; returns 409 if the type is already present.",
    params(("name" = String, Path, description = "Blueprint name")),
    request_body = AddConfigurationRequest,
    responses(
        (status = 201, description = "Configuration added", body = ConfigurationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Blueprint not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Configuration type already present (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(type_name = %payload.type_name))]
pub async fn add_configuration(
    State(state): State<AppState>,
    Path(name): Path<String>,
    AppJson(payload): AppJson<AddConfigurationRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_add_configuration(&payload)?;

    let store = BlueprintStore::new(&state.db);
    let parent = store
        .find_blueprint(&name)
        .await?
        .ok_or_else(|| blueprint_not_found(&name))?;

    let type_name = payload.type_name.trim().to_string();
    let mut record = BlueprintConfiguration::new(
        parent.blueprint_name.clone(),
        type_name.clone(),
        payload.properties.to_string(),
    );
    record.set_blueprint(Some(BlueprintRef::from(&parent)));

    let inserted = store
        .insert_configuration(record)
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => AppError::Conflict(format!(
                "Configuration '{type_name}' already exists in blueprint '{name}'"
            )),
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ConfigurationResponse::from(inserted)),
    ))
}

#[utoipa::path(
    get,
    path = "/{name}/configurations/{type_name}",
    tag = "Blueprint Configurations",
    operation_id = "getBlueprintConfiguration",
    summary = "Get one configuration group",
    params(
        ("name" = String, Path, description = "Blueprint name"),
        ("type_name" = String, Path, description = "Configuration type"),
    ),
    responses(
        (status = 200, description = "Configuration group", body = ConfigurationResponse),
        (status = 404, description = "Configuration not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_configuration(
    State(state): State<AppState>,
    Path((name, type_name)): Path<(String, String)>,
) -> Result<Json<ConfigurationResponse>, AppError> {
    let key = BlueprintConfigKey::new(name, type_name);
    let record = BlueprintStore::new(&state.db)
        .find_configuration(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Configuration '{key}' not found")))?;

    Ok(Json(ConfigurationResponse::from(record)))
}

fn blueprint_not_found(name: &str) -> AppError {
    AppError::NotFound(format!("Blueprint '{name}' not found"))
}

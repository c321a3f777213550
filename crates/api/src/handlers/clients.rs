use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use careflow_core::{
    errors::ClinicError,
    models::{
        ListMeta, ListResponse,
        client::{Client, CreateClientRequest},
    },
    pagination::{PageQuery, Pagination},
    validation::validate_client,
};
use careflow_db::repositories::CLIENT_NOT_FOUND;
use tracing::info;

use crate::{ApiState, handlers::parse_id, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn list_clients(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<Client>>, AppError> {
    let page = Pagination::from_query(&query);

    let data = state.store.list_clients(&page).await?;
    let total = state.store.count_clients().await?;

    Ok(Json(ListResponse {
        data,
        meta: ListMeta {
            page: page.page,
            per_page: page.per_page,
            total,
        },
    }))
}

/// Creates a client and pushes it to the remote API.
///
/// A failed push is logged by the sync adapter and does not fail the request;
/// the response then simply carries no `external_id`.
#[axum::debug_handler]
pub async fn create_client(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<CreateClientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let Json(request) = payload?;
    let params = request
        .client
        .filter(|params| !params.is_empty())
        .ok_or_else(|| ClinicError::missing_param("client"))?;

    let fields = validate_client(&params)?;
    let client = state.store.create_client(&fields, None).await?;
    info!(client_id = %client.id, "Created client");

    let client = match state.sync.push_client(&client).await {
        Some(pushed) => pushed,
        None => client,
    };

    Ok((StatusCode::CREATED, Json(client)))
}

/// Deletes a client together with its appointments.
#[axum::debug_handler]
pub async fn delete_client(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, CLIENT_NOT_FOUND)?;

    if !state.store.delete_client(id).await? {
        return Err(ClinicError::NotFound(CLIENT_NOT_FOUND.to_string()).into());
    }

    info!(client_id = %id, "Deleted client");
    Ok(StatusCode::NO_CONTENT)
}

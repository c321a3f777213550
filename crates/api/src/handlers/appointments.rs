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
        appointment::{Appointment, AppointmentRequest, AppointmentWithClient},
    },
    pagination::{PageQuery, Pagination},
    validation::AppointmentDraft,
};
use careflow_db::{repositories::APPOINTMENT_NOT_FOUND, rules::validate_appointment};
use tracing::info;

use crate::{ApiState, handlers::parse_id, middleware::error_handling::AppError};

fn not_found() -> ClinicError {
    ClinicError::NotFound(APPOINTMENT_NOT_FOUND.to_string())
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<AppointmentWithClient>>, AppError> {
    let page = Pagination::from_query(&query);

    let data = state.store.list_appointments(&page).await?;
    let total = state.store.count_appointments().await?;

    Ok(Json(ListResponse {
        data,
        meta: ListMeta {
            page: page.page,
            per_page: page.per_page,
            total,
        },
    }))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<AppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let Json(request) = payload?;
    let params = request
        .appointment
        .filter(|params| !params.is_empty())
        .ok_or_else(|| ClinicError::missing_param("appointment"))?;

    let draft = AppointmentDraft::from_params(&params);
    let fields = validate_appointment(state.store.as_ref(), draft, None).await?;
    let appointment = state.store.create_appointment(&fields, None).await?;
    info!(appointment_id = %appointment.id, "Created appointment");

    let appointment = match state.sync.push_appointment(&appointment).await {
        Some(pushed) => pushed,
        None => appointment,
    };

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Applies a partial update. Keys left out of the request keep their stored
/// values; `"notes": null` clears the notes.
#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    payload: Result<Json<AppointmentRequest>, JsonRejection>,
) -> Result<Json<Appointment>, AppError> {
    let id = parse_id(&id, APPOINTMENT_NOT_FOUND)?;
    let stored = state.store.get_appointment(id).await?.ok_or_else(not_found)?;

    let Json(request) = payload?;
    let params = request
        .appointment
        .filter(|params| !params.is_empty())
        .ok_or_else(|| ClinicError::missing_param("appointment"))?;

    let draft = AppointmentDraft::merged(&stored, &params);
    let fields = validate_appointment(state.store.as_ref(), draft, Some(id)).await?;
    let updated = state.store.update_appointment(id, &fields).await?;
    info!(appointment_id = %id, "Updated appointment");

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, APPOINTMENT_NOT_FOUND)?;

    if !state.store.delete_appointment(id).await? {
        return Err(not_found().into());
    }

    info!(appointment_id = %id, "Deleted appointment");
    Ok(StatusCode::NO_CONTENT)
}

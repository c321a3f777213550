use axum::{
    Router,
    routing::{get, patch},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            patch(handlers::appointments::update_appointment)
                .delete(handlers::appointments::delete_appointment),
        )
}

use crate::metrics::exposition;
use crate::server::state::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let mut readings = Vec::new();
    for collector in state.collectors.iter() {
        readings.extend(collector.collect().await);
    }

    match exposition::encode(&state.schema, &readings) {
        Ok(body) => (
            [(header::CONTENT_TYPE, exposition::content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::{KoderId, NewKoder},
    error::{ApiError, ErrorCode},
    protocol::{delete_koder_route, koders_route, KoderResponse, KodersResponse},
};
use tracing::{debug, error};

use crate::app_state::AppState;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(koders_route(), get(http_list_koders).post(http_create_koder))
        .route(delete_koder_route(), post(http_delete_koder))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.api.storage.health_check().await.map_err(|e| {
        error!(error = %e, "storage health check failed");
        api_error(ApiError::new(ErrorCode::Internal, e.to_string()))
    })?;
    Ok("ok")
}

async fn http_list_koders(State(state): State<Arc<AppState>>) -> ApiResult<Json<KodersResponse>> {
    let koders = server_api::list_koders(&state.api)
        .await
        .map_err(api_error)?;
    Ok(Json(KodersResponse { koders }))
}

async fn http_create_koder(
    State(state): State<Arc<AppState>>,
    req: Result<Json<NewKoder>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<KoderResponse>)> {
    // Missing fields and non-JSON bodies get the same 400 body as rule failures.
    let Json(req) = req.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "rejected create payload");
        api_error(ApiError::new(ErrorCode::Validation, rejection.body_text()))
    })?;
    let koder = server_api::create_koder(&state.api, req)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(KoderResponse { koder })))
}

async fn http_delete_koder(
    State(state): State<Arc<AppState>>,
    Path(koder_id): Path<String>,
) -> ApiResult<Json<KoderResponse>> {
    let koder = server_api::delete_koder(&state.api, &KoderId::new(koder_id))
        .await
        .map_err(api_error)?;
    Ok(Json(KoderResponse { koder }))
}

fn api_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cars::services::{CarRequest, PartialCarRequest, ServiceError, ValidationError};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const CARS_PATH: &str = "/api/v1/cars";

#[derive(Serialize)]
pub struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    code: String,
    message: String,
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = ErrorResponse {
        error: ErrorDetail {
            code: code.to_string(),
            message: message.to_string(),
        },
    };
    (status, Json(body)).into_response()
}

fn bad_request(message: &str) -> Response {
    tracing::debug!("Rejected cars API request: {}", message);
    error_response(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn service_error(err: ServiceError) -> Response {
    match err {
        ServiceError::NotFound(id) => {
            tracing::debug!("No car found for id: {}", id);
            error_response(
                StatusCode::NOT_FOUND,
                "not_found",
                &format!("No car found for id: {}", id),
            )
        },
        ServiceError::Unexpected(e) => {
            tracing::warn!("Error processing cars API request: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            )
        },
    }
}

fn car_location(id: &str) -> String {
    format!("{}/{}", CARS_PATH, id)
}

/// Unwrap a JSON body, turning syntax, type and validation failures into 400
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    validate: impl FnOnce(&T) -> Result<(), ValidationError>,
) -> Result<T, Response> {
    let Json(body) = payload.map_err(|rejection| bad_request(&rejection.body_text()))?;
    validate(&body).map_err(|e| bad_request(&e.to_string()))?;
    Ok(body)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "update_mode": state.config.update_mode.to_string(),
    }))
}

async fn create_car(
    State(state): State<AppState>,
    payload: Result<Json<CarRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload, CarRequest::validate) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.car_service.add(request).await {
        Ok(view) => (
            StatusCode::CREATED,
            [(header::LOCATION, car_location(&view.id))],
            Json(view),
        )
            .into_response(),
        Err(e) => service_error(e),
    }
}

async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CarRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload, CarRequest::validate) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.car_service.update(&id, request).await {
        Ok(outcome) if outcome.created() => (
            StatusCode::CREATED,
            [(header::LOCATION, car_location(&id))],
        )
            .into_response(),
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error(e),
    }
}

async fn partial_update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PartialCarRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload, PartialCarRequest::validate) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.car_service.partial_update(&id, request).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error(e),
    }
}

async fn get_car(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.car_service.get(&id).await {
        Ok(Some(view)) => Json(view).into_response(),
        Ok(None) => service_error(ServiceError::NotFound(id)),
        Err(e) => service_error(e),
    }
}

async fn delete_car(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.car_service.remove(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error(e),
    }
}

async fn find_by_make(State(state): State<AppState>, Path(make): Path<String>) -> Response {
    match state.car_service.find_by_make(&make).await {
        Ok(views) => Json(views).into_response(),
        Err(e) => service_error(e),
    }
}

async fn find_by_make_and_model(
    State(state): State<AppState>,
    Path((make, model)): Path<(String, String)>,
) -> Response {
    match state.car_service.find_by_make_and_model(&make, &model).await {
        Ok(views) => Json(views).into_response(),
        Err(e) => service_error(e),
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    let car_routes = Router::new()
        .route(CARS_PATH, post(create_car))
        .route(
            "/api/v1/cars/{id}",
            get(get_car)
                .put(update_car)
                .patch(partial_update_car)
                .delete(delete_car),
        )
        .route("/api/v1/cars/make/{make}", get(find_by_make))
        .route(
            "/api/v1/cars/make/{make}/model/{model}",
            get(find_by_make_and_model),
        );

    Router::new()
        .route("/health", get(health))
        .merge(car_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

//! # HTTP Routes
//!
//! Thin axum handlers over [`crate::actions`].
//!
//! ## Route Table
//! ```text
//! GET    /health              liveness + storage check
//! GET    /api/books           list_books
//! POST   /api/books           add_book
//! GET    /api/books/{id}      get_book (404 when missing)
//! POST   /api/books/{id}      update_book
//! DELETE /api/books/{id}      delete_book (204)
//! GET    /api/sales           list_sales
//! POST   /api/sales           add_sale
//! POST   /api/sales/{id}      update_sale
//! DELETE /api/sales/{id}      delete_sale (204)
//! GET    /api/dashboard       dashboard
//! GET    /api/events          SSE: `revalidate` events with stale views
//! ```
//!
//! Action endpoints answer 200 with the `ActionState` body even when the
//! action failed; the UI reads `message`.

use std::convert::Infallible;

use axum::extract::{FromRequest, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Serialize;
use serde_json::Value;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use sellerbox_core::{ActionState, DashboardStats, FormData};

use crate::actions;
use crate::dto::{BookDto, SaleDto};
use crate::error::ApiError;
use crate::state::AppState;

/// Builds the full router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(add_book))
        .route(
            "/books/{id}",
            get(get_book).post(update_book).delete(delete_book),
        )
        .route("/sales", get(list_sales).post(add_sale))
        .route("/sales/{id}", post(update_sale).delete(delete_sale))
        .route("/dashboard", get(dashboard))
        .route("/events", get(events))
}

// =============================================================================
// Form Extractor
// =============================================================================

/// A form body, URL-encoded or JSON.
///
/// JSON scalars are stringified so both encodings reach the validators as
/// the same [`FormData`]; `null` drops the key.
#[derive(Debug)]
pub struct FormInput(pub FormData);

impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(map) = Json::<serde_json::Map<String, Value>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(FormInput(json_to_form(map)))
        } else {
            let Form(form) = Form::<FormData>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(FormInput(form))
        }
    }
}

fn json_to_form(map: serde_json::Map<String, Value>) -> FormData {
    map.into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect()
}

fn delete_response(result: Result<(), ActionState>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(state) => Json(state).into_response(),
    }
}

// =============================================================================
// Book Handlers
// =============================================================================

async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookDto>>, ApiError> {
    actions::list_books(&state).await.map(Json)
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookDto>, ApiError> {
    actions::get_book(&state, &id).await.map(Json)
}

async fn add_book(State(state): State<AppState>, FormInput(form): FormInput) -> Json<ActionState> {
    Json(actions::add_book(&state, &form).await)
}

async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormInput(form): FormInput,
) -> Json<ActionState> {
    Json(actions::update_book(&state, &id, &form).await)
}

async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    delete_response(actions::delete_book(&state, &id).await)
}

// =============================================================================
// Sale Handlers
// =============================================================================

async fn list_sales(State(state): State<AppState>) -> Result<Json<Vec<SaleDto>>, ApiError> {
    actions::list_sales(&state).await.map(Json)
}

async fn add_sale(State(state): State<AppState>, FormInput(form): FormInput) -> Json<ActionState> {
    Json(actions::add_sale(&state, &form).await)
}

async fn update_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormInput(form): FormInput,
) -> Json<ActionState> {
    Json(actions::update_sale(&state, &id, &form).await)
}

async fn delete_sale(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    delete_response(actions::delete_sale(&state, &id).await)
}

// =============================================================================
// Dashboard, Events, Health
// =============================================================================

async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    actions::dashboard(&state).await.map(Json)
}

/// One `revalidate` event per successful mutation. A lagging client skips
/// the events it missed.
async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.revalidator.subscribe()).filter_map(|message| {
        let views = message.ok()?;
        Event::default()
            .event("revalidate")
            .json_data(views)
            .ok()
            .map(Ok)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: String,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.storage_healthy().await;
    let (code, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage: state.backend().to_string(),
    };
    (code, Json(body))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    async fn send(app: &Router, request: HttpRequest<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> HttpRequest<Body> {
        HttpRequest::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> HttpRequest<Body> {
        HttpRequest::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_form(uri: &str, body: &str) -> HttpRequest<Body> {
        HttpRequest::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn delete(uri: &str) -> HttpRequest<Body> {
        HttpRequest::delete(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(AppState::default());
        let (status, body) = send(&app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn test_add_book_json_and_list() {
        let app = router(AppState::default());

        let (status, body) = send(
            &app,
            post_json(
                "/api/books",
                serde_json::json!({"code": "X1", "name": "Test", "quantity": 5, "description": null}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "book_added");

        let (_, books) = send(&app, get("/api/books")).await;
        assert_eq!(books[0]["code"], "X1");
        assert_eq!(books[0]["quantity"], 5);
        assert!(books[0]["coverImageUrl"].is_null());
    }

    #[tokio::test]
    async fn test_add_book_form_validation_is_200() {
        let app = router(AppState::default());

        let (status, body) = send(&app, post_form("/api/books", "code=&name=Test&quantity=abc")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "validation_failed");
        assert_eq!(body["errors"]["code"], serde_json::json!(["required"]));
        assert_eq!(body["errors"]["quantity"], serde_json::json!(["invalid_number"]));
    }

    #[tokio::test]
    async fn test_missing_book_is_404() {
        let app = router(AppState::default());
        let (status, body) = send(&app, get("/api/books/nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_deletes_are_204() {
        let app = router(AppState::default());

        let (status, _) = send(&app, delete("/api/books/nope")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, delete("/api/sales/nope")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_sale_flow_over_http() {
        let state = AppState::default();
        let app = router(state.clone());
        send(&app, post_form("/api/books", "code=X1&name=Test&quantity=2")).await;
        let (_, books) = send(&app, get("/api/books")).await;
        let book_id = books[0]["id"].as_str().unwrap().to_string();

        let date = actions::today().format("%d.%m.%Y").to_string();
        let (_, body) = send(
            &app,
            post_json(
                "/api/sales",
                serde_json::json!({"bookId": book_id, "date": date, "platform": "SellerBox-web"}),
            ),
        )
        .await;
        assert_eq!(body["message"], "sale_added");

        let (_, sales) = send(&app, get("/api/sales")).await;
        let sale_id = sales[0]["id"].as_str().unwrap().to_string();
        assert_eq!(sales[0]["platform"], "sellerbox_web");
        assert_eq!(sales[0]["bookName"], "Test");

        let mut rx = state.revalidator.subscribe();
        let (_, body) = send(
            &app,
            post_form(
                &format!("/api/sales/{sale_id}"),
                "status=sold_in_person&saleAmount=100&taxRate=6",
            ),
        )
        .await;
        assert_eq!(body["message"], "sale_updated");
        assert!(rx.try_recv().is_ok());

        let (_, book) = send(&app, get(&format!("/api/books/{book_id}"))).await;
        assert_eq!(book["quantity"], 1);

        let (_, stats) = send(&app, get("/api/dashboard")).await;
        assert_eq!(stats["revenue"], 10_000);
        assert_eq!(stats["taxTotal"], 600);
        assert_eq!(stats["salesByStatus"]["sold_in_person"], 1);
    }

    #[test]
    fn test_json_scalars_become_strings() {
        let map = serde_json::json!({"quantity": 3, "name": "Dune", "notes": null, "flag": true});
        let Value::Object(map) = map else { unreachable!() };
        let form = json_to_form(map);

        assert_eq!(form.get("quantity").map(String::as_str), Some("3"));
        assert_eq!(form.get("name").map(String::as_str), Some("Dune"));
        assert_eq!(form.get("flag").map(String::as_str), Some("true"));
        assert!(!form.contains_key("notes"));
    }
}

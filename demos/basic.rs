//! Minimal reqlog example: instrumented JSON endpoints.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42 -H 'x-request-name: profile'
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -i http://localhost:3000/boom
//!
//! Each request logs `Request: Start` and `Request: End` with an `execId`,
//! and the response carries `x-response-time`.

use http::StatusCode;
use reqlog::log::{Fields, Level, Logger};
use reqlog::middleware::{ContextLogger, RequestLogger, ResponseTime};
use reqlog::{BoxError, Request, Response, Router, Server};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt::init();

    // Options as they would arrive from a config file.
    let request_log = RequestLogger::from_json(&json!({ "level": "info" }))?;
    let response_time = ResponseTime::from_json(&json!({ "resHeader": "x-response-time" }))?;

    let app = Router::new()
        .layer(ContextLogger::default())
        .layer(request_log)
        .layer(response_time)
        .get("/users/{id}", get_user)
        .post("/users", create_user)
        .get("/boom", boom);

    Server::bind("0.0.0.0:3000")?.serve(app).await?;
    Ok(())
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    if let Some(log) = req.log() {
        log.log(Level::Debug, Fields::new().with("userId", id), "loading user");
    }
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#)
}

// GET /boom: the failure skips `Request: End` and becomes a 500.
async fn boom(_req: Request) -> Result<Response, BoxError> {
    Err("simulated failure".into())
}

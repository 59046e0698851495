use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use uuid::Uuid;
use crate::core::{ControllerError, Event};
use crate::models::{AnswerRequest, ErrorResponse, HealthResponse, QuizView, SwipeRequest};
use crate::services::{SessionError, SessionStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
}

/// Configure all session-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/quiz", web::get().to(get_quiz))
        .route("/sessions", web::post().to(create_session))
        .route("/sessions/{id}", web::get().to(get_session))
        .route("/sessions/{id}", web::delete().to(delete_session))
        .route("/sessions/{id}/answer", web::post().to(answer))
        .route("/sessions/{id}/swipe", web::post().to(swipe))
        .route("/sessions/{id}/retry", web::post().to(retry))
        .route("/sessions/{id}/restart", web::post().to(restart));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        active_sessions: state.sessions.active_sessions(),
    })
}

/// Quiz definition endpoint
///
/// GET /api/v1/quiz
async fn get_quiz(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(QuizView::from(state.sessions.quiz().as_ref()))
}

/// Start a session
///
/// POST /api/v1/sessions
async fn create_session(state: web::Data<AppState>) -> impl Responder {
    let view = state.sessions.create().await;
    HttpResponse::Created().json(view)
}

/// GET /api/v1/sessions/{id}
async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    match state.sessions.view(path.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/v1/sessions/{id}
async fn delete_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    match state.sessions.remove(path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

/// Answer the active question
///
/// POST /api/v1/sessions/{id}/answer
///
/// Request body:
/// ```json
/// { "label": "string" }
/// ```
async fn answer(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<AnswerRequest>,
) -> HttpResponse {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for answer request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let AnswerRequest { label } = req.into_inner();
    apply(&state, path.into_inner(), Event::Answer(label)).await
}

/// Like or dislike the current card
///
/// POST /api/v1/sessions/{id}/swipe
///
/// Request body:
/// ```json
/// { "liked": true }
/// ```
async fn swipe(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<SwipeRequest>,
) -> HttpResponse {
    apply(&state, path.into_inner(), Event::Swipe(req.liked)).await
}

/// Re-issue the request that failed last
///
/// POST /api/v1/sessions/{id}/retry
async fn retry(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    apply(&state, path.into_inner(), Event::Retry).await
}

/// POST /api/v1/sessions/{id}/restart
async fn restart(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    apply(&state, path.into_inner(), Event::Restart).await
}

async fn apply(state: &AppState, id: Uuid, event: Event) -> HttpResponse {
    tracing::debug!("Session {} <- {:?}", id, event);

    match state.sessions.dispatch(id, event).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

fn error_response(err: SessionError) -> HttpResponse {
    match err {
        SessionError::NotFound(id) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Session not found".to_string(),
            message: format!("No live session with id {}", id),
            status_code: 404,
        }),
        SessionError::Rejected(reason) => {
            let error = match reason {
                ControllerError::Busy => "Request in flight",
                ControllerError::WrongStage { .. } => "Wrong stage",
                ControllerError::NothingToRetry => "Nothing to retry",
                ControllerError::Quiz(_) => "Invalid answer",
                ControllerError::Swipe(_) => "Invalid swipe",
            };
            tracing::info!("Rejected session input: {}", reason);
            HttpResponse::Conflict().json(ErrorResponse {
                error: error.to_string(),
                message: reason.to_string(),
                status_code: 409,
            })
        }
    }
}

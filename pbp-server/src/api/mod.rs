//! Activation API handlers.
//!
//! # Endpoints
//!
//! - `GET  /active`            – list game codes with a running poller
//! - `POST /activate/{*code}`   – start polling a game (fire-and-forget)
//! - `POST /deactivate/{*code}` – ask a running poller to stop
//!
//! The code is the rest of the path and may itself contain `/`.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kanau::processor::Processor;
use pbp_core::processors::{ActivateGame, DeactivateGame, ListActiveGames};
use pbp_sdk::GameCode;
use serde::Serialize;

use crate::state::AppState;

/// Build the activation API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/active", get(list_active))
        .route("/activate/{*code}", post(activate_game))
        .route("/deactivate/{*code}", post(deactivate_game))
}

#[derive(Serialize)]
struct ActiveGamesResponse {
    games: Vec<GameCode>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// `GET /active`: currently active game codes.
async fn list_active(State(state): State<AppState>) -> Result<Response, ApiError> {
    let Ok(games) = state.activation.process(ListActiveGames).await;

    let body = serde_json::to_vec(&ActiveGamesResponse { games }).map_err(ApiError::Encoding)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// `POST /activate/{*code}`: start a poller unless one is already running.
///
/// Always answers `202 Accepted`; failures of the poller only show up as the
/// code leaving `/active`.
async fn activate_game(State(state): State<AppState>, Path(code): Path<String>) -> StatusCode {
    let Ok(_) = state
        .activation
        .process(ActivateGame {
            game_code: GameCode::from(code),
        })
        .await;
    StatusCode::ACCEPTED
}

/// `POST /deactivate/{*code}`: stop a running poller.
async fn deactivate_game(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let Ok(stopping) = state
        .activation
        .process(DeactivateGame {
            game_code: GameCode::from(code),
        })
        .await;
    if stopping {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(ApiError::GameNotActive)
    }
}

/// Errors that can occur in activation API handlers.
#[derive(Debug)]
enum ApiError {
    /// The response body could not be encoded.
    Encoding(serde_json::Error),
    /// No poller owns the requested code.
    GameNotActive,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Encoding(e) => {
                tracing::error!(error = %e, "Failed to encode active games");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "server error occurred",
                    }),
                )
                    .into_response()
            }
            ApiError::GameNotActive => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: "game not active",
                }),
            )
                .into_response(),
        }
    }
}

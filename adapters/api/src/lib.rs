#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Transport-neutral JSON API over the Life Defence session manager.
//!
//! A host server only needs to hand the method, path and body of each
//! request to [`Api::respond`] and write the returned status and JSON body.

mod route;

use std::sync::Arc;

use life_defence_core::{Difficulty, PlacementError, Speed};
use life_defence_session::{RestartOptions, SessionError, SessionManager, StepOutcome};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

pub use route::{Method, Route};

/// Status code of a successful request.
pub const STATUS_OK: u16 = 200;
/// Status code of a malformed request body.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// Status code of an unknown game or route.
pub const STATUS_NOT_FOUND: u16 = 404;

/// Body of `POST /api/game/new`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateGameRequest {
    /// Difficulty of the new game.
    pub difficulty: Difficulty,
}

/// Body of `POST /api/game/{id}/place-pattern`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacePatternRequest {
    /// Name of a player pattern.
    pub pattern: String,
    /// Row of the pattern's top-left corner.
    pub row: i64,
    /// Column of the pattern's top-left corner.
    pub col: i64,
}

/// Body of `POST /api/game/{id}/pause`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseRequest {
    /// Desired paused flag.
    pub paused: bool,
}

/// Body of `POST /api/game/{id}/set-speed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSpeedRequest {
    /// Desired advisory speed.
    pub speed: Speed,
}

/// Acknowledgement returned by operations that do not return a full state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResponse {
    /// Whether the operation took effect.
    pub success: bool,
    /// Human-readable reason when it did not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResponse {
    /// Acknowledges a successful operation.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Reports a rejected operation.
    #[must_use]
    pub fn rejected(reason: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(reason.to_string()),
        }
    }
}

/// Status code and JSON body produced for a request.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: impl Serialize) -> Result<Self, ApiError> {
        Ok(Self {
            status: STATUS_OK,
            body: serde_json::to_value(body)?,
        })
    }
}

/// Failures that end a request before it reaches a session.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The addressed game does not exist.
    #[error("game {0} not found")]
    NotFound(String),
    /// No endpoint matches the method and path.
    #[error("no route for {method} {path}")]
    UnknownRoute {
        /// Requested method.
        method: String,
        /// Requested path.
        path: String,
    },
    /// The request body is not the JSON the endpoint expects.
    #[error("malformed request body: {0}")]
    BadRequest(#[from] serde_json::Error),
    /// The session refused a placement.
    #[error(transparent)]
    Rejected(#[from] PlacementError),
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotFound(id) => Self::NotFound(id.to_string()),
            SessionError::Placement(reason) => Self::Rejected(reason),
        }
    }
}

impl ApiError {
    /// HTTP status code reported for the error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::UnknownRoute { .. } => STATUS_NOT_FOUND,
            Self::BadRequest(_) | Self::Rejected(_) => STATUS_BAD_REQUEST,
        }
    }

    /// Converts the error into its `{success: false, error}` response.
    #[must_use]
    pub fn into_response(self) -> ApiResponse {
        ApiResponse {
            status: self.status(),
            body: json!({ "success": false, "error": self.to_string() }),
        }
    }
}

/// Dispatches API requests to a shared [`SessionManager`].
#[derive(Clone, Debug)]
pub struct Api {
    manager: Arc<SessionManager>,
}

impl Api {
    /// Creates an API front end over the provided manager.
    #[must_use]
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    /// Manager backing the API.
    #[must_use]
    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    /// Routes and handles a raw request, folding every error into a response.
    pub fn respond(&self, method: &str, path: &str, body: &str) -> ApiResponse {
        let outcome = method
            .parse::<Method>()
            .and_then(|method| Route::parse(method, path))
            .and_then(|route| self.handle(route, body));
        match outcome {
            Ok(response) => response,
            Err(error) => {
                debug!(method, path, %error, "request failed");
                error.into_response()
            }
        }
    }

    /// Handles a request for an already matched route.
    pub fn handle(&self, route: Route, body: &str) -> Result<ApiResponse, ApiError> {
        match route {
            Route::Create => {
                let request: CreateGameRequest = parse_optional(body)?;
                ApiResponse::ok(self.manager.create(request.difficulty))
            }
            Route::State(id) => ApiResponse::ok(self.manager.get_state(id)?),
            Route::Step(id) => match self.manager.step(id)? {
                StepOutcome::Accepted(_) => ApiResponse::ok(OperationResponse::ok()),
                StepOutcome::Rejected(reason) => {
                    ApiResponse::ok(OperationResponse::rejected(reason))
                }
            },
            Route::PlacePattern(id) => {
                let request: PlacePatternRequest = parse_required(body)?;
                match self
                    .manager
                    .place(id, &request.pattern, request.row, request.col)
                {
                    Ok(_) => ApiResponse::ok(OperationResponse::ok()),
                    Err(SessionError::Placement(reason)) => {
                        ApiResponse::ok(OperationResponse::rejected(reason))
                    }
                    Err(error) => Err(error.into()),
                }
            }
            Route::Pause(id) => {
                let request: PauseRequest = parse_required(body)?;
                self.manager.set_paused(id, request.paused)?;
                ApiResponse::ok(OperationResponse::ok())
            }
            Route::Restart(id) => {
                let options: RestartOptions = parse_optional(body)?;
                ApiResponse::ok(self.manager.restart(id, options)?)
            }
            Route::SetSpeed(id) => {
                let request: SetSpeedRequest = parse_required(body)?;
                self.manager.set_speed(id, request.speed)?;
                ApiResponse::ok(OperationResponse::ok())
            }
            Route::Delete(id) => {
                self.manager.delete(id)?;
                ApiResponse::ok(OperationResponse::ok())
            }
        }
    }
}

fn parse_required<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    Ok(serde_json::from_str(body)?)
}

fn parse_optional<T: DeserializeOwned + Default>(body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    parse_required(body)
}

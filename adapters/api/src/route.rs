use std::{fmt, str::FromStr};

use life_defence_session::GameId;

use crate::ApiError;

const GAME_PREFIX: &str = "/api/game/";

/// HTTP methods understood by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read-only request.
    Get,
    /// Mutating request.
    Post,
    /// Removal request.
    Delete,
}

impl FromStr for Method {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ApiError::UnknownRoute {
                method: value.to_owned(),
                path: String::new(),
            }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        })
    }
}

/// Endpoint addressed by a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// `POST /api/game/new`
    Create,
    /// `GET /api/game/{id}/state`
    State(GameId),
    /// `POST /api/game/{id}/step`
    Step(GameId),
    /// `POST /api/game/{id}/place-pattern`
    PlacePattern(GameId),
    /// `POST /api/game/{id}/pause`
    Pause(GameId),
    /// `POST /api/game/{id}/restart`
    Restart(GameId),
    /// `POST /api/game/{id}/set-speed`
    SetSpeed(GameId),
    /// `DELETE /api/game/{id}`
    Delete(GameId),
}

impl Route {
    /// Matches a method and path against the route table.
    ///
    /// A well-formed path whose identifier is not a valid game id yields
    /// [`ApiError::NotFound`], since no such game can exist.
    pub fn parse(method: Method, path: &str) -> Result<Self, ApiError> {
        let unknown = || ApiError::UnknownRoute {
            method: method.to_string(),
            path: path.to_owned(),
        };

        let path = path.split_once('?').map_or(path, |(path, _)| path);
        let rest = path
            .trim_end_matches('/')
            .strip_prefix(GAME_PREFIX)
            .ok_or_else(unknown)?;
        if method == Method::Post && rest == "new" {
            return Ok(Self::Create);
        }

        let (id, action) = match rest.split_once('/') {
            Some((id, action)) => (id, Some(action)),
            None => (rest, None),
        };
        let build: fn(GameId) -> Self = match (method, action) {
            (Method::Get, Some("state")) => Self::State,
            (Method::Post, Some("step")) => Self::Step,
            (Method::Post, Some("place-pattern")) => Self::PlacePattern,
            (Method::Post, Some("pause")) => Self::Pause,
            (Method::Post, Some("restart")) => Self::Restart,
            (Method::Post, Some("set-speed")) => Self::SetSpeed,
            (Method::Delete, None) => Self::Delete,
            _ => return Err(unknown()),
        };
        let id = GameId::from_str(id).map_err(|_| ApiError::NotFound(id.to_owned()))?;
        Ok(build(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_endpoint_is_matched() {
        let id = GameId::new();
        let cases = [
            (Method::Get, format!("/api/game/{id}/state"), Route::State(id)),
            (Method::Post, format!("/api/game/{id}/step"), Route::Step(id)),
            (
                Method::Post,
                format!("/api/game/{id}/place-pattern"),
                Route::PlacePattern(id),
            ),
            (Method::Post, format!("/api/game/{id}/pause"), Route::Pause(id)),
            (Method::Post, format!("/api/game/{id}/restart"), Route::Restart(id)),
            (Method::Post, format!("/api/game/{id}/set-speed"), Route::SetSpeed(id)),
            (Method::Delete, format!("/api/game/{id}"), Route::Delete(id)),
            (Method::Post, "/api/game/new".to_owned(), Route::Create),
        ];
        for (method, path, expected) in cases {
            assert_eq!(Route::parse(method, &path).expect(&path), expected);
        }
    }

    #[test]
    fn wrong_method_or_path_is_unknown() {
        let id = GameId::new();
        for (method, path) in [
            (Method::Get, format!("/api/game/{id}/step")),
            (Method::Post, format!("/api/game/{id}/teleport")),
            (Method::Get, "/api/game/new".to_owned()),
            (Method::Get, "/health".to_owned()),
        ] {
            assert!(matches!(
                Route::parse(method, &path),
                Err(ApiError::UnknownRoute { .. })
            ));
        }
    }

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(
            Route::parse(Method::Get, "/api/game/not-a-uuid/state"),
            Err(ApiError::NotFound(id)) if id == "not-a-uuid"
        ));
    }

    #[test]
    fn methods_parse_case_insensitively() {
        assert_eq!("post".parse::<Method>().expect("known method"), Method::Post);
        assert!("PATCH".parse::<Method>().is_err());
    }
}

//! Contains the data models for API requests and responses.

use serde::{Deserialize, Serialize};

use crate::grid::{Offset, Position, VisitedMap};
use crate::state::{CameraState, OperationState};

/// Body of `POST /move`.
#[derive(Debug, Default, Deserialize)]
pub struct MoveRequest {
    #[serde(default)]
    pub direction: Option<String>,
}

/// Body of `POST /set_target`. Coordinates are kept loose so a bad value
/// turns into an "ignored" reply instead of a rejected request.
#[derive(Debug, Default, Deserialize)]
pub struct SetTargetRequest {
    #[serde(default)]
    pub x: Option<serde_json::Value>,
    #[serde(default)]
    pub y: Option<serde_json::Value>,
}

impl SetTargetRequest {
    pub fn coordinates(&self) -> (Option<i64>, Option<i64>) {
        (coordinate(self.x.as_ref()), coordinate(self.y.as_ref()))
    }
}

fn coordinate(value: Option<&serde_json::Value>) -> Option<i64> {
    match value? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub status: &'static str,
    pub target_region: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_delta: Option<Offset>,
}

#[derive(Debug, Serialize)]
pub struct SetTargetResponse {
    pub status: &'static str,
    pub target_region: Position,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
}

/// Represents the response for the `/status` endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub current_region: Position,
    pub target: Position,
    pub final_destination: Position,
    pub state: OperationState,
    pub visited: VisitedMap,
}

impl From<CameraState> for StatusResponse {
    fn from(state: CameraState) -> Self {
        Self {
            current_region: state.current,
            target: state.target,
            final_destination: state.final_destination,
            state: state.state,
            visited: state.visited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_accept_numbers_and_numeric_strings() {
        let req: SetTargetRequest = serde_json::from_str(r#"{"x": 3, "y": "2"}"#).unwrap();
        assert_eq!(req.coordinates(), (Some(3), Some(2)));
    }

    #[test]
    fn test_coordinates_reject_garbage() {
        let req: SetTargetRequest = serde_json::from_str(r#"{"x": 1.5, "y": null}"#).unwrap();
        assert_eq!(req.coordinates(), (None, None));
        let req: SetTargetRequest = serde_json::from_str(r#"{"x": "left"}"#).unwrap();
        assert_eq!(req.coordinates(), (None, None));
    }

    #[test]
    fn test_move_response_omits_missing_delta() {
        let body = MoveResponse { status: "ignored", target_region: Position::ORIGIN, net_delta: None };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("net_delta").is_none());
        assert_eq!(json["target_region"]["x"], 0);
    }
}

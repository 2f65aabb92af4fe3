//! The backend HTTP contract.
//!
//! | Method | Path                 | Body                     | Response           |
//! |--------|----------------------|--------------------------|--------------------|
//! | GET    | `/grid`              |                          | grid definition    |
//! | GET    | `/state`             |                          | simulation         |
//! | GET    | `/models`            |                          | `[name, ...]`      |
//! | POST   | `/step`              |                          | simulation         |
//! | POST   | `/reset`             |                          | simulation         |
//! | POST   | `/set_active_models` | `{ model_names: [...] }` | simulation         |
//! | POST   | `/set_model`         | `{ model_name }`         | ignored (legacy)   |

use serde::Serialize;

use crate::error::{Result, ViewError};
use crate::snapshot::{GridSnapshot, GridWire, SimulationSnapshot, SimulationWire};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    Grid,
    State,
    Models,
    Step,
    Reset,
    SetActiveModels(Vec<String>),
    /// Single-model selection from older backends; the response carries no
    /// snapshot, so a `State` fetch follows.
    SetModel(String),
}

#[derive(Serialize)]
struct SetActiveModelsBody<'a> {
    model_names: &'a [String],
}

#[derive(Serialize)]
struct SetModelBody<'a> {
    model_name: &'a str,
}

impl ApiRequest {
    pub fn method(&self) -> Method {
        match self {
            ApiRequest::Grid | ApiRequest::State | ApiRequest::Models => Method::Get,
            _ => Method::Post,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ApiRequest::Grid => "/grid",
            ApiRequest::State => "/state",
            ApiRequest::Models => "/models",
            ApiRequest::Step => "/step",
            ApiRequest::Reset => "/reset",
            ApiRequest::SetActiveModels(_) => "/set_active_models",
            ApiRequest::SetModel(_) => "/set_model",
        }
    }

    /// JSON request body, if the endpoint takes one.
    pub fn body(&self) -> Option<String> {
        let json = match self {
            ApiRequest::SetActiveModels(names) => {
                serde_json::to_string(&SetActiveModelsBody { model_names: names })
            }
            ApiRequest::SetModel(name) => serde_json::to_string(&SetModelBody { model_name: name }),
            _ => return None,
        };
        // Serializing a struct of strings cannot fail.
        json.ok()
    }

    /// Whether the response replaces the simulation snapshot.
    pub fn yields_snapshot(&self) -> bool {
        matches!(
            self,
            ApiRequest::State | ApiRequest::Step | ApiRequest::Reset | ApiRequest::SetActiveModels(_)
        )
    }

    pub fn decode(&self, body: &str) -> Result<ApiResponse> {
        let endpoint = self.path();
        let decode_err = |source| ViewError::Decode { endpoint, source };
        Ok(match self {
            ApiRequest::Grid => {
                let wire: GridWire = serde_json::from_str(body).map_err(decode_err)?;
                ApiResponse::Grid(GridSnapshot::try_from(wire)?)
            }
            ApiRequest::Models => {
                ApiResponse::Models(serde_json::from_str(body).map_err(decode_err)?)
            }
            ApiRequest::SetModel(_) => ApiResponse::Ack,
            _ => {
                let wire: SimulationWire = serde_json::from_str(body).map_err(decode_err)?;
                ApiResponse::Snapshot(wire.into())
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Grid(GridSnapshot),
    Snapshot(SimulationSnapshot),
    Models(Vec<String>),
    Ack,
}

/// Transport for [`ApiRequest`]s.
///
/// Implementations return the body of a successful (2xx) response and map
/// everything else to [`ViewError::Network`] or [`ViewError::Status`].
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn send(&self, request: &ApiRequest) -> Result<String>;
}

/// Send `request` and decode the response body.
pub async fn exchange<B: Backend>(backend: &B, request: &ApiRequest) -> Result<ApiResponse> {
    let body = backend.send(request).await?;
    request.decode(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_and_bodies() {
        assert_eq!(ApiRequest::Grid.method(), Method::Get);
        assert_eq!(ApiRequest::Step.method(), Method::Post);
        assert_eq!(ApiRequest::Reset.path(), "/reset");
        assert_eq!(ApiRequest::Step.body(), None);
        assert_eq!(
            ApiRequest::SetActiveModels(vec!["m1".into(), "m2".into()]).body().as_deref(),
            Some(r#"{"model_names":["m1","m2"]}"#)
        );
        assert_eq!(
            ApiRequest::SetModel("m1".into()).body().as_deref(),
            Some(r#"{"model_name":"m1"}"#)
        );
    }

    #[test]
    fn decodes_each_shape() {
        let grid = ApiRequest::Grid
            .decode(r#"{"grid_size_x":2,"grid_size_y":2,"resources":[[0,0],[1,1]],"resource_map":{"0,0":"Book","1,1":"Pen"}}"#)
            .unwrap();
        assert!(matches!(grid, ApiResponse::Grid(g) if g.resources.len() == 2 && g.resource_names.len() == 2));

        let models = ApiRequest::Models.decode(r#"["m1","m2"]"#).unwrap();
        assert_eq!(models, ApiResponse::Models(vec!["m1".into(), "m2".into()]));

        // set_active_models answers with an extra "success" key.
        let snap = ApiRequest::SetActiveModels(vec![])
            .decode(r#"{"success":true,"active_models":["m1"],"states":{"m1":{"agent_pos":[0,0],"goal_pos":[1,1],"path":[[0,0]],"reward":0}}}"#)
            .unwrap();
        assert!(matches!(snap, ApiResponse::Snapshot(s) if s.active_models == ["m1"]));

        assert_eq!(ApiRequest::SetModel("m".into()).decode("whatever").unwrap(), ApiResponse::Ack);
    }

    #[test]
    fn malformed_bodies_are_decode_errors() {
        let err = ApiRequest::Step.decode("{not json").unwrap_err();
        assert!(matches!(err, ViewError::Decode { endpoint: "/step", .. }));

        let err = ApiRequest::Grid.decode(r#"{"grid_size_x":0,"grid_size_y":1}"#).unwrap_err();
        assert!(matches!(err, ViewError::InvalidGrid { .. }));
    }
}

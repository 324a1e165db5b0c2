//! JSON request parameters. An empty body decodes to the type's defaults.

use crate::error::{ApiError, AppError, ErrorCode};
use crate::messages;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug)]
pub struct JsonParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonParams<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "failed to buffer request body");
            AppError::InvalidRequest(ApiError::invalid_request(messages::request_body_too_large()))
        })?;
        decode(&bytes).map(JsonParams)
    }
}

fn invalid_body() -> AppError {
    AppError::InvalidRequest(ApiError::invalid_request(messages::invalid_request_body()))
}

pub(crate) fn decode<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let value: Value = serde_json::from_slice(bytes).map_err(|_| invalid_body())?;
    let Value::Object(map) = value else {
        return Err(invalid_body());
    };
    serde_json::from_value(Value::Object(map.clone())).map_err(|e| blame_field::<T>(&map, &e))
}

/// Name the top-level field that fails to decode on its own. Every parameter field is
/// optional, so a single-key object only fails because of that key.
fn blame_field<T: DeserializeOwned>(map: &Map<String, Value>, err: &serde_json::Error) -> AppError {
    for (key, value) in map {
        let mut single = Map::new();
        single.insert(key.clone(), value.clone());
        if let Err(e) = serde_json::from_value::<T>(Value::Object(single)) {
            let detail = e.to_string();
            return AppError::InvalidRequest(ApiError::invalid_param(
                ErrorCode::ParameterInvalid,
                messages::invalid_param_type(key, &detail),
                Some(key.clone()),
            ));
        }
    }
    tracing::debug!(error = %err, "undecodable request body");
    invalid_body()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{GroupCreateParams, ListParams, GroupFilter};

    #[test]
    fn empty_body_is_default() {
        let p: GroupCreateParams = decode(b"").unwrap();
        assert!(p.name.is_none());
        let p: ListParams<GroupFilter> = decode(b"  \n").unwrap();
        assert_eq!(p.page.limit(), 10);
    }

    #[test]
    fn flattened_list_params_decode() {
        let id = uuid::Uuid::new_v4();
        let body = serde_json::json!({ "limit": 2, "starting_after": id, "name": "tools", "expand": ["parent_group"] });
        let p: ListParams<GroupFilter> = decode(body.to_string().as_bytes()).unwrap();
        assert_eq!(p.page.limit, Some(2));
        assert_eq!(p.page.starting_after, Some(id));
        assert_eq!(p.filter.name.as_deref(), Some("tools"));
        assert_eq!(p.expand, vec!["parent_group".to_string()]);
    }

    #[test]
    fn malformed_json_is_invalid_body() {
        let err = decode::<GroupCreateParams>(b"{\"name\":").unwrap_err();
        match err {
            AppError::InvalidRequest(e) => assert_eq!(e.message, messages::invalid_request_body()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn wrong_type_names_the_field() {
        let err = decode::<GroupCreateParams>(br#"{"name":"ok","parent_group":42}"#).unwrap_err();
        match err {
            AppError::InvalidRequest(e) => {
                assert_eq!(e.param.as_deref(), Some("parent_group"));
                assert_eq!(e.code, Some(ErrorCode::ParameterInvalid));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

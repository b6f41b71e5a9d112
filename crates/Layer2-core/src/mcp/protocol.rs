//! JSON-RPC 2.0 메시지 타입

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolgate_foundation::Error;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 알림 (응답 없음)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// 서버 요청에 대한 응답 (게이트웨이 → 백엔드)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcReply {
    pub jsonrpc: String,
    pub id: Value,
    pub error: JsonRpcError,
}

/// JSON-RPC 에러
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
            data: None,
        }
    }
}

impl From<JsonRpcError> for Error {
    fn from(e: JsonRpcError) -> Self {
        Error::Rpc {
            code: e.code,
            message: e.message,
        }
    }
}

/// 백엔드에서 들어온 한 줄의 분류
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingMessage {
    /// 우리 요청에 대한 응답
    Response {
        id: u64,
        outcome: std::result::Result<Value, JsonRpcError>,
    },
    /// 서버가 보낸 요청 (`method` + `id`)
    Request { id: Value, method: String },
    /// 서버 알림
    Notification { method: String, params: Option<Value> },
}

impl IncomingMessage {
    /// 한 줄 파싱
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
        let obj = value
            .as_object()
            .ok_or_else(|| "message is not a JSON object".to_string())?;

        if let Some(method) = obj.get("method").and_then(Value::as_str) {
            return Ok(match obj.get("id") {
                Some(id) if !id.is_null() => Self::Request {
                    id: id.clone(),
                    method: method.to_string(),
                },
                _ => Self::Notification {
                    method: method.to_string(),
                    params: obj.get("params").cloned(),
                },
            });
        }

        let id = obj
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| "response without a numeric id".to_string())?;

        if let Some(error) = obj.get("error") {
            let error: JsonRpcError =
                serde_json::from_value(error.clone()).map_err(|e| e.to_string())?;
            return Ok(Self::Response {
                id,
                outcome: Err(error),
            });
        }

        match obj.get("result") {
            Some(result) => Ok(Self::Response {
                id,
                outcome: Ok(result.clone()),
            }),
            None => Err(format!("response {} has neither result nor error", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest::new(7, "tools/list", None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}));
    }

    #[test]
    fn test_parse_response() {
        let msg = IncomingMessage::parse(r#"{"jsonrpc":"2.0","id":3,"result":{"ok":true}}"#).unwrap();
        assert_eq!(
            msg,
            IncomingMessage::Response {
                id: 3,
                outcome: Ok(json!({"ok": true}))
            }
        );

        let msg = IncomingMessage::parse(
            r#"{"jsonrpc":"2.0","id":4,"error":{"code":-32602,"message":"bad params"}}"#,
        )
        .unwrap();
        match msg {
            IncomingMessage::Response { id, outcome: Err(e) } => {
                assert_eq!(id, 4);
                assert_eq!(e.code, -32602);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_server_messages() {
        let msg = IncomingMessage::parse(r#"{"jsonrpc":"2.0","id":"s1","method":"roots/list"}"#).unwrap();
        assert_eq!(
            msg,
            IncomingMessage::Request {
                id: json!("s1"),
                method: "roots/list".into()
            }
        );

        let msg = IncomingMessage::parse(
            r#"{"jsonrpc":"2.0","method":"notifications/progress","params":{"p":1}}"#,
        )
        .unwrap();
        assert!(matches!(msg, IncomingMessage::Notification { .. }));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(IncomingMessage::parse("not json").is_err());
        assert!(IncomingMessage::parse("[1,2]").is_err());
        assert!(IncomingMessage::parse(r#"{"jsonrpc":"2.0","id":1}"#).is_err());
        assert!(IncomingMessage::parse(r#"{"jsonrpc":"2.0","id":"x","result":1}"#).is_err());
    }

    #[test]
    fn test_rpc_error_conversion() {
        let err: Error = JsonRpcError::method_not_found("x").into();
        assert!(matches!(err, Error::Rpc { code: -32601, .. }));
    }
}

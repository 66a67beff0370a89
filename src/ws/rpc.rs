//! Hook for requests that clients send over the WebSocket.
//!
//! Player command handling lives outside this crate. The frontend hands
//! each decoded request to a [`RequestHandler`] and writes back whatever
//! it returns.

use serde_json::Value;

use super::messages::{INVALID_REQUEST, METHOD_NOT_FOUND, RpcErrorResponse};

/// Answers JSON requests received on a WebSocket connection.
pub trait RequestHandler: Send + Sync + std::fmt::Debug {
    /// Handles one decoded request. `None` sends nothing back, which is
    /// the right answer to a notification.
    fn handle(&self, request: Value) -> Option<Value>;
}

/// Handler used when no player core is attached.
///
/// Requests with an `id` get "Method not found"; notifications are
/// ignored; anything that is not an object is an invalid request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCoreHandler;

impl RequestHandler for NoCoreHandler {
    fn handle(&self, request: Value) -> Option<Value> {
        let Value::Object(request) = request else {
            return Some(
                RpcErrorResponse::new(Value::Null, INVALID_REQUEST, "Invalid Request").to_value(),
            );
        };
        let id = request.get("id").cloned()?;
        let method = request
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        tracing::debug!(method, "no player core attached");
        Some(RpcErrorResponse::new(id, METHOD_NOT_FOUND, "Method not found").to_value())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_with_id_gets_method_not_found() {
        let response = NoCoreHandler.handle(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "core.playback.play"
        }));
        let Some(response) = response else {
            panic!("request must be answered");
        };
        assert_eq!(response["id"], 1);
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
    }

    #[test]
    fn notification_is_ignored() {
        let response =
            NoCoreHandler.handle(json!({"jsonrpc": "2.0", "method": "core.playback.play"}));
        assert!(response.is_none());
    }

    #[test]
    fn non_object_is_invalid_request() {
        let Some(response) = NoCoreHandler.handle(json!([1, 2])) else {
            panic!("invalid request must be answered");
        };
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }
}

//! Request and response types carried over the wire.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One logical remote call: an action name plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    action: String,
    payload: Value,
}

impl RpcRequest {
    pub fn new(action: impl Into<String>, payload: Value) -> Self {
        Self {
            action: action.into(),
            payload,
        }
    }

    /// Build a request from any serializable payload.
    pub fn encode<P: Serialize + ?Sized>(
        action: impl Into<String>,
        payload: &P,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(action, serde_json::to_value(payload)?))
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

/// A successful backend response.
///
/// The full JSON object is kept; action-specific fields are read with
/// [`RpcResponse::get`] or decoded with [`RpcResponse::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    body: Value,
}

impl RpcResponse {
    pub(crate) fn new(body: Value) -> Self {
        Self { body }
    }

    /// The `status` field, when present.
    pub fn status(&self) -> Option<&str> {
        self.body.get("status").and_then(Value::as_str)
    }

    /// The `message` field, when present.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// Decode the whole body into a typed response.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }

    /// Decode a single field. A missing field decodes from `null`.
    pub fn decode_field<T: DeserializeOwned>(&self, field: &str) -> Result<T, serde_json::Error> {
        T::deserialize(self.body.get(field).unwrap_or(&Value::Null))
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let request = RpcRequest::new("getPublicSchedules", json!({"department": "ER"}));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"action": "getPublicSchedules", "payload": {"department": "ER"}})
        );
    }

    #[test]
    fn test_request_encode_struct_payload() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Lookup<'a> {
            department_id: &'a str,
        }

        let request = RpcRequest::encode("getPreviousSchedules", &Lookup { department_id: "ICU" })
            .unwrap();
        assert_eq!(request.action(), "getPreviousSchedules");
        assert_eq!(request.payload(), &json!({"departmentId": "ICU"}));
    }

    #[test]
    fn test_response_accessors() {
        let resp = RpcResponse::new(json!({
            "status": "success",
            "message": "saved",
            "exists": true
        }));
        assert_eq!(resp.status(), Some("success"));
        assert_eq!(resp.message(), Some("saved"));
        assert!(resp.decode_field::<bool>("exists").unwrap());
        assert_eq!(resp.decode_field::<Option<String>>("missing").unwrap(), None);
    }

    #[test]
    fn test_response_decode_whole_body() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Departments {
            departments: Vec<String>,
        }

        let resp = RpcResponse::new(json!({"status": "success", "departments": ["ER", "ICU"]}));
        assert_eq!(
            resp.decode::<Departments>().unwrap(),
            Departments {
                departments: vec!["ER".to_string(), "ICU".to_string()]
            }
        );
    }
}

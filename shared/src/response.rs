use std::collections::HashMap;

use crate::ProxyResponse;

/// Build the outbound envelope. 301 produces a redirect with a Location
/// header; every other status serializes the payload as the JSON body. This
/// is the only constructor handlers use.
pub fn response(status_code: i64, payload: &serde_json::Value) -> ProxyResponse {
    if status_code == 301 {
        let location = payload.as_str().unwrap_or_default().to_string();
        let mut headers = HashMap::new();
        headers.insert("Location".to_string(), location);
        ProxyResponse {
            status_code,
            body: None,
            headers: Some(headers),
        }
    } else {
        ProxyResponse {
            status_code,
            body: Some(payload.to_string()),
            headers: None,
        }
    }
}

/// Shorthand for a redirect envelope.
pub fn redirect(location: String) -> ProxyResponse {
    response(301, &serde_json::Value::String(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_envelope() {
        let resp = response(400, &json!({"message": "invalid request"}));
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.body.as_deref(), Some("{\"message\":\"invalid request\"}"));
        assert!(resp.headers.is_none());
    }

    #[test]
    fn test_redirect_envelope() {
        let resp = redirect("https://a.example?success=true".to_string());
        assert_eq!(resp.status_code, 301);
        assert!(resp.body.is_none());
        assert_eq!(
            resp.headers.unwrap().get("Location").map(String::as_str),
            Some("https://a.example?success=true")
        );
    }

    #[test]
    fn test_serialized_envelope_shape() {
        let resp = response(200, &json!({"message": "it's all good"}));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["body"], "{\"message\":\"it's all good\"}");
        assert!(value.get("headers").is_none());
    }
}

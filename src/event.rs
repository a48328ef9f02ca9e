use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single `{key, value}` header entry as the edge runtime encodes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.to_string()),
            value: value.into(),
        }
    }
}

/// Headers keyed by their lowercase name.
pub type Headers = BTreeMap<String, Vec<HeaderEntry>>;

/// The outer envelope the edge runtime invokes us with.
///
/// Example:
///
/// ```json
/// {
///     "Records": [{
///         "cf": {
///             "config": { "eventType": "origin-response" },
///             "request": { "uri": "/cats/tabby_m.png", "querystring": "" },
///             "response": { "status": "200", "headers": {} }
///         }
///     }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub cf: CloudFrontEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontEvent {
    pub config: EventConfig,
    pub request: RequestRecord,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(rename = "eventType")]
    pub event_type: EventType,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    ViewerRequest,
    OriginRequest,
    OriginResponse,
    ViewerResponse,
}

/// The request half of an edge event.
///
/// Only the fields the transform reads are typed, everything else the
/// runtime sends is carried through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub uri: String,

    #[serde(default)]
    pub querystring: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestRecord {
    pub fn new(uri: &str, querystring: &str, domain_name: &str) -> Self {
        Self {
            uri: uri.to_string(),
            querystring: querystring.to_string(),
            origin: Some(Origin {
                s3: Some(S3Origin {
                    domain_name: domain_name.to_string(),
                    extra: Map::new(),
                }),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    /// The S3 origin host, e.g. `hello.s3.ap-northeast-2.amazonaws.com`.
    pub fn origin_domain(&self) -> Option<&str> {
        self.origin
            .as_ref()
            .and_then(|o| o.s3.as_ref())
            .map(|s3| s3.domain_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Origin>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Origin {
    #[serde(rename = "domainName")]
    pub domain_name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    Text,
    Base64,
}

/// The response half of an edge event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub status: String,

    #[serde(
        rename = "statusDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub status_description: Option<String>,

    #[serde(default)]
    pub headers: Headers,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(rename = "bodyEncoding", default, skip_serializing_if = "Option::is_none")]
    pub body_encoding: Option<BodyEncoding>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseRecord {
    pub fn with_status(status: u16) -> Self {
        Self {
            status: status.to_string(),
            status_description: None,
            headers: Headers::new(),
            body: None,
            body_encoding: None,
            extra: Map::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.trim() == "200"
    }
}

/// What an invocation hands back to the edge runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EdgeEventResult {
    Request(RequestRecord),
    Response(ResponseRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN_RESPONSE: &str = r#"{
        "Records": [{
            "cf": {
                "config": {
                    "distributionDomainName": "d111111abcdef8.cloudfront.net",
                    "distributionId": "EDFDVBD6EXAMPLE",
                    "eventType": "origin-response",
                    "requestId": "4TyzHTaYWb1GX1qTfsHhEqV6HUDd_BzoBZnwfnvQc_1oF26ClkoUSEQ=="
                },
                "request": {
                    "clientIp": "203.0.113.178",
                    "headers": {},
                    "method": "GET",
                    "origin": {
                        "s3": {
                            "authMethod": "none",
                            "customHeaders": {},
                            "domainName": "hello.s3.ap-northeast-2.amazonaws.com",
                            "path": ""
                        }
                    },
                    "querystring": "w=100",
                    "uri": "/path/to/file.png"
                },
                "response": {
                    "headers": {
                        "x-cache": [{ "key": "X-Cache", "value": "Miss from cloudfront" }]
                    },
                    "status": "200",
                    "statusDescription": "OK"
                }
            }
        }]
    }"#;

    #[test]
    fn test_parse_origin_response_event() {
        let event: EdgeEvent = serde_json::from_str(ORIGIN_RESPONSE).unwrap();
        let cf = &event.records[0].cf;

        assert_eq!(cf.config.event_type, EventType::OriginResponse);
        assert_eq!(cf.request.uri, "/path/to/file.png");
        assert_eq!(cf.request.querystring, "w=100");
        assert_eq!(
            cf.request.origin_domain(),
            Some("hello.s3.ap-northeast-2.amazonaws.com")
        );

        let response = cf.response.as_ref().unwrap();
        assert!(response.is_ok());
        assert_eq!(response.headers["x-cache"][0].value, "Miss from cloudfront");
    }

    #[test]
    fn test_unknown_fields_survive_a_round_trip() {
        let event: EdgeEvent = serde_json::from_str(ORIGIN_RESPONSE).unwrap();
        let request = serde_json::to_value(&event.records[0].cf.request).unwrap();

        assert_eq!(request["clientIp"], "203.0.113.178");
        assert_eq!(request["method"], "GET");
        assert_eq!(request["origin"]["s3"]["authMethod"], "none");
    }

    #[test]
    fn test_response_skips_empty_optionals() {
        let value = serde_json::to_value(ResponseRecord::with_status(404)).unwrap();
        assert_eq!(value["status"], "404");
        assert!(value.get("body").is_none());
        assert!(value.get("bodyEncoding").is_none());
    }
}

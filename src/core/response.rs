//! Response envelope decoding and error classification

use std::fmt;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::{ApiError, Result};
use crate::core::params::Charset;

/// Result code carried by every response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
    Success,
    ValidationError,
    AuthenticationError,
    ResourceNotFound,
    OperationsLimitExceeded,
    GeneralError,
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Success => write!(f, "SUCCESS"),
            ResponseCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ResponseCode::AuthenticationError => write!(f, "AUTHENTICATION_ERROR"),
            ResponseCode::ResourceNotFound => write!(f, "RESOURCE_NOT_FOUND"),
            ResponseCode::OperationsLimitExceeded => write!(f, "OPERATIONS_LIMIT_EXCEEDED"),
            ResponseCode::GeneralError => write!(f, "GENERAL_ERROR"),
        }
    }
}

/// Uniform wrapper every JSON response is returned inside
///
/// `data` stays raw here; operations decode it against their own payload
/// type in a second stage. It is expected to be absent when the code is not
/// SUCCESS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub code: ResponseCode,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Outer `{"response": {...}}` object on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeWrapper {
    pub response: Envelope,
}

fn decode_envelope(body: &[u8]) -> std::result::Result<Envelope, serde_json::Error> {
    serde_json::from_slice::<EnvelopeWrapper>(body).map(|wrapper| wrapper.response)
}

/// Inspect status and envelope before a response is trusted
///
/// Returns the envelope only for a successful response; every other
/// combination maps into the error taxonomy with the server's messages
/// preserved verbatim.
pub(crate) fn classify(status: StatusCode, body: &[u8]) -> Result<Envelope> {
    let envelope = decode_envelope(body);

    if status.is_success() {
        let envelope = envelope.map_err(|e| ApiError::MalformedResponse {
            message: format!("invalid response envelope: {}", e),
        })?;

        return match envelope.code {
            ResponseCode::Success => Ok(envelope),
            ResponseCode::OperationsLimitExceeded => Err(ApiError::OperationsLimitExceeded {
                messages: envelope.messages,
            }),
            code => Err(ApiError::ApiResponse {
                code,
                messages: envelope.messages,
            }),
        };
    }

    // Error statuses may or may not carry an envelope; keep whatever
    // messages were decodable.
    let (code, messages) = match envelope {
        Ok(envelope) => (Some(envelope.code), envelope.messages),
        Err(_) => (None, Vec::new()),
    };

    match status.as_u16() {
        401 | 403 => Err(ApiError::Authentication { messages }),
        429 => Err(ApiError::OperationsLimitExceeded { messages }),
        status => {
            if code == Some(ResponseCode::OperationsLimitExceeded) {
                Err(ApiError::OperationsLimitExceeded { messages })
            } else {
                Err(ApiError::Http {
                    status,
                    raw_body: String::from_utf8_lossy(body).into_owned(),
                    messages,
                })
            }
        }
    }
}

/// Second decode stage: the envelope's raw `data` against the operation's
/// payload type
///
/// Absent or null `data` decodes as an empty object, so payloads without
/// required fields tolerate it.
pub(crate) fn decode_data<T: DeserializeOwned>(envelope: Envelope) -> Result<T> {
    let raw = match envelope.data {
        None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
        Some(value) => value,
    };

    serde_json::from_value(raw).map_err(|e| ApiError::MalformedResponse {
        message: format!("unexpected data shape: {}", e),
    })
}

/// Decode a downloaded file body per its content-type label
///
/// UTF-16 is honored only when the label says so (BOM-sensitive, big-endian
/// without one); everything else is read as UTF-8.
pub(crate) fn decode_text(body: &[u8], content_type: Option<&str>) -> Result<String> {
    let charset = content_type.map(Charset::from_label).unwrap_or(Charset::Utf8);

    match charset {
        Charset::Utf8 => String::from_utf8(body.to_vec()).map_err(|_| {
            ApiError::MalformedResponse {
                message: "file body is not valid UTF-8".to_string(),
            }
        }),
        Charset::Utf16 => decode_utf16(body),
    }
}

fn decode_utf16(body: &[u8]) -> Result<String> {
    if body.len() % 2 != 0 {
        return Err(ApiError::MalformedResponse {
            message: "odd byte length for UTF-16 file body".to_string(),
        });
    }

    let (little_endian, payload) = match body {
        [0xFE, 0xFF, rest @ ..] => (false, rest),
        [0xFF, 0xFE, rest @ ..] => (true, rest),
        rest => (false, rest),
    };

    let units = payload.chunks_exact(2).map(|pair| {
        if little_endian {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        }
    });

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|_| ApiError::MalformedResponse {
            message: "file body is not valid UTF-16".to_string(),
        })
}

/// Result of a file upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
    pub over_written: bool,
    pub string_count: u32,
    pub word_count: u32,
}

/// One entry in a file listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListItem {
    pub file_uri: String,
    pub last_uploaded: String,
    pub file_type: String,
}

/// Files known to the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    pub total_count: u32,
    #[serde(default)]
    pub items: Vec<FileListItem>,
}

/// Translation progress counters for one locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatusItem {
    pub locale_id: String,
    pub authorized_string_count: u32,
    pub authorized_word_count: u32,
    pub completed_string_count: u32,
    pub completed_word_count: u32,
    pub excluded_string_count: u32,
    pub excluded_word_count: u32,
}

/// Translation status of a file across all locales
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub total_count: u32,
    pub total_string_count: u32,
    pub total_word_count: u32,
    #[serde(default)]
    pub items: Vec<FileStatusItem>,
}

/// Translation status of a file for a single locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLocaleStatus {
    pub file_uri: String,
    pub total_string_count: u32,
    pub total_word_count: u32,
    pub authorized_string_count: u32,
    pub authorized_word_count: u32,
    pub completed_string_count: u32,
    pub completed_word_count: u32,
    pub excluded_string_count: u32,
    pub excluded_word_count: u32,
    pub last_uploaded: String,
    pub file_type: String,
}

/// Per-locale last-modified timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastModifiedItem {
    pub locale_id: String,
    pub last_modified: String,
}

/// Last-modified timestamps of a file across locales
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLastModified {
    pub total_count: u32,
    #[serde(default)]
    pub items: Vec<LastModifiedItem>,
}

/// Locales a file is authorized for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedLocales {
    #[serde(default)]
    pub items: Vec<String>,
}

/// One rejected string from a translation import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationImportError {
    #[serde(default)]
    pub import_key: Option<String>,
    #[serde(default)]
    pub string_hashcode: Option<String>,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Result of a translation import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileImportData {
    #[serde(default)]
    pub string_count: u32,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub translation_import_errors: Vec<TranslationImportError>,
}

/// Payload of operations that return no data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyData {}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    fn wrap(code: &str, messages: Vec<&str>, data: Option<Value>) -> Vec<u8> {
        let mut response = json!({ "code": code, "messages": messages });
        if let Some(data) = data {
            response["data"] = data;
        }
        serde_json::to_vec(&json!({ "response": response })).unwrap()
    }

    #[test]
    fn test_success_decodes_payload() {
        let body = wrap(
            "SUCCESS",
            vec![],
            Some(json!({ "overWritten": false, "stringCount": 1, "wordCount": 2 })),
        );

        let envelope = classify(StatusCode::OK, &body).unwrap();
        let data: UploadData = decode_data(envelope).unwrap();
        assert_eq!(
            data,
            UploadData {
                over_written: false,
                string_count: 1,
                word_count: 2,
            }
        );
    }

    #[test]
    fn test_validation_error_without_data_is_api_response() {
        let body = wrap("VALIDATION_ERROR", vec!["fileUri is required"], None);

        let result = classify(StatusCode::OK, &body);
        match result {
            Err(ApiError::ApiResponse { code, messages }) => {
                assert_eq!(code, ResponseCode::ValidationError);
                assert_eq!(messages, vec!["fileUri is required".to_string()]);
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_401_with_authentication_code() {
        let body = wrap("AUTHENTICATION_ERROR", vec!["token expired"], None);

        let result = classify(StatusCode::UNAUTHORIZED, &body);
        match result {
            Err(ApiError::Authentication { messages }) => {
                assert_eq!(messages, vec!["token expired".to_string()]);
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_429_is_operations_limit() {
        let body = wrap("GENERAL_ERROR", vec!["slow down"], None);

        assert!(matches!(
            classify(StatusCode::TOO_MANY_REQUESTS, &body),
            Err(ApiError::OperationsLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_limit_code_outranks_status() {
        let body = wrap("OPERATIONS_LIMIT_EXCEEDED", vec!["limit reached"], None);

        assert!(matches!(
            classify(StatusCode::OK, &body),
            Err(ApiError::OperationsLimitExceeded { .. })
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, &body),
            Err(ApiError::OperationsLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_server_error_keeps_raw_body() {
        let body = b"<html>gateway timeout</html>".to_vec();

        match classify(StatusCode::BAD_GATEWAY, &body) {
            Err(ApiError::Http {
                status,
                raw_body,
                messages,
            }) => {
                assert_eq!(status, 502);
                assert_eq!(raw_body, "<html>gateway timeout</html>");
                assert!(messages.is_empty());
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_garbage_on_200_is_malformed() {
        assert!(matches!(
            classify(StatusCode::OK, b"not json"),
            Err(ApiError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_is_malformed() {
        let body = wrap("SUCCESS", vec![], Some(json!({ "overWritten": "yes" })));

        let envelope = classify(StatusCode::OK, &body).unwrap();
        assert!(matches!(
            decode_data::<UploadData>(envelope),
            Err(ApiError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_empty_data_tolerates_absence() {
        let body = wrap("SUCCESS", vec![], None);

        let envelope = classify(StatusCode::OK, &body).unwrap();
        let data: EmptyData = decode_data(envelope).unwrap();
        assert_eq!(data, EmptyData {});
    }

    #[test]
    fn test_envelope_round_trip() {
        let payload = FileList {
            total_count: 1,
            items: vec![FileListItem {
                file_uri: "strings.xml".to_string(),
                last_uploaded: "2015-07-29T10:34:30+0000".to_string(),
                file_type: "xml".to_string(),
            }],
        };

        let wrapper = EnvelopeWrapper {
            response: Envelope {
                code: ResponseCode::Success,
                messages: Vec::new(),
                data: Some(serde_json::to_value(&payload).unwrap()),
            },
        };

        let body = serde_json::to_vec(&wrapper).unwrap();
        let envelope = classify(StatusCode::OK, &body).unwrap();
        let decoded: FileList = decode_data(envelope).unwrap();
        assert_eq!(decoded, payload);
        assert_json_eq!(
            serde_json::to_value(&decoded).unwrap(),
            serde_json::to_value(&payload).unwrap()
        );
    }

    #[test]
    fn test_decode_text_utf8_default() {
        let text = decode_text("hello".as_bytes(), Some("text/plain; charset=UTF-8")).unwrap();
        assert_eq!(text, "hello");

        let text = decode_text("hello".as_bytes(), None).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_decode_text_utf16_with_bom() {
        // "hi" little-endian with BOM
        let le = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(
            decode_text(&le, Some("text/plain; charset=UTF-16")).unwrap(),
            "hi"
        );

        // "hi" big-endian with BOM
        let be = [0xFE, 0xFF, 0x00, b'h', 0x00, b'i'];
        assert_eq!(
            decode_text(&be, Some("text/plain; charset=UTF-16")).unwrap(),
            "hi"
        );
    }

    #[test]
    fn test_decode_text_utf16_defaults_to_big_endian() {
        let be = [0x00, b'h', 0x00, b'i'];
        assert_eq!(decode_text(&be, Some("UTF-16")).unwrap(), "hi");
    }

    #[test]
    fn test_decode_text_rejects_odd_utf16() {
        assert!(matches!(
            decode_text(&[0x00, b'h', 0x00], Some("UTF-16")),
            Err(ApiError::MalformedResponse { .. })
        ));
    }
}

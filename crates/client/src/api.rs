//! Wire types for the Nolej REST API.
//!
//! Field names follow the remote service's camelCase JSON exactly.

use serde::{Deserialize, Serialize};

/// Body of `POST /documents`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDocumentRequest {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "organisationID")]
    pub organisation_id: String,
    pub title: String,
    #[serde(rename = "decrementedCredit")]
    pub decremented_credit: i64,
    #[serde(rename = "docURL")]
    pub doc_url: String,
    #[serde(rename = "webhookURL")]
    pub webhook_url: String,
    #[serde(rename = "mediaType")]
    pub media_type: String,
    #[serde(rename = "automaticMode")]
    pub automatic_mode: bool,
    pub language: String,
}

/// Body of `POST /documents` responses.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
}

/// Body of `GET /documents/{id}/transcription` responses: the title the
/// service inferred plus a URL the transcription text can be fetched
/// from.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResult {
    pub title: String,
    pub result: String,
}

/// Body of `PUT /documents/{id}/transcription`: where the reviewed
/// transcription is hosted and whether the rest of the pipeline should
/// run unattended.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisStart {
    #[serde(rename = "s3URL")]
    pub s3_url: String,
    #[serde(rename = "automaticMode")]
    pub automatic_mode: bool,
}

/// Generic `{"result": "..."}` acknowledgement body.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultAck {
    #[serde(default)]
    pub result: Option<String>,
}

/// One generated artifact from `GET /documents/{id}/activities?format=h5p`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub activity_name: String,
    pub url: String,
}

/// Body of `GET /documents/{id}/activities?format=h5p` responses.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageList {
    pub activities: Vec<PackageDescriptor>,
}

/// The service sometimes double-encodes its "ok" acknowledgement.
pub fn is_ok_result(result: &str) -> bool {
    result == "ok" || result == "\"ok\""
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_ack_tolerates_double_encoding() {
        assert!(is_ok_result("ok"));
        assert!(is_ok_result("\"ok\""));
        assert!(!is_ok_result("ko"));
        assert!(!is_ok_result(""));
    }

    #[test]
    fn create_request_uses_the_service_field_names() {
        let req = CreateDocumentRequest {
            user_id: 7,
            organisation_id: "Acme".to_string(),
            title: "Photosynthesis".to_string(),
            decremented_credit: 1,
            doc_url: "https://files.example.org/photosynthesis.pdf".to_string(),
            webhook_url: "https://lms.example.org/webhooks/nolej".to_string(),
            media_type: "document".to_string(),
            automatic_mode: false,
            language: "en".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["userID"], 7);
        assert_eq!(json["docURL"], "https://files.example.org/photosynthesis.pdf");
        assert_eq!(json["mediaType"], "document");
        assert_eq!(json["automaticMode"], false);
    }
}

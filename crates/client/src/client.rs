//! Trait seam and reqwest implementation for the Nolej REST API.

use async_trait::async_trait;

use crate::api::{
    is_ok_result, AnalysisStart, CreateDocumentRequest, CreateDocumentResponse, PackageDescriptor,
    PackageList, ResultAck, TranscriptionResult,
};

/// Errors from outbound Nolej calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service replied, but with an error shape or unexpected body.
    #[error("Nolej API error: {0}")]
    Api(String),
}

/// Operations the backend performs against the Nolej service.
///
/// The webhook ingestor, the document handlers, and the package
/// importer all take `&dyn NolejApi` so tests can substitute a stub.
#[async_trait]
pub trait NolejApi: Send + Sync {
    /// `POST /documents` — start transcription of a new source.
    /// Returns the document id issued by the service.
    async fn create_document(&self, req: &CreateDocumentRequest) -> Result<String, ClientError>;

    /// `GET /documents/{id}/transcription` — where to fetch the
    /// transcription text, plus the inferred title.
    async fn get_transcription(&self, document_id: &str)
        -> Result<TranscriptionResult, ClientError>;

    /// `PUT /documents/{id}/transcription` — submit the (possibly
    /// reviewed) transcription and start analysis.
    async fn start_analysis(
        &self,
        document_id: &str,
        req: &AnalysisStart,
    ) -> Result<(), ClientError>;

    /// `GET /documents/{id}/{resource}` — raw settings / concepts /
    /// questions / summary content.
    async fn get_resource(&self, document_id: &str, resource: &str)
        -> Result<Vec<u8>, ClientError>;

    /// `PUT /documents/{id}/{resource}` — push edited resource content.
    async fn put_resource(
        &self,
        document_id: &str,
        resource: &str,
        content: &[u8],
    ) -> Result<(), ClientError>;

    /// `GET /documents/{id}/activities?format=h5p` — descriptors of
    /// the generated packages.
    async fn list_packages(&self, document_id: &str)
        -> Result<Vec<PackageDescriptor>, ClientError>;

    /// `GET /documents/{id}/lastwebhook` — the most recent callback
    /// payload, for recovery when a delivery was lost.
    async fn last_webhook(&self, document_id: &str) -> Result<serde_json::Value, ClientError>;

    /// Fetch an artifact from an absolute URL handed out by the
    /// service (transcription text, package files).
    async fn download(&self, url: &str) -> Result<Vec<u8>, ClientError>;
}

/// Production implementation over HTTPS.
pub struct HttpNolejClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpNolejClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("X-API-KEY {}", self.api_key))
            .header("User-Agent", "Nolej Integration Backend")
    }
}

#[async_trait]
impl NolejApi for HttpNolejClient {
    async fn create_document(&self, req: &CreateDocumentRequest) -> Result<String, ClientError> {
        let response: CreateDocumentResponse = self
            .request(reqwest::Method::POST, "/documents")
            .json(req)
            .send()
            .await?
            .json()
            .await?;

        match response.id {
            Some(id) => Ok(id),
            None => Err(ClientError::Api(
                response
                    .error_message
                    .unwrap_or_else(|| "document creation returned no id".to_string()),
            )),
        }
    }

    async fn get_transcription(
        &self,
        document_id: &str,
    ) -> Result<TranscriptionResult, ClientError> {
        let path = format!("/documents/{document_id}/transcription");
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        response
            .json::<TranscriptionResult>()
            .await
            .map_err(|e| ClientError::Api(format!("unexpected transcription body: {e}")))
    }

    async fn start_analysis(
        &self,
        document_id: &str,
        req: &AnalysisStart,
    ) -> Result<(), ClientError> {
        let path = format!("/documents/{document_id}/transcription");
        let ack: ResultAck = self
            .request(reqwest::Method::PUT, &path)
            .json(req)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Api(format!("unexpected analysis ack: {e}")))?;

        match ack.result.as_deref() {
            Some(result) if is_ok_result(result) => Ok(()),
            other => Err(ClientError::Api(format!(
                "analysis start rejected: {other:?}"
            ))),
        }
    }

    async fn get_resource(
        &self,
        document_id: &str,
        resource: &str,
    ) -> Result<Vec<u8>, ClientError> {
        let path = format!("/documents/{document_id}/{resource}");
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Api(format!(
                "fetching {resource} failed with status {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn put_resource(
        &self,
        document_id: &str,
        resource: &str,
        content: &[u8],
    ) -> Result<(), ClientError> {
        let path = format!("/documents/{document_id}/{resource}");
        let response = self
            .request(reqwest::Method::PUT, &path)
            .header("Content-Type", "application/json")
            .body(content.to_vec())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Api(format!(
                "updating {resource} failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn list_packages(
        &self,
        document_id: &str,
    ) -> Result<Vec<PackageDescriptor>, ClientError> {
        let path = format!("/documents/{document_id}/activities?format=h5p");
        let list: PackageList = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Api(format!("unexpected activities body: {e}")))?;
        Ok(list.activities)
    }

    async fn last_webhook(&self, document_id: &str) -> Result<serde_json::Value, ClientError> {
        let path = format!("/documents/{document_id}/lastwebhook");
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Api(format!("unexpected lastwebhook body: {e}")))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Api(format!(
                "download of {url} failed with status {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

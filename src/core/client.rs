//! Files API client facade

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::core::auth::{AuthenticationData, TokenContext};
use crate::core::config::ConnectionConfig;
use crate::core::errors::Result;
use crate::core::params::{
    self, FileImportParams, FileListParams, FileUploadParams, GetFileParams, LastModifiedParams,
    RequestSpec,
};
use crate::core::response::{
    self, AuthorizedLocales, EmptyData, FileImportData, FileLastModified, FileList,
    FileLocaleStatus, FileStatus, UploadData,
};
use crate::core::transport::Dispatcher;

/// Client for the Smartling Files and Authentication APIs
///
/// One method per operation. Each call validates its parameters, attaches
/// the caller's token snapshot, dispatches, classifies the response, and
/// decodes the payload. The client holds no token state of its own: callers
/// check [`TokenContext::is_access_token_valid`] and re-authenticate when
/// needed, swapping in the fresh context atomically.
#[derive(Debug, Clone)]
pub struct FilesApiClient {
    config: Arc<ConnectionConfig>,
    dispatcher: Dispatcher,
}

impl FilesApiClient {
    /// Create a new client
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let dispatcher = Dispatcher::new(&config)?;

        Ok(Self {
            config: Arc::new(config),
            dispatcher,
        })
    }

    fn files_root(&self) -> String {
        self.config.files_api_root()
    }

    /// Dispatch, classify, and decode one enveloped call
    async fn call<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
        token: Option<&TokenContext>,
    ) -> Result<T> {
        let raw = self.dispatcher.execute(spec, token).await?;

        match response::classify(raw.status, &raw.body) {
            Ok(envelope) => response::decode_data(envelope),
            Err(e) => {
                warn!("API call failed: {}", e);
                Err(e)
            }
        }
    }

    /// Dispatch a download; success bodies are raw text, error bodies are
    /// enveloped
    async fn download(&self, spec: RequestSpec, token: &TokenContext) -> Result<String> {
        let raw = self.dispatcher.execute(spec, Some(token)).await?;

        if !raw.status.is_success() {
            response::classify(raw.status, &raw.body)?;
        }

        response::decode_text(&raw.body, raw.content_type.as_deref())
    }

    /// Exchange user credentials for a fresh token context
    pub async fn authenticate(
        &self,
        user_identifier: &str,
        user_secret: &str,
    ) -> Result<TokenContext> {
        let spec = params::authenticate(&self.config.auth_api_root(), user_identifier, user_secret)?;
        let data: AuthenticationData = self.call(spec, None).await?;

        debug!("authenticated, access token valid for {}s", data.expires_in);
        Ok(TokenContext::from_data(data, Utc::now().timestamp_millis()))
    }

    /// Trade a refresh token for a replacement token context
    pub async fn refresh_authentication(&self, refresh_token: &str) -> Result<TokenContext> {
        let spec = params::refresh_authentication(&self.config.auth_api_root(), refresh_token)?;
        let data: AuthenticationData = self.call(spec, None).await?;

        Ok(TokenContext::from_data(data, Utc::now().timestamp_millis()))
    }

    /// Upload a file for translation
    ///
    /// `content` is the file body as bytes; opening and closing any source
    /// file is the caller's responsibility. `encoding` is the text-encoding
    /// label forwarded to the server.
    pub async fn upload_file(
        &self,
        token: &TokenContext,
        content: Vec<u8>,
        encoding: &str,
        upload_params: &FileUploadParams,
    ) -> Result<UploadData> {
        let spec = upload_params.build(&self.files_root(), content, encoding)?;
        self.call(spec, Some(token)).await
    }

    /// Download the translated rendition of a file for one locale
    pub async fn get_file(
        &self,
        token: &TokenContext,
        locale: &str,
        file_params: &GetFileParams,
    ) -> Result<String> {
        let spec = file_params.build(&self.files_root(), locale)?;
        self.download(spec, token).await
    }

    /// Download the original uploaded file
    pub async fn get_original_file(
        &self,
        token: &TokenContext,
        file_params: &GetFileParams,
    ) -> Result<String> {
        let spec = file_params.build_original(&self.files_root())?;
        self.download(spec, token).await
    }

    /// List files known to the project
    pub async fn list_files(
        &self,
        token: &TokenContext,
        list_params: &FileListParams,
    ) -> Result<FileList> {
        let spec = list_params.build(&self.files_root())?;
        self.call(spec, Some(token)).await
    }

    /// Translation status of a file across all locales
    pub async fn get_file_status(
        &self,
        token: &TokenContext,
        file_uri: &str,
    ) -> Result<FileStatus> {
        let spec = params::file_status(&self.files_root(), file_uri)?;
        self.call(spec, Some(token)).await
    }

    /// Translation status of a file for a single locale
    pub async fn get_file_locale_status(
        &self,
        token: &TokenContext,
        locale: &str,
        file_uri: &str,
    ) -> Result<FileLocaleStatus> {
        let spec = params::file_locale_status(&self.files_root(), locale, file_uri)?;
        self.call(spec, Some(token)).await
    }

    /// Delete a file from the project
    pub async fn delete_file(&self, token: &TokenContext, file_uri: &str) -> Result<EmptyData> {
        let spec = params::delete_file(&self.files_root(), file_uri)?;
        self.call(spec, Some(token)).await
    }

    /// Rename a file
    pub async fn rename_file(
        &self,
        token: &TokenContext,
        file_uri: &str,
        new_file_uri: &str,
    ) -> Result<EmptyData> {
        let spec = params::rename_file(&self.files_root(), file_uri, new_file_uri)?;
        self.call(spec, Some(token)).await
    }

    /// Per-locale last-modified timestamps of a file
    pub async fn get_last_modified(
        &self,
        token: &TokenContext,
        modified_params: &LastModifiedParams,
    ) -> Result<FileLastModified> {
        let spec = modified_params.build(&self.files_root())?;
        self.call(spec, Some(token)).await
    }

    /// Import previously translated content for one locale
    pub async fn import_translations(
        &self,
        token: &TokenContext,
        locale: &str,
        content: Vec<u8>,
        encoding: &str,
        import_params: &FileImportParams,
    ) -> Result<FileImportData> {
        let spec = import_params.build(&self.files_root(), locale, content, encoding)?;
        self.call(spec, Some(token)).await
    }

    /// Locales a file is currently authorized for
    pub async fn get_authorized_locales(
        &self,
        token: &TokenContext,
        file_uri: &str,
    ) -> Result<AuthorizedLocales> {
        let spec = params::authorized_locales(&self.files_root(), file_uri)?;
        self.call(spec, Some(token)).await
    }

    /// Authorize a file for the given locales
    pub async fn authorize_locales(
        &self,
        token: &TokenContext,
        file_uri: &str,
        locale_ids: &[String],
    ) -> Result<EmptyData> {
        let spec = params::authorize_locales(&self.files_root(), file_uri, locale_ids)?;
        self.call(spec, Some(token)).await
    }

    /// Remove locale authorization from a file
    pub async fn unauthorize_locales(
        &self,
        token: &TokenContext,
        file_uri: &str,
        locale_ids: &[String],
    ) -> Result<EmptyData> {
        let spec = params::unauthorize_locales(&self.files_root(), file_uri, locale_ids)?;
        self.call(spec, Some(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ApiError;

    #[tokio::test]
    async fn test_client_creation() {
        let config = ConnectionConfig::new("https://api.smartling.com", "testProject");
        let client = FilesApiClient::new(config);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_client_rejects_empty_project() {
        let config = ConnectionConfig::new("https://api.smartling.com", "");
        assert!(matches!(
            FilesApiClient::new(config),
            Err(ApiError::InvalidParameter { name }) if name == "project_id"
        ));
    }
}

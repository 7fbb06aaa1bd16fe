//! Request construction: parameter assembly, URL composition, bodies

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, Url};
use serde_json::json;

use crate::core::errors::{ApiError, Result};

/// Ordered query/form parameter list
///
/// Absent optionals are never serialized; insertion order is preserved in
/// the output. Array-valued parameters emit one `name[]=value` pair per
/// element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamList(Vec<(String, String)>);

impl ParamList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a parameter
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        self.0.push((name.to_string(), value.into()));
    }

    /// Append a parameter only when a value is present
    pub fn add_opt(&mut self, name: &str, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.0.push((name.to_string(), value.to_string()));
        }
    }

    /// Append one `name[]=value` pair per element, in order
    pub fn add_array(&mut self, name: &str, values: &[String]) {
        for value in values {
            self.0.push((format!("{}[]", name), value.clone()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Text encoding of an uploaded or downloaded file body
///
/// Chosen by case-insensitive substring match on the encoding label, never
/// by inspecting the bytes. Anything that does not mention UTF-16 is UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Utf16,
}

impl Charset {
    /// Pick the charset for an encoding or content-type label
    pub fn from_label(label: &str) -> Self {
        if label.to_uppercase().contains("UTF-16") {
            Charset::Utf16
        } else {
            Charset::Utf8
        }
    }

    /// Mime string for the multipart file part
    pub fn mime(&self) -> &'static str {
        match self {
            Charset::Utf8 => "text/plain; charset=UTF-8",
            Charset::Utf16 => "text/plain; charset=UTF-16",
        }
    }
}

/// File content attached to an upload or import request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Name reported for the single `file` part
    pub file_name: String,
    pub content: Vec<u8>,
    pub charset: Charset,
    /// Text fields sent alongside the file part
    pub fields: ParamList,
}

/// Body of an outbound request
#[derive(Debug, Clone)]
pub enum RequestBody {
    None,
    Json(serde_json::Value),
    FileUpload(FileUpload),
}

/// Fully assembled description of one outbound call, discarded after
/// dispatch
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
}

impl RequestSpec {
    fn new(method: Method, url: Url, body: RequestBody) -> Self {
        Self { method, url, body }
    }
}

/// File type identifiers accepted by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Android,
    Ios,
    Gettext,
    Html,
    JavaProperties,
    Yaml,
    Xliff,
    Xml,
    Json,
    Csv,
    PlainText,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Android => "android",
            FileType::Ios => "ios",
            FileType::Gettext => "gettext",
            FileType::Html => "html",
            FileType::JavaProperties => "javaProperties",
            FileType::Yaml => "yaml",
            FileType::Xliff => "xliff",
            FileType::Xml => "xml",
            FileType::Json => "json",
            FileType::Csv => "csv",
            FileType::PlainText => "plainText",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which rendition of a file a download should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalType {
    Pending,
    Published,
    Pseudo,
}

impl fmt::Display for RetrievalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalType::Pending => write!(f, "pending"),
            RetrievalType::Published => write!(f, "published"),
            RetrievalType::Pseudo => write!(f, "pseudo"),
        }
    }
}

/// Workflow state applied to imported translations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationState {
    PostTranslation,
    Published,
}

impl fmt::Display for TranslationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationState::PostTranslation => write!(f, "POST_TRANSLATION"),
            TranslationState::Published => write!(f, "PUBLISHED"),
        }
    }
}

fn require(value: &str, name: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ApiError::InvalidParameter {
            name: name.to_string(),
        });
    }

    Ok(())
}

fn compose_url(path: String, params: &ParamList) -> Result<Url> {
    let mut url = Url::parse(&path).map_err(|_| ApiError::InvalidParameter {
        name: "base_url".to_string(),
    })?;

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in params.iter() {
            pairs.append_pair(name, value);
        }
    }

    Ok(url)
}

fn rfc3339(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|v| v.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Parameters for uploading a file
#[derive(Debug, Clone)]
pub struct FileUploadParams {
    file_uri: String,
    file_type: Option<FileType>,
    approve_content: Option<bool>,
    callback_url: Option<String>,
    locales_to_approve: Vec<String>,
    overwrite_approved_locales: Option<bool>,
}

impl FileUploadParams {
    pub fn new(file_uri: impl Into<String>) -> Self {
        Self {
            file_uri: file_uri.into(),
            file_type: None,
            approve_content: None,
            callback_url: None,
            locales_to_approve: Vec::new(),
            overwrite_approved_locales: None,
        }
    }

    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    pub fn approve_content(mut self, approve: bool) -> Self {
        self.approve_content = Some(approve);
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn locales_to_approve(mut self, locales: Vec<String>) -> Self {
        self.locales_to_approve = locales;
        self
    }

    pub fn overwrite_approved_locales(mut self, overwrite: bool) -> Self {
        self.overwrite_approved_locales = Some(overwrite);
        self
    }

    pub(crate) fn build(
        &self,
        files_root: &str,
        content: Vec<u8>,
        encoding: &str,
    ) -> Result<RequestSpec> {
        require(&self.file_uri, "fileUri")?;

        let mut fields = ParamList::new();
        fields.add("fileUri", self.file_uri.clone());
        fields.add_opt("fileType", self.file_type);
        fields.add_opt("approveContent", self.approve_content);
        fields.add_opt("callbackUrl", self.callback_url.clone());
        fields.add_array("localesToApprove", &self.locales_to_approve);
        fields.add_opt("overwriteApprovedLocales", self.overwrite_approved_locales);

        let url = compose_url(format!("{}/file", files_root), &ParamList::new())?;
        let upload = FileUpload {
            file_name: self.file_uri.clone(),
            content,
            charset: Charset::from_label(encoding),
            fields,
        };

        Ok(RequestSpec::new(Method::POST, url, RequestBody::FileUpload(upload)))
    }
}

/// Parameters for downloading a translated or original file
#[derive(Debug, Clone)]
pub struct GetFileParams {
    file_uri: String,
    retrieval_type: Option<RetrievalType>,
    include_original_strings: Option<bool>,
}

impl GetFileParams {
    pub fn new(file_uri: impl Into<String>) -> Self {
        Self {
            file_uri: file_uri.into(),
            retrieval_type: None,
            include_original_strings: None,
        }
    }

    pub fn with_retrieval_type(mut self, retrieval_type: RetrievalType) -> Self {
        self.retrieval_type = Some(retrieval_type);
        self
    }

    pub fn include_original_strings(mut self, include: bool) -> Self {
        self.include_original_strings = Some(include);
        self
    }

    fn query(&self) -> Result<ParamList> {
        require(&self.file_uri, "fileUri")?;

        let mut params = ParamList::new();
        params.add("fileUri", self.file_uri.clone());
        params.add_opt("retrievalType", self.retrieval_type);
        params.add_opt("includeOriginalStrings", self.include_original_strings);

        Ok(params)
    }

    /// Download of the translated rendition for one locale
    pub(crate) fn build(&self, files_root: &str, locale: &str) -> Result<RequestSpec> {
        require(locale, "locale")?;

        let url = compose_url(
            format!("{}/locales/{}/file", files_root, locale),
            &self.query()?,
        )?;

        Ok(RequestSpec::new(Method::GET, url, RequestBody::None))
    }

    /// Download of the original uploaded file
    pub(crate) fn build_original(&self, files_root: &str) -> Result<RequestSpec> {
        let url = compose_url(format!("{}/file", files_root), &self.query()?)?;
        Ok(RequestSpec::new(Method::GET, url, RequestBody::None))
    }
}

/// Search parameters for listing files; every field is optional
#[derive(Debug, Clone, Default)]
pub struct FileListParams {
    locale_ids: Vec<String>,
    uri_mask: Option<String>,
    file_types: Vec<FileType>,
    last_uploaded_after: Option<DateTime<Utc>>,
    last_uploaded_before: Option<DateTime<Utc>>,
    offset: Option<u32>,
    limit: Option<u32>,
}

impl FileListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale_ids(mut self, locale_ids: Vec<String>) -> Self {
        self.locale_ids = locale_ids;
        self
    }

    pub fn with_uri_mask(mut self, uri_mask: impl Into<String>) -> Self {
        self.uri_mask = Some(uri_mask.into());
        self
    }

    pub fn with_file_types(mut self, file_types: Vec<FileType>) -> Self {
        self.file_types = file_types;
        self
    }

    pub fn uploaded_after(mut self, after: DateTime<Utc>) -> Self {
        self.last_uploaded_after = Some(after);
        self
    }

    pub fn uploaded_before(mut self, before: DateTime<Utc>) -> Self {
        self.last_uploaded_before = Some(before);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn build(&self, files_root: &str) -> Result<RequestSpec> {
        let mut params = ParamList::new();
        params.add_array("localeIds", &self.locale_ids);
        params.add_opt("uriMask", self.uri_mask.clone());
        let file_types: Vec<String> =
            self.file_types.iter().map(|t| t.as_str().to_string()).collect();
        params.add_array("fileTypes", &file_types);
        params.add_opt("lastUploadedAfter", rfc3339(self.last_uploaded_after));
        params.add_opt("lastUploadedBefore", rfc3339(self.last_uploaded_before));
        params.add_opt("offset", self.offset);
        params.add_opt("limit", self.limit);

        let url = compose_url(format!("{}/files/list", files_root), &params)?;
        Ok(RequestSpec::new(Method::GET, url, RequestBody::None))
    }
}

/// Parameters for importing pre-existing translations
#[derive(Debug, Clone)]
pub struct FileImportParams {
    file_uri: String,
    file_type: FileType,
    translation_state: Option<TranslationState>,
    overwrite: Option<bool>,
}

impl FileImportParams {
    pub fn new(file_uri: impl Into<String>, file_type: FileType) -> Self {
        Self {
            file_uri: file_uri.into(),
            file_type,
            translation_state: None,
            overwrite: None,
        }
    }

    pub fn with_translation_state(mut self, state: TranslationState) -> Self {
        self.translation_state = Some(state);
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    pub(crate) fn build(
        &self,
        files_root: &str,
        locale: &str,
        content: Vec<u8>,
        encoding: &str,
    ) -> Result<RequestSpec> {
        require(&self.file_uri, "fileUri")?;
        require(locale, "locale")?;

        let mut fields = ParamList::new();
        fields.add("fileUri", self.file_uri.clone());
        fields.add("fileType", self.file_type.as_str());
        fields.add_opt("translationState", self.translation_state);
        fields.add_opt("overwrite", self.overwrite);

        let url = compose_url(
            format!("{}/locales/{}/file/import", files_root, locale),
            &ParamList::new(),
        )?;
        let upload = FileUpload {
            file_name: self.file_uri.clone(),
            content,
            charset: Charset::from_label(encoding),
            fields,
        };

        Ok(RequestSpec::new(Method::POST, url, RequestBody::FileUpload(upload)))
    }
}

/// Parameters for querying per-locale last-modified timestamps
#[derive(Debug, Clone)]
pub struct LastModifiedParams {
    file_uri: String,
    last_modified_after: Option<DateTime<Utc>>,
}

impl LastModifiedParams {
    pub fn new(file_uri: impl Into<String>) -> Self {
        Self {
            file_uri: file_uri.into(),
            last_modified_after: None,
        }
    }

    pub fn modified_after(mut self, after: DateTime<Utc>) -> Self {
        self.last_modified_after = Some(after);
        self
    }

    pub(crate) fn build(&self, files_root: &str) -> Result<RequestSpec> {
        require(&self.file_uri, "fileUri")?;

        let mut params = ParamList::new();
        params.add("fileUri", self.file_uri.clone());
        params.add_opt("lastModifiedAfter", rfc3339(self.last_modified_after));

        let url = compose_url(format!("{}/file/last_modified", files_root), &params)?;
        Ok(RequestSpec::new(Method::GET, url, RequestBody::None))
    }
}

/// Status of a file across all locales
pub(crate) fn file_status(files_root: &str, file_uri: &str) -> Result<RequestSpec> {
    require(file_uri, "fileUri")?;

    let mut params = ParamList::new();
    params.add("fileUri", file_uri);

    let url = compose_url(format!("{}/file/status", files_root), &params)?;
    Ok(RequestSpec::new(Method::GET, url, RequestBody::None))
}

/// Status of a file for a single locale
pub(crate) fn file_locale_status(
    files_root: &str,
    locale: &str,
    file_uri: &str,
) -> Result<RequestSpec> {
    require(locale, "locale")?;
    require(file_uri, "fileUri")?;

    let mut params = ParamList::new();
    params.add("fileUri", file_uri);

    let url = compose_url(
        format!("{}/locales/{}/file/status", files_root, locale),
        &params,
    )?;
    Ok(RequestSpec::new(Method::GET, url, RequestBody::None))
}

pub(crate) fn delete_file(files_root: &str, file_uri: &str) -> Result<RequestSpec> {
    require(file_uri, "fileUri")?;

    let url = compose_url(format!("{}/file/delete", files_root), &ParamList::new())?;
    let body = RequestBody::Json(json!({ "fileUri": file_uri }));
    Ok(RequestSpec::new(Method::POST, url, body))
}

pub(crate) fn rename_file(
    files_root: &str,
    file_uri: &str,
    new_file_uri: &str,
) -> Result<RequestSpec> {
    require(file_uri, "fileUri")?;
    require(new_file_uri, "newFileUri")?;

    let url = compose_url(format!("{}/file/rename", files_root), &ParamList::new())?;
    let body = RequestBody::Json(json!({
        "fileUri": file_uri,
        "newFileUri": new_file_uri,
    }));
    Ok(RequestSpec::new(Method::POST, url, body))
}

/// Locales a file is currently authorized for
pub(crate) fn authorized_locales(files_root: &str, file_uri: &str) -> Result<RequestSpec> {
    require(file_uri, "fileUri")?;

    let mut params = ParamList::new();
    params.add("fileUri", file_uri);

    let url = compose_url(format!("{}/file/authorized_locales", files_root), &params)?;
    Ok(RequestSpec::new(Method::GET, url, RequestBody::None))
}

pub(crate) fn authorize_locales(
    files_root: &str,
    file_uri: &str,
    locale_ids: &[String],
) -> Result<RequestSpec> {
    require(file_uri, "fileUri")?;
    if locale_ids.is_empty() {
        return Err(ApiError::InvalidParameter {
            name: "localeIds".to_string(),
        });
    }

    let url = compose_url(
        format!("{}/file/authorized_locales", files_root),
        &ParamList::new(),
    )?;
    let body = RequestBody::Json(json!({
        "fileUri": file_uri,
        "localeIds": locale_ids,
    }));
    Ok(RequestSpec::new(Method::POST, url, body))
}

pub(crate) fn unauthorize_locales(
    files_root: &str,
    file_uri: &str,
    locale_ids: &[String],
) -> Result<RequestSpec> {
    require(file_uri, "fileUri")?;
    if locale_ids.is_empty() {
        return Err(ApiError::InvalidParameter {
            name: "localeIds".to_string(),
        });
    }

    let mut params = ParamList::new();
    params.add("fileUri", file_uri);
    params.add_array("localeIds", locale_ids);

    let url = compose_url(format!("{}/file/authorized_locales", files_root), &params)?;
    Ok(RequestSpec::new(Method::DELETE, url, RequestBody::None))
}

/// Authentication request against the auth API
pub(crate) fn authenticate(
    auth_root: &str,
    user_identifier: &str,
    user_secret: &str,
) -> Result<RequestSpec> {
    require(user_identifier, "userIdentifier")?;
    require(user_secret, "userSecret")?;

    let url = compose_url(format!("{}/authenticate", auth_root), &ParamList::new())?;
    let body = RequestBody::Json(json!({
        "userIdentifier": user_identifier,
        "userSecret": user_secret,
    }));
    Ok(RequestSpec::new(Method::POST, url, body))
}

/// Token refresh against the auth API
pub(crate) fn refresh_authentication(auth_root: &str, refresh_token: &str) -> Result<RequestSpec> {
    require(refresh_token, "refreshToken")?;

    let url = compose_url(
        format!("{}/authenticate/refresh", auth_root),
        &ParamList::new(),
    )?;
    let body = RequestBody::Json(json!({ "refreshToken": refresh_token }));
    Ok(RequestSpec::new(Method::POST, url, body))
}

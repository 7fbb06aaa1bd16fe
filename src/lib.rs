//! Smartling Files API client - Rust client library
//!
//! This library talks to the Smartling translation-management service over
//! HTTP: authentication and token lifecycle, file upload/download, listing,
//! status, import, and locale authorization, with typed results and a
//! classified error taxonomy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod core;

// Re-export key types for convenience
pub use crate::core::{
    auth::{AuthenticationData, TokenContext, REFRESH_MARGIN_MS},
    client::FilesApiClient,
    config::{ConnectionConfig, ProxyConfiguration, DEFAULT_BASE_URL},
    errors::{ApiError, Result},
    params::{
        Charset, FileImportParams, FileListParams, FileType, FileUpload, FileUploadParams,
        GetFileParams, LastModifiedParams, ParamList, RequestBody, RequestSpec, RetrievalType,
        TranslationState,
    },
    response::{
        AuthorizedLocales, EmptyData, Envelope, EnvelopeWrapper, FileImportData, FileLastModified,
        FileList, FileListItem, FileLocaleStatus, FileStatus, FileStatusItem, LastModifiedItem,
        ResponseCode, TranslationImportError, UploadData,
    },
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

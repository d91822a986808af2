//! HTTP error mapping
//!
//! Every failure leaves the server as `{ "error": <message> }` with an
//! optional `details` field holding the underlying error text. Messages are
//! the Portuguese strings the admin panel shows; `details` is only attached
//! when `expose_error_details` is configured.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use icevan_assets::AssetError;
use serde::Serialize;
use tracing::{error, warn};

/// Request-level error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid request parameters: {0}")]
    InvalidParameters(String),

    #[error("unsupported video format: '{0}'")]
    UnsupportedVideo(String),

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Asset(e) if e.is_rejection() => StatusCode::BAD_REQUEST,
            Self::Asset(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Asset(e) if e.is_conflict() => StatusCode::CONFLICT,
            Self::Asset(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingField(_) | Self::InvalidParameters(_) | Self::UnsupportedVideo(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Multipart(e) => e.status(),
        }
    }

    /// Message shown to the admin panel
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Asset(e) => match e {
                AssetError::InvalidFolder(_) => "Pasta não permitida",
                AssetError::UnsupportedFormat(_) => "Formato de arquivo não permitido",
                AssetError::InvalidFilename(_) => "Nome de arquivo inválido",
                AssetError::InvalidSlug(_) => "Parâmetros inválidos",
                AssetError::UnknownApplication(_) => "Aplicação não encontrada",
                AssetError::NotFound { .. } => "Arquivo não encontrado",
                AssetError::NameTaken { .. } => "Já existe um arquivo com esse nome",
                AssetError::ReadFailure { .. } => "Erro ao listar arquivos",
                AssetError::WriteFailure { .. } => "Erro no upload",
                AssetError::DeleteFailure { .. } => "Arquivo não pode ser deletado",
                AssetError::RenameFailure { .. } => "Erro ao renomear arquivo",
            },
            Self::MissingField("file" | "folder") => "Arquivo e pasta são obrigatórios",
            Self::MissingField(_) | Self::InvalidParameters(_) => "Parâmetros inválidos",
            Self::UnsupportedVideo(_) => "Formato não permitido. Use MP4, WebM, MOV ou AVI.",
            Self::Multipart(_) => "Erro no upload",
        }
    }

    /// Stable machine-readable kind, used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Asset(e) => e.kind(),
            Self::MissingField(_) => "missing_field",
            Self::InvalidParameters(_) => "invalid_parameters",
            Self::UnsupportedVideo(_) => "unsupported_video",
            Self::Multipart(_) => "multipart",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// An [`ApiError`] bound to the detail-exposure setting
#[derive(Debug)]
pub struct Failure {
    pub error: ApiError,
    pub expose_details: bool,
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            error!(kind = self.error.kind(), error = %self.error, "Request failed");
        } else {
            warn!(kind = self.error.kind(), error = %self.error, "Request rejected");
        }

        let body = ErrorBody {
            error: self.error.public_message(),
            details: self.expose_details.then(|| self.error.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn rejections_are_bad_requests() {
        let err = ApiError::from(AssetError::InvalidFolder("../../etc".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Pasta não permitida");

        let err = ApiError::from(AssetError::UnsupportedFormat("virus.exe".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Formato de arquivo não permitido");
    }

    #[test]
    fn io_failures_are_server_errors() {
        let err = ApiError::from(AssetError::write_failure(
            "images/hero/01-a.jpg",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Erro no upload");
    }

    #[test]
    fn missing_things_are_not_found() {
        let err = ApiError::from(AssetError::UnknownApplication("kombi".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn taken_name_is_a_conflict() {
        let err = ApiError::from(AssetError::NameTaken {
            folder: "images/hero".into(),
            filename: "03-x.jpg".into(),
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.public_message(), "Já existe um arquivo com esse nome");
    }

    #[test]
    fn video_rejection_names_accepted_formats() {
        let err = ApiError::UnsupportedVideo("filme.mkv".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.public_message(),
            "Formato não permitido. Use MP4, WebM, MOV ou AVI."
        );
    }

    #[test]
    fn missing_upload_fields_share_message() {
        assert_eq!(
            ApiError::MissingField("folder").public_message(),
            "Arquivo e pasta são obrigatórios"
        );
        assert_eq!(
            ApiError::MissingField("target").public_message(),
            "Parâmetros inválidos"
        );
    }
}

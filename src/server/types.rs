use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::nlp::NlpError;

/// Request body for POST /api/sentimento.
///
/// Fields are optional so a missing field reaches the handler and gets the
/// API's own 400 message instead of a serde rejection.
#[derive(Deserialize)]
pub struct SentimentoRequest {
    pub texto: Option<String>,
}

/// Request body for POST /api/gerar.
///
/// The size is kept as raw JSON: only an absent field may default to medio,
/// while a present value of any type must survive to the handler's own
/// validation (a bare `Option<String>` would turn `null` into "absent" and
/// reject numbers with a body-level error instead of a 400).
#[derive(Deserialize)]
pub struct GerarRequest {
    pub tema: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub tamanho: Option<Value>,
}

/// Request body for POST /api/resumir
#[derive(Deserialize)]
pub struct ResumirRequest {
    pub texto: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub tamanho_resumo: Option<Value>,
}

/// Keeps JSON `null` distinguishable from an absent field: any present value,
/// `null` included, becomes `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The error envelope shared by every failure response.
///
/// Validation errors (400) carry only `erro`; internal errors (500) and the
/// 404/405 fallbacks also carry `mensagem`.
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub sucesso: bool,
    pub erro: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensagem: Option<String>,
}

impl ErrorEnvelope {
    pub fn validation(erro: impl Into<String>) -> Self {
        Self {
            sucesso: false,
            erro: erro.into(),
            mensagem: None,
        }
    }

    pub fn internal(erro: impl Into<String>, mensagem: impl Into<String>) -> Self {
        Self {
            sucesso: false,
            erro: erro.into(),
            mensagem: Some(mensagem.into()),
        }
    }
}

impl From<NlpError> for ErrorEnvelope {
    fn from(err: NlpError) -> Self {
        ErrorEnvelope::internal(err.erro, err.mensagem)
    }
}

/// Pretty-printed JSON response body.
///
/// The API contract is human-readable UTF-8 JSON, so this responder replaces
/// `axum::Json` everywhere and serializes with `to_vec_pretty`.
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec_pretty(&self.0) {
            Ok(mut body) => {
                body.push(b'\n');
                (
                    [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                    body,
                )
                    .into_response()
            }
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}

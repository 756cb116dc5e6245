use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use super::types::{
    ErrorEnvelope, GerarRequest, PrettyJson, ResumirRequest, SentimentoRequest,
};
use crate::nlp::{NlpService, Tamanho};

/// Serves the static web interface
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// GET /api/status - fixed health descriptor
pub async fn status() -> impl IntoResponse {
    info!("Status endpoint called");
    PrettyJson(json!({
        "status": "online",
        "mensagem": "API de IA está funcionando corretamente!",
        "versao": env!("CARGO_PKG_VERSION"),
        "endpoints_disponiveis": [
            "/api/status",
            "/api/modelo",
            "/api/sentimento",
            "/api/gerar",
            "/api/resumir"
        ]
    }))
}

/// GET /api/modelo - descriptor of the configured models
pub async fn model_info(State(service): State<Arc<NlpService>>) -> impl IntoResponse {
    info!("Model info endpoint called");
    PrettyJson(service.model_info())
}

/// POST /api/sentimento - sentiment analysis of `texto`
pub async fn analyze_sentiment(
    State(service): State<Arc<NlpService>>,
    body: Result<Json<SentimentoRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return malformed_body(rejection),
    };

    // Field must be present...
    let Some(texto) = request.texto else {
        return validation_error("Campo 'texto' é obrigatório");
    };
    // ...and not blank
    if texto.trim().is_empty() {
        return validation_error("O texto não pode estar vazio");
    }

    info!("Sentiment analysis requested ({} chars)", texto.chars().count());

    // Model work is synchronous and CPU-bound, keep it off the async workers
    let result = tokio::task::spawn_blocking(move || service.analyze_sentiment(&texto)).await;
    match result {
        Ok(Ok(analysis)) => (StatusCode::OK, PrettyJson(analysis)).into_response(),
        Ok(Err(e)) => {
            error!("Sentiment analysis failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                PrettyJson(ErrorEnvelope::from(e)),
            )
                .into_response()
        }
        Err(e) => task_failure(e),
    }
}

/// POST /api/gerar - text generation about `tema`
pub async fn generate_text(
    State(service): State<Arc<NlpService>>,
    body: Result<Json<GerarRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return malformed_body(rejection),
    };

    let Some(tema) = request.tema else {
        return validation_error("Campo 'tema' é obrigatório");
    };
    let tamanho = match parse_tamanho(request.tamanho.as_ref()) {
        Some(tamanho) => tamanho,
        None => return validation_error("Tamanho deve ser: curto, medio ou longo"),
    };
    if tema.trim().is_empty() {
        return validation_error("O tema não pode estar vazio");
    }

    info!("Text generation requested (tema: '{}', tamanho: {})", tema, tamanho);

    let result = tokio::task::spawn_blocking(move || service.generate_text(&tema, tamanho)).await;
    match result {
        Ok(Ok(generated)) => (StatusCode::OK, PrettyJson(generated)).into_response(),
        Ok(Err(e)) => {
            error!("Text generation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                PrettyJson(ErrorEnvelope::from(e)),
            )
                .into_response()
        }
        Err(e) => task_failure(e),
    }
}

/// POST /api/resumir - extractive summarization of `texto`
pub async fn summarize_text(
    State(service): State<Arc<NlpService>>,
    body: Result<Json<ResumirRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return malformed_body(rejection),
    };

    let Some(texto) = request.texto else {
        return validation_error("Campo 'texto' é obrigatório");
    };
    let tamanho = match parse_tamanho(request.tamanho_resumo.as_ref()) {
        Some(tamanho) => tamanho,
        None => return validation_error("Tamanho do resumo deve ser: curto, medio ou longo"),
    };
    if texto.trim().is_empty() {
        return validation_error("O texto não pode estar vazio");
    }

    info!("Summarization requested ({} chars, tamanho: {})", texto.chars().count(), tamanho);

    // Pure sentence extraction, cheap enough to run inline
    let summary = service.summarize_text(&texto, tamanho);
    (StatusCode::OK, PrettyJson(summary)).into_response()
}

/// Fallback for unknown routes
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        PrettyJson(ErrorEnvelope::internal(
            "Endpoint não encontrado",
            "Verifique a documentação da API",
        )),
    )
        .into_response()
}

/// Fallback for known routes hit with the wrong HTTP method
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        PrettyJson(ErrorEnvelope::internal(
            "Método HTTP não permitido",
            "Verifique o método HTTP correto para este endpoint",
        )),
    )
        .into_response()
}

/// Missing size field defaults to medio; any present value that is not one of
/// the three size strings is rejected, wrong JSON types (null, numbers,
/// arrays) included
fn parse_tamanho(value: Option<&Value>) -> Option<Tamanho> {
    match value {
        None => Some(Tamanho::default()),
        Some(Value::String(value)) => Tamanho::parse(value),
        Some(_) => None,
    }
}

fn validation_error(erro: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        PrettyJson(ErrorEnvelope::validation(erro)),
    )
        .into_response()
}

/// An unreadable body is an endpoint-boundary failure, not a validation one,
/// so it maps to the generic 500 envelope
fn malformed_body(rejection: JsonRejection) -> Response {
    error!("Failed to read request body: {}", rejection.body_text());
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        PrettyJson(ErrorEnvelope::internal(
            rejection.body_text(),
            "Erro ao processar requisição",
        )),
    )
        .into_response()
}

fn task_failure(join_error: tokio::task::JoinError) -> Response {
    error!("Inference task failed to complete: {}", join_error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        PrettyJson(ErrorEnvelope::internal(
            join_error.to_string(),
            "Erro ao processar requisição",
        )),
    )
        .into_response()
}

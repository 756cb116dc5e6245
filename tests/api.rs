//! Integration tests driving the production router in memory.
//!
//! Only the summarization capability needs to run end to end here; it is
//! model-free by design. The model-backed endpoints are exercised up to their
//! validation and failure mapping, with the generation model pointed at a
//! file that does not exist.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use iapi::config::{GenerationConfig, LoggingConfig, ModelConfig, ServerConfig, Settings};
use iapi::nlp::NlpService;
use iapi::server::router;

fn test_settings() -> Settings {
    Settings {
        models: ModelConfig {
            directory: std::env::temp_dir(),
            sentiment: "lxyuan/distilbert-base-multilingual-cased-sentiments-student".to_string(),
            generation: "definitely-not-on-disk.gguf".to_string(),
        },
        generation: GenerationConfig {
            temperature: 0.7,
            top_k: 50,
            top_p: 0.9,
            repetition_penalty: 1.2,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            file: None,
        },
    }
}

fn app() -> Router {
    router(Arc::new(NlpService::new(test_settings())))
}

async fn get(path: &str) -> (StatusCode, String) {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn post_json(path: &str, payload: &Value) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn status_is_online_with_fixed_version() {
    let (status, body) = get("/api/status").await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "online");
    assert_eq!(body["versao"], "1.0.0");
    assert_eq!(body["endpoints_disponiveis"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn responses_are_pretty_printed() {
    let (_, body) = get("/api/status").await;
    // Pretty JSON spans multiple indented lines
    assert!(body.contains("\n  "));
}

#[tokio::test]
async fn model_info_names_all_three_capabilities() {
    let (status, body) = get("/api/modelo").await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["dispositivo"], "CPU");
    assert!(body["modelos"]["sentimento"].as_str().unwrap().contains("distilbert"));
    assert!(body["modelos"]["geracao"].as_str().unwrap().ends_with(".gguf"));
    assert!(body["modelos"]["resumo"].as_str().unwrap().contains("extração"));
}

#[tokio::test]
async fn index_serves_the_web_page() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<!DOCTYPE html>"));
}

#[tokio::test]
async fn summarization_keeps_the_requested_number_of_sentences() {
    for (tamanho, esperado) in [("curto", "A."), ("medio", "A. B."), ("longo", "A. B. C.")] {
        let (status, body) = post_json(
            "/api/resumir",
            &json!({"texto": "A. B. C.", "tamanho_resumo": tamanho}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sucesso"], true);
        assert_eq!(body["resumo"], esperado, "tamanho_resumo = {}", tamanho);
        assert_eq!(body["tamanho_resumo"], tamanho);
    }
}

#[tokio::test]
async fn summarization_defaults_to_medio() {
    let (status, body) = post_json("/api/resumir", &json!({"texto": "A. B. C."})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resumo"], "A. B.");
    assert_eq!(body["tamanho_resumo"], "medio");
}

#[tokio::test]
async fn summarization_reports_reduction_and_note() {
    let (_, body) = post_json(
        "/api/resumir",
        &json!({"texto": "Primeira frase. Segunda frase.", "tamanho_resumo": "curto"}),
    )
    .await;
    assert_eq!(body["texto_original"], "Primeira frase. Segunda frase.");
    assert_eq!(body["reducao"], "15/30 caracteres");
    assert!(body["nota"].as_str().unwrap().contains("extração de frases"));
}

#[tokio::test]
async fn resummarizing_a_summary_is_stable() {
    let (_, primeira) = post_json(
        "/api/resumir",
        &json!({"texto": "A. B. C. D.", "tamanho_resumo": "medio"}),
    )
    .await;
    let resumo = primeira["resumo"].as_str().unwrap();

    let (_, segunda) = post_json(
        "/api/resumir",
        &json!({"texto": resumo, "tamanho_resumo": "longo"}),
    )
    .await;
    assert_eq!(segunda["resumo"], resumo);
}

#[tokio::test]
async fn missing_texto_is_rejected() {
    for path in ["/api/sentimento", "/api/resumir"] {
        let (status, body) = post_json(path, &json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "path = {}", path);
        assert_eq!(body["sucesso"], false);
        assert_eq!(body["erro"], "Campo 'texto' é obrigatório");
    }
}

#[tokio::test]
async fn blank_texto_is_rejected() {
    for path in ["/api/sentimento", "/api/resumir"] {
        let (status, body) = post_json(path, &json!({"texto": "   "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "path = {}", path);
        assert_eq!(body["erro"], "O texto não pode estar vazio");
    }
}

#[tokio::test]
async fn missing_tema_is_rejected() {
    let (status, body) = post_json("/api/gerar", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Campo 'tema' é obrigatório");
}

#[tokio::test]
async fn blank_tema_is_rejected() {
    let (status, body) = post_json("/api/gerar", &json!({"tema": "\t "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "O tema não pode estar vazio");
}

#[tokio::test]
async fn unknown_size_is_rejected() {
    let (status, body) = post_json(
        "/api/gerar",
        &json!({"tema": "O mar", "tamanho": "gigante"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Tamanho deve ser: curto, medio ou longo");

    let (status, body) = post_json(
        "/api/resumir",
        &json!({"texto": "A. B.", "tamanho_resumo": "CURTO"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Tamanho do resumo deve ser: curto, medio ou longo");
}

#[tokio::test]
async fn null_size_is_rejected() {
    // A size that is present but null is an invalid value, not an absent
    // field, so it must not default to medio
    let (status, body) = post_json(
        "/api/gerar",
        &json!({"tema": "O mar", "tamanho": null}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Tamanho deve ser: curto, medio ou longo");

    let (status, body) = post_json(
        "/api/resumir",
        &json!({"texto": "A. B.", "tamanho_resumo": null}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Tamanho do resumo deve ser: curto, medio ou longo");
}

#[tokio::test]
async fn non_string_size_is_rejected() {
    // Wrong JSON types for the size are validation failures, not body errors
    let (status, body) = post_json(
        "/api/gerar",
        &json!({"tema": "O mar", "tamanho": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Tamanho deve ser: curto, medio ou longo");

    let (status, body) = post_json(
        "/api/resumir",
        &json!({"texto": "A. B.", "tamanho_resumo": ["curto"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Tamanho do resumo deve ser: curto, medio ou longo");
}

#[tokio::test]
async fn generation_failure_maps_to_internal_error() {
    // The configured GGUF file does not exist, so the service reports an
    // internal failure instead of panicking
    let (status, body) = post_json("/api/gerar", &json!({"tema": "O mar"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["sucesso"], false);
    assert_eq!(body["mensagem"], "Erro ao gerar texto");
    assert!(body["erro"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn malformed_body_maps_to_internal_error() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/resumir")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("not json at all"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["sucesso"], false);
    assert_eq!(body["mensagem"], "Erro ao processar requisição");
}

#[tokio::test]
async fn unknown_routes_return_the_error_envelope() {
    let (status, body) = get("/api/nada").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["sucesso"], false);
    assert_eq!(body["erro"], "Endpoint não encontrado");
    assert_eq!(body["mensagem"], "Verifique a documentação da API");
}

#[tokio::test]
async fn wrong_method_returns_the_error_envelope() {
    // GET on a POST-only endpoint
    let (status, body) = get("/api/sentimento").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["sucesso"], false);
    assert_eq!(body["erro"], "Método HTTP não permitido");
}

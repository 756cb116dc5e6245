//! # NLP Service Module
//!
//! The nlp module holds the model cache and the three capabilities exposed by
//! the API: sentiment analysis, text generation and extractive summarization.
//!
//! ## Key Components
//!
//! - `NlpService`: owned cache of the two expensive pipelines plus the
//!   capability entry points the server calls
//! - `SentimentPipeline` / `GenerationPipeline`: the pretrained backends
//! - `Tamanho`: the curto/medio/longo size enum shared by generation and
//!   summarization
//!
//! ## Caching
//!
//! Each pipeline sits in a `OnceCell`, so a model is loaded at most once even
//! when several first requests race; a failed load leaves the cell empty and
//! the next request retries. Nothing is ever evicted.

pub mod generation;
pub mod sentiment;
pub mod summary;
pub mod types;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::config::Settings;
use generation::GenerationPipeline;
use sentiment::SentimentPipeline;
pub use types::{
    GeneratedText, ModelIdentifiers, ModelInfo, NlpError, SentimentAnalysis, SummarizedText,
    Tamanho,
};

/// Fixed failure messages, one per fallible capability
const ERRO_SENTIMENTO: &str = "Erro ao analisar sentimento";
const ERRO_GERACAO: &str = "Erro ao gerar texto";

/// The model cache and inference layer behind the HTTP API.
///
/// Constructed once at startup and shared with the request handlers through
/// an `Arc`. All methods take `&self`; the interior `OnceCell`s make lazy
/// initialization safe under concurrent first access.
pub struct NlpService {
    settings: Settings,
    sentiment: OnceCell<SentimentPipeline>,
    generation: OnceCell<GenerationPipeline>,
}

impl NlpService {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            sentiment: OnceCell::new(),
            generation: OnceCell::new(),
        }
    }

    /// Returns the sentiment pipeline, loading it on first use
    fn sentiment_pipeline(&self) -> Result<&SentimentPipeline, NlpError> {
        self.sentiment
            .get_or_try_init(|| SentimentPipeline::load(&self.settings.models.sentiment))
            .map_err(|e| NlpError::new(ERRO_SENTIMENTO, e))
    }

    /// Returns the generation pipeline, loading it on first use
    fn generation_pipeline(&self) -> Result<&GenerationPipeline, NlpError> {
        self.generation
            .get_or_try_init(|| {
                GenerationPipeline::load(
                    &self.settings.generation_model_path(),
                    self.settings.generation.clone(),
                )
            })
            .map_err(|e| NlpError::new(ERRO_GERACAO, e))
    }

    /// Classifies the sentiment of `texto`.
    ///
    /// The classifier's label is localized (POSITIVE -> POSITIVO and so on;
    /// unknown labels pass through uppercased) and the probability is scaled
    /// to a 0-100 percentage rounded to 2 decimals. This method never panics:
    /// load and inference failures come back as `NlpError`.
    pub fn analyze_sentiment(&self, texto: &str) -> Result<SentimentAnalysis, NlpError> {
        let pipeline = self.sentiment_pipeline()?;
        let scored = pipeline
            .predict(texto)
            .map_err(|e| NlpError::new(ERRO_SENTIMENTO, e))?;

        let sentimento = localize_label(&scored.label);
        let confianca = round2(f64::from(scored.score) * 100.0);

        Ok(SentimentAnalysis {
            sucesso: true,
            detalhes: format!("{} ({:.2}%)", sentimento, f64::from(scored.score) * 100.0),
            sentimento,
            confianca,
            texto_original: texto.to_string(),
        })
    }

    /// Generates a continuation for `tema`.
    ///
    /// The prompt is simply `"{tema}."`; the size picks the new-token budget
    /// (50/100/150). The reported word count is whitespace-based.
    pub fn generate_text(&self, tema: &str, tamanho: Tamanho) -> Result<GeneratedText, NlpError> {
        let pipeline = self.generation_pipeline()?;

        let prompt = format!("{}.", tema);
        let completion = pipeline
            .complete(&prompt, tamanho.token_budget())
            .map_err(|e| NlpError::new(ERRO_GERACAO, e))?;
        let texto_gerado = generation::strip_prompt_echo(&prompt, &completion).to_string();

        Ok(GeneratedText {
            sucesso: true,
            tema: tema.to_string(),
            palavras_geradas: texto_gerado.split_whitespace().count(),
            texto_gerado,
            tamanho_solicitado: tamanho,
        })
    }

    /// Summarizes `texto` by keeping its leading sentences.
    ///
    /// Pure and infallible: no model is involved, so unlike the other two
    /// capabilities this one cannot report an internal failure.
    pub fn summarize_text(&self, texto: &str, tamanho: Tamanho) -> SummarizedText {
        let resumo = summary::extract_sentences(texto, tamanho.sentence_count());

        SummarizedText {
            sucesso: true,
            reducao: format!(
                "{}/{} caracteres",
                resumo.chars().count(),
                texto.chars().count()
            ),
            texto_original: texto.to_string(),
            resumo,
            tamanho_resumo: tamanho,
            nota: "Resumo por extração de frases (método simplificado)".to_string(),
        }
    }

    /// Static descriptor of the configured models
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            modelos: ModelIdentifiers {
                sentimento: self.settings.models.sentiment.clone(),
                geracao: self.settings.models.generation.clone(),
                resumo: "Método simplificado (extração de frases)".to_string(),
            },
            provedor: "Modelos locais (Hugging Face / GGUF)".to_string(),
            descricao: "Modelos pequenos executados localmente, sem chamadas externas".to_string(),
            dispositivo: "CPU".to_string(),
            capacidades: vec![
                "Análise de sentimentos".to_string(),
                "Geração de texto em português".to_string(),
                "Resumo simples de texto".to_string(),
                "Execução 100% local".to_string(),
            ],
        }
    }

    /// Eagerly loads both pipelines so the first request does not pay the
    /// model load. Failures are logged and swallowed; the cache falls back to
    /// lazy per-request loading.
    pub fn preload(&self) {
        info!("Pre-loading NLP models...");

        match self.sentiment_pipeline() {
            Ok(_) => info!("Sentiment model pre-loaded"),
            Err(e) => warn!("Sentiment model pre-load failed ({}); will load on demand", e.erro),
        }

        match self.generation_pipeline() {
            Ok(_) => info!("Generation model pre-loaded"),
            Err(e) => warn!("Generation model pre-load failed ({}); will load on demand", e.erro),
        }
    }
}

/// Maps the classifier's English labels to the API's Portuguese vocabulary.
/// Unknown labels pass through uppercased rather than failing the request.
fn localize_label(label: &str) -> String {
    let upper = label.to_uppercase();
    match upper.as_str() {
        "POSITIVE" => "POSITIVO".to_string(),
        "NEGATIVE" => "NEGATIVO".to_string(),
        "NEUTRAL" => "NEUTRO".to_string(),
        _ => upper.clone(),
    }
}

/// Rounds to 2 decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

use serde::Serialize;
use std::error::Error;
use std::fmt;

/// Requested output size for generation and summarization.
///
/// The API speaks Portuguese on the wire, so the serialized form is
/// `curto`, `medio` or `longo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tamanho {
    Curto,
    Medio,
    Longo,
}

impl Tamanho {
    /// Parses a wire value; anything other than the three known sizes is rejected
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "curto" => Some(Tamanho::Curto),
            "medio" => Some(Tamanho::Medio),
            "longo" => Some(Tamanho::Longo),
            _ => None,
        }
    }

    /// New-token budget used by the text-generation pipeline
    pub fn token_budget(self) -> usize {
        match self {
            Tamanho::Curto => 50,
            Tamanho::Medio => 100,
            Tamanho::Longo => 150,
        }
    }

    /// Number of leading sentences kept by the summarizer
    pub fn sentence_count(self) -> usize {
        match self {
            Tamanho::Curto => 1,
            Tamanho::Medio => 2,
            Tamanho::Longo => 3,
        }
    }
}

impl Default for Tamanho {
    fn default() -> Self {
        Tamanho::Medio
    }
}

impl fmt::Display for Tamanho {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tamanho::Curto => write!(f, "curto"),
            Tamanho::Medio => write!(f, "medio"),
            Tamanho::Longo => write!(f, "longo"),
        }
    }
}

/// Successful sentiment analysis payload
#[derive(Debug, Clone, Serialize)]
pub struct SentimentAnalysis {
    pub sucesso: bool,
    pub sentimento: String,
    pub confianca: f64,
    pub texto_original: String,
    pub detalhes: String,
}

/// Successful text generation payload
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedText {
    pub sucesso: bool,
    pub tema: String,
    pub texto_gerado: String,
    pub tamanho_solicitado: Tamanho,
    pub palavras_geradas: usize,
}

/// Successful summarization payload
#[derive(Debug, Clone, Serialize)]
pub struct SummarizedText {
    pub sucesso: bool,
    pub texto_original: String,
    pub resumo: String,
    pub tamanho_resumo: Tamanho,
    pub reducao: String,
    pub nota: String,
}

/// Static descriptor of the models behind the API
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub modelos: ModelIdentifiers,
    pub provedor: String,
    pub descricao: String,
    pub dispositivo: String,
    pub capacidades: Vec<String>,
}

/// Model identifier per capability
#[derive(Debug, Clone, Serialize)]
pub struct ModelIdentifiers {
    pub sentimento: String,
    pub geracao: String,
    pub resumo: String,
}

/// Failure reported by an NLP capability.
///
/// Model loading and inference problems never escape the service as panics or
/// raw errors; they are converted into this pair of a detailed cause (`erro`)
/// and the fixed per-capability message (`mensagem`) the API returns with 500.
#[derive(Debug)]
pub struct NlpError {
    /// Detailed cause, taken from the underlying error
    pub erro: String,
    /// Fixed user-facing message for the capability that failed
    pub mensagem: &'static str,
}

impl NlpError {
    pub fn new(mensagem: &'static str, cause: impl fmt::Display) -> Self {
        Self {
            erro: cause.to_string(),
            mensagem,
        }
    }
}

impl fmt::Display for NlpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.mensagem, self.erro)
    }
}

impl Error for NlpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_sizes() {
        assert_eq!(Tamanho::parse("curto"), Some(Tamanho::Curto));
        assert_eq!(Tamanho::parse("medio"), Some(Tamanho::Medio));
        assert_eq!(Tamanho::parse("longo"), Some(Tamanho::Longo));
    }

    #[test]
    fn rejects_unknown_sizes() {
        // Case-sensitive, no aliases
        assert_eq!(Tamanho::parse("CURTO"), None);
        assert_eq!(Tamanho::parse("gigante"), None);
        assert_eq!(Tamanho::parse(""), None);
    }

    #[test]
    fn default_size_is_medio() {
        assert_eq!(Tamanho::default(), Tamanho::Medio);
    }

    #[test]
    fn token_budget_grows_with_size() {
        assert_eq!(Tamanho::Curto.token_budget(), 50);
        assert_eq!(Tamanho::Medio.token_budget(), 100);
        assert_eq!(Tamanho::Longo.token_budget(), 150);
    }

    #[test]
    fn sentence_count_grows_with_size() {
        assert_eq!(Tamanho::Curto.sentence_count(), 1);
        assert_eq!(Tamanho::Medio.sentence_count(), 2);
        assert_eq!(Tamanho::Longo.sentence_count(), 3);
    }

    #[test]
    fn size_serializes_to_lowercase_wire_form() {
        let json = serde_json::to_string(&Tamanho::Curto).unwrap();
        assert_eq!(json, "\"curto\"");
    }

    #[test]
    fn nlp_error_display_includes_message_and_cause() {
        let err = NlpError::new("Erro ao gerar texto", "model file missing");
        assert_eq!(err.to_string(), "Erro ao gerar texto: model file missing");
    }
}

//! Sentiment classification pipeline.
//!
//! Runs a pretrained DistilBERT sequence classifier on CPU with candle. The
//! model, tokenizer and config are fetched from the Hugging Face hub on first
//! load and cached by `hf-hub` under its usual cache directory, so the first
//! request after a cold start pays the download once.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::ops::softmax_last_dim;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config, DistilBertModel};
use hf_hub::api::sync::Api;
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::info;

/// DistilBERT accepts at most 512 positions
const MAX_SEQUENCE_LEN: usize = 512;

/// Label plus softmax probability for the winning class
#[derive(Debug, Clone)]
pub struct SentimentScore {
    pub label: String,
    pub score: f32,
}

/// The classification head and label names live in the checkpoint, not in
/// candle's base model, so they are loaded separately from the same weights.
#[derive(Deserialize)]
struct ClassifierConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// Hidden size, needed to shape the head's linear layers
#[derive(Deserialize)]
struct HiddenSize {
    dim: usize,
}

pub struct SentimentPipeline {
    model: DistilBertModel,
    tokenizer: Tokenizer,
    pre_classifier: Linear,
    classifier: Linear,
    labels: Vec<String>,
    device: Device,
}

impl SentimentPipeline {
    /// Downloads (or reuses the cached copy of) `model_id` and builds the
    /// classifier on CPU.
    pub fn load(model_id: &str) -> Result<Self> {
        let device = Device::Cpu;

        info!("Fetching sentiment model files for {}", model_id);
        let api = Api::new()?;
        let repo = api.model(model_id.to_string());
        let config_path = repo.get("config.json")?;
        let tokenizer_path = repo.get("tokenizer.json")?;
        let weights_path = repo.get("model.safetensors")?;

        let config_text = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&config_text)?;
        let head: HiddenSize = serde_json::from_str(&config_text)?;
        let labels = Self::labels_from_config(&config_text)?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(anyhow::Error::msg)?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)?
        };
        let model = DistilBertModel::load(vb.pp("distilbert"), &config)?;
        let pre_classifier = candle_nn::linear(head.dim, head.dim, vb.pp("pre_classifier"))?;
        let classifier = candle_nn::linear(head.dim, labels.len(), vb.pp("classifier"))?;

        info!("Sentiment model {} ready ({} labels, CPU)", model_id, labels.len());
        Ok(Self {
            model,
            tokenizer,
            pre_classifier,
            classifier,
            labels,
            device,
        })
    }

    /// Classifies `text`, returning the winning label and its probability.
    pub fn predict(&self, text: &str) -> Result<SentimentScore> {
        let encoding = self.tokenizer.encode(text, true).map_err(anyhow::Error::msg)?;
        let mut ids = encoding.get_ids().to_vec();
        ids.truncate(MAX_SEQUENCE_LEN);
        if ids.is_empty() {
            bail!("tokenizer produced no tokens");
        }

        let input_ids = Tensor::new(ids.as_slice(), &self.device)?.unsqueeze(0)?;
        // Single sequence, no padding: nothing is masked
        let mask = Tensor::zeros((ids.len(), ids.len()), DType::U8, &self.device)?;

        let hidden = self.model.forward(&input_ids, &mask)?;
        // Classify from the [CLS] position, exactly like the reference head:
        // pre_classifier -> ReLU -> classifier -> softmax
        let cls = hidden.i((.., 0))?;
        let logits = self.classifier.forward(&self.pre_classifier.forward(&cls)?.relu()?)?;
        let probs = softmax_last_dim(&logits)?.squeeze(0)?.to_vec1::<f32>()?;

        let (best, score) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| anyhow!("classifier produced no scores"))?;

        let label = self
            .labels
            .get(best)
            .ok_or_else(|| anyhow!("class index {} has no label", best))?
            .clone();

        Ok(SentimentScore { label, score })
    }

    /// Reads id2label from the checkpoint's config.json, ordered by class id
    fn labels_from_config(config_text: &str) -> Result<Vec<String>> {
        let classifier: ClassifierConfig = serde_json::from_str(config_text)?;
        if classifier.id2label.is_empty() {
            bail!("model config.json carries no id2label mapping");
        }

        let mut by_id: Vec<(usize, String)> = Vec::with_capacity(classifier.id2label.len());
        for (id, label) in classifier.id2label {
            let id: usize = id
                .parse()
                .map_err(|_| anyhow!("non-numeric class id in id2label: {}", id))?;
            by_id.push((id, label));
        }
        by_id.sort_by_key(|(id, _)| *id);
        Ok(by_id.into_iter().map(|(_, label)| label).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_ordered_by_class_id() {
        let config = r#"{"id2label": {"2": "negative", "0": "positive", "1": "neutral"}}"#;
        let labels = SentimentPipeline::labels_from_config(config).unwrap();
        assert_eq!(labels, vec!["positive", "neutral", "negative"]);
    }

    #[test]
    fn missing_id2label_is_an_error() {
        assert!(SentimentPipeline::labels_from_config("{}").is_err());
    }

    #[test]
    fn non_numeric_class_id_is_an_error() {
        let config = r#"{"id2label": {"first": "positive"}}"#;
        assert!(SentimentPipeline::labels_from_config(config).is_err());
    }
}

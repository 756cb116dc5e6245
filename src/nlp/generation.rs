//! Text-generation pipeline.
//!
//! Wraps a local GGUF causal language model loaded through `llama_cpp`. The
//! model stays resident for the life of the process; each request gets its
//! own short-lived session so requests never share decoding state.

use std::path::Path;

use anyhow::{bail, Context, Result};
use llama_cpp::standard_sampler::{SamplerStage, StandardSampler};
use llama_cpp::{LlamaModel, LlamaParams, SessionParams};
use tracing::info;

use crate::config::GenerationConfig;

pub struct GenerationPipeline {
    model: LlamaModel,
    params: GenerationConfig,
}

impl GenerationPipeline {
    /// Loads the GGUF model at `path` into memory.
    pub fn load(path: &Path, params: GenerationConfig) -> Result<Self> {
        if !path.exists() {
            bail!("generation model not found at {}", path.display());
        }

        info!("Loading generation model from {}", path.display());
        let model = LlamaModel::load_from_file(path, LlamaParams::default())
            .with_context(|| format!("loading GGUF model {}", path.display()))?;
        info!("Generation model ready");

        Ok(Self { model, params })
    }

    /// Samples one continuation of `prompt`, up to `max_tokens` new tokens.
    pub fn complete(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        let mut session = self
            .model
            .create_session(SessionParams::default())
            .context("creating inference session")?;
        session.advance_context(prompt).context("feeding prompt")?;

        // Stage order matters: penalize repeats before truncating the
        // distribution, temperature last
        let stages = vec![
            SamplerStage::RepetitionPenalty {
                repetition_penalty: self.params.repetition_penalty,
                frequency_penalty: 0.0,
                presence_penalty: 0.0,
                last_n: 64,
            },
            SamplerStage::TopK(self.params.top_k),
            SamplerStage::TopP(self.params.top_p),
            SamplerStage::Temperature(self.params.temperature),
        ];
        let sampler = StandardSampler::new_softmax(stages, 1);

        let mut completion = String::new();
        for piece in session
            .start_completing_with(sampler, max_tokens)
            .context("starting completion")?
            .into_strings()
        {
            completion.push_str(&piece);
        }

        Ok(completion)
    }
}

/// Drops a leading echo of the prompt from a completion.
///
/// llama.cpp continuations normally exclude the prompt, but some models echo
/// it back; the API contract is that `texto_gerado` is continuation only.
pub(crate) fn strip_prompt_echo<'a>(prompt: &str, completion: &'a str) -> &'a str {
    completion.strip_prefix(prompt).unwrap_or(completion).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoed_prompt_is_removed() {
        assert_eq!(strip_prompt_echo("O mar.", "O mar. é azul e profundo"), "é azul e profundo");
    }

    #[test]
    fn completion_without_echo_is_only_trimmed() {
        assert_eq!(strip_prompt_echo("O mar.", "  é azul e profundo "), "é azul e profundo");
    }

    #[test]
    fn partial_prefix_is_not_treated_as_echo() {
        // "O ma" is not the full prompt, so nothing is stripped
        assert_eq!(strip_prompt_echo("O mar.", "O ma"), "O ma");
    }

    #[test]
    fn empty_completion_stays_empty() {
        assert_eq!(strip_prompt_echo("O mar.", ""), "");
    }
}

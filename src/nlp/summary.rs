//! Extractive summarization by leading-sentence selection.
//!
//! No model is involved: the text is split on literal `.` characters and the
//! first N trimmed, non-empty fragments are kept. This is deliberately the
//! cheapest capability of the service and the only one that works with no
//! models on disk.

/// Keeps the first `n` sentences of `texto`.
///
/// Fragments are produced by splitting on `.`, trimming surrounding
/// whitespace and dropping empties, so `"A.  B."` and `"A. B."` summarize
/// identically. The result always carries a trailing period. A text with no
/// period at all counts as a single fragment.
pub fn extract_sentences(texto: &str, n: usize) -> String {
    let frases: Vec<&str> = texto
        .split('.')
        .map(str::trim)
        .filter(|frase| !frase.is_empty())
        .collect();

    let mut resumo = frases
        .iter()
        .take(n)
        .copied()
        .collect::<Vec<&str>>()
        .join(". ");
    resumo.push('.');
    resumo
}

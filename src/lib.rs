//! Local NLP API: sentiment analysis, text generation and extractive
//! summarization behind a small HTTP surface. Models are loaded once, cached
//! in process memory and run entirely on CPU.

pub mod config;
pub mod nlp;
pub mod server;

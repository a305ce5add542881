//! Entry points that run the lexer, block structurer and decoder in sequence

use crate::blocks::structure;
use crate::decoder::Decoder;
use crate::document::Document;
use crate::error::DclError;
use crate::lexer::DclLexer;
use std::fs;
use std::path::Path;

/// Configuration for a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    /// Fail with [`DclError::Resolve`] when any diagnostic was recorded
    pub strict: bool,
    /// Emit every token at trace level before decoding
    pub debug_tokens: bool,
}

impl DecoderConfig {
    /// Creates a new decoder configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether diagnostics turn into an error
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets whether tokens are dumped to the trace log
    pub fn with_debug_tokens(mut self, debug_tokens: bool) -> Self {
        self.debug_tokens = debug_tokens;
        self
    }
}

/// Loads a document from source text.
///
/// Never fails; inspect [`Document::diagnostics`] for anything that
/// degraded to Void or was dropped.
pub fn load_from_str(text: &str) -> Document {
    decode(text, &DecoderConfig::default())
}

/// Loads a document from source text with the given configuration
pub fn load_from_str_with_config(text: &str, config: &DecoderConfig) -> Result<Document, DclError> {
    let document = decode(text, config);

    if config.strict && !document.diagnostics().is_empty() {
        return Err(DclError::Resolve {
            diagnostics: document.diagnostics().to_vec(),
        });
    }

    Ok(document)
}

/// Loads a document from a file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Document, DclError> {
    load_from_file_with_config(path, &DecoderConfig::default())
}

/// Loads a document from a file with the given configuration
pub fn load_from_file_with_config(
    path: impl AsRef<Path>,
    config: &DecoderConfig,
) -> Result<Document, DclError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DclError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "loading file");
    load_from_str_with_config(&text, config)
}

fn decode(text: &str, config: &DecoderConfig) -> Document {
    let mut lexer = DclLexer::new(text);
    let tokens = lexer.tokenize();

    if config.debug_tokens {
        for token in &tokens {
            tracing::trace!(
                position = %token.position,
                kind = token.kind.type_name(),
                "{}",
                token
            );
        }
    }

    let block = structure(&tokens);
    Decoder::with_diagnostics(lexer.into_diagnostics()).decode(block)
}

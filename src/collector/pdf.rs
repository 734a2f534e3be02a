//! Extração de texto de PDF.
//!
//! ```text
//! bytes ──► pdf_extract ──► NFC ──► junta hifenização de fim de linha
//!                               └─► colapsa espaços, descarta linhas vazias
//! ```

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Limpa artefatos comuns de extração de PDF.
pub fn normalize_pdf_text(text: &str) -> String {
    let normalized: String = text.nfc().collect();
    let hyphen_break = Regex::new(r"(\w)-\s*\n\s*(\w)").expect("regex de hifenização válida");
    let joined = hyphen_break.replace_all(&normalized, "$1$2");

    joined
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Texto normalizado de um PDF em memória.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, String> {
    let raw = pdf_extract::extract_text_from_mem(bytes).map_err(|e| format!("falha ao extrair texto do PDF: {e}"))?;
    let text = normalize_pdf_text(&raw);
    if text.trim().is_empty() {
        return Err("PDF sem texto extraível".to_string());
    }
    tracing::debug!(raw_len = raw.len(), text_len = text.len(), "Texto extraído do PDF");
    Ok(text)
}

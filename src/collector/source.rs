//! Descrição de uma fonte de coleta e resolução do seu formato.

use serde::{Deserialize, Serialize};

use crate::core::SourceKind;

/// Localização reservada para os registros embutidos.
pub const SEED_LOCATION: &str = "seed";

/// Formato declarado de uma fonte. `auto` decide pela extensão.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    #[default]
    Auto,
    Text,
    Pdf,
    Records,
    #[value(name = "scienceqa")]
    ScienceQa,
    #[value(name = "openbookqa")]
    OpenBookQa,
}

/// `[[collector.sources]]` ou `--source`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Caminho local, URL http(s) ou `seed`.
    pub location: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: SourceFormat,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

fn default_subject() -> String {
    "general".to_string()
}

impl SourceSpec {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            name: None,
            format: SourceFormat::Auto,
            subject: default_subject(),
            grade_level: None,
            topic: None,
        }
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Nome usado em logs e no relatório.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.location)
    }

    pub fn is_remote(&self) -> bool {
        let lower = self.location.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }

    pub fn is_seed(&self) -> bool {
        self.location == SEED_LOCATION
    }

    /// Tipo efetivo da fonte.
    ///
    /// `auto` usa a extensão do caminho (ignorando query string):
    /// `.pdf` → PDF, `.json` → registros, `.jsonl` → OpenBookQA,
    /// o resto → texto (ou HTTP, se remoto).
    pub fn kind(&self) -> SourceKind {
        if self.is_seed() {
            return SourceKind::Seed;
        }
        match self.format {
            SourceFormat::Text if self.is_remote() => SourceKind::Http,
            SourceFormat::Text => SourceKind::Text,
            SourceFormat::Pdf => SourceKind::Pdf,
            SourceFormat::Records => SourceKind::Records,
            SourceFormat::ScienceQa => SourceKind::ScienceQa,
            SourceFormat::OpenBookQa => SourceKind::OpenBookQa,
            SourceFormat::Auto => match self.extension().as_deref() {
                Some("pdf") => SourceKind::Pdf,
                Some("json") => SourceKind::Records,
                Some("jsonl") => SourceKind::OpenBookQa,
                _ if self.is_remote() => SourceKind::Http,
                _ => SourceKind::Text,
            },
        }
    }

    fn extension(&self) -> Option<String> {
        let path = self.location.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
        let file = path.rsplit('/').next().unwrap_or_default();
        file.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_format_by_extension() {
        assert_eq!(SourceSpec::new("notes/biology.txt").kind(), SourceKind::Text);
        assert_eq!(SourceSpec::new("book.PDF").kind(), SourceKind::Pdf);
        assert_eq!(SourceSpec::new("data/cs.json").kind(), SourceKind::Records);
        assert_eq!(
            SourceSpec::new("https://example.org/main/train.jsonl?download=1").kind(),
            SourceKind::OpenBookQa
        );
        assert_eq!(SourceSpec::new("https://example.org/page").kind(), SourceKind::Http);
        assert_eq!(SourceSpec::new("seed").kind(), SourceKind::Seed);
    }

    #[test]
    fn test_explicit_format_wins() {
        let spec = SourceSpec::new("https://example.org/train.json").with_format(SourceFormat::ScienceQa);
        assert_eq!(spec.kind(), SourceKind::ScienceQa);
        let spec = SourceSpec::new("https://example.org/a.json").with_format(SourceFormat::Text);
        assert_eq!(spec.kind(), SourceKind::Http);
    }

    #[test]
    fn test_toml_defaults() {
        let spec: SourceSpec = toml::from_str(r#"location = "a.txt""#).unwrap();
        assert_eq!(spec.format, SourceFormat::Auto);
        assert_eq!(spec.subject, "general");
        assert_eq!(spec.display_name(), "a.txt");
    }
}

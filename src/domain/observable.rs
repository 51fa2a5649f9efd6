// Observable domain model
use serde::{Deserialize, Serialize};

/// A named external source of state, sampled whenever an event is captured.
///
/// The source string is either an HTTP(S) URL or a local file path; the
/// actual fetch lives behind the `StateSource` port in the application layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observable {
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Url,
    File,
}

impl Observable {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        if self.source.starts_with("http://") || self.source.starts_with("https://") {
            SourceKind::Url
        } else {
            SourceKind::File
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind() {
        let url = Observable::new("weather", "https://example.com/state.json");
        assert_eq!(url.source_kind(), SourceKind::Url);

        let file = Observable::new("reactor", "./data/reactor.json");
        assert_eq!(file.source_kind(), SourceKind::File);
    }
}

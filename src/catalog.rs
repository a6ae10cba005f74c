//! Section catalog
//!
//! An immutable, load-once collection of articles keyed by id. The catalog
//! is built at startup and shared read-only for the rest of the process.

use crate::navigation::event::{section_callback_data, TELEGRAM_CALLBACK_DATA_LIMIT};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while loading the catalog source
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The source file is missing or unreadable
    #[error("cannot read catalog {path}: {source}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The source is not a valid JSON catalog document
    #[error("malformed JSON catalog: {0}")]
    Json(#[from] serde_json::Error),
    /// The source is not a valid YAML catalog document
    #[error("malformed YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Serialization format of a catalog source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl SourceFormat {
    /// Pick the format from the file extension; anything but `.yaml`/`.yml` is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// One addressable article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Stable, unique lookup key
    pub id: String,
    /// Display title used for the menu label
    pub title: String,
    /// Raw markup body
    pub body: String,
}

/// A section record as it appears in the source document.
#[derive(Debug, Deserialize)]
struct SectionRecord {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

impl From<SectionRecord> for Section {
    fn from(record: SectionRecord) -> Self {
        let title = record
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| record.id.clone());
        Self {
            id: record.id,
            title,
            body: record.html.or(record.body).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<SectionRecord>),
    Wrapped { sections: Vec<SectionRecord> },
}

impl CatalogDocument {
    fn into_records(self) -> Vec<SectionRecord> {
        match self {
            Self::List(records) | Self::Wrapped { sections: records } => records,
        }
    }
}

/// Ordered, immutable collection of sections
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from sections in display order.
    ///
    /// Duplicate ids resolve last-write-wins: the later section replaces the
    /// earlier one but keeps the earlier one's menu position. Sections with
    /// an empty id, or an id too long to fit in a callback payload, are
    /// skipped.
    pub fn from_sections(sections: impl IntoIterator<Item = Section>) -> Self {
        let mut catalog = Self::default();
        for section in sections {
            if section.id.is_empty() {
                warn!(title = %section.title, "Skipping catalog section with empty id");
                continue;
            }
            if section_callback_data(&section.id).len() > TELEGRAM_CALLBACK_DATA_LIMIT {
                warn!(section_id = %section.id, "Skipping catalog section: id too long for callback data");
                continue;
            }
            if let Some(&slot) = catalog.index.get(&section.id) {
                warn!(section_id = %section.id, "Duplicate section id, later record replaces earlier one");
                catalog.sections[slot] = section;
            } else {
                catalog.index.insert(section.id.clone(), catalog.sections.len());
                catalog.sections.push(section);
            }
        }
        catalog
    }

    /// Parse a catalog document held in memory.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` or `CatalogError::Yaml` if the document is malformed.
    pub fn parse(contents: &str, format: SourceFormat) -> Result<Self, CatalogError> {
        let document: CatalogDocument = match format {
            SourceFormat::Json => serde_json::from_str(contents)?,
            SourceFormat::Yaml => serde_yaml::from_str(contents)?,
        };
        Ok(Self::from_sections(
            document.into_records().into_iter().map(Section::from),
        ))
    }

    /// Load the catalog from a JSON or YAML file.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the file is missing, unreadable or malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, SourceFormat::from_path(path))
    }

    /// Load the catalog, degrading to an empty one on failure.
    ///
    /// The bot stays available with an empty menu rather than refusing to start.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(catalog) => {
                info!(
                    path = %path.display(),
                    sections = catalog.len(),
                    "Catalog loaded."
                );
                catalog
            }
            Err(e) => {
                warn!(error = %e, "Failed to load catalog, continuing with an empty one");
                Self::default()
            }
        }
    }

    /// Look up a section by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Section> {
        self.index.get(id).map(|&slot| &self.sections[slot])
    }

    /// All sections in display order.
    #[must_use]
    pub fn all(&self) -> &[Section] {
        &self.sections
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the catalog holds no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

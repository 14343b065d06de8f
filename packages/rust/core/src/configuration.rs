//! The structural description of a document (`document.json`).
//!
//! [`DocumentConfiguration`] is either built empty and filled through its
//! validating mutators, or loaded from a [`ConfigSource`] and checked
//! against the published JSON Schema. Every mutator is all-or-nothing: on
//! error the previous state is left untouched.

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use adpt_shared::{AdptError, DEFAULT_SCHEMA_URL, Result, slug};

use crate::author::Author;
use crate::fetch::Fetcher;
use crate::schema::DocumentSchema;

/// Name of the configuration file inside a document directory.
pub const FILE_NAME: &str = "document.json";

/// Language used when none is given.
pub const DEFAULT_LANG: &str = "en";

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// Kind of document, mapped to the `:doctype:` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Book,
    Article,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Article => "article",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = AdptError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "book" => Ok(Self::Book),
            "article" => Ok(Self::Article),
            other => Err(AdptError::validation(format!(
                "unknown document type '{other}' (expected 'book' or 'article')"
            ))),
        }
    }
}

/// One entry of the chapter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    /// Top-level division (front/back matter) included without level offset.
    #[serde(default)]
    pub part: bool,
}

impl Chapter {
    /// File-name id of the chapter; unique within a document.
    pub fn slug(&self) -> String {
        slug(&self.title)
    }
}

/// Copyright information. `fromYear` is required; other keys are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Copyright {
    #[serde(rename = "fromYear", default = "current_year")]
    pub from_year: i32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Copyright {
    pub fn since(from_year: i32) -> Self {
        Self {
            from_year,
            extra: Map::new(),
        }
    }

    /// `2019--2024` style span ending at `current_year`, or a single year.
    pub fn year_span(&self, current_year: i32) -> String {
        if self.from_year >= current_year {
            self.from_year.to_string()
        } else {
            format!("{}--{current_year}", self.from_year)
        }
    }
}

impl Default for Copyright {
    fn default() -> Self {
        Self::since(current_year())
    }
}

pub(crate) fn current_year() -> i32 {
    chrono::Local::now().year()
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where a configuration is loaded from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Raw `document.json` text.
    Json(String),
    /// A document directory containing [`FILE_NAME`].
    Directory(PathBuf),
    /// An already-parsed mapping.
    Mapping(Value),
}

impl ConfigSource {
    fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Directory(_) => "directory",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Resolve to a JSON object.
    fn into_value(self) -> Result<Value> {
        let value = match self {
            Self::Json(text) => parse_json(&text, "configuration")?,
            Self::Directory(dir) => {
                let path = dir.join(FILE_NAME);
                let text = std::fs::read_to_string(&path).map_err(|e| AdptError::io(&path, e))?;
                parse_json(&text, &path.display().to_string())?
            }
            Self::Mapping(value) => value,
        };

        match value {
            Value::Object(_) => Ok(value),
            other => Err(AdptError::UnsupportedSourceKind {
                found: json_kind(&other).to_string(),
            }),
        }
    }
}

fn parse_json(text: &str, what: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| AdptError::parse(format!("{what} is not valid JSON: {e}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// DocumentConfiguration
// ---------------------------------------------------------------------------

/// Validated structure of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentConfiguration {
    schema_url: String,
    title: Option<String>,
    authors: Vec<Author>,
    doc_type: DocumentType,
    chapters: Vec<Chapter>,
    lang: String,
    copyright: Copyright,
    version: Option<Map<String, Value>>,
}

impl Default for DocumentConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape of a schema-checked mapping, before invariants are enforced.
#[derive(Deserialize)]
struct RawConfiguration {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<Author>,
    #[serde(default, rename = "type")]
    doc_type: Option<String>,
    #[serde(default)]
    chapters: Vec<Chapter>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    copyright: Option<Copyright>,
    #[serde(default)]
    version: Option<Map<String, Value>>,
}

/// Canonical serialized form; field order is significant.
#[derive(Serialize)]
struct CanonicalConfiguration<'a> {
    #[serde(rename = "$schema")]
    schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    authors: &'a [Author],
    #[serde(rename = "type", skip_serializing_if = "is_book")]
    doc_type: DocumentType,
    chapters: &'a [Chapter],
    lang: &'a str,
    copyright: &'a Copyright,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a Map<String, Value>>,
}

/// A slug names exactly one file inside the source directory.
fn is_file_stem(slug: &str) -> bool {
    if slug.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(slug).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn is_book(doc_type: &DocumentType) -> bool {
    *doc_type == DocumentType::Book
}

impl DocumentConfiguration {
    /// An empty configuration: no title, no authors, `book`, `en`,
    /// copyright from the current year.
    pub fn new() -> Self {
        Self {
            schema_url: DEFAULT_SCHEMA_URL.to_string(),
            title: None,
            authors: Vec::new(),
            doc_type: DocumentType::default(),
            chapters: Vec::new(),
            lang: DEFAULT_LANG.to_string(),
            copyright: Copyright::default(),
            version: None,
        }
    }

    /// Load and validate against the default schema.
    pub async fn load<F: Fetcher>(source: ConfigSource, fetcher: &F) -> Result<Self> {
        Self::load_with_schema(source, fetcher, DEFAULT_SCHEMA_URL).await
    }

    /// Load and validate against the schema published at `schema_url`.
    ///
    /// The schema is fetched on every call. Schema defaults are inserted
    /// before validation; all violations are returned together as
    /// [`AdptError::InvalidConfiguration`].
    #[instrument(skip_all, fields(source = source.kind(), schema_url = %schema_url))]
    pub async fn load_with_schema<F: Fetcher>(
        source: ConfigSource,
        fetcher: &F,
        schema_url: &str,
    ) -> Result<Self> {
        let mut value = source.into_value()?;

        let schema = DocumentSchema::fetch(fetcher, schema_url).await?;
        schema.apply(&mut value)?;

        let raw: RawConfiguration =
            serde_json::from_value(value).map_err(|e| AdptError::InvalidConfiguration {
                violations: vec![e.to_string()],
            })?;

        let config = Self::from_raw(raw, schema_url)?;
        info!(
            title = config.title.as_deref().unwrap_or_default(),
            authors = config.authors.len(),
            chapters = config.chapters.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn from_raw(raw: RawConfiguration, schema_url: &str) -> Result<Self> {
        let mut config = Self::new();
        config.schema_url = schema_url.to_string();

        if let Some(title) = raw.title {
            config.set_title(&title)?;
        }
        config.set_authors(raw.authors)?;

        config.doc_type = match raw.doc_type {
            None => DocumentType::default(),
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!(doc_type = %name, "unrecognized document type, falling back to book");
                DocumentType::Book
            }),
        };

        for chapter in raw.chapters {
            config.add_chapter(&chapter.title, chapter.part)?;
        }

        if let Some(lang) = raw.lang {
            config.set_lang(&lang);
        }
        if let Some(copyright) = raw.copyright {
            config.copyright = copyright;
        }
        config.set_version(raw.version)?;

        Ok(config)
    }

    // -- accessors ----------------------------------------------------------

    pub fn schema_url(&self) -> &str {
        &self.schema_url
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn doc_type(&self) -> DocumentType {
        self.doc_type
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn copyright(&self) -> &Copyright {
        &self.copyright
    }

    pub fn version(&self) -> Option<&Map<String, Value>> {
        self.version.as_ref()
    }

    /// Fast structural pre-flight: a title and at least one author.
    ///
    /// Does not re-run schema validation.
    pub fn check_if_valid(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty()) && !self.authors.is_empty()
    }

    // -- mutators -----------------------------------------------------------

    /// Replace the title. Trimmed; empty titles are rejected.
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AdptError::EmptyTitle);
        }
        self.title = Some(title.to_string());
        Ok(())
    }

    /// Replace the whole authors list. Duplicates are rejected.
    pub fn set_authors(&mut self, authors: Vec<Author>) -> Result<()> {
        let mut seen = HashSet::with_capacity(authors.len());
        if !authors.iter().all(|a| seen.insert(a)) {
            return Err(AdptError::DuplicateAuthors);
        }
        self.authors = authors;
        Ok(())
    }

    /// Append one author, keeping the list free of duplicates.
    pub fn add_author(&mut self, author: Author) -> Result<()> {
        if self.authors.contains(&author) {
            return Err(AdptError::DuplicateAuthors);
        }
        self.authors.push(author);
        Ok(())
    }

    /// Append a chapter whose slug must not collide with an existing one.
    pub fn add_chapter(&mut self, title: &str, is_part: bool) -> Result<()> {
        if title.trim().is_empty() {
            return Err(AdptError::validation("chapter title can't be empty"));
        }

        let new_slug = slug(title);
        if !is_file_stem(&new_slug) {
            return Err(AdptError::validation(format!(
                "chapter title '{title}' can't be used as a file name"
            )));
        }
        if self.chapters.iter().any(|ch| ch.slug() == new_slug) {
            return Err(AdptError::DuplicateChapterSlug { slug: new_slug });
        }

        debug!(title, part = is_part, slug = %new_slug, "chapter added");
        self.chapters.push(Chapter {
            title: title.to_string(),
            part: is_part,
        });
        Ok(())
    }

    /// Set the language code; trimmed and lowercased, blank means `en`.
    pub fn set_lang(&mut self, lang: &str) {
        let lang = lang.trim().to_lowercase();
        self.lang = if lang.is_empty() {
            DEFAULT_LANG.to_string()
        } else {
            lang
        };
    }

    pub fn set_doc_type(&mut self, doc_type: DocumentType) {
        self.doc_type = doc_type;
    }

    pub fn set_copyright(&mut self, copyright: Copyright) {
        self.copyright = copyright;
    }

    /// Set the version map. Keys keep their spelling apart from surrounding
    /// whitespace; two keys that trim to the same text are rejected.
    pub fn set_version(&mut self, version: Option<Map<String, Value>>) -> Result<()> {
        let Some(map) = version else {
            self.version = None;
            return Ok(());
        };

        let mut trimmed = Map::with_capacity(map.len());
        for (key, value) in map {
            let key = key.trim().to_string();
            if trimmed.contains_key(&key) {
                return Err(AdptError::validation(format!(
                    "version key '{key}' is given more than once"
                )));
            }
            trimmed.insert(key, value);
        }
        self.version = Some(trimmed);
        Ok(())
    }

    // -- serialization ------------------------------------------------------

    fn canonical(&self) -> CanonicalConfiguration<'_> {
        CanonicalConfiguration {
            schema: &self.schema_url,
            title: self.title.as_deref(),
            authors: &self.authors,
            doc_type: self.doc_type,
            chapters: &self.chapters,
            lang: &self.lang,
            copyright: &self.copyright,
            version: self.version.as_ref(),
        }
    }

    /// Canonical mapping: `$schema`, title, authors, chapters, lang,
    /// copyright, then version when present. `type` follows the authors
    /// only for non-book documents.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self.canonical())
            .map_err(|e| AdptError::parse(format!("JSON serialization failed: {e}")))
    }

    /// Pretty-printed canonical JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.canonical())
            .map_err(|e| AdptError::parse(format!("JSON serialization failed: {e}")))
    }

    /// Overwrite `<directory>/document.json` with the canonical JSON.
    #[instrument(skip_all, fields(dir = %directory.display()))]
    pub fn write_file(&self, directory: &Path) -> Result<PathBuf> {
        let path = directory.join(FILE_NAME);
        let json = self.to_json()?;
        std::fs::write(&path, json).map_err(|e| AdptError::io(&path, e))?;
        debug!(path = %path.display(), "wrote configuration");
        Ok(path)
    }

    /// Whether `dir` exists, is non-empty and holds a `document.json`.
    pub fn is_document_directory(dir: &Path) -> bool {
        let non_empty = std::fs::read_dir(dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false);
        non_empty && dir.join(FILE_NAME).is_file()
    }
}

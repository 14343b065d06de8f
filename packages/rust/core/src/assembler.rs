//! Master document assembler.
//!
//! Turns a validated [`DocumentConfiguration`] into the AsciiDoc master
//! document: header attributes, the inlined locale bundle, the colophon
//! include and one include per chapter.

use tracing::{debug, info, instrument};
use url::Url;

use adpt_shared::{
    AdptError, AppConfig, DEFAULT_LOCALE_URL_TEMPLATE, LANG_PLACEHOLDER, LayoutConfig, Result,
    slug,
};

use crate::configuration::{Chapter, DocumentConfiguration, current_year};
use crate::fetch::Fetcher;

/// Depth passed to `:sectnumsdepth:`.
const SECTION_NUMBERING_DEPTH: u8 = 5;

/// Include attribute that nests a chapter below the document title.
const LEVEL_OFFSET: &str = "leveloffset=+1";

const DEFAULT_COLOPHON: &str = "\
[colophon#colophon%nonfacing]
== {doctitle}

Copyright (c) {copyright-year}, {author}.

_Created using ADPT, the AsciiDoc Publishing Toolbox_.
";

/// Runtime options for assembly.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Where fragments live and how they are named.
    pub layout: LayoutConfig,
    /// Locale bundle URL with a `{lang}` placeholder.
    pub locale_url_template: String,
    /// Upper end of the copyright span.
    pub current_year: i32,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            locale_url_template: DEFAULT_LOCALE_URL_TEMPLATE.to_string(),
            current_year: current_year(),
        }
    }
}

impl From<&AppConfig> for AssembleOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            locale_url_template: config.remote.locale_url_template.clone(),
            current_year: current_year(),
        }
    }
}

/// Renders one document.
#[derive(Debug)]
pub struct DocumentAssembler<'a> {
    config: &'a DocumentConfiguration,
    options: AssembleOptions,
}

impl<'a> DocumentAssembler<'a> {
    /// Wrap a configuration that passes [`DocumentConfiguration::check_if_valid`].
    pub fn new(config: &'a DocumentConfiguration, options: AssembleOptions) -> Result<Self> {
        if !config.check_if_valid() {
            return Err(AdptError::validation(
                "the document needs a title and at least one author before it can be assembled",
            ));
        }
        Ok(Self { config, options })
    }

    fn title(&self) -> &str {
        self.config.title().unwrap_or_default()
    }

    /// Base name of the master document: the slug of the title.
    pub fn file_name(&self) -> String {
        slug(self.title())
    }

    /// `<file_name>.<ext>`.
    pub fn master_file_name(&self) -> String {
        format!("{}.{}", self.file_name(), self.options.layout.extension)
    }

    /// Include target of the colophon fragment, e.g. `src/colophon.adoc`.
    pub fn colophon_path(&self) -> String {
        self.fragment_path(&self.options.layout.colophon)
    }

    /// Include target of a chapter fragment, e.g. `src/intro.adoc`.
    pub fn chapter_path(&self, chapter: &Chapter) -> String {
        self.fragment_path(&chapter.slug())
    }

    fn fragment_path(&self, stem: &str) -> String {
        let layout = &self.options.layout;
        format!("{}/{stem}.{}", layout.source_dir, layout.extension)
    }

    /// Locale bundle location for the document language.
    pub fn locale_url(&self) -> Result<Url> {
        let raw = self
            .options
            .locale_url_template
            .replace(LANG_PLACEHOLDER, self.config.lang());
        Url::parse(&raw).map_err(|e| AdptError::validation(format!("invalid locale URL '{raw}': {e}")))
    }

    /// Include directive for one chapter. Parts keep their top-level rank.
    pub fn include_directive(&self, chapter: &Chapter) -> String {
        let attributes = if chapter.part { "" } else { LEVEL_OFFSET };
        format!("include::{}[{attributes}]", self.chapter_path(chapter))
    }

    /// Title, byline and document attributes, one per line.
    pub fn header(&self) -> String {
        let byline = self
            .config
            .authors()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");

        let lines = [
            format!("= {}", self.title()),
            byline,
            format!(":doctype: {}", self.config.doc_type()),
            ":toc: left".to_string(),
            ":sectnums:".to_string(),
            ":partnums:".to_string(),
            format!(":sectnumsdepth: {SECTION_NUMBERING_DEPTH}"),
            ":xrefstyle: short".to_string(),
            format!(
                ":copyright-year: {}",
                self.config.copyright().year_span(self.options.current_year)
            ),
            format!(":lang: {}", self.config.lang()),
        ];

        let mut header = lines.join("\n");
        header.push('\n');
        header
    }

    /// Build the full master document.
    ///
    /// Fetches the locale bundle (one request); fetch errors are returned
    /// as-is.
    #[instrument(skip_all, fields(title = %self.title(), lang = %self.config.lang()))]
    pub async fn render<F: Fetcher>(&self, fetcher: &F) -> Result<String> {
        let locale_url = self.locale_url()?;
        let locale = fetcher.fetch(locale_url.as_str()).await?;
        debug!(url = %locale_url, bytes = locale.len(), "locale bundle fetched");

        let mut out = self.header();

        // Trailing blank lines of the bundle would double the gap before the colophon.
        let locale = locale.trim_end();
        if !locale.is_empty() {
            out.push_str(locale);
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&format!("include::{}[]\n", self.colophon_path()));

        for chapter in self.config.chapters() {
            out.push('\n');
            out.push_str(&self.include_directive(chapter));
            out.push('\n');
        }

        info!(
            chapters = self.config.chapters().len(),
            bytes = out.len(),
            "document rendered"
        );
        Ok(out)
    }

    /// Colophon written when the document has none of its own.
    pub fn default_colophon() -> &'static str {
        DEFAULT_COLOPHON
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author::Author;
    use crate::configuration::Copyright;
    use crate::fetch::fixtures::{EN_LOCALE_URL, FixtureFetcher};

    fn options() -> AssembleOptions {
        AssembleOptions {
            current_year: 2020,
            ..AssembleOptions::default()
        }
    }

    fn my_book() -> DocumentConfiguration {
        let mut config = DocumentConfiguration::new();
        config.set_title("My Book").unwrap();
        config
            .set_authors(vec![Author::new("Jane", "Doe").unwrap()])
            .unwrap();
        config.add_chapter("Intro", false).unwrap();
        config.set_lang("en");
        config.set_copyright(Copyright::since(2019));
        config
    }

    #[tokio::test]
    async fn renders_my_book_scenario() {
        let config = my_book();
        let assembler = DocumentAssembler::new(&config, options()).unwrap();
        let doc = assembler.render(&FixtureFetcher::standard()).await.unwrap();

        assert!(doc.starts_with("= My Book\nJane Doe\n"));
        assert!(doc.contains(":doctype: book\n"));
        assert!(doc.contains(":copyright-year: 2019--2020\n"));
        assert!(doc.contains(":lang: en\n"));
        assert!(doc.lines().any(|l| l == "include::src/intro.adoc[leveloffset=+1]"));
    }

    #[tokio::test]
    async fn full_layout_is_exact() {
        let mut config = my_book();
        config.add_chapter("Front Matter", true).unwrap();
        let fetcher = FixtureFetcher::default().with(EN_LOCALE_URL, ":toc-title: Contents\n\n");

        let doc = DocumentAssembler::new(&config, options())
            .unwrap()
            .render(&fetcher)
            .await
            .unwrap();

        let expected = "\
= My Book
Jane Doe
:doctype: book
:toc: left
:sectnums:
:partnums:
:sectnumsdepth: 5
:xrefstyle: short
:copyright-year: 2019--2020
:lang: en
:toc-title: Contents

include::src/colophon.adoc[]

include::src/intro.adoc[leveloffset=+1]

include::src/front-matter.adoc[]
";
        assert_eq!(doc, expected);
    }

    #[tokio::test]
    async fn part_chapters_have_no_level_offset() {
        let mut config = my_book();
        config.add_chapter("Front Matter", true).unwrap();
        let doc = DocumentAssembler::new(&config, options())
            .unwrap()
            .render(&FixtureFetcher::standard())
            .await
            .unwrap();

        let line = doc
            .lines()
            .find(|l| l.contains("front-matter"))
            .expect("front matter include");
        assert_eq!(line, "include::src/front-matter.adoc[]");
        assert!(!line.contains("leveloffset"));
    }

    #[tokio::test]
    async fn locale_bundle_is_inlined_after_attributes() {
        let config = my_book();
        let doc = DocumentAssembler::new(&config, options())
            .unwrap()
            .render(&FixtureFetcher::standard())
            .await
            .unwrap();

        let lang_at = doc.find(":lang: en").unwrap();
        let locale_at = doc.find(":toc-title: Table of Contents").unwrap();
        let colophon_at = doc.find("include::src/colophon.adoc[]").unwrap();
        assert!(lang_at < locale_at && locale_at < colophon_at);
    }

    #[tokio::test]
    async fn locale_trailing_blank_lines_are_dropped() {
        let config = my_book();
        let assembler = DocumentAssembler::new(&config, options()).unwrap();

        let padded = FixtureFetcher::default().with(EN_LOCALE_URL, ":toc-title: Contents\n\n\n");
        let doc = assembler.render(&padded).await.unwrap();
        assert!(doc.contains(":lang: en\n:toc-title: Contents\n\ninclude::src/colophon.adoc[]\n"));

        let empty = FixtureFetcher::default().with(EN_LOCALE_URL, "");
        let doc = assembler.render(&empty).await.unwrap();
        assert!(doc.contains(":lang: en\n\ninclude::src/colophon.adoc[]\n"));
    }

    #[tokio::test]
    async fn locale_fetch_failure_propagates() {
        let mut config = my_book();
        config.set_lang("xx");
        let err = DocumentAssembler::new(&config, options())
            .unwrap()
            .render(&FixtureFetcher::standard())
            .await
            .unwrap_err();
        assert!(matches!(err, AdptError::Network(_)));
    }

    #[test]
    fn byline_keeps_order_and_optional_parts() {
        let mut config = my_book();
        config
            .set_authors(vec![
                Author::new("John", "Smith").unwrap().with_email("john@example.org"),
                Author::new("Jane", "Doe").unwrap().with_middle_name("Q."),
            ])
            .unwrap();
        let header = DocumentAssembler::new(&config, options()).unwrap().header();

        assert_eq!(
            header.lines().nth(1),
            Some("John Smith <john@example.org>; Jane Q. Doe")
        );
    }

    #[test]
    fn article_type_and_current_year_copyright() {
        let mut config = my_book();
        config.set_doc_type(crate::configuration::DocumentType::Article);
        config.set_copyright(Copyright::since(2020));
        let header = DocumentAssembler::new(&config, options()).unwrap().header();

        assert!(header.contains(":doctype: article\n"));
        assert!(header.contains(":copyright-year: 2020\n"));
    }

    #[test]
    fn file_name_is_title_slug() {
        let config = my_book();
        let assembler = DocumentAssembler::new(&config, options()).unwrap();
        assert_eq!(assembler.file_name(), "my-book");
        assert_eq!(assembler.master_file_name(), "my-book.adoc");
    }

    #[test]
    fn custom_layout_changes_include_paths() {
        let config = my_book();
        let opts = AssembleOptions {
            layout: LayoutConfig {
                source_dir: "chapters".into(),
                extension: "asciidoc".into(),
                colophon: "about".into(),
            },
            ..options()
        };
        let assembler = DocumentAssembler::new(&config, opts).unwrap();

        assert_eq!(assembler.colophon_path(), "chapters/about.asciidoc");
        assert_eq!(
            assembler.include_directive(&config.chapters()[0]),
            "include::chapters/intro.asciidoc[leveloffset=+1]"
        );
    }

    #[test]
    fn locale_url_uses_language() {
        let mut config = my_book();
        config.set_lang("IT");
        let assembler = DocumentAssembler::new(&config, options()).unwrap();
        assert!(
            assembler
                .locale_url()
                .unwrap()
                .as_str()
                .ends_with("/attributes-it.adoc")
        );

        let broken = AssembleOptions {
            locale_url_template: "not a url {lang}".into(),
            ..options()
        };
        let assembler = DocumentAssembler::new(&config, broken).unwrap();
        assert!(assembler.locale_url().is_err());
    }

    #[test]
    fn incomplete_configuration_is_refused() {
        let config = DocumentConfiguration::new();
        assert!(DocumentAssembler::new(&config, options()).is_err());
    }

    #[test]
    fn default_colophon_has_placeholders() {
        let colophon = DocumentAssembler::default_colophon();
        assert!(colophon.starts_with("[colophon#colophon%nonfacing]\n"));
        assert!(colophon.contains("{doctitle}"));
        assert!(colophon.contains("{copyright-year}"));
        assert!(colophon.contains("{author}"));
        assert!(colophon.contains("Created using ADPT"));
    }
}

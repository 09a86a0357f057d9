//! Document assembly: three templates, two inner renders, one outer render.
//!
//! ## Template resources
//!
//! | Name               | Placeholders besides the data fields            |
//! |--------------------|-------------------------------------------------|
//! | `page1-cover.svg`  | `COVER_IMAGE_URL`                               |
//! | `pages/page2.html` | `FOOTER_LOGO_URL`                               |
//! | `document.html`    | `COVER_SVG`, `PAGE2_HTML`, `FOOTER_LOGO_URL`, `FOOTER_LINE` only |
//!
//! These names are part of the template contract.
//!
//! Field values are inserted into HTML and SVG verbatim, without escaping.
//! Callers are trusted to submit non-hostile text, or to sanitize it before
//! it reaches the pipeline.

use crate::asset::{Asset, encode};
use crate::error::ConfigurationError;
use crate::schema::{FOOTER_LINE, MemoData, data_placeholder_names};
use memo_template::{PlaceholderMap, Template};
use memo_traits::TemplateSource;

pub const DOCUMENT_TEMPLATE: &str = "document.html";
pub const COVER_TEMPLATE: &str = "page1-cover.svg";
pub const PAGE2_TEMPLATE: &str = "pages/page2.html";

/// Every template `assemble` loads.
pub const REQUIRED_TEMPLATES: [&str; 3] = [DOCUMENT_TEMPLATE, COVER_TEMPLATE, PAGE2_TEMPLATE];

pub const COVER_IMAGE_URL: &str = "COVER_IMAGE_URL";
pub const FOOTER_LOGO_URL: &str = "FOOTER_LOGO_URL";
pub const COVER_SVG: &str = "COVER_SVG";
pub const PAGE2_HTML: &str = "PAGE2_HTML";

/// The three loaded templates.
#[derive(Debug, Clone)]
pub struct MemoTemplates {
    pub document: Template,
    pub cover: Template,
    pub page2: Template,
}

fn load_one(source: &dyn TemplateSource, name: &'static str) -> Result<Template, ConfigurationError> {
    source
        .load(name)
        .map(|text| Template::new(name, text))
        .map_err(|err| ConfigurationError::TemplateUnavailable {
            template: name,
            source: err,
        })
}

impl MemoTemplates {
    /// Loads all three templates. Nothing is rendered unless all of them load.
    pub fn load(source: &dyn TemplateSource) -> Result<Self, ConfigurationError> {
        Ok(Self {
            document: load_one(source, DOCUMENT_TEMPLATE)?,
            cover: load_one(source, COVER_TEMPLATE)?,
            page2: load_one(source, PAGE2_TEMPLATE)?,
        })
    }

    /// Renders the fragments, then nests them into the document shell.
    ///
    /// `cover_image_url` and `footer_logo_url` are inline references (see
    /// [`encode`]). Each level is a single substitution pass, so text
    /// inserted at one level is never read as a token at the next.
    pub fn render(&self, data: &MemoData, cover_image_url: &str, footer_logo_url: &str) -> String {
        let fields = data.placeholders();

        let cover_svg = self
            .cover
            .render(&fields.clone().with(COVER_IMAGE_URL, cover_image_url));
        let page2_html = self
            .page2
            .render(&fields.with(FOOTER_LOGO_URL, footer_logo_url));

        let shell = PlaceholderMap::new()
            .with(COVER_SVG, cover_svg)
            .with(PAGE2_HTML, page2_html)
            .with(FOOTER_LOGO_URL, footer_logo_url)
            .with(FOOTER_LINE, data.footer_line());

        self.document.render(&shell)
    }

    /// Per template, the placeholders no rendering call will supply.
    pub fn unresolved_placeholders(&self) -> Vec<(&str, Vec<&str>)> {
        let fields: PlaceholderMap = data_placeholder_names().map(|name| (name, "")).collect();
        let cover = fields.clone().with(COVER_IMAGE_URL, "");
        let page2 = fields.with(FOOTER_LOGO_URL, "");
        let shell = PlaceholderMap::new()
            .with(COVER_SVG, "")
            .with(PAGE2_HTML, "")
            .with(FOOTER_LOGO_URL, "")
            .with(FOOTER_LINE, "");

        [
            (&self.cover, cover),
            (&self.page2, page2),
            (&self.document, shell),
        ]
        .into_iter()
        .map(|(template, map)| (template.name(), template.unresolved(&map)))
        .filter(|(_, names)| !names.is_empty())
        .collect()
    }
}

/// Loads the templates from `source` and assembles the final HTML document.
pub fn assemble(
    source: &dyn TemplateSource,
    data: &MemoData,
    cover: Option<&Asset>,
    footer_logo: Option<&Asset>,
) -> Result<String, ConfigurationError> {
    let templates = MemoTemplates::load(source)?;
    let html = templates.render(data, &encode(cover), &encode(footer_logo));
    log::debug!(
        "Assembled memo document ({} bytes) from {}",
        html.len(),
        source.name()
    );
    Ok(html)
}

use memo_press::FieldSet;
use memo_resource::InMemoryTemplateSource;
use std::path::PathBuf;

/// A complete, valid memo form.
pub fn memo_fields() -> FieldSet {
    [
        ("title", "Q3 Liquidity Review"),
        ("subtitle", "Working capital and covenant headroom"),
        ("clientName", "Northwind Capital"),
        ("preparedBy", "A. Analyst"),
        ("memoDate", "2026-10-19"),
        ("summary", "Liquidity remains adequate."),
        ("body", "Cash on hand covers 14 months of operating expenses."),
        ("footerLabel", "Ref"),
        ("footerValue", "NW-204"),
    ]
    .into_iter()
    .collect()
}

/// Small templates that make nesting visible in the output.
pub fn tiny_templates() -> InMemoryTemplateSource {
    InMemoryTemplateSource::with_templates([
        ("document.html", "<div>{{COVER_SVG}}{{PAGE2_HTML}}<footer>{{FOOTER_LINE}}</footer></div>"),
        ("page1-cover.svg", "<img src='{{COVER_IMAGE_URL}}'>"),
        ("pages/page2.html", "<p>{{TITLE}} / {{MEMO_DATE_LONG}}</p><img src='{{FOOTER_LOGO_URL}}'>"),
    ])
}

/// The templates shipped with the service.
pub fn shipped_template_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// Hand-built `multipart/form-data` bodies.
pub struct MultipartBody {
    boundary: &'static str,
    body: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self {
            boundary: "memo-press-test-boundary",
            body: Vec::new(),
        }
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: &[(&str, &str)]) -> Self {
        fields
            .iter()
            .fold(Self::new(), |body, (name, value)| body.text(name, value))
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Returns the `Content-Type` header value and the encoded body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// The valid memo form as multipart text parts.
pub fn memo_form() -> MultipartBody {
    MultipartBody::from_fields(&[
        ("title", "Q3 Liquidity Review"),
        ("clientName", "Northwind Capital"),
        ("preparedBy", "A. Analyst"),
        ("memoDate", "2026-10-19"),
        ("footerLabel", "Ref"),
        ("footerValue", "NW-204"),
    ])
}

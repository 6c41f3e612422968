//! Built-in boilerplate removal.
//!
//! A regex-based [`ContentExtractor`] good enough for plain article pages.
//! Deployments with a heavier extraction service plug it in behind the
//! same trait.

use regex::Regex;

use crate::traits::{ContentExtractor, ExtractedContent};

/// Regex-based article extractor: strips scripts, styles, and tags,
/// decodes common entities, and pulls the `<title>` as metadata.
pub struct HtmlExtractor {
    title: Regex,
    script: Regex,
    style: Regex,
    br: Regex,
    block_close: Regex,
    tag: Regex,
    multi_newline: Regex,
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlExtractor {
    pub fn new() -> Self {
        Self {
            title: Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("valid regex"),
            script: Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"),
            style: Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"),
            br: Regex::new(r"(?i)<br\s*/?>").expect("valid regex"),
            block_close: Regex::new(r"(?i)</(p|div|h1|h2|h3|h4|h5|h6|li|tr|article|section)>")
                .expect("valid regex"),
            tag: Regex::new(r"<[^>]+>").expect("valid regex"),
            multi_newline: Regex::new(r"\n{3,}").expect("valid regex"),
        }
    }

    fn metadata_title(&self, html: &str) -> Option<String> {
        self.title
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn body_text(&self, html: &str) -> String {
        let text = self.script.replace_all(html, "");
        let text = self.style.replace_all(&text, "");
        let text = self.br.replace_all(&text, "\n");
        let text = self.block_close.replace_all(&text, "\n");
        let text = self.tag.replace_all(&text, " ");

        let text = text
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'");

        // Collapse per-line whitespace, then squeeze blank runs.
        let lines: Vec<String> = text
            .lines()
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        let joined = lines.join("\n");
        self.multi_newline.replace_all(&joined, "\n\n").trim().to_string()
    }
}

impl ContentExtractor for HtmlExtractor {
    fn extract(&self, raw_html: &str) -> Option<ExtractedContent> {
        let body = self.body_text(raw_html);
        if body.is_empty() {
            return None;
        }
        Some(ExtractedContent {
            title: self.metadata_title(raw_html),
            body,
        })
    }
}

//! XML and CSS documents written into the package

use crate::constants::*;
use crate::spine::SpineLayout;
use crate::types::*;
use std::fmt::Write as _;

/// `META-INF/container.xml`, pointing at the package document
pub fn render_container() -> String {
    format!(
        r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
<rootfiles>
<rootfile full-path="{}/{}" media-type="{}"/>
</rootfiles>
</container>"#,
        OEBPS_DIR, OPF_FILE, OPF_MEDIA_TYPE
    )
}

/// Full-bleed stylesheet shared by every page
pub const STYLE_CSS: &str = r#"html, body {
    margin: 0;
    padding: 0;
    width: 100%;
    height: 100%;
    background-color: #000000;
}

body > div {
    margin: 0;
    padding: 0;
    width: 100%;
    height: 100%;
}

img {
    display: block;
    margin: 0 auto;
    padding: 0;
    border: none;

    max-width: 100%;
    max-height: 100%;
    width: auto;
    height: auto;
}
"#;

/// Escape text for use in XML content and attribute values
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Book-level metadata written into `content.opf`
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
    pub book_id: String,
    pub title: String,
    pub creator: String,
    /// `dcterms:modified`, formatted `%Y-%m-%dT%H:%M:%SZ`
    pub modified: String,
    pub reading_direction: ReadingDirection,
    /// Written verbatim
    pub original_resolution: String,
    pub spread_mode: String,
}

/// One fixed-viewport XHTML page; a page without an image renders blank.
pub fn render_page_document(page: &PageDocument) -> String {
    let (title, body_class, body) = match &page.image_file {
        Some(image) => (
            escape_xml(&page.id),
            "single-page",
            format!(
                "<div>\n<img src=\"../{}/{}\" alt=\"\"/>\n</div>",
                IMAGES_DIR,
                escape_xml(image)
            ),
        ),
        None => ("blank".to_string(), "blank-page", "<div></div>".to_string()),
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
<title>{title}</title>
<link href="{css}" type="text/css" rel="stylesheet"/>
<meta name="viewport" content="width={width}, height={height}"/>
</head>
<body class="{body_class}">
{body}
</body>
</html>
"#,
        title = title,
        css = STYLESHEET_FILE,
        width = page.viewport.width,
        height = page.viewport.height,
        body_class = body_class,
        body = body,
    )
}

/// `OEBPS/content.opf`
pub fn render_opf(meta: &PackageMetadata, layout: &SpineLayout) -> String {
    let mut opf = String::new();
    opf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    opf.push_str(
        "<package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\" unique-identifier=\"BookID\">\n",
    );
    opf.push_str(
        "  <metadata xmlns:opf=\"http://www.idpf.org/2007/opf\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n",
    );
    let _ = writeln!(
        opf,
        "    <dc:identifier id=\"BookID\">{}</dc:identifier>",
        escape_xml(&meta.book_id)
    );
    let _ = writeln!(opf, "    <dc:title id=\"id\">{}</dc:title>", escape_xml(&meta.title));
    let _ = writeln!(
        opf,
        "    <dc:creator id=\"id-2\">{}</dc:creator>",
        escape_xml(&meta.creator)
    );
    let _ = writeln!(
        opf,
        "    <meta property=\"dcterms:modified\">{}</meta>",
        meta.modified
    );
    if let Some(cover_id) = &layout.cover_image_id {
        let _ = writeln!(
            opf,
            "    <meta name=\"cover\" content=\"{}\"/>",
            escape_xml(cover_id)
        );
    }

    let hints = [
        ("fixed-layout", "true".to_string()),
        ("original-resolution", escape_xml(&meta.original_resolution)),
        ("book-type", "comic".to_string()),
        (
            "primary-writing-mode",
            meta.reading_direction.primary_writing_mode().to_string(),
        ),
        ("zero-gutter", "true".to_string()),
        ("zero-margin", "true".to_string()),
        ("ke-border-color", "#FFFFFF".to_string()),
        ("ke-border-width", "0".to_string()),
        ("orientation-lock", "none".to_string()),
        ("region-mag", "true".to_string()),
    ];
    for (name, content) in hints {
        let _ = writeln!(opf, "    <meta name=\"{}\" content=\"{}\"/>", name, content);
    }
    let _ = writeln!(
        opf,
        "    <meta property=\"rendition:spread\">{}</meta>",
        escape_xml(&meta.spread_mode)
    );
    opf.push_str("    <meta property=\"rendition:layout\">pre-paginated</meta>\n");
    opf.push_str("  </metadata>\n");

    opf.push_str("  <manifest>\n");
    for item in &layout.manifest {
        let properties = item
            .properties
            .as_deref()
            .map(|p| format!(" properties=\"{}\"", escape_xml(p)))
            .unwrap_or_default();
        let _ = writeln!(
            opf,
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"{}/>",
            escape_xml(&item.id),
            escape_xml(&item.href),
            item.media_type,
            properties
        );
    }
    opf.push_str("  </manifest>\n");

    let _ = writeln!(
        opf,
        "  <spine page-progression-direction=\"{}\" toc=\"ncx\">",
        meta.reading_direction
    );
    for entry in &layout.spine {
        let _ = writeln!(
            opf,
            "    <itemref idref=\"{}\" linear=\"yes\" properties=\"page-spread-{}\"/>",
            escape_xml(&entry.idref),
            entry.spread.as_str()
        );
    }
    opf.push_str("  </spine>\n");
    opf.push_str("</package>\n");
    opf
}

/// `OEBPS/toc.ncx` with one navigation point per page file, in the given order
pub fn render_ncx(book_id: &str, title: &str, page_files: &[String]) -> String {
    let mut ncx = String::new();
    ncx.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    ncx.push_str(
        "<ncx version=\"2005-1\" xml:lang=\"en-US\" xmlns=\"http://www.daisy.org/z3986/2005/ncx/\">\n",
    );
    ncx.push_str("  <head>\n");
    let _ = writeln!(
        ncx,
        "    <meta name=\"dtb:uid\" content=\"{}\"/>",
        escape_xml(book_id)
    );
    ncx.push_str("    <meta name=\"dtb:depth\" content=\"1\"/>\n");
    ncx.push_str("    <meta name=\"dtb:totalPageCount\" content=\"0\"/>\n");
    ncx.push_str("    <meta name=\"dtb:maxPageNumber\" content=\"0\"/>\n");
    ncx.push_str("    <meta name=\"generated\" content=\"true\"/>\n");
    ncx.push_str("  </head>\n");
    let _ = writeln!(ncx, "  <docTitle><text>{}</text></docTitle>", escape_xml(title));
    ncx.push_str("  <navMap>\n");
    for (idx, file) in page_files.iter().enumerate() {
        let order = idx + 1;
        let _ = writeln!(ncx, "    <navPoint id=\"navPoint-{0}\" playOrder=\"{0}\">", order);
        let _ = writeln!(ncx, "      <navLabel><text>Page {}</text></navLabel>", order);
        let _ = writeln!(
            ncx,
            "      <content src=\"{}/{}\"/>",
            TEXT_DIR,
            escape_xml(file)
        );
        ncx.push_str("    </navPoint>\n");
    }
    ncx.push_str("  </navMap>\n");
    ncx.push_str("</ncx>\n");
    ncx
}

/// `OEBPS/nav.xhtml`; the table of contents and page list both point at
/// `first_page`.
pub fn render_nav(title: &str, first_page: Option<&str>) -> String {
    let title = escape_xml(title);
    let entry = first_page
        .map(|file| {
            format!(
                "<li><a href=\"{}/{}\">{}</a></li>\n",
                TEXT_DIR,
                escape_xml(file),
                title
            )
        })
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
<title>{title}</title>
<meta charset="utf-8"/>
</head>
<body>
<nav xmlns:epub="http://www.idpf.org/2007/ops" epub:type="toc" id="toc">
<ol>
{entry}</ol>
</nav>
<nav epub:type="page-list">
<ol>
{entry}</ol>
</nav>
</body>
</html>"#,
        title = title,
        entry = entry,
    )
}

//! The pre-deployment check battery.
//!
//! Each check walks the site snapshot and records findings against the
//! shared [`AuditReport`]. The tool registry is the source of truth for
//! which pages must exist and what limits they advertise. Blocking class
//! per finding follows what has actually broken production before: dead
//! links, wrong canonicals, unpinned FFmpeg builds, and missing ad guards
//! are errors; softer SEO drift stays a warning.

use once_cell::sync::Lazy;
use regex::Regex;

use turbocheck_common::{ConversionFlow, ToolRegistry};

use crate::report::AuditReport;
use crate::site::SiteSnapshot;

/// AdSense client expected on every public page.
pub const ADSENSE_CLIENT: &str = "ca-pub-6238323731269830";
/// FFmpeg build the audio/video pages must pin.
pub const FFMPEG_VERSION: &str = "@ffmpeg/ffmpeg@0.11.6";
pub const FFMPEG_CORE: &str = "@ffmpeg/core@0.11.0";
/// Canonical origin of the deployed site.
pub const CANONICAL_ORIGIN: &str = "https://turboconvert.io";

/// Pages that advertise the landing-page hand-off and must carry the
/// store read-back.
const PAGES_WITH_STORE_HANDOFF: &[&str] = &[
    "compress-pdf",
    "merge-pdf",
    "split-pdf",
    "rotate-pdf",
    "pdf-to-jpg",
    "pdf-to-word",
    "jpg-to-pdf",
    "compress-image",
    "mp4-to-mp3",
    "mp3-to-wav",
    "wav-to-mp3",
    "mp3-to-mp4",
];

/// Navigation links that are not tool pages.
const NON_TOOL_LINKS: &[&str] = &["/", "/blog", "/privacy", "/terms", "/contact"];

static HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="(/[a-z0-9#-]+)""#).expect("static regex"));
static FILE_INPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<input[^>]+type=["']file["'][^>]*>"#).expect("static regex"));
static DOWNLOAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\.download\s*=|URL\.createObjectURL|href.*blob:|download.*btn|btn.*download)")
        .expect("static regex")
});
static CONVERSION_SIGNAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"FileReader|canvas\.|pdf-lib|pdfjsLib|mammoth|FFmpeg|createFFmpeg|heic2any|drawImage|toBlob|toDataURL|getDocument|PDFDocument|Worker|WebAssembly|wasm",
    )
    .expect("static regex")
});
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<title>(.*?)</title>").expect("static regex"));
static META_DESC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<meta name="description" content="([^"]*)""#).expect("static regex"));
static CANONICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<link rel="canonical" href="([^"]+)""#).expect("static regex"));
static DISPLAYED_LIMIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*M[Bo]").expect("static regex"));
static JS_LIMIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*\*\s*1024\s*\*\s*1024").expect("static regex"));
static SITEMAP_LOC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<loc>(.*?)</loc>").expect("static regex"));
static IDB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"indexedDB|IndexedDB|openDB|idb\.").expect("static regex"));
static DOUBLE_TRIGGER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)zone\.addEventListener\(['"]click['"],\s*(?:\(\)|function\s*\(\))\s*(?:=>|\{)\s*(?:inp|input|fileInput)\.click\(\)"#,
    )
    .expect("static regex")
});
static HTML_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"));
// Whole-line comments only; a `//` inside a URL is not a comment.
static LINE_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*//[^\n]*").expect("static regex"));

/// Run the whole battery.
pub fn run_all(site: &SiteSnapshot, registry: &ToolRegistry) -> AuditReport {
    let mut report = AuditReport::default();
    homepage_links(site, registry, &mut report);
    tool_pages_are_tools(site, registry, &mut report);
    file_input_present(site, registry, &mut report);
    upload_input_hidden(site, &mut report);
    download_mechanism(site, registry, &mut report);
    conversion_logic_signals(site, registry, &mut report);
    ffmpeg_pins(site, registry, &mut report);
    size_limit_consistency(site, registry, &mut report);
    og_tags(site, &mut report);
    title_and_meta_lengths(site, &mut report);
    canonical_exact(site, registry, &mut report);
    blog_canonicals(site, &mut report);
    schema_inline(site, registry, &mut report);
    adsense(site, &mut report);
    store_handoff_presence(site, &mut report);
    sitemap(site, registry, &mut report);
    llms_txt(site, &mut report);
    placeholder_links(site, registry, &mut report);
    double_upload_trigger(site, &mut report);
    no_duplicate_pages(site, &mut report);
    report
}

fn page_name(slug: &str) -> String {
    format!("{slug}.html")
}

/// Every homepage tool link resolves to an existing page; anchors are dead.
pub fn homepage_links(site: &SiteSnapshot, registry: &ToolRegistry, report: &mut AuditReport) {
    let Some(index) = site.get("index.html") else {
        report.fail("index.html", "file missing");
        return;
    };

    let mut hrefs: Vec<&str> = HREF_RE
        .captures_iter(index)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|h| !NON_TOOL_LINKS.contains(h))
        .collect();
    hrefs.sort_unstable();
    hrefs.dedup();

    for href in &hrefs {
        if href.starts_with("/#") {
            report.fail("index.html", format!("anchor link instead of a page: {href}"));
            continue;
        }
        let slug = href.trim_start_matches('/');
        if site.contains(&page_name(slug)) {
            report.ok();
        } else {
            report.fail(
                "index.html",
                format!("dead link: {href} → {slug}.html missing"),
            );
        }
    }

    for slug in registry.slugs() {
        if !hrefs.contains(&format!("/{slug}").as_str()) {
            report.warn("index.html", format!("expected page not linked: /{slug}"));
        }
    }
}

/// A tool page must not be a blog article wearing a tool URL.
pub fn tool_pages_are_tools(site: &SiteSnapshot, registry: &ToolRegistry, report: &mut AuditReport) {
    for slug in registry.slugs() {
        let name = page_name(slug);
        let Some(content) = site.get(&name) else {
            report.fail(&name, "file missing");
            continue;
        };
        let canonical_to_blog = CANONICAL_RE
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().contains(&format!("/blog/{slug}")))
            .unwrap_or(false);
        if content.contains("← Blog") || canonical_to_blog {
            report.fail(
                &name,
                format!("blog article instead of a tool page (canonical points at /blog/{slug})"),
            );
        } else {
            report.ok();
        }
    }
}

/// Upload is impossible without a file input.
pub fn file_input_present(site: &SiteSnapshot, registry: &ToolRegistry, report: &mut AuditReport) {
    for slug in registry.slugs() {
        let name = page_name(slug);
        let Some(content) = site.get(&name) else { continue };
        if FILE_INPUT_RE.is_match(content) {
            report.ok();
        } else {
            report.fail(&name, "no <input type=\"file\"> found — upload impossible");
        }
    }
}

/// File inputs inside upload zones must be visually hidden, or the native
/// browser button shows through.
pub fn upload_input_hidden(site: &SiteSnapshot, report: &mut AuditReport) {
    for (name, content) in site.html_pages() {
        if !content.contains("uploadZone") && !content.contains("detector-zone") {
            report.ok();
            continue;
        }
        let exposed = FILE_INPUT_RE.find_iter(content).any(|m| {
            let tag = m.as_str();
            !(tag.contains("opacity:0")
                || tag.contains("display:none")
                || tag.contains("visibility:hidden"))
        });
        if exposed {
            report.fail(name, "visible input[type=file] inside an upload zone");
        } else {
            report.ok();
        }
    }
}

/// A download mechanism should be detectable on every tool page.
pub fn download_mechanism(site: &SiteSnapshot, registry: &ToolRegistry, report: &mut AuditReport) {
    for slug in registry.slugs() {
        let name = page_name(slug);
        let Some(content) = site.get(&name) else { continue };
        if DOWNLOAD_RE.is_match(content) {
            report.ok();
        } else {
            report.warn(&name, "no download mechanism detected — verify manually");
        }
    }
}

/// Real conversion logic, not a fake loader.
pub fn conversion_logic_signals(
    site: &SiteSnapshot,
    registry: &ToolRegistry,
    report: &mut AuditReport,
) {
    for slug in registry.slugs() {
        let name = page_name(slug);
        let Some(content) = site.get(&name) else { continue };
        if CONVERSION_SIGNAL_RE.is_match(content) {
            report.ok();
        } else {
            report.warn(&name, "no conversion logic detected — possible fake loader");
        }
    }
}

fn strip_comments(content: &str) -> String {
    let without_html = HTML_COMMENT_RE.replace_all(content, "");
    LINE_COMMENT_RE.replace_all(&without_html, "").into_owned()
}

/// FFmpeg pages: pinned versions, no unpkg (Worker CORS), no
/// SharedArrayBuffer (COOP/COEP), and the MP3 encoder where needed.
pub fn ffmpeg_pins(site: &SiteSnapshot, registry: &ToolRegistry, report: &mut AuditReport) {
    for tool in registry.iter().filter(|t| t.flow == ConversionFlow::AcceptOnly) {
        let name = page_name(tool.slug);
        let Some(raw) = site.get(&name) else {
            report.fail(&name, "file missing");
            continue;
        };
        let code = strip_comments(raw);

        if raw.contains(FFMPEG_VERSION) {
            report.ok();
        } else {
            report.fail(&name, format!("wrong FFmpeg version — must be {FFMPEG_VERSION}"));
        }
        if raw.contains(FFMPEG_CORE) {
            report.ok();
        } else {
            report.fail(&name, format!("missing corePath {FFMPEG_CORE}"));
        }
        if code.contains("unpkg.com") {
            report.fail(&name, "uses unpkg.com — Worker CORS errors; use jsdelivr.net");
        } else {
            report.ok();
        }
        if code.contains("SharedArrayBuffer") {
            report.fail(&name, "uses SharedArrayBuffer — COOP/COEP issues");
        } else {
            report.ok();
        }
        if tool.output_format == "MP3" {
            if code.contains("libmp3lame") {
                report.ok();
            } else {
                report.fail(&name, "missing codec: libmp3lame (required for MP3 encoding)");
            }
        }
        if !code.contains("catch") && !code.to_lowercase().contains("onerror") {
            report.warn(&name, "error handling may be incomplete");
        }
    }
}

/// The limit a page displays must match the limit the registry (and the
/// page's own JS) enforces.
pub fn size_limit_consistency(
    site: &SiteSnapshot,
    registry: &ToolRegistry,
    report: &mut AuditReport,
) {
    for tool in registry.iter() {
        let name = page_name(tool.slug);
        let Some(content) = site.get(&name) else { continue };
        let expected = tool.size_limit_mb;

        if let Some(displayed) = DISPLAYED_LIMIT_RE
            .captures(content)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
        {
            if displayed == expected {
                report.ok();
            } else {
                report.warn(
                    &name,
                    format!("displayed limit {displayed} MB ≠ expected {expected} MB"),
                );
            }
        }

        for capture in JS_LIMIT_RE.captures_iter(content) {
            if let Some(value) = capture.get(1).and_then(|m| m.as_str().parse::<u64>().ok()) {
                if value != expected {
                    report.warn(
                        &name,
                        format!("JS limit {value} MB ≠ displayed limit {expected} MB"),
                    );
                    break;
                }
            }
        }
    }
}

/// Open Graph coverage. A missing og:image on a monetized page degrades
/// social sharing and is blocking.
pub fn og_tags(site: &SiteSnapshot, report: &mut AuditReport) {
    const REQUIRED: &[&str] = &["og:title", "og:description", "og:url", "og:image"];
    for (name, content) in site.html_pages() {
        if matches!(name, "privacy.html" | "terms.html") {
            continue;
        }
        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|t| !content.contains(t))
            .collect();
        if missing.is_empty() {
            report.ok();
        } else if missing.contains(&"og:image") && content.contains("adsbygoogle") {
            report.fail(name, "og:image missing on a monetized page");
        } else {
            report.warn(name, format!("OG tag missing: {}", missing[0]));
        }
    }
}

/// Title and meta-description length windows.
pub fn title_and_meta_lengths(site: &SiteSnapshot, report: &mut AuditReport) {
    for (name, content) in site.html_pages() {
        match TITLE_RE.captures(content).and_then(|c| c.get(1)) {
            None => report.warn(name, "missing <title>"),
            Some(m) => {
                let title = m.as_str().trim();
                if title.len() > 70 {
                    report.warn(name, format!("title too long ({} chars)", title.len()));
                } else if title.len() < 20 {
                    report.warn(name, format!("title too short ({} chars)", title.len()));
                } else {
                    report.ok();
                }
            }
        }

        let base = name.rsplit('/').next().unwrap_or(name);
        if matches!(base, "privacy.html" | "terms.html") {
            continue;
        }
        match META_DESC_RE.captures(content).and_then(|c| c.get(1)) {
            None => report.warn(name, "missing meta description"),
            Some(m) => {
                let desc = m.as_str();
                if desc.len() < 80 {
                    report.fail(name, format!("meta description too short ({} chars < 80)", desc.len()));
                } else if desc.len() > 162 {
                    report.warn(name, format!("meta description too long ({} chars)", desc.len()));
                } else {
                    report.ok();
                }
            }
        }
    }
}

/// Tool-page canonicals must be exact.
pub fn canonical_exact(site: &SiteSnapshot, registry: &ToolRegistry, report: &mut AuditReport) {
    for slug in registry.slugs() {
        let name = page_name(slug);
        let Some(content) = site.get(&name) else { continue };
        match CANONICAL_RE.captures(content).and_then(|c| c.get(1)) {
            None => report.warn(&name, "missing canonical"),
            Some(m) => {
                let expected = format!("{CANONICAL_ORIGIN}/{slug}");
                if m.as_str() == expected {
                    report.ok();
                } else {
                    report.fail(
                        &name,
                        format!("canonical incorrect: \"{}\" ≠ \"{expected}\"", m.as_str()),
                    );
                }
            }
        }
    }
}

/// Blog articles canonicalize under /blog/, not the root.
pub fn blog_canonicals(site: &SiteSnapshot, report: &mut AuditReport) {
    for (name, content) in site.blog_pages() {
        let slug = name.trim_end_matches(".html");
        match CANONICAL_RE.captures(content).and_then(|c| c.get(1)) {
            None => report.warn(name, "missing canonical"),
            Some(m) => {
                let expected = format!("{CANONICAL_ORIGIN}/{slug}");
                if m.as_str() == expected {
                    report.ok();
                } else {
                    report.fail(
                        name,
                        format!("canonical incorrect: \"{}\" ≠ \"{expected}\"", m.as_str()),
                    );
                }
            }
        }
    }
}

/// Structured data must be inline; crawlers do not reliably execute an
/// injector script.
pub fn schema_inline(site: &SiteSnapshot, registry: &ToolRegistry, report: &mut AuditReport) {
    for slug in registry.slugs() {
        let name = page_name(slug);
        let Some(content) = site.get(&name) else { continue };
        let has_inline = content.contains("application/ld+json");
        if !has_inline && !content.contains("WebApplication") {
            report.fail(&name, "schema not inline — crawlers may never see it");
            continue;
        }
        if !content.contains("WebApplication") {
            report.warn(&name, "WebApplication schema missing");
        }
        if content.contains("FAQPage") {
            report.ok();
        } else {
            report.warn(&name, "FAQPage schema missing");
        }
    }

    for (name, content) in site.blog_pages() {
        if content.contains("BreadcrumbList") {
            report.ok();
        } else {
            report.warn(name, "BreadcrumbList schema missing on blog article");
        }
    }

    if let Some(index) = site.get("index.html") {
        if index.contains("application/ld+json") {
            report.ok();
        } else {
            report.fail("index.html", "no inline ld+json schema on the homepage");
        }
    }
}

/// AdSense snippet on public pages; the guard script wherever ads render.
pub fn adsense(site: &SiteSnapshot, report: &mut AuditReport) {
    for (name, content) in site.html_pages() {
        let base = name.rsplit('/').next().unwrap_or(name);
        if matches!(base, "privacy.html" | "terms.html") {
            continue;
        }
        if content.contains(ADSENSE_CLIENT) {
            report.ok();
        } else {
            report.warn(name, format!("AdSense snippet ({ADSENSE_CLIENT}) absent"));
        }
        if content.contains("adsbygoogle") {
            if content.contains("adsense-guard") {
                report.ok();
            } else {
                report.fail(name, "adsense-guard.js absent — empty slots stay visible");
            }
        }
    }
}

/// Pages advertising the hand-off must read the persistent store.
pub fn store_handoff_presence(site: &SiteSnapshot, report: &mut AuditReport) {
    for slug in PAGES_WITH_STORE_HANDOFF {
        let name = page_name(slug);
        let Some(content) = site.get(&name) else { continue };
        if IDB_RE.is_match(content) {
            report.ok();
        } else {
            report.warn(&name, "store hand-off missing — detector uploads will not transfer");
        }
    }
}

/// Sitemap coverage, dead URLs, duplicates.
pub fn sitemap(site: &SiteSnapshot, registry: &ToolRegistry, report: &mut AuditReport) {
    let Some(sitemap) = site.get("sitemap.xml") else {
        report.warn("sitemap.xml", "file missing");
        return;
    };

    for slug in registry.slugs() {
        if sitemap.contains(&format!("/{slug}")) {
            report.ok();
        } else {
            report.warn("sitemap.xml", format!("tool page absent: /{slug}"));
        }
    }

    let mut seen = std::collections::BTreeSet::new();
    for capture in SITEMAP_LOC_RE.captures_iter(sitemap) {
        let Some(url) = capture.get(1).map(|m| m.as_str()) else { continue };
        if !seen.insert(url) {
            report.fail("sitemap.xml", format!("duplicate URL: {url}"));
            continue;
        }
        let slug = url
            .trim_start_matches(CANONICAL_ORIGIN)
            .trim_matches('/');
        if slug.is_empty() || slug == "blog" {
            report.ok();
            continue;
        }
        if site.contains(&page_name(slug)) {
            report.ok();
        } else {
            report.fail("sitemap.xml", format!("dead URL: {url} → {slug}.html missing"));
        }
    }
}

/// llms.txt documents the flagship tools.
pub fn llms_txt(site: &SiteSnapshot, report: &mut AuditReport) {
    let Some(llms) = site.get("llms.txt") else {
        report.warn("llms.txt", "file missing — reduced AI visibility");
        return;
    };
    for slug in ["compress-pdf", "merge-pdf", "mp4-to-mp3"] {
        if llms.contains(slug) {
            report.ok();
        } else {
            report.warn("llms.txt", format!("tool not documented: {slug}"));
        }
    }
}

/// No void links or leftover TODO markers on tool pages. `href="#"` is
/// accepted, since download buttons rewrite it dynamically.
pub fn placeholder_links(site: &SiteSnapshot, registry: &ToolRegistry, report: &mut AuditReport) {
    for slug in registry.slugs() {
        let name = page_name(slug);
        let Some(content) = site.get(&name) else { continue };
        if content.contains(r#"href="javascript:void(0)""#) {
            report.warn(&name, "javascript:void(0) link");
        } else if content.contains("TODO") {
            report.warn(&name, "leftover TODO marker");
        } else {
            report.ok();
        }
    }
}

/// Zone click-through plus an input overlay opens the picker twice on
/// Safari/Firefox.
pub fn double_upload_trigger(site: &SiteSnapshot, report: &mut AuditReport) {
    for (name, content) in site.html_pages() {
        if DOUBLE_TRIGGER_RE.is_match(content) {
            report.fail(name, "double upload trigger — picker opens twice");
        } else {
            report.ok();
        }
    }
}

/// No page duplicated between the root and /blog/.
pub fn no_duplicate_pages(site: &SiteSnapshot, report: &mut AuditReport) {
    const BLOG_ONLY: &[&str] = &[
        "how-to-compress-pdf.html",
        "how-to-convert-pdf-to-word.html",
        "how-to-merge-pdf.html",
        "how-to-reduce-image-size.html",
        "how-to-rotate-pdf.html",
        "how-to-split-pdf.html",
        "best-free-pdf-tools.html",
    ];
    for name in BLOG_ONLY {
        if site.contains(name) {
            report.fail(*name, "article duplicated at the root — must live under /blog/ only");
        } else {
            report.ok();
        }
    }

    for (name, content) in site.blog_pages() {
        if content.contains("uploadZone") || content.contains("fileInput") {
            report.fail(name, "tool page duplicated under /blog/ — duplicate content");
        } else {
            report.ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteSnapshot;
    use turbocheck_common::ToolRegistry;

    fn compliant_tool_page(slug: &str) -> String {
        format!(
            r#"<!doctype html><html><head>
<title>{slug} — Free Online Converter</title>
<meta name="description" content="Convert files with the {slug} tool online for free. Fast, private, fully in your browser with no signup or upload required.">
<link rel="canonical" href="https://turboconvert.io/{slug}">
<meta property="og:title" content="x"><meta property="og:description" content="x">
<meta property="og:url" content="x"><meta property="og:image" content="x">
<script type="application/ld+json">{{"@type":"WebApplication"}}</script>
<script type="application/ld+json">{{"@type":"FAQPage"}}</script>
<script async src="https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client={client}"></script>
<script src="/adsense-guard.js"></script>
</head><body>
<div class="uploadZone" id="zone"></div>
<input type="file" id="inp" style="opacity:0">
<script>
const LIMIT = 100 * 1024 * 1024; // 100 MB
const reader = new FileReader();
const a = document.createElement('a'); a.download = 'out';
URL.createObjectURL(new Blob([]));
indexedDB.open('turboconvert', 1);
</script>
</body></html>"#,
            slug = slug,
            client = ADSENSE_CLIENT,
        )
    }

    fn site_with(pages: Vec<(&str, String)>) -> SiteSnapshot {
        SiteSnapshot::from_pages(pages)
    }

    #[test]
    fn compliant_tool_page_produces_no_errors() {
        let site = site_with(vec![("compress-pdf.html", compliant_tool_page("compress-pdf"))]);
        let mut report = AuditReport::default();
        canonical_exact(&site, ToolRegistry::builtin(), &mut report);
        file_input_present(&site, ToolRegistry::builtin(), &mut report);
        upload_input_hidden(&site, &mut report);
        size_limit_consistency(&site, ToolRegistry::builtin(), &mut report);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
    }

    #[test]
    fn homepage_anchor_and_dead_links_are_errors() {
        let index = r##"<html><body>
<a href="/compress-pdf">ok</a>
<a href="/#tools">anchor</a>
<a href="/gif-maker">dead</a>
</body></html>"##;
        let site = site_with(vec![
            ("index.html", index.to_string()),
            ("compress-pdf.html", compliant_tool_page("compress-pdf")),
        ]);
        let mut report = AuditReport::default();
        homepage_links(&site, ToolRegistry::builtin(), &mut report);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors.iter().any(|f| f.message.contains("anchor")));
        assert!(report.errors.iter().any(|f| f.message.contains("gif-maker")));
    }

    #[test]
    fn wrong_canonical_blocks_deployment() {
        let page = compliant_tool_page("compress-pdf")
            .replace("/compress-pdf\"", "/blog/compress-pdf\"");
        let site = site_with(vec![("compress-pdf.html", page)]);
        let mut report = AuditReport::default();
        canonical_exact(&site, ToolRegistry::builtin(), &mut report);
        assert!(report.blocked());
    }

    #[test]
    fn ffmpeg_page_without_pins_fails() {
        let mut page = compliant_tool_page("mp4-to-mp3");
        page.push_str("<script src='https://unpkg.com/@ffmpeg/ffmpeg@0.12.0'></script>");
        let site = site_with(vec![("mp4-to-mp3.html", page)]);
        let mut report = AuditReport::default();
        ffmpeg_pins(&site, ToolRegistry::builtin(), &mut report);
        let messages: Vec<&str> = report.errors.iter().map(|f| f.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("0.11.6")));
        assert!(messages.iter().any(|m| m.contains("unpkg.com")));
        assert!(messages.iter().any(|m| m.contains("libmp3lame")));
    }

    #[test]
    fn pinned_ffmpeg_page_passes() {
        let mut page = compliant_tool_page("wav-to-mp3");
        page.push_str(&format!(
            "<script src='https://cdn.jsdelivr.net/npm/{FFMPEG_VERSION}/dist/ffmpeg.min.js'></script>\
             <script>createFFmpeg({{ corePath: 'https://cdn.jsdelivr.net/npm/{FFMPEG_CORE}/dist/ffmpeg-core.js' }});\
             run('-acodec', 'libmp3lame'); try {{}} catch (e) {{}}</script>"
        ));
        let site = site_with(vec![("wav-to-mp3.html", page)]);
        let mut report = AuditReport::default();
        ffmpeg_pins(&site, ToolRegistry::builtin(), &mut report);
        let wav_errors: Vec<_> = report
            .errors
            .iter()
            .filter(|f| f.page == "wav-to-mp3.html")
            .collect();
        assert!(wav_errors.is_empty(), "{wav_errors:?}");
    }

    #[test]
    fn size_limit_mismatch_is_flagged() {
        let page = compliant_tool_page("compress-pdf").replace("100 * 1024", "200 * 1024");
        let site = site_with(vec![("compress-pdf.html", page)]);
        let mut report = AuditReport::default();
        size_limit_consistency(&site, ToolRegistry::builtin(), &mut report);
        assert!(report
            .warnings
            .iter()
            .any(|f| f.message.contains("200 MB")));
    }

    #[test]
    fn sitemap_duplicates_and_dead_urls_block() {
        let sitemap = r#"<urlset>
<url><loc>https://turboconvert.io/compress-pdf</loc></url>
<url><loc>https://turboconvert.io/compress-pdf</loc></url>
<url><loc>https://turboconvert.io/gone-tool</loc></url>
</urlset>"#;
        let site = site_with(vec![
            ("sitemap.xml", sitemap.to_string()),
            ("compress-pdf.html", compliant_tool_page("compress-pdf")),
        ]);
        let mut report = AuditReport::default();
        super::sitemap(&site, ToolRegistry::builtin(), &mut report);
        assert!(report.errors.iter().any(|f| f.message.contains("duplicate")));
        assert!(report.errors.iter().any(|f| f.message.contains("gone-tool")));
    }

    #[test]
    fn missing_ad_guard_on_monetized_page_blocks() {
        let page = compliant_tool_page("compress-pdf").replace("adsense-guard", "other-script");
        let site = site_with(vec![("compress-pdf.html", page)]);
        let mut report = AuditReport::default();
        adsense(&site, &mut report);
        assert!(report.blocked());
    }

    #[test]
    fn double_trigger_pattern_is_caught() {
        let page = format!(
            "{}<script>zone.addEventListener('click', () => inp.click());</script>",
            compliant_tool_page("compress-pdf")
        );
        let site = site_with(vec![("compress-pdf.html", page)]);
        let mut report = AuditReport::default();
        double_upload_trigger(&site, &mut report);
        assert!(report.blocked());
    }

    #[test]
    fn tool_page_copied_into_blog_is_duplicate_content() {
        let site = site_with(vec![(
            "blog/compress-pdf.html",
            compliant_tool_page("compress-pdf"),
        )]);
        let mut report = AuditReport::default();
        no_duplicate_pages(&site, &mut report);
        assert!(report.blocked());
    }

    #[test]
    fn short_meta_description_blocks() {
        let page = compliant_tool_page("compress-pdf").replace(
            r#"content="Convert files with the compress-pdf tool online for free. Fast, private, fully in your browser with no signup or upload required.""#,
            r#"content="Too short.""#,
        );
        let site = site_with(vec![("compress-pdf.html", page)]);
        let mut report = AuditReport::default();
        title_and_meta_lengths(&site, &mut report);
        assert!(report.blocked());
    }

    #[test]
    fn run_all_on_empty_site_reports_missing_pages() {
        let site = SiteSnapshot::from_pages(Vec::<(&str, &str)>::new());
        let report = run_all(&site, ToolRegistry::builtin());
        assert!(report.blocked());
        assert!(report
            .errors
            .iter()
            .any(|f| f.page == "index.html" && f.message.contains("missing")));
    }
}

//! End-to-end audit flow over a synthetic site build.

use std::io::Write;

use turbocheck_audit::checks::{self, ADSENSE_CLIENT, FFMPEG_CORE, FFMPEG_VERSION};
use turbocheck_audit::schema;
use turbocheck_audit::SiteSnapshot;
use turbocheck_common::ToolRegistry;

fn tool_page(slug: &str, limit_mb: u64, ffmpeg: bool) -> String {
    let ffmpeg_block = if ffmpeg {
        format!(
            "<script src='https://cdn.jsdelivr.net/npm/{FFMPEG_VERSION}/dist/ffmpeg.min.js'></script>\n\
             <script>const ff = createFFmpeg({{ corePath: 'https://cdn.jsdelivr.net/npm/{FFMPEG_CORE}/dist/ffmpeg-core.js' }});\n\
             try {{ ff.run('-acodec', 'libmp3lame'); }} catch (e) {{ console.error(e); }}</script>"
        )
    } else {
        String::new()
    };
    format!(
        r#"<!doctype html><html><head>
<title>{slug} — Free Online Tool by TurboConvert</title>
<meta name="description" content="Use the {slug} tool online for free. Conversion runs fully in your browser, files never leave your device, and no signup is required.">
<link rel="canonical" href="https://turboconvert.io/{slug}">
<meta property="og:title" content="t"><meta property="og:description" content="d">
<meta property="og:url" content="u"><meta property="og:image" content="i">
<script async src="https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client={ADSENSE_CLIENT}"></script>
<script src="/adsense-guard.js"></script>
<script type="application/ld+json">{{"@graph":[{{"@type":"WebApplication"}},{{"@type":"FAQPage"}}]}}</script>
</head><body>
<div class="uploadZone" id="zone"><input type="file" id="inp" style="opacity:0"></div>
<script>
const LIMIT = {limit_mb} * 1024 * 1024; // shown as {limit_mb} MB
const reader = new FileReader();
const out = document.createElement('a'); out.download = 'converted';
URL.createObjectURL(new Blob([]));
indexedDB.open('turboconvert', 1);
</script>
{ffmpeg_block}
</body></html>"#
    )
}

fn build_site() -> SiteSnapshot {
    let registry = ToolRegistry::builtin();
    let mut pages: Vec<(String, String)> = Vec::new();

    let links: String = registry
        .slugs()
        .map(|slug| format!("<a href=\"/{slug}\">{slug}</a>\n"))
        .collect();
    pages.push((
        "index.html".to_string(),
        format!(
            r#"<!doctype html><html><head>
<title>TurboConvert — Free Online File Conversion</title>
<meta name="description" content="Convert PDF, image, audio and document files online for free. Everything runs in your browser; nothing is ever uploaded to a server.">
<meta property="og:title" content="t"><meta property="og:description" content="d">
<meta property="og:url" content="u"><meta property="og:image" content="i">
<script async src="https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client={ADSENSE_CLIENT}"></script>
<script src="/adsense-guard.js"></script>
<script type="application/ld+json">{{"@type":"WebSite"}}</script>
</head><body><div class="detector-zone"><input type="file" id="detectorInput" style="opacity:0"></div>
{links}</body></html>"#
        ),
    ));

    for tool in registry.iter() {
        let ffmpeg = matches!(
            tool.slug,
            "mp4-to-mp3" | "wav-to-mp3" | "mp3-to-wav" | "mp3-to-mp4"
        );
        pages.push((
            format!("{}.html", tool.slug),
            tool_page(tool.slug, tool.size_limit_mb, ffmpeg),
        ));
    }

    let sitemap_urls: String = std::iter::once("https://turboconvert.io/".to_string())
        .chain(
            registry
                .slugs()
                .map(|slug| format!("https://turboconvert.io/{slug}")),
        )
        .map(|url| format!("<url><loc>{url}</loc></url>\n"))
        .collect();
    pages.push((
        "sitemap.xml".to_string(),
        format!("<urlset>\n{sitemap_urls}</urlset>"),
    ));
    pages.push((
        "llms.txt".to_string(),
        "compress-pdf merge-pdf mp4-to-mp3".to_string(),
    ));

    SiteSnapshot::from_pages(pages)
}

#[test]
fn compliant_site_is_not_blocked() {
    let report = checks::run_all(&build_site(), ToolRegistry::builtin());
    assert!(!report.blocked(), "unexpected errors: {:?}", report.errors);
    assert!(report.passed > 100);
}

#[test]
fn removing_a_page_cascades_into_errors() {
    let registry = ToolRegistry::builtin();
    let mut pages: Vec<(String, String)> = build_site()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    pages.retain(|(name, _)| name != "merge-pdf.html");
    let site = SiteSnapshot::from_pages(pages);

    let report = checks::run_all(&site, registry);
    assert!(report.blocked());
    // the homepage link went dead and the sitemap URL now points nowhere
    assert!(report
        .errors
        .iter()
        .any(|f| f.page == "index.html" && f.message.contains("merge-pdf")));
    assert!(report
        .errors
        .iter()
        .any(|f| f.page == "sitemap.xml" && f.message.contains("merge-pdf")));
}

#[test]
fn audit_reads_the_shipped_zip_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("site.zip");
    let file = std::fs::File::create(&archive_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in build_site().iter() {
        writer.start_file(name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();

    let site = SiteSnapshot::load(&archive_path).unwrap();
    let report = checks::run_all(&site, ToolRegistry::builtin());
    assert!(!report.blocked(), "unexpected errors: {:?}", report.errors);
}

#[test]
fn schema_injection_then_audit_passes_the_inline_check() {
    let registry = ToolRegistry::builtin();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("rotate-pdf.html"),
        "<html><head><title>Rotate PDF Pages Online Free</title></head><body></body></html>",
    )
    .unwrap();

    schema::inject_dir(dir.path(), registry).unwrap();

    let html = std::fs::read_to_string(dir.path().join("rotate-pdf.html")).unwrap();
    assert!(html.contains("application/ld+json"));
    assert!(html.contains("WebApplication"));
    assert!(html.contains("FAQPage"));
    assert!(html.contains("https://turboconvert.io/rotate-pdf"));
}

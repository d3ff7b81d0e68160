//! Structured-data generation: the schema.org graph for each tool page.
//!
//! Crawlers do not reliably execute injector scripts, so the graph is
//! rendered inline into the page markup before `</head>`. Pages already
//! carrying inline `ld+json` are left untouched, which makes the injector
//! idempotent and safe to run on every deploy.

use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use turbocheck_common::{ToolContract, ToolRegistry};

use crate::checks::CANONICAL_ORIGIN;
use crate::AuditResult;

/// The schema.org `@graph` for one tool page: WebApplication, HowTo,
/// FAQPage, BreadcrumbList.
pub fn build_graph(tool: &ToolContract) -> Value {
    let url = format!("{CANONICAL_ORIGIN}/{}", tool.slug);
    let input = tool.input_format;
    let output = tool.output_format;

    json!({
        "@context": "https://schema.org",
        "@graph": [
            {
                "@type": "WebApplication",
                "@id": format!("{url}#app"),
                "name": tool.display_name,
                "description": tool.description,
                "url": url,
                "applicationCategory": "UtilitiesApplication",
                "operatingSystem": "Any",
                "offers": {
                    "@type": "Offer",
                    "price": "0",
                    "priceCurrency": "USD",
                    "availability": "https://schema.org/InStock"
                },
                "featureList": [
                    format!("Free {input} to {output} conversion"),
                    "No signup required",
                    "SSL encrypted",
                    "Files never leave your device"
                ],
                "publisher": {
                    "@type": "Organization",
                    "name": "TurboConvert",
                    "url": CANONICAL_ORIGIN
                }
            },
            {
                "@type": "HowTo",
                "name": format!("How to convert {input} to {output} online for free"),
                "description": format!("Convert {input} to {output} in 3 steps — free, fast, secure."),
                "totalTime": "PT10S",
                "step": [
                    {
                        "@type": "HowToStep",
                        "position": 1,
                        "name": format!("Upload your {input} file"),
                        "text": format!("Click Select file or drag and drop your {input} file.")
                    },
                    {
                        "@type": "HowToStep",
                        "position": 2,
                        "name": format!("Convert to {output}"),
                        "text": "Click Convert. Your file is processed instantly."
                    },
                    {
                        "@type": "HowToStep",
                        "position": 3,
                        "name": format!("Download your {output}"),
                        "text": "Click Download to save your converted file."
                    }
                ]
            },
            {
                "@type": "FAQPage",
                "mainEntity": [
                    {
                        "@type": "Question",
                        "name": format!("Is this {input} to {output} converter free?"),
                        "acceptedAnswer": {
                            "@type": "Answer",
                            "text": "Yes, TurboConvert is 100% free. No signup, no credit card, no limits."
                        }
                    },
                    {
                        "@type": "Question",
                        "name": "Is my file safe?",
                        "acceptedAnswer": {
                            "@type": "Answer",
                            "text": "Yes. Conversion runs entirely in your browser; files are never uploaded."
                        }
                    },
                    {
                        "@type": "Question",
                        "name": "Do I need software?",
                        "acceptedAnswer": {
                            "@type": "Answer",
                            "text": "No. Works in your browser on any device. No installation needed."
                        }
                    }
                ]
            },
            {
                "@type": "BreadcrumbList",
                "itemListElement": [
                    {
                        "@type": "ListItem",
                        "position": 1,
                        "name": "TurboConvert",
                        "item": CANONICAL_ORIGIN
                    },
                    {
                        "@type": "ListItem",
                        "position": 2,
                        "name": tool.display_name,
                        "item": url
                    }
                ]
            }
        ]
    })
}

/// Render the inline script tag carrying the graph.
pub fn render_script_tag(tool: &ToolContract) -> AuditResult<String> {
    let graph = serde_json::to_string(&build_graph(tool))?;
    Ok(format!(
        "<script type=\"application/ld+json\">{graph}</script>"
    ))
}

/// Inject the graph into a page's markup. Returns `None` when the page
/// already carries inline `ld+json` or has no `</head>` to anchor on.
pub fn inject_into_page(html: &str, tool: &ToolContract) -> AuditResult<Option<String>> {
    if html.contains("application/ld+json") {
        return Ok(None);
    }
    let Some(position) = html.find("</head>") else {
        return Ok(None);
    };
    let tag = render_script_tag(tool)?;
    let mut out = String::with_capacity(html.len() + tag.len() + 1);
    out.push_str(&html[..position]);
    out.push_str(&tag);
    out.push('\n');
    out.push_str(&html[position..]);
    Ok(Some(out))
}

/// Summary of an injection pass over a site directory.
#[derive(Debug, Clone, Default)]
pub struct InjectionSummary {
    pub injected: Vec<String>,
    pub skipped: Vec<String>,
}

/// Rewrite every known tool page under `site_dir` that lacks inline
/// structured data.
pub fn inject_dir(site_dir: &Path, registry: &ToolRegistry) -> AuditResult<InjectionSummary> {
    let mut summary = InjectionSummary::default();
    for tool in registry.iter() {
        let page_path = site_dir.join(format!("{}.html", tool.slug));
        if !page_path.is_file() {
            continue;
        }
        let html = std::fs::read_to_string(&page_path)?;
        match inject_into_page(&html, tool)? {
            Some(updated) => {
                std::fs::write(&page_path, updated)?;
                info!(page = %page_path.display(), "schema injected");
                summary.injected.push(format!("{}.html", tool.slug));
            }
            None => summary.skipped.push(format!("{}.html", tool.slug)),
        }
    }
    Ok(summary)
}

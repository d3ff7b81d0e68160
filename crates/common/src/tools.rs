//! Tool registry: the DOM contract of every TurboConvert tool page.
//!
//! Element identifiers are a versioned contract with the pages themselves;
//! a rename on the page side is a breaking change that must be mirrored here.
//! Two identifier families exist, audited from the page sources: the older
//! pages use `inp`/`frow`/`cbtn`/`dl`, the newer ones
//! `fileInput`/`fileRow`/`convertBtn`/`dlWrap`. Both are expressed through
//! the one canonical [`ToolContract`] shape; the family is only a label
//! derived from the input id.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fixtures::FixtureKind;

/// Default per-file size limit in MB; audio/video pages allow more.
pub const DEFAULT_SIZE_LIMIT_MB: u64 = 100;
/// Size limit for the FFmpeg-backed audio/video pages.
pub const MEDIA_SIZE_LIMIT_MB: u64 = 500;

/// Identifier family a contract belongs to. Purely informational;
/// the runner never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractFamily {
    A,
    B,
}

/// How far the standard suite drives a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionFlow {
    /// Submit a fixture, trigger conversion, wait for the download element.
    Full,
    /// Submit a fixture and stop once it is accepted. Used for the
    /// FFmpeg-backed pages, where a full conversion pulls a ~30MB WASM
    /// bundle per run.
    AcceptOnly,
    /// Only verify the page loads with its upload surface attached.
    PageReady,
}

/// The DOM contract of a single tool page.
#[derive(Debug, Clone, Serialize)]
pub struct ToolContract {
    /// URL slug, e.g. `compress-pdf` for `/compress-pdf`.
    pub slug: &'static str,
    /// The `<input type="file">` element.
    pub input_id: &'static str,
    /// Element that becomes visible once a submitted file is staged.
    /// `None` for pages that reveal nothing before the trigger is clicked:
    /// deliberate per-tool variability, not a defect.
    pub accepted_id: Option<&'static str>,
    /// The control that starts the conversion.
    pub trigger_id: &'static str,
    /// Element that becomes visible once a downloadable result exists.
    pub completion_id: &'static str,
    /// Some pages expose a second success marker (e.g. a "download all"
    /// wrap next to the per-page links); either counts as completion.
    pub alt_completion_id: Option<&'static str>,
    /// Upload size limit in MB, as displayed and enforced by the page.
    pub size_limit_mb: u64,
    /// Fixture submitted by the standard suite, when one is needed.
    pub fixture: Option<FixtureKind>,
    pub flow: ConversionFlow,
    /// Display metadata, also consumed by the structured-data generator.
    pub display_name: &'static str,
    pub description: &'static str,
    pub input_format: &'static str,
    pub output_format: &'static str,
}

impl ToolContract {
    pub fn family(&self) -> ContractFamily {
        if self.input_id == "inp" {
            ContractFamily::A
        } else {
            ContractFamily::B
        }
    }

    /// CSS selector matching any acceptable completion marker.
    pub fn completion_selector(&self) -> String {
        match self.alt_completion_id {
            Some(alt) => format!("#{}, #{}", self.completion_id, alt),
            None => format!("#{}", self.completion_id),
        }
    }

    pub fn page_path(&self) -> String {
        format!("/{}", self.slug)
    }
}

macro_rules! tool {
    ($slug:literal, $inp:literal, $row:expr, $cbtn:literal, $dl:literal, $alt:expr,
     $limit:expr, $fixture:expr, $flow:expr, $name:literal, $desc:literal,
     $from:literal, $to:literal) => {
        ToolContract {
            slug: $slug,
            input_id: $inp,
            accepted_id: $row,
            trigger_id: $cbtn,
            completion_id: $dl,
            alt_completion_id: $alt,
            size_limit_mb: $limit,
            fixture: $fixture,
            flow: $flow,
            display_name: $name,
            description: $desc,
            input_format: $from,
            output_format: $to,
        }
    };
}

use ConversionFlow::{AcceptOnly, Full, PageReady};
use FixtureKind::{Docx, Jpg, Mp3, Pdf, Png, Pptx, Wav, Webp, Xlsx};

#[rustfmt::skip]
static TOOLS: &[ToolContract] = &[
    // PDF tools, family A
    tool!("compress-pdf", "inp", Some("qualityWrap"), "cbtn", "dl", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Pdf), Full,
          "Compress PDF Online Free", "Reduce PDF file size online for free without losing quality.",
          "PDF", "PDF"),
    tool!("pdf-to-jpg", "inp", Some("frow"), "cbtn", "dl", Some("dlAll"),
          DEFAULT_SIZE_LIMIT_MB, Some(Pdf), Full,
          "PDF to JPG Converter", "Convert PDF pages to JPG images online for free.",
          "PDF", "JPG"),
    tool!("merge-pdf", "inp", Some("fileList"), "cbtn", "dl", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Pdf), Full,
          "Merge PDF Files Online", "Combine multiple PDF files into one document for free.",
          "PDF", "PDF"),
    tool!("split-pdf", "inp", None, "cbtn", "dl", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Pdf), Full,
          "Split PDF Online Free", "Split PDF into separate pages online for free.",
          "PDF", "PDF"),
    tool!("rotate-pdf", "inp", None, "cbtn", "dl", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Pdf), Full,
          "Rotate PDF Pages Online", "Rotate PDF pages to fix orientation for free.",
          "PDF", "PDF"),
    tool!("pdf-to-word", "inp", Some("frow"), "cbtn", "dl", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Pdf), Full,
          "PDF to Word Converter", "Convert PDF to editable Word document online for free. No signup needed.",
          "PDF", "DOCX"),

    // Audio/video tools, family A, FFmpeg-backed
    tool!("mp4-to-mp3", "inp", Some("frow"), "cbtn", "dl", None,
          MEDIA_SIZE_LIMIT_MB, Some(Mp3), AcceptOnly,
          "MP4 to MP3 Converter", "Extract audio from MP4 and convert to MP3 online for free. No upload needed.",
          "MP4", "MP3"),
    tool!("wav-to-mp3", "inp", Some("frow"), "cbtn", "dl", None,
          MEDIA_SIZE_LIMIT_MB, Some(Wav), AcceptOnly,
          "WAV to MP3 Converter", "Convert WAV to MP3 online for free. Reduce file size 10x.",
          "WAV", "MP3"),
    tool!("mp3-to-wav", "inp", Some("frow"), "cbtn", "dl", None,
          MEDIA_SIZE_LIMIT_MB, Some(Mp3), AcceptOnly,
          "MP3 to WAV Converter", "Convert MP3 to WAV online for free. Perfect for audio editing.",
          "MP3", "WAV"),
    tool!("mp3-to-mp4", "inp", Some("frow"), "cbtn", "dl", None,
          MEDIA_SIZE_LIMIT_MB, Some(Mp3), AcceptOnly,
          "MP3 to MP4 Converter", "Convert MP3 to MP4 video online for free. Upload to YouTube.",
          "MP3", "MP4"),

    // Image tools, family B
    tool!("compress-image", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Jpg), Full,
          "Compress Image Online Free", "Compress images online for free without quality loss.",
          "Image", "Image"),
    tool!("jpg-to-pdf", "fileInput", Some("fileList"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Jpg), Full,
          "JPG to PDF Converter", "Convert JPG images to PDF online for free.",
          "JPG", "PDF"),
    tool!("jpg-to-png", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Jpg), Full,
          "JPG to PNG Converter", "Convert JPG to PNG with transparency for free.",
          "JPG", "PNG"),
    tool!("png-to-jpg", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Png), Full,
          "PNG to JPG Converter", "Convert PNG to JPG online for free.",
          "PNG", "JPG"),
    tool!("webp-to-jpg", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Webp), Full,
          "WebP to JPG Converter", "Convert WebP to JPG online for free.",
          "WebP", "JPG"),
    // The convert button lives inside the (initially hidden) file row, so
    // the page is only checked for readiness.
    tool!("heic-to-jpg", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, None, PageReady,
          "HEIC to JPG Converter", "Convert iPhone HEIC photos to JPG for free.",
          "HEIC", "JPG"),

    // Document tools, family B
    tool!("pdf-to-excel", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Pdf), Full,
          "PDF to Excel Converter", "Extract PDF tables to Excel spreadsheet for free.",
          "PDF", "XLSX"),
    tool!("word-to-pdf", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Docx), Full,
          "Word to PDF Converter", "Convert Word DOCX to PDF online for free. Perfect formatting.",
          "DOCX", "PDF"),
    tool!("excel-to-pdf", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Xlsx), Full,
          "Excel to PDF Converter", "Convert Excel spreadsheets to PDF for free.",
          "XLSX", "PDF"),
    tool!("word-to-jpg", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Docx), Full,
          "Word to JPG Converter", "Convert Word documents to JPG images for free.",
          "DOCX", "JPG"),
    tool!("ppt-to-pdf", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Pptx), Full,
          "PowerPoint to PDF Converter", "Convert PowerPoint to PDF online for free.",
          "PPTX", "PDF"),
    tool!("pdf-to-ppt", "fileInput", Some("fileRow"), "convertBtn", "dlWrap", None,
          DEFAULT_SIZE_LIMIT_MB, Some(Pdf), Full,
          "PDF to PowerPoint Converter", "Convert PDF to editable PowerPoint for free.",
          "PDF", "PPTX"),
];

/// Lookup table over the static contracts.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: &'static [ToolContract],
}

static REGISTRY: Lazy<ToolRegistry> = Lazy::new(|| ToolRegistry { tools: TOOLS });

impl ToolRegistry {
    /// The built-in registry covering every shipped tool page.
    pub fn builtin() -> &'static ToolRegistry {
        &REGISTRY
    }

    /// Resolve a slug. Absence is a hard configuration error, never a skip.
    pub fn get(&self, slug: &str) -> Result<&ToolContract> {
        self.tools
            .iter()
            .find(|t| t.slug == slug)
            .ok_or_else(|| Error::UnknownTool {
                slug: slug.to_string(),
            })
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.tools.iter().any(|t| t.slug == slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolContract> {
        self.tools.iter()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.iter().map(|t| t.slug)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Expected size limit for a page, by slug. Used by the audit to check
    /// the displayed limit against the enforced one.
    pub fn size_limit_mb(&self, slug: &str) -> Result<u64> {
        Ok(self.get(slug)?.size_limit_mb)
    }
}

//! Fixture forge: one minimal sample file per handled format.
//!
//! Scenario fixtures are materialized deterministically into a temp
//! directory at run time instead of being committed as binary blobs. Each
//! file is the smallest payload the corresponding page will stage: the
//! intake path validates name, type, and size before any decoding work.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{Error, Result};

/// Sample-file formats known to the forge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureKind {
    Pdf,
    Jpg,
    Png,
    Webp,
    Docx,
    Xlsx,
    Pptx,
    Mp3,
    Wav,
}

impl FixtureKind {
    pub fn all() -> &'static [FixtureKind] {
        use FixtureKind::*;
        &[Pdf, Jpg, Png, Webp, Docx, Xlsx, Pptx, Mp3, Wav]
    }

    pub fn file_name(self) -> &'static str {
        match self {
            FixtureKind::Pdf => "test.pdf",
            FixtureKind::Jpg => "test.jpg",
            FixtureKind::Png => "test.png",
            FixtureKind::Webp => "test.webp",
            FixtureKind::Docx => "test.docx",
            FixtureKind::Xlsx => "test.xlsx",
            FixtureKind::Pptx => "test.pptx",
            FixtureKind::Mp3 => "test.mp3",
            FixtureKind::Wav => "test.wav",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            FixtureKind::Pdf => "application/pdf",
            FixtureKind::Jpg => "image/jpeg",
            FixtureKind::Png => "image/png",
            FixtureKind::Webp => "image/webp",
            FixtureKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FixtureKind::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            FixtureKind::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            FixtureKind::Mp3 => "audio/mpeg",
            FixtureKind::Wav => "audio/wav",
        }
    }

    fn bytes(self) -> Result<Vec<u8>> {
        match self {
            FixtureKind::Pdf => Ok(minimal_pdf()),
            FixtureKind::Jpg => Ok(MINIMAL_JPEG.to_vec()),
            FixtureKind::Png => Ok(MINIMAL_PNG.to_vec()),
            FixtureKind::Webp => Ok(MINIMAL_WEBP.to_vec()),
            FixtureKind::Docx => ooxml_container(&[
                ("word/document.xml", DOCX_DOCUMENT_XML),
                ("[Content_Types].xml", DOCX_CONTENT_TYPES),
                ("_rels/.rels", DOCX_RELS),
            ]),
            FixtureKind::Xlsx => ooxml_container(&[
                ("xl/workbook.xml", XLSX_WORKBOOK),
                ("xl/worksheets/sheet1.xml", XLSX_SHEET),
                ("xl/_rels/workbook.xml.rels", XLSX_WORKBOOK_RELS),
                ("[Content_Types].xml", XLSX_CONTENT_TYPES),
                ("_rels/.rels", XLSX_RELS),
            ]),
            FixtureKind::Pptx => ooxml_container(&[
                ("ppt/presentation.xml", PPTX_PRESENTATION),
                ("[Content_Types].xml", PPTX_CONTENT_TYPES),
                ("_rels/.rels", PPTX_RELS),
            ]),
            FixtureKind::Mp3 => Ok(minimal_mp3()),
            FixtureKind::Wav => Ok(minimal_wav()),
        }
    }
}

impl std::fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A materialized set of fixtures. The backing directory lives as long as
/// the set does.
pub struct FixtureSet {
    dir: TempDir,
}

impl FixtureSet {
    /// Write every known fixture into a fresh temp directory.
    pub fn materialize() -> Result<Self> {
        let dir = TempDir::new()?;
        for kind in FixtureKind::all() {
            let path = dir.path().join(kind.file_name());
            std::fs::write(&path, kind.bytes()?)?;
            debug!(fixture = %kind, path = %path.display(), "fixture written");
        }
        Ok(Self { dir })
    }

    pub fn path(&self, kind: FixtureKind) -> PathBuf {
        self.dir.path().join(kind.file_name())
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

// A one-page PDF with an explicit catalog/pages/page chain. Viewers that
// rebuild the xref accept the omitted table.
fn minimal_pdf() -> Vec<u8> {
    b"%PDF-1.4\n\
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n\
3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >> endobj\n\
trailer << /Root 1 0 R /Size 4 >>\n\
%%EOF\n"
        .to_vec()
}

// 1x1 transparent PNG.
const MINIMAL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15,
    0xC4, 0x89, //
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, // IDAT
    0x78, 0x9C, 0x63, 0x64, 0x60, 0xF8, 0x5F, 0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47,
    0xBA, 0x92, //
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82, // IEND
];

// 1x1 grey baseline JPEG.
const MINIMAL_JPEG: &[u8] = &[
    0xFF, 0xD8, // SOI
    0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00, 0x01, 0x00,
    0x01, 0x00, 0x00, // APP0/JFIF
    0xFF, 0xDB, 0x00, 0x43, 0x00, 0x03, 0x02, 0x02, 0x02, 0x02, 0x02, 0x03, 0x02, 0x02, 0x02,
    0x03, 0x03, 0x03, 0x03, 0x04, 0x06, 0x04, 0x04, 0x04, 0x04, 0x04, 0x08, 0x06, 0x06, 0x05,
    0x06, 0x09, 0x08, 0x0A, 0x0A, 0x09, 0x08, 0x09, 0x09, 0x0A, 0x0C, 0x0F, 0x0C, 0x0A, 0x0B,
    0x0E, 0x0B, 0x09, 0x09, 0x0D, 0x11, 0x0D, 0x0E, 0x0F, 0x10, 0x10, 0x11, 0x10, 0x0A, 0x0C,
    0x12, 0x13, 0x12, 0x10, 0x13, 0x0F, 0x10, 0x10, 0x10, // DQT
    0xFF, 0xC9, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00, // SOF
    0xFF, 0xCC, 0x00, 0x06, 0x00, 0x10, 0x10, 0x05, // DAC
    0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0xD2, 0xCF, 0x20, // SOS
    0xFF, 0xD9, // EOI
];

// 1x1 WebP (lossless VP8L bitstream).
const MINIMAL_WEBP: &[u8] = &[
    0x52, 0x49, 0x46, 0x46, 0x1A, 0x00, 0x00, 0x00, // RIFF, chunk size 26
    0x57, 0x45, 0x42, 0x50, 0x56, 0x50, 0x38, 0x4C, // WEBP VP8L
    0x0D, 0x00, 0x00, 0x00, 0x2F, 0x00, 0x00, 0x00, 0x10, 0x07, 0x10, 0x11, 0x11, 0x88, 0x88,
    0xFE, 0x07, 0x00,
];

// 0.1s of 8kHz mono 16-bit silence.
fn minimal_wav() -> Vec<u8> {
    const SAMPLE_RATE: u32 = 8_000;
    const SAMPLES: u32 = SAMPLE_RATE / 10;
    let data_len = SAMPLES * 2;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // PCM chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

// Four silent MPEG-1 Layer III frames (44.1kHz, 128kbps, frame size 417).
fn minimal_mp3() -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut out = Vec::with_capacity(FRAME_LEN * 4);
    for _ in 0..4 {
        out.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        out.resize(out.len() + FRAME_LEN - 4, 0);
    }
    out
}

fn ooxml_container(entries: &[(&str, &str)]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options)?;
        writer.write_all(content.as_bytes())?;
    }
    let cursor = writer
        .finish()
        .map_err(|e| Error::Fixture(format!("container assembly failed: {e}")))?;
    Ok(cursor.into_inner())
}

const DOCX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const DOCX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCX_DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body><w:p><w:r><w:t>turbocheck sample</w:t></w:r></w:p></w:body>
</w:document>"#;

const XLSX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const XLSX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const XLSX_WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const XLSX_WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

const XLSX_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>turbocheck</t></is></c></row></sheetData>
</worksheet>"#;

const PPTX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#;

const PPTX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

const PPTX_PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:sldIdLst/>
</p:presentation>"#;

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! DOCX template renderer.
//!
//! A DOCX file is a zip container; the body lives in `word/document.xml`.
//! The renderer substitutes scalar slots (`{fecha_reporte}`,
//! `{respuesta_p1}`..`{respuesta_p6}`), expands the two list sections
//! (`{#lista_actividades}`..`{/lista_actividades}` and
//! `{#lista_bautismos}`..`{/lista_bautismos}`) one fragment per item, and
//! replaces `{%imagenes}` slots with inline drawings backed by new media
//! parts, patching the relationship and content-type entries accordingly.
//!
//! Slot markers must sit inside a single run, and section markers in
//! paragraphs of their own; the fixed template shipped with the app is
//! authored that way.

use crate::models::report::{ReportContext, ReportImage};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DOCUMENT_ENTRY: &str = "word/document.xml";
const RELS_ENTRY: &str = "word/_rels/document.xml.rels";
const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";

/// EMU (English Metric Units) per pixel at 96 dpi.
const EMU_PER_PIXEL: u64 = 9525;

/// Drawing object ids start high to stay clear of template-authored ones.
const DOC_PR_ID_BASE: u32 = 1000;

/// Errors produced while rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template container error: {0}")]
    Container(String),

    #[error("Template entry missing: {0}")]
    MissingEntry(String),

    #[error("Template document is not valid UTF-8")]
    InvalidXml,

    #[error("Unbalanced section markers for '{0}'")]
    UnbalancedSection(String),

    #[error("Section markers for '{0}' must sit in separate paragraphs")]
    SectionLayout(String),

    #[error("Unsupported image format")]
    UnsupportedImage,
}

/// Value bound to one slot of a section item.
enum Slot<'a> {
    Text(&'a str),
    Images(&'a [ReportImage]),
}

type SectionItem<'a> = Vec<(&'static str, Slot<'a>)>;

/// Render the annual report template with a fully-resolved context.
pub fn render_report(template: &[u8], ctx: &ReportContext) -> Result<Vec<u8>, RenderError> {
    let mut entries = read_entries(template)?;

    let doc_idx = entry_index(&entries, DOCUMENT_ENTRY)
        .ok_or_else(|| RenderError::MissingEntry(DOCUMENT_ENTRY.to_string()))?;
    let mut xml =
        String::from_utf8(entries[doc_idx].1.clone()).map_err(|_| RenderError::InvalidXml)?;

    // Relationship ids must not collide with the ones the template carries.
    let next_rel = entry_index(&entries, RELS_ENTRY)
        .map(|i| String::from_utf8_lossy(&entries[i].1).into_owned())
        .map(|rels| max_relationship_id(&rels))
        .unwrap_or(0)
        + 1;
    let mut media = MediaRegistry::new(next_rel);

    // Scalar slots.
    xml = xml.replace(&slot("fecha_reporte"), &escape_multiline(&ctx.fecha_reporte));
    for (i, answer) in ctx.respuestas.iter().enumerate() {
        xml = xml.replace(
            &slot(&format!("respuesta_p{}", i + 1)),
            &escape_multiline(answer),
        );
    }

    // List sections.
    let activity_items: Vec<SectionItem> = ctx
        .lista_actividades
        .iter()
        .map(|entry| {
            vec![
                ("titulo", Slot::Text(&entry.titulo)),
                ("fecha", Slot::Text(&entry.fecha)),
                ("descripcion", Slot::Text(&entry.descripcion)),
                ("imagenes", Slot::Images(&entry.imagenes)),
            ]
        })
        .collect();
    xml = expand_section(xml, "lista_actividades", &activity_items, &mut media)?;

    let baptism_items: Vec<SectionItem> = ctx
        .lista_bautismos
        .iter()
        .map(|entry| {
            vec![
                ("nombre", Slot::Text(&entry.nombre)),
                ("imagenes", Slot::Images(&entry.imagenes)),
            ]
        })
        .collect();
    xml = expand_section(xml, "lista_bautismos", &baptism_items, &mut media)?;

    entries[doc_idx].1 = xml.into_bytes();

    // New media parts need relationship and content-type patching.
    if !media.parts.is_empty() {
        let rels_idx = entry_index(&entries, RELS_ENTRY)
            .ok_or_else(|| RenderError::MissingEntry(RELS_ENTRY.to_string()))?;
        let rels =
            String::from_utf8(entries[rels_idx].1.clone()).map_err(|_| RenderError::InvalidXml)?;
        entries[rels_idx].1 = patch_relationships(&rels, &media.parts).into_bytes();

        let ct_idx = entry_index(&entries, CONTENT_TYPES_ENTRY)
            .ok_or_else(|| RenderError::MissingEntry(CONTENT_TYPES_ENTRY.to_string()))?;
        let content_types =
            String::from_utf8(entries[ct_idx].1.clone()).map_err(|_| RenderError::InvalidXml)?;
        entries[ct_idx].1 = patch_content_types(&content_types, &media.parts).into_bytes();

        for part in &media.parts {
            entries.push((format!("word/media/{}", part.file_name), part.bytes.clone()));
        }
    }

    write_entries(&entries)
}

// ─── Container I/O ───────────────────────────────────────────────

fn read_entries(template: &[u8]) -> Result<Vec<(String, Vec<u8>)>, RenderError> {
    let mut archive = ZipArchive::new(Cursor::new(template))
        .map_err(|e| RenderError::Container(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| RenderError::Container(e.to_string()))?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| RenderError::Container(e.to_string()))?;
        entries.push((name, buf));
    }
    Ok(entries)
}

fn write_entries(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, RenderError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| RenderError::Container(e.to_string()))?;
            writer
                .write_all(bytes)
                .map_err(|e| RenderError::Container(e.to_string()))?;
        }
        writer
            .finish()
            .map_err(|e| RenderError::Container(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}

fn entry_index(entries: &[(String, Vec<u8>)], name: &str) -> Option<usize> {
    entries.iter().position(|(n, _)| n == name)
}

// ─── Section Expansion ───────────────────────────────────────────

fn expand_section(
    xml: String,
    name: &str,
    items: &[SectionItem],
    media: &mut MediaRegistry,
) -> Result<String, RenderError> {
    let open = format!("{{#{}}}", name);
    let close = format!("{{/{}}}", name);

    let open_pos = match xml.find(&open) {
        Some(pos) => pos,
        None => {
            // A close marker without an open one is a template defect.
            if xml.contains(&close) {
                return Err(RenderError::UnbalancedSection(name.to_string()));
            }
            return Ok(xml);
        }
    };
    let close_pos = xml
        .find(&close)
        .ok_or_else(|| RenderError::UnbalancedSection(name.to_string()))?;
    if close_pos < open_pos {
        return Err(RenderError::UnbalancedSection(name.to_string()));
    }

    let (open_start, open_end) = paragraph_bounds(&xml, open_pos)
        .ok_or_else(|| RenderError::SectionLayout(name.to_string()))?;
    let (close_start, close_end) = paragraph_bounds(&xml, close_pos)
        .ok_or_else(|| RenderError::SectionLayout(name.to_string()))?;
    if close_start < open_end {
        return Err(RenderError::SectionLayout(name.to_string()));
    }

    let fragment = &xml[open_end..close_start];
    let mut rendered = String::new();
    for item in items {
        rendered.push_str(&render_fragment(fragment, item, media)?);
    }

    Ok(format!(
        "{}{}{}",
        &xml[..open_start],
        rendered,
        &xml[close_end..]
    ))
}

/// Bounds of the `<w:p>`..`</w:p>` paragraph containing byte offset `pos`.
fn paragraph_bounds(xml: &str, pos: usize) -> Option<(usize, usize)> {
    let bytes = xml.as_bytes();
    let mut search_end = pos;
    let start = loop {
        let candidate = xml[..search_end].rfind("<w:p")?;
        // Skip `<w:pPr>` and friends.
        match bytes.get(candidate + 4) {
            Some(b'>') | Some(b' ') => break candidate,
            _ => search_end = candidate,
        }
    };
    let end = xml[pos..].find("</w:p>")?;
    Some((start, pos + end + "</w:p>".len()))
}

fn render_fragment(
    fragment: &str,
    item: &SectionItem,
    media: &mut MediaRegistry,
) -> Result<String, RenderError> {
    let mut out = fragment.to_string();
    for (key, value) in item {
        match value {
            Slot::Text(text) => {
                out = out.replace(&slot(key), &escape_multiline(text));
            }
            Slot::Images(images) => {
                out = replace_image_slot(out, key, images, media)?;
            }
        }
    }
    Ok(out)
}

/// Replace the paragraph holding `{%key}` with image drawings (or nothing).
fn replace_image_slot(
    xml: String,
    key: &str,
    images: &[ReportImage],
    media: &mut MediaRegistry,
) -> Result<String, RenderError> {
    let marker = format!("{{%{}}}", key);
    let pos = match xml.find(&marker) {
        Some(pos) => pos,
        None => return Ok(xml),
    };
    let (start, end) =
        paragraph_bounds(&xml, pos).ok_or_else(|| RenderError::SectionLayout(key.to_string()))?;

    if images.is_empty() {
        return Ok(format!("{}{}", &xml[..start], &xml[end..]));
    }

    let mut runs = String::new();
    for image in images {
        runs.push_str(&media.add(image)?);
    }
    Ok(format!(
        "{}<w:p>{}</w:p>{}",
        &xml[..start],
        runs,
        &xml[end..]
    ))
}

// ─── Media Registry ──────────────────────────────────────────────

struct MediaPart {
    rel_id: String,
    file_name: String,
    ext: &'static str,
    content_type: &'static str,
    bytes: Vec<u8>,
}

/// Collects embedded images and hands out unique relationship ids.
struct MediaRegistry {
    next_rel: u32,
    parts: Vec<MediaPart>,
}

impl MediaRegistry {
    fn new(next_rel: u32) -> Self {
        Self {
            next_rel,
            parts: Vec::new(),
        }
    }

    /// Register one image and return its inline drawing run.
    fn add(&mut self, image: &ReportImage) -> Result<String, RenderError> {
        let (ext, content_type) =
            image_format(&image.bytes).ok_or(RenderError::UnsupportedImage)?;

        let rel_id = format!("rId{}", self.next_rel);
        self.next_rel += 1;
        let index = self.parts.len() + 1;
        // Distinct prefix so template-authored media files are never clobbered.
        let file_name = format!("report_image{}.{}", index, ext);
        let doc_pr_id = DOC_PR_ID_BASE + index as u32;

        let cx = u64::from(image.width_px) * EMU_PER_PIXEL;
        let cy = u64::from(image.height_px) * EMU_PER_PIXEL;

        self.parts.push(MediaPart {
            rel_id: rel_id.clone(),
            file_name: file_name.clone(),
            ext,
            content_type,
            bytes: image.bytes.clone(),
        });

        Ok(format!(
            concat!(
                r#"<w:r><w:drawing>"#,
                r#"<wp:inline xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
                r#"<wp:docPr id="{id}" name="{name}"/>"#,
                r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
                r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
                r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
            ),
            cx = cx,
            cy = cy,
            id = doc_pr_id,
            name = file_name,
            rel = rel_id,
        ))
    }
}

/// Sniff the encoded image format from magic bytes.
fn image_format(bytes: &[u8]) -> Option<(&'static str, &'static str)> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some(("png", "image/png"))
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(("jpeg", "image/jpeg"))
    } else if bytes.starts_with(b"GIF8") {
        Some(("gif", "image/gif"))
    } else {
        None
    }
}

fn patch_relationships(rels: &str, parts: &[MediaPart]) -> String {
    let mut additions = String::new();
    for part in parts {
        additions.push_str(&format!(
            r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/{}"/>"#,
            part.rel_id, part.file_name
        ));
    }
    rels.replace(
        "</Relationships>",
        &format!("{}</Relationships>", additions),
    )
}

fn patch_content_types(content_types: &str, parts: &[MediaPart]) -> String {
    let mut out = content_types.to_string();
    for part in parts {
        let needle = format!(r#"Extension="{}""#, part.ext);
        if !out.contains(&needle) {
            out = out.replace(
                "</Types>",
                &format!(
                    r#"<Default Extension="{}" ContentType="{}"/></Types>"#,
                    part.ext, part.content_type
                ),
            );
        }
    }
    out
}

/// Highest numeric `rId` already present in a relationships document.
fn max_relationship_id(rels: &str) -> u32 {
    let mut max = 0;
    let mut rest = rels;
    while let Some(pos) = rest.find("Id=\"rId") {
        let tail = &rest[pos + 7..];
        let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
        if let Ok(n) = digits.parse::<u32>() {
            max = max.max(n);
        }
        rest = tail;
    }
    max
}

fn slot(name: &str) -> String {
    format!("{{{}}}", name)
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Escape text and turn newlines into Word line breaks.
fn escape_multiline(value: &str) -> String {
    xml_escape(value).replace('\n', r#"</w:t><w:br/><w:t xml:space="preserve">"#)
}

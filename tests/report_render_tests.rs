// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end render tests: aggregated data through the template engine.

use chrono::NaiveDate;
use quorumflow::models::report::ReportImage;
use quorumflow::models::{Activity, AnnualReportAnswers, Baptism, BaptismSource};
use quorumflow::services::aggregator::YearData;
use quorumflow::services::docx::render_report;
use quorumflow::services::report::build_context;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
}

/// Minimal DOCX template with every slot the report binds.
fn report_template() -> Vec<u8> {
    let mut body = String::new();
    body.push_str(&paragraph("Reporte anual - {fecha_reporte}"));
    for i in 1..=6 {
        body.push_str(&paragraph(&format!("{{respuesta_p{}}}", i)));
    }
    body.push_str(&paragraph("{#lista_actividades}"));
    body.push_str(&paragraph("{titulo}"));
    body.push_str(&paragraph("{fecha}"));
    body.push_str(&paragraph("{descripcion}"));
    body.push_str(&paragraph("{%imagenes}"));
    body.push_str(&paragraph("{/lista_actividades}"));
    body.push_str(&paragraph("{#lista_bautismos}"));
    body.push_str(&paragraph("{nombre}"));
    body.push_str(&paragraph("{%imagenes}"));
    body.push_str(&paragraph("{/lista_bautismos}"));

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;
    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in [
            ("[Content_Types].xml", content_types),
            ("word/_rels/document.xml.rels", rels),
            ("word/document.xml", document.as_str()),
        ] {
            writer.start_file(name, options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

fn document_xml(docx: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut file = archive.by_name("word/document.xml").unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

fn ts(y: i32, m: u32, d: u32) -> chrono::DateTime<chrono::Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap()
        .and_utc()
}

#[test]
fn test_empty_year_still_produces_a_document() {
    let data = YearData {
        activities: vec![],
        baptisms: vec![],
        answers: AnnualReportAnswers::default(),
    };

    let ctx = build_context(
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        &data,
        vec![],
        vec![],
    );
    let docx = render_report(&report_template(), &ctx).unwrap();
    let document = document_xml(&docx);

    assert!(document.contains("Reporte anual - 31 de diciembre de 2025"));
    // List placeholders render as empty sections, not errors.
    assert!(!document.contains("{#lista_actividades}"));
    assert!(!document.contains("{titulo}"));
    assert!(!document.contains("{nombre}"));
}

#[test]
fn test_full_year_renders_activities_and_baptisms() {
    let activity = Activity {
        id: "a1".to_string(),
        title: "Noche de talentos".to_string(),
        date: ts(2025, 6, 15),
        description: "Una gran velada".to_string(),
        time: Some("19:00".to_string()),
        location: Some("el centro de reuniones".to_string()),
        context: None,
        learning: Some("organizar mejor".to_string()),
        additional_text: None,
        image_urls: vec![],
    };
    let baptism = Baptism {
        name: "Juan Pérez".to_string(),
        date: ts(2025, 5, 3),
        source: BaptismSource::Manual,
        photo_urls: vec![],
    };
    let answers = AnnualReportAnswers {
        p1: "Crecimos en unidad".to_string(),
        ..AnnualReportAnswers::default()
    };

    let data = YearData {
        activities: vec![activity],
        baptisms: vec![baptism],
        answers,
    };

    let ctx = build_context(
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        &data,
        vec![vec![]],
        vec![vec![]],
    );
    let docx = render_report(&report_template(), &ctx).unwrap();
    let document = document_xml(&docx);

    assert!(document.contains("Noche de talentos"));
    assert!(document.contains("15 de junio de 2025, 19:00"));
    assert!(document.contains("Lugar: el centro de reuniones"));
    assert!(document.contains("Aprendizaje: organizar mejor"));
    assert!(document.contains("Juan Pérez (3 de mayo de 2025)"));
    assert!(document.contains("Crecimos en unidad"));
}

#[test]
fn test_resolved_images_embed_into_the_document() {
    // 1x1 PNG, pre-sized as if it came back 450x300 from the sizer.
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R', 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, b'I', b'D', b'A', b'T', 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, b'I',
        b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82,
    ];

    let data = YearData {
        activities: vec![],
        baptisms: vec![Baptism {
            name: "Con fotos".to_string(),
            date: ts(2025, 5, 3),
            source: BaptismSource::Automatic,
            photo_urls: vec!["https://example.com/p.png".to_string()],
        }],
        answers: AnnualReportAnswers::default(),
    };

    let ctx = build_context(
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        &data,
        vec![],
        vec![vec![ReportImage {
            bytes: PNG_1X1.to_vec(),
            width_px: 450,
            height_px: 300,
        }]],
    );
    let docx = render_report(&report_template(), &ctx).unwrap();
    let document = document_xml(&docx);

    assert!(document.contains("<w:drawing>"));
    assert!(document.contains("r:embed="));

    let mut archive = ZipArchive::new(Cursor::new(docx.as_slice())).unwrap();
    assert!(archive.by_name("word/media/report_image1.png").is_ok());
}

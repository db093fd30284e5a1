#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use paper_pilot::error::FetchError;
use paper_pilot::{Config, PaperSource, RawResponse};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

/// 生成一份每页一行文字的 PDF
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// 固定内容的文件来源，未登记的文件返回 404
#[derive(Default)]
pub struct StaticSource {
    files: HashMap<String, RawResponse>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pdf(mut self, filename: &str, bytes: Vec<u8>) -> Self {
        self.files
            .insert(filename.to_string(), RawResponse::new(200, bytes));
        self
    }

    pub fn response(mut self, filename: &str, response: RawResponse) -> Self {
        self.files.insert(filename.to_string(), response);
        self
    }
}

impl PaperSource for StaticSource {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let filename = url.rsplit('/').next().unwrap_or_default();
        Ok(self
            .files
            .get(filename)
            .cloned()
            .unwrap_or_else(|| RawResponse::new(404, "Not Found")))
    }
}

/// 模板、结束页、运行日志都指向临时目录（默认不存在）
pub fn test_config(dir: &Path) -> Config {
    Config {
        paper_base_url: "http://papers.test/upload/".to_string(),
        max_concurrent_downloads: 4,
        request_timeout_secs: 2,
        cover_template_path: dir.join("template_base.png"),
        end_page_path: dir.join("end.pdf"),
        run_log_file: dir.join("run_log.json"),
        output_dir: dir.join("output"),
        ..Config::default()
    }
}

/// 读出压缩包里的 (条目名, 内容)
pub fn zip_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

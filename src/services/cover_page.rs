//! 封面生成服务 - 业务能力层
//!
//! 把底图铺满一页 A4，再写上三行文字：级别+科目代码、科目名、试卷编号

use crate::config::Config;
use crate::error::CoverError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// A4 页面尺寸（pt）
const A4_WIDTH: f32 = 595.28;
const A4_HEIGHT: f32 = 841.89;

/// 文字布局，单位是底图像素
const TEXT_X: f32 = 152.0;
const TEXT_Y_START: f32 = 440.0;
const LINE_SPACING: f32 = 172.0;
const FONT_LARGE: f32 = 106.0;
const FONT_MEDIUM: f32 = 74.0;
/// 字体顶部到基线的比例
const ASCENT: f32 = 0.8;

/// 科目名超过这个长度且没有简称时，只取前两个单词
const MAX_SUBJECT_DISPLAY_LEN: usize = 16;

/// 封面上的文字
#[derive(Debug, Clone)]
pub struct CoverText {
    pub level_label: String,
    pub subject_code: String,
    pub subject_display: String,
    pub paper_id: String,
}

/// 已解码的封面底图，同一次任务里所有封面共用
#[derive(Debug, Clone)]
pub struct CoverBackground {
    image: Stream,
    width: f32,
    height: f32,
}

impl CoverBackground {
    /// 解码 PNG / JPEG 等图片
    pub fn decode(bytes: &[u8]) -> Result<Self, CoverError> {
        let image =
            lopdf::xobject::image_from(bytes.to_vec()).map_err(CoverError::ImageDecodeFailed)?;
        let width = dimension(&image, b"Width")?;
        let height = dimension(&image, b"Height")?;
        debug!("封面底图尺寸: {}x{}", width, height);
        Ok(Self {
            image,
            width,
            height,
        })
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// 生成单页封面 PDF
    pub fn render(&self, text: &CoverText) -> Result<Vec<u8>, CoverError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let image_id = doc.add_object(self.image.clone());
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im1" => image_id },
        });

        let scale_x = A4_WIDTH / self.width;
        let scale_y = A4_HEIGHT / self.height;

        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    A4_WIDTH.into(),
                    0.into(),
                    0.into(),
                    A4_HEIGHT.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec!["Im1".into()]),
            Operation::new("Q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
        ];

        let lines = [
            (
                format!("{} {}", text.level_label, text.subject_code),
                FONT_LARGE,
                TEXT_Y_START,
            ),
            (
                text.subject_display.clone(),
                FONT_LARGE,
                TEXT_Y_START + LINE_SPACING,
            ),
            (
                format!("PAPER {}", text.paper_id),
                FONT_MEDIUM,
                TEXT_Y_START + LINE_SPACING * 2.0,
            ),
        ];
        for (line, font_px, top_px) in lines {
            let font_size = font_px * scale_y;
            let x = TEXT_X * scale_x;
            let baseline = A4_HEIGHT - (top_px + font_px * ASCENT) * scale_y;
            operations.push(Operation::new("Tf", vec!["F1".into(), font_size.into()]));
            operations.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    x.into(),
                    baseline.into(),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(&line), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations }
            .encode()
            .map_err(CoverError::WriteFailed)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| CoverError::WriteFailed(e.into()))?;
        Ok(out)
    }
}

fn dimension(image: &Stream, key: &[u8]) -> Result<f32, CoverError> {
    let value = image
        .dict
        .get(key)
        .and_then(|v| v.as_i64())
        .map_err(|_| CoverError::MissingDimensions)?;
    if value <= 0 {
        return Err(CoverError::MissingDimensions);
    }
    Ok(value as f32)
}

/// 替代字符
const UNMAPPED: u8 = b'?';

/// 把文字编码为 WinAnsi（标准 14 字体的单字节编码）
///
/// Latin-1 可打印字符原样映射，常见的弯引号、破折号等映射到 0x80-0x9F 区，
/// 其余字符（中文等）无法用 Helvetica 显示，替换为 `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut replaced = 0;
    let bytes = text
        .chars()
        .map(|c| {
            let byte = match c {
                ' '..='~' => Some(c as u8),
                '\u{a0}'..='\u{ff}' => Some(c as u32 as u8),
                '€' => Some(0x80),
                '‚' => Some(0x82),
                '„' => Some(0x84),
                '…' => Some(0x85),
                '‘' => Some(0x91),
                '’' => Some(0x92),
                '“' => Some(0x93),
                '”' => Some(0x94),
                '•' => Some(0x95),
                '–' => Some(0x96),
                '—' => Some(0x97),
                '™' => Some(0x99),
                _ => None,
            };
            byte.unwrap_or_else(|| {
                replaced += 1;
                UNMAPPED
            })
        })
        .collect();
    if replaced > 0 {
        debug!("封面文字中有 {} 个字符无法用 Helvetica 显示: {}", replaced, text);
    }
    bytes
}

/// 封面上显示的科目名
///
/// 优先使用简称；科目名过长时只取前两个单词
pub fn subject_display(subject_name: &str, alias: Option<&str>) -> String {
    if let Some(alias) = alias.map(str::trim).filter(|a| !a.is_empty()) {
        return alias.to_string();
    }
    if subject_name.chars().count() > MAX_SUBJECT_DISPLAY_LEN {
        return subject_name
            .split_whitespace()
            .take(2)
            .collect::<Vec<_>>()
            .join(" ");
    }
    subject_name.to_string()
}

/// 封面生成器
#[derive(Debug, Clone)]
pub struct CoverPageGenerator {
    template_path: PathBuf,
}

impl CoverPageGenerator {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cover_template_path.clone())
    }

    pub fn template_path(&self) -> &PathBuf {
        &self.template_path
    }

    /// 准备底图：优先使用上传的图片，否则读取模板
    ///
    /// 两者都没有时返回 None，调用方跳过封面
    pub fn load_background(
        &self,
        uploaded: Option<&[u8]>,
    ) -> Result<Option<CoverBackground>, CoverError> {
        let bytes = match uploaded {
            Some(bytes) => bytes.to_vec(),
            None => match std::fs::read(&self.template_path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                Err(source) => {
                    return Err(CoverError::TemplateReadFailed {
                        path: self.template_path.display().to_string(),
                        source,
                    })
                }
            },
        };
        CoverBackground::decode(&bytes).map(Some)
    }
}

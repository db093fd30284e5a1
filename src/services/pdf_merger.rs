//! PDF 合并服务 - 业务能力层
//!
//! 按顺序拼接多份完整的 PDF，保持每份文档内部的页面顺序

use crate::error::MergeError;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

/// 可以从上级 Pages 节点继承的页面属性
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// 防止损坏文档里的 Parent 环
const MAX_TREE_DEPTH: usize = 64;

/// 检查数据能否解析为 PDF，返回页数
pub fn page_count(bytes: &[u8]) -> Result<usize, lopdf::Error> {
    Ok(Document::load_mem(bytes)?.get_pages().len())
}

/// 按顺序合并多份 PDF
///
/// 只有一份输入时原样返回（仍会先校验能否解析）
pub fn merge_documents(parts: &[&[u8]]) -> Result<Vec<u8>, MergeError> {
    match parts {
        [] => return Err(MergeError::Empty),
        [single] => {
            let pages = page_count(single)
                .map_err(|source| MergeError::InvalidPart { index: 0, source })?;
            if pages == 0 {
                return Err(MergeError::NoPages { index: 0 });
            }
            return Ok(single.to_vec());
        }
        _ => {}
    }

    let mut merged = Document::with_version("1.5");
    let mut next_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();

    for (index, bytes) in parts.iter().enumerate() {
        let mut doc = Document::load_mem(bytes)
            .map_err(|source| MergeError::InvalidPart { index, source })?;
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        if doc.version > merged.version {
            merged.version = doc.version.clone();
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(MergeError::NoPages { index });
        }
        for page_id in page_ids {
            let page = flatten_page(&doc, page_id)
                .map_err(|source| MergeError::InvalidPart { index, source })?;
            pages.push((page_id, page));
        }

        // 页面树和目录重新构建，其余对象原样搬过来
        for (id, object) in doc.objects {
            let skip = matches!(
                object.type_name().unwrap_or_default(),
                "Catalog" | "Pages" | "Page" | "XRef" | "ObjStm"
            );
            if !skip {
                merged.objects.insert(id, object);
            }
        }
    }

    let pages_id: ObjectId = (next_id, 0);
    let catalog_id: ObjectId = (next_id + 1, 0);
    let page_total = pages.len() as i64;

    let mut kids = Vec::with_capacity(pages.len());
    for (page_id, mut page) in pages {
        page.set("Parent", pages_id);
        kids.push(Object::Reference(page_id));
        merged.objects.insert(page_id, Object::Dictionary(page));
    }

    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_total,
        }),
    );
    merged.objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        }),
    );
    merged.trailer.set("Root", catalog_id);
    merged.max_id = catalog_id.0;

    merged.renumber_objects();
    merged.compress();

    let mut out = Vec::new();
    merged
        .save_to(&mut out)
        .map_err(|e| MergeError::WriteFailed(e.into()))?;
    Ok(out)
}

/// 复制页面字典，并把从上级节点继承的属性写到页面自身
fn flatten_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary, lopdf::Error> {
    let mut page = doc.get_object(page_id)?.as_dict()?.clone();

    let mut parent = page.get(b"Parent").and_then(|p| p.as_reference()).ok();
    let mut depth = 0;
    while let Some(parent_id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_object(parent_id).and_then(|o| o.as_dict()) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    Ok(page)
}

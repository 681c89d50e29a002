//! Section batches to insert columns.

use crate::schema::{CONTENT_FIELD, EMBEDDING_FIELD, HEADING_FIELD, ID_FIELD, TITLE_FIELD};
use crate::types::Section;
use sectiondb_core::AppResult;
use sectiondb_milvus::Column;

/// Convert an embedding to the single-precision form the server stores.
pub fn to_f32(embedding: &[f64]) -> Vec<f32> {
    embedding.iter().map(|&v| v as f32).collect()
}

/// Split sections into `id`, `title`, `heading`, `content` and `embedding`
/// columns.
///
/// IDs are the sections' positions in the batch, starting at 0. Fails if any
/// embedding does not have `dim` elements.
pub fn sections_to_columns(sections: &[Section], dim: usize) -> AppResult<Vec<Column>> {
    let mut ids = Vec::with_capacity(sections.len());
    let mut titles = Vec::with_capacity(sections.len());
    let mut headings = Vec::with_capacity(sections.len());
    let mut contents = Vec::with_capacity(sections.len());
    let mut embeddings = Vec::with_capacity(sections.len());

    for (i, section) in sections.iter().enumerate() {
        ids.push(i as i64);
        titles.push(section.title.clone());
        headings.push(section.heading.clone());
        contents.push(section.content.clone());
        embeddings.push(to_f32(&section.embedding));
    }

    Ok(vec![
        Column::int64(ID_FIELD, ids),
        Column::varchar(TITLE_FIELD, titles),
        Column::varchar(HEADING_FIELD, headings),
        Column::varchar(CONTENT_FIELD, contents),
        Column::float_vector(EMBEDDING_FIELD, dim, embeddings)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectiondb_core::AppError;

    #[test]
    fn test_sections_to_columns() {
        let sections = vec![
            Section::new("Guide", "Install", "Run it").with_embedding(vec![0.5, 0.25]),
            Section::new("Guide", "Upgrade", "Stop it").with_embedding(vec![1.0, -1.0]),
        ];

        let columns = sections_to_columns(&sections, 2).unwrap();
        assert_eq!(columns.len(), 5);
        assert_eq!(columns[0], Column::int64("id", vec![0, 1]));
        assert_eq!(columns[2].varchar_at(1).unwrap(), "Upgrade");
        assert_eq!(
            columns[4],
            Column::float_vector("embedding", 2, vec![vec![0.5, 0.25], vec![1.0, -1.0]]).unwrap()
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let sections = vec![Section::new("Guide", "Install", "Run it").with_embedding(vec![0.5])];
        assert!(matches!(
            sections_to_columns(&sections, 2),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_to_f32() {
        assert_eq!(to_f32(&[0.5, -2.0]), vec![0.5f32, -2.0f32]);
    }
}

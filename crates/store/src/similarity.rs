//! Search results back to sections.

use crate::schema::{CONTENT_FIELD, HEADING_FIELD, ID_FIELD, TITLE_FIELD};
use crate::types::{Section, Similarity};
use sectiondb_core::{AppError, AppResult};
use sectiondb_milvus::{Column, DataType, SearchResult};

/// Find a result column by name, checking its type.
fn column<'a>(result: &'a SearchResult, name: &str, data_type: DataType) -> AppResult<&'a Column> {
    let column = result
        .field(name)
        .ok_or_else(|| AppError::Schema(format!("Search result is missing column '{}'", name)))?;

    if column.data_type() != data_type {
        return Err(AppError::Schema(format!(
            "Search result column '{}' is {}, expected {}",
            name,
            column.data_type().as_str(),
            data_type.as_str()
        )));
    }

    Ok(column)
}

/// Rebuild one [`Similarity`] per hit from the columnar result.
///
/// Embeddings are not returned by searches, so the sections come back
/// without them.
pub fn similarities_from_result(result: &SearchResult) -> AppResult<Vec<Similarity>> {
    if result.result_count == 0 {
        return Ok(Vec::new());
    }

    let ids = column(result, ID_FIELD, DataType::Int64)?;
    let titles = column(result, TITLE_FIELD, DataType::VarChar)?;
    let headings = column(result, HEADING_FIELD, DataType::VarChar)?;
    let contents = column(result, CONTENT_FIELD, DataType::VarChar)?;

    (0..result.result_count)
        .map(|i| {
            let score = result.scores.get(i).copied().ok_or_else(|| {
                AppError::Schema(format!("Search result has no score for hit {}", i))
            })?;

            Ok(Similarity {
                section: Section::new(
                    titles.varchar_at(i)?,
                    headings.varchar_at(i)?,
                    contents.varchar_at(i)?,
                ),
                id: ids.int64_at(i)?,
                score: f64::from(score),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn result(fields: Vec<Column>, count: usize) -> SearchResult {
        SearchResult {
            result_count: count,
            scores: vec![0.5, 2.0][..count].to_vec(),
            fields,
        }
    }

    #[test]
    fn test_reshape_in_result_order() {
        let result = result(
            vec![
                Column::int64("id", vec![9, 3]),
                Column::varchar("title", strings(&["API", "Guide"])),
                Column::varchar("heading", strings(&["Search", "Install"])),
                Column::varchar("content", strings(&["query it", "run it"])),
            ],
            2,
        );

        let similarities = similarities_from_result(&result).unwrap();
        assert_eq!(similarities.len(), 2);
        assert_eq!(similarities[0].id, 9);
        assert_eq!(similarities[0].score, 0.5);
        assert_eq!(similarities[0].section.heading, "Search");
        assert_eq!(similarities[1].id, 3);
        assert_eq!(similarities[1].section.content, "run it");
        assert!(similarities[1].section.embedding.is_empty());
    }

    #[test]
    fn test_empty_result_needs_no_columns() {
        let similarities = similarities_from_result(&SearchResult::default()).unwrap();
        assert!(similarities.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let result = result(vec![Column::int64("id", vec![1])], 1);
        match similarities_from_result(&result) {
            Err(AppError::Schema(msg)) => assert!(msg.contains("title")),
            other => panic!("Expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_mistyped_id_column() {
        let result = result(
            vec![
                Column::varchar("id", strings(&["1"])),
                Column::varchar("title", strings(&["a"])),
                Column::varchar("heading", strings(&["b"])),
                Column::varchar("content", strings(&["c"])),
            ],
            1,
        );
        assert!(matches!(
            similarities_from_result(&result),
            Err(AppError::Schema(_))
        ));
    }

    #[test]
    fn test_short_column() {
        let result = result(
            vec![
                Column::int64("id", vec![1, 2]),
                Column::varchar("title", strings(&["a", "b"])),
                Column::varchar("heading", strings(&["c"])),
                Column::varchar("content", strings(&["d", "e"])),
            ],
            2,
        );
        assert!(similarities_from_result(&result).is_err());
    }
}

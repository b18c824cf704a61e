use super::{document_matches, QueryEngine, QueryResult};
use crate::parsers::patterns::{normalize_header, normalize_headers};
use crate::parsers::PAGE_BREAK;
use crate::types::{Exhibit, SourceDocument};
use serde::{Serialize, Serializer};

/// Exhibit metadata without its rows or page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExhibitSummary {
    pub exhibit_id: String,
    pub exhibit_name: String,
    pub source_document: String,
    pub page_range: Vec<u32>,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&Exhibit> for ExhibitSummary {
    fn from(exhibit: &Exhibit) -> Self {
        Self {
            exhibit_id: exhibit.exhibit_id.clone(),
            exhibit_name: exhibit.exhibit_name.clone(),
            source_document: exhibit.source_document.clone(),
            page_range: exhibit.page_range.clone(),
            headers: exhibit.headers.clone(),
            row_count: exhibit.row_count(),
        }
    }
}

fn serialize_summary<S: Serializer>(exhibit: &&Exhibit, serializer: S) -> Result<S::Ok, S::Error> {
    ExhibitSummary::from(*exhibit).serialize(serializer)
}

/// An exhibit with its description score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExhibitHit<'a> {
    pub score: u32,
    #[serde(serialize_with = "serialize_summary")]
    pub exhibit: &'a Exhibit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchedValue {
    Cell { column: String, value: String },
    Row { headers: Vec<String>, cells: Vec<String> },
}

/// Result of a row lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueMatch {
    pub exhibit_id: String,
    pub exhibit_name: String,
    /// Position within the exhibit's data rows
    pub row_index: usize,
    pub value: MatchedValue,
}

impl ValueMatch {
    /// The single cell when a return column was requested.
    pub fn cell(&self) -> Option<&str> {
        match &self.value {
            MatchedValue::Cell { value, .. } => Some(value),
            MatchedValue::Row { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "selection", rename_all = "snake_case")]
pub enum RowSelection {
    /// Leading rows of the table
    Sample,
    /// Rows with a cell containing the description
    Matching {
        description: String,
        total_matches: usize,
    },
}

/// Part of one exhibit's rows, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub summary: ExhibitSummary,
    pub selection: RowSelection,
    pub rows: Vec<Vec<String>>,
}

impl<'a> QueryEngine<'a> {
    /// Exhibits whose name contains `exhibit_name`, case-insensitively.
    pub fn find_exhibit(&self, exhibit_name: &str) -> QueryResult<Vec<&'a Exhibit>> {
        let exhibits = self.corpus.exhibits();
        if exhibits.is_empty() {
            return QueryResult::NoData;
        }

        let needle = exhibit_name.trim().to_lowercase();
        if needle.is_empty() {
            return QueryResult::not_found("Exhibit name is empty.");
        }

        let matches: Vec<&'a Exhibit> = exhibits
            .iter()
            .filter(|e| e.exhibit_name.to_lowercase().contains(&needle))
            .collect();

        if matches.is_empty() {
            QueryResult::not_found(format!("Exhibit '{exhibit_name}' not found."))
        } else {
            QueryResult::Found(matches)
        }
    }

    /// Rank exhibits by how often the description's words occur in their
    /// page text and headers.
    pub fn find_exhibit_by_description(
        &self,
        description: &str,
        document_filter: Option<&str>,
        top_k: Option<usize>,
    ) -> QueryResult<Vec<ExhibitHit<'a>>> {
        let exhibits = self.corpus.exhibits();
        if exhibits.is_empty() {
            return QueryResult::NoData;
        }

        let description_lower = description.to_lowercase();
        let terms: Vec<&str> = description_lower.split_whitespace().collect();
        if terms.is_empty() {
            return QueryResult::not_found("Table description is empty.");
        }

        let mut hits: Vec<ExhibitHit<'a>> = exhibits
            .iter()
            .filter(|e| document_matches(&e.source_document, document_filter))
            .map(|exhibit| ExhibitHit {
                score: description_score(exhibit, &terms),
                exhibit,
            })
            .filter(|hit| hit.score > 0)
            .collect();

        if hits.is_empty() {
            return QueryResult::not_found(format!("No tables found matching '{description}'."));
        }

        // Stable: ties keep corpus order
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        // Zero means "use the default", never an empty hit list
        let top_k = top_k.filter(|&k| k > 0).unwrap_or(self.limits.exhibits_top_k);
        hits.truncate(top_k);
        QueryResult::Found(hits)
    }

    /// First row, across exhibits matching `exhibit_name`, whose cells
    /// contain every expected value under its column.
    ///
    /// Column names and expected values match case-insensitively as
    /// substrings. An exhibit that lacks one of the criteria columns is
    /// passed over; the lookup reports `ColumnNotFound` only when no
    /// candidate exhibit has them all.
    pub fn find_value(
        &self,
        exhibit_name: &str,
        criteria: &[(&str, &str)],
        return_column: Option<&str>,
    ) -> QueryResult<ValueMatch> {
        let candidates = match self.find_exhibit(exhibit_name) {
            QueryResult::Found(candidates) => candidates,
            QueryResult::NoData => return QueryResult::NoData,
            QueryResult::NotFound { reason } => return QueryResult::NotFound { reason },
            QueryResult::ColumnNotFound { column, exhibit } => {
                return QueryResult::ColumnNotFound { column, exhibit }
            }
        };

        let expected: Vec<(&str, String)> = criteria
            .iter()
            .map(|(column, value)| (*column, value.to_lowercase()))
            .collect();

        let mut unresolved_column: Option<&str> = None;
        let mut any_resolved = false;

        for exhibit in candidates {
            let headers = normalize_headers(&exhibit.headers);

            let mut indices = Vec::with_capacity(expected.len());
            for (column, _) in &expected {
                match resolve_column(&headers, column) {
                    Some(index) => indices.push(index),
                    None => {
                        tracing::debug!("Column '{column}' not in {}", exhibit.exhibit_id);
                        unresolved_column.get_or_insert(*column);
                        break;
                    }
                }
            }
            if indices.len() < expected.len() {
                continue;
            }
            any_resolved = true;

            let matched = exhibit.rows.iter().enumerate().find(|(_, row)| {
                indices.iter().zip(&expected).all(|(&index, (_, value))| {
                    row.get(index)
                        .is_some_and(|cell| cell.to_lowercase().contains(value.as_str()))
                })
            });

            let Some((row_index, row)) = matched else {
                continue;
            };

            let value = match return_column {
                Some(column) => match resolve_column(&headers, column) {
                    Some(index) => MatchedValue::Cell {
                        column: exhibit.headers[index].clone(),
                        // Short rows are padded with empty cells
                        value: row.get(index).cloned().unwrap_or_default(),
                    },
                    None => {
                        return QueryResult::ColumnNotFound {
                            column: column.to_string(),
                            exhibit: exhibit.exhibit_id.clone(),
                        }
                    }
                },
                None => MatchedValue::Row {
                    headers: exhibit.headers.clone(),
                    cells: row.clone(),
                },
            };

            return QueryResult::Found(ValueMatch {
                exhibit_id: exhibit.exhibit_id.clone(),
                exhibit_name: exhibit.exhibit_name.clone(),
                row_index,
                value,
            });
        }

        match unresolved_column {
            Some(column) if !any_resolved => QueryResult::ColumnNotFound {
                column: column.to_string(),
                exhibit: exhibit_name.to_string(),
            },
            _ => QueryResult::not_found(format!(
                "No matching row found for criteria: {}",
                describe_criteria(criteria)
            )),
        }
    }

    /// Matching exhibits with either a leading sample of rows or the rows
    /// that mention `description`.
    pub fn extract_table(
        &self,
        exhibit_name: &str,
        description: Option<&str>,
    ) -> QueryResult<Vec<TableView>> {
        let description = description.map(str::trim).filter(|d| !d.is_empty());

        self.find_exhibit(exhibit_name).map(|exhibits| {
            exhibits
                .into_iter()
                .map(|exhibit| match description {
                    Some(description) => {
                        let needle = description.to_lowercase();
                        let matching: Vec<&Vec<String>> = exhibit
                            .rows
                            .iter()
                            .filter(|row| row.iter().any(|cell| cell.to_lowercase().contains(&needle)))
                            .collect();
                        TableView {
                            summary: ExhibitSummary::from(exhibit),
                            selection: RowSelection::Matching {
                                description: description.to_string(),
                                total_matches: matching.len(),
                            },
                            rows: matching
                                .into_iter()
                                .take(self.limits.matching_rows)
                                .cloned()
                                .collect(),
                        }
                    }
                    None => TableView {
                        summary: ExhibitSummary::from(exhibit),
                        selection: RowSelection::Sample,
                        rows: exhibit.rows.iter().take(self.limits.sample_rows).cloned().collect(),
                    },
                })
                .collect()
        })
    }

    pub fn list_documents(&self) -> QueryResult<Vec<&'a SourceDocument>> {
        let documents = self.corpus.documents();
        if documents.is_empty() {
            QueryResult::NoData
        } else {
            QueryResult::Found(documents.iter().collect())
        }
    }
}

/// First header containing `column`, compared on normalized text.
fn resolve_column(normalized_headers: &[String], column: &str) -> Option<usize> {
    let needle = normalize_header(column);
    normalized_headers.iter().position(|h| h.contains(&needle))
}

fn description_score(exhibit: &Exhibit, terms: &[&str]) -> u32 {
    // Merge separators are not page content
    let mut haystack = exhibit.page_text.replace(PAGE_BREAK, "\n").to_lowercase();
    for header in &exhibit.headers {
        haystack.push(' ');
        haystack.push_str(&header.to_lowercase());
    }
    terms
        .iter()
        .map(|term| haystack.matches(term).count() as u32)
        .sum()
}

fn describe_criteria(criteria: &[(&str, &str)]) -> String {
    criteria
        .iter()
        .map(|(column, value)| format!("{column}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

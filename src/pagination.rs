use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::PageDefaults;
use crate::error::{AppError, AppResult};

/// PageQueryParams
///
/// Raw query parameters accepted by every paginated list endpoint. Values stay strings so
/// that malformed input surfaces as a structured `ParameterValidation` error instead of an
/// extractor rejection.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct PageQueryParams {
    /// 1-based page number.
    pub page: Option<String>,
    /// Number of records per page.
    pub size: Option<String>,
    /// Field to sort by, using the JSON field name (e.g. `name`, `factoryNumber`).
    pub field: Option<String>,
    /// `true`/`asc` for ascending, `false`/`desc` for descending. Also accepted as `asc`.
    #[serde(alias = "asc")]
    pub direction: Option<String>,
}

/// PageParams
///
/// Normalized pagination request as seen at the API boundary (page numbers are 1-based).
#[derive(Debug, Clone, PartialEq)]
pub struct PageParams {
    pub page_number: i64,
    pub page_size: i64,
    pub sort_field: String,
    pub sort_ascending: bool,
}

/// Maps a sortable JSON field name to its column.
pub type SortColumns = &'static [(&'static str, &'static str)];

/// PageQuery
///
/// Store-facing form of `PageParams`: 0-based page index and a whitelisted column name,
/// safe to splice into an `ORDER BY` clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageQuery {
    pub page_index: i64,
    pub page_size: i64,
    /// JSON name of the sort field, as matched against the whitelist.
    pub sort_field: &'static str,
    pub sort_column: &'static str,
    pub ascending: bool,
}

impl PageQuery {
    /// Rows to skip. `to_query` guarantees this fits in an `i64`.
    pub fn offset(&self) -> i64 {
        self.page_index.saturating_mul(self.page_size)
    }
}

impl PageParams {
    /// Resolves the sort field against `columns` and converts to a 0-based query.
    pub fn to_query(&self, columns: SortColumns) -> AppResult<PageQuery> {
        let (sort_field, sort_column) = columns
            .iter()
            .find(|(field, _)| *field == self.sort_field)
            .copied()
            .ok_or_else(|| {
                let allowed: Vec<&str> = columns.iter().map(|(field, _)| *field).collect();
                AppError::ParameterValidation(format!(
                    "Cannot sort by \"{}\"; allowed fields: {}",
                    self.sort_field,
                    allowed.join(", ")
                ))
            })?;

        let page_index = self.page_number - 1;
        if page_index.checked_mul(self.page_size).is_none() {
            return Err(AppError::ParameterValidation(format!(
                "Parameter \"page\" is out of range: {}",
                self.page_number
            )));
        }

        Ok(PageQuery {
            page_index,
            page_size: self.page_size,
            sort_field,
            sort_column,
            ascending: self.sort_ascending,
        })
    }
}

/// Page
///
/// One slice of a sorted collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// 0-based index of this slice.
    pub page_number: i64,
    pub total_pages: i64,
    pub content: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(query: &PageQuery, total_elements: i64, content: Vec<T>) -> Self {
        let total_pages = if total_elements <= 0 || query.page_size <= 0 {
            0
        } else {
            (total_elements + query.page_size - 1) / query.page_size
        };
        Self {
            page_number: query.page_index,
            total_pages,
            content,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page_number: self.page_number,
            total_pages: self.total_pages,
            content: self.content.into_iter().map(f).collect(),
        }
    }
}

/// PageResolver
///
/// Turns raw query strings into `PageParams`, filling blanks from the configured defaults.
#[derive(Debug, Clone)]
pub struct PageResolver {
    defaults: PageDefaults,
}

impl PageResolver {
    pub fn new(defaults: PageDefaults) -> Self {
        Self { defaults }
    }

    pub fn resolve(&self, params: &PageQueryParams) -> AppResult<PageParams> {
        Ok(PageParams {
            page_number: self.page_number(params.page.as_deref())?,
            page_size: self.page_size(params.size.as_deref())?,
            sort_field: self.sort_field(params.field.as_deref()),
            sort_ascending: self.sort_direction(params.direction.as_deref())?,
        })
    }

    pub fn page_number(&self, raw: Option<&str>) -> AppResult<i64> {
        let number = match non_blank(raw) {
            Some(value) => parse_positive("page", value)?,
            None => self.defaults.number,
        };
        Ok(number)
    }

    pub fn page_size(&self, raw: Option<&str>) -> AppResult<i64> {
        let Some(value) = non_blank(raw) else {
            return Ok(self.defaults.size);
        };
        let size = parse_positive("size", value)?;
        if size > self.defaults.max_size {
            return Err(AppError::ParameterValidation(format!(
                "Parameter \"size\" must not exceed {}",
                self.defaults.max_size
            )));
        }
        Ok(size)
    }

    pub fn sort_field(&self, raw: Option<&str>) -> String {
        non_blank(raw)
            .map(str::to_string)
            .unwrap_or_else(|| self.defaults.sort_field.clone())
    }

    pub fn sort_direction(&self, raw: Option<&str>) -> AppResult<bool> {
        let Some(value) = non_blank(raw) else {
            return Ok(self.defaults.sort_ascending);
        };
        match value.to_ascii_lowercase().as_str() {
            "true" | "asc" => Ok(true),
            "false" | "desc" => Ok(false),
            _ => Err(AppError::ParameterValidation(format!(
                "Invalid parameter \"direction\": '{value}'"
            ))),
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_positive(name: &str, value: &str) -> AppResult<i64> {
    let parsed: i64 = value.parse().map_err(|_| {
        AppError::ParameterValidation(format!("Invalid parameter \"{name}\": '{value}'"))
    })?;
    if parsed < 1 {
        return Err(AppError::ParameterValidation(format!(
            "Parameter \"{name}\" must be at least 1"
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: SortColumns = &[("id", "id"), ("name", "type_name")];

    fn resolver() -> PageResolver {
        PageResolver::new(PageDefaults::default())
    }

    fn params(page: &str, size: &str, field: &str, direction: &str) -> PageQueryParams {
        PageQueryParams {
            page: Some(page.to_string()),
            size: Some(size.to_string()),
            field: Some(field.to_string()),
            direction: Some(direction.to_string()),
        }
    }

    #[test]
    fn blanks_fall_back_to_defaults() {
        let resolved = resolver().resolve(&params(" ", "", "", "")).unwrap();
        assert_eq!(
            resolved,
            PageParams {
                page_number: 1,
                page_size: 5,
                sort_field: "id".to_string(),
                sort_ascending: true,
            }
        );
        assert_eq!(
            resolver().resolve(&PageQueryParams::default()).unwrap(),
            resolved
        );
    }

    #[test]
    fn explicit_values_are_parsed() {
        let resolved = resolver().resolve(&params("3", "20", "name", "desc")).unwrap();
        assert_eq!(resolved.page_number, 3);
        assert_eq!(resolved.page_size, 20);
        assert_eq!(resolved.sort_field, "name");
        assert!(!resolved.sort_ascending);
    }

    #[test]
    fn non_numeric_page_is_a_parameter_error() {
        let err = resolver().page_number(Some("first")).unwrap_err();
        assert!(matches!(err, AppError::ParameterValidation(msg) if msg.contains("page")));

        let err = resolver().page_size(Some("5x")).unwrap_err();
        assert!(matches!(err, AppError::ParameterValidation(msg) if msg.contains("size")));
    }

    #[test]
    fn zero_and_oversized_pages_are_rejected() {
        assert!(resolver().page_number(Some("0")).is_err());
        assert!(resolver().page_size(Some("-2")).is_err());
        assert!(resolver().page_size(Some("101")).is_err());
        assert_eq!(resolver().page_size(Some("100")).unwrap(), 100);
    }

    #[test]
    fn direction_accepts_booleans_and_keywords() {
        assert!(resolver().sort_direction(Some("TRUE")).unwrap());
        assert!(resolver().sort_direction(Some("asc")).unwrap());
        assert!(!resolver().sort_direction(Some("false")).unwrap());
        assert!(!resolver().sort_direction(Some("Desc")).unwrap());
        assert!(resolver().sort_direction(Some("sideways")).is_err());
    }

    #[test]
    fn to_query_is_zero_based_and_whitelisted() {
        let resolved = resolver().resolve(&params("2", "5", "name", "true")).unwrap();
        let query = resolved.to_query(COLUMNS).unwrap();
        assert_eq!(query.page_index, 1);
        assert_eq!(query.offset(), 5);
        assert_eq!(query.sort_column, "type_name");

        let unknown = PageParams {
            sort_field: "name; DROP TABLE emitter".to_string(),
            ..resolved
        };
        assert!(matches!(
            unknown.to_query(COLUMNS),
            Err(AppError::ParameterValidation(_))
        ));
    }

    #[test]
    fn page_beyond_addressable_rows_is_rejected() {
        let resolved = resolver()
            .resolve(&params("9223372036854775807", "5", "id", "true"))
            .unwrap();

        let err = resolved.to_query(COLUMNS).unwrap_err();
        assert!(matches!(err, AppError::ParameterValidation(msg) if msg.contains("page")));

        let last_valid = PageParams {
            page_number: i64::MAX / 5,
            ..resolved
        };
        assert!(last_valid.to_query(COLUMNS).is_ok());
    }

    #[test]
    fn total_pages_rounds_up() {
        let query = PageQuery {
            page_index: 0,
            page_size: 5,
            sort_field: "id",
            sort_column: "id",
            ascending: true,
        };
        assert_eq!(Page::new(&query, 3, vec![1, 2, 3]).total_pages, 1);
        assert_eq!(Page::new(&query, 10, Vec::<i32>::new()).total_pages, 2);
        assert_eq!(Page::new(&query, 11, Vec::<i32>::new()).total_pages, 3);
        assert_eq!(Page::new(&query, 0, Vec::<i32>::new()).total_pages, 0);

        let empty_size = PageQuery { page_size: 0, ..query };
        assert_eq!(Page::new(&empty_size, 4, Vec::<i32>::new()).total_pages, 0);
    }
}

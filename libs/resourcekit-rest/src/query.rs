use resourcekit_db::{Filter, ResourceError};

/// Parsed list query: `page`, `size` and every other parameter as an exact-match filter.
///
/// Repeated parameters keep their first value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: i64,
    pub size: i64,
    pub filter: Filter,
}

impl ListParams {
    /// # Errors
    /// Returns [`ResourceError::InvalidFilter`] if the query string cannot be decoded or
    /// `page`/`size` is not an integer.
    pub fn parse(raw: Option<&str>, default_size: u64) -> Result<Self, ResourceError> {
        let pairs: Vec<(String, String)> = match raw {
            Some(q) => serde_urlencoded::from_str(q)
                .map_err(|e| ResourceError::invalid_filter("query", e.to_string()))?,
            None => Vec::new(),
        };

        let mut page = None;
        let mut size = None;
        let mut filter = Filter::new();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => {
                    if page.is_none() {
                        page = Some(parse_int("page", &value)?);
                    }
                }
                "size" => {
                    if size.is_none() {
                        size = Some(parse_int("size", &value)?);
                    }
                }
                _ => {
                    filter.entry(key).or_insert(value);
                }
            }
        }

        Ok(Self {
            page: page.unwrap_or(1),
            size: size.unwrap_or_else(|| i64::try_from(default_size).unwrap_or(i64::MAX)),
            filter,
        })
    }
}

fn parse_int(field: &str, raw: &str) -> Result<i64, ResourceError> {
    raw.trim()
        .parse()
        .map_err(|_| ResourceError::invalid_filter(field, "must be an integer"))
}

//! Search criteria builders
//!
//! Magento list endpoints take their filters as flat query parameters:
//!
//! ```text
//! searchCriteria[filter_groups][0][filters][0][field]=status
//! searchCriteria[filter_groups][0][filters][0][value]=pending
//! searchCriteria[filter_groups][0][filters][0][condition_type]=eq
//! searchCriteria[sortOrders][0][field]=created_at
//! searchCriteria[sortOrders][0][direction]=DESC
//! ```
//!
//! Filters inside a group are OR-ed; groups are AND-ed.

use crate::types::{JsonValue, Query};

/// Page size parameter key
pub const PAGE_SIZE_KEY: &str = "searchCriteria[pageSize]";

/// Current page parameter key
pub const CURRENT_PAGE_KEY: &str = "searchCriteria[currentPage]";

/// A single field condition
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name
    pub field: String,
    /// Value to compare against
    pub value: JsonValue,
    /// Condition type (`eq`, `in`, `like`, `gt`, ...). Magento defaults to `eq`.
    pub condition_type: Option<String>,
}

impl Filter {
    /// Create a filter without an explicit condition type
    pub fn new(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            condition_type: None,
        }
    }

    /// Create an `eq` filter
    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(field, value).condition("eq")
    }

    /// Create an `in` filter over comma-joined values
    pub fn is_in<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(field, joined).condition("in")
    }

    /// Set the condition type
    #[must_use]
    pub fn condition(mut self, condition_type: impl Into<String>) -> Self {
        self.condition_type = Some(condition_type.into());
        self
    }
}

impl<F: Into<String>, V: Into<JsonValue>> From<(F, V)> for Filter {
    fn from((field, value): (F, V)) -> Self {
        Filter::new(field, value)
    }
}

impl<F: Into<String>, V: Into<JsonValue>> From<(F, V, &str)> for Filter {
    fn from((field, value, condition_type): (F, V, &str)) -> Self {
        Filter::new(field, value).condition(condition_type)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A sort order on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    /// Field name
    pub field: String,
    /// Direction as sent to the API (`ASC`/`DESC`, case is passed through)
    pub direction: String,
}

impl SortOrder {
    /// Create a sort order with a raw direction string
    pub fn new(field: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: direction.into(),
        }
    }

    /// Ascending order on a field
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc.as_str())
    }

    /// Descending order on a field
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc.as_str())
    }
}

impl<F: Into<String>, D: Into<String>> From<(F, D)> for SortOrder {
    fn from((field, direction): (F, D)) -> Self {
        SortOrder::new(field, direction)
    }
}

/// Builder for search criteria queries
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    filter_groups: Vec<Vec<Filter>>,
    sort_orders: Vec<SortOrder>,
    page_size: Option<usize>,
    current_page: Option<usize>,
}

impl SearchQuery {
    /// Create an empty search query
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group of OR-ed filters
    #[must_use]
    pub fn filter_group<I, F>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Filter>,
    {
        self.filter_groups
            .push(filters.into_iter().map(Into::into).collect());
        self
    }

    /// Add a group holding a single filter
    #[must_use]
    pub fn filter(self, filter: impl Into<Filter>) -> Self {
        self.filter_group([filter.into()])
    }

    /// Add a sort order
    #[must_use]
    pub fn sort_order(mut self, order: impl Into<SortOrder>) -> Self {
        self.sort_orders.push(order.into());
        self
    }

    /// Set the page size
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the current page (1-based)
    #[must_use]
    pub fn current_page(mut self, current_page: usize) -> Self {
        self.current_page = Some(current_page);
        self
    }

    /// Encode into query parameters
    pub fn build(self) -> Query {
        let mut query = Query::new();

        if let Some(page_size) = self.page_size {
            query.insert(PAGE_SIZE_KEY, page_size);
        }
        if let Some(current_page) = self.current_page {
            query.insert(CURRENT_PAGE_KEY, current_page);
        }

        for (group_index, group) in self.filter_groups.into_iter().enumerate() {
            for (filter_index, filter) in group.into_iter().enumerate() {
                let prefix =
                    format!("searchCriteria[filter_groups][{group_index}][filters][{filter_index}]");
                query.insert(format!("{prefix}[field]"), filter.field);
                query.insert(format!("{prefix}[value]"), filter.value);
                if let Some(condition_type) = filter.condition_type {
                    query.insert(format!("{prefix}[condition_type]"), condition_type);
                }
            }
        }

        for (index, order) in self.sort_orders.into_iter().enumerate() {
            let prefix = format!("searchCriteria[sortOrders][{index}]");
            query.insert(format!("{prefix}[field]"), order.field);
            query.insert(format!("{prefix}[direction]"), order.direction);
        }

        query
    }
}

impl From<SearchQuery> for Query {
    fn from(search: SearchQuery) -> Self {
        search.build()
    }
}

/// Query selecting entities whose `field` matches `value`.
///
/// Without a condition type Magento compares with `eq`.
pub fn make_field_value_query(
    field: impl Into<String>,
    value: impl Into<JsonValue>,
    condition_type: Option<&str>,
) -> Query {
    let mut filter = Filter::new(field, value);
    if let Some(condition_type) = condition_type {
        filter = filter.condition(condition_type);
    }
    SearchQuery::new().filter(filter).build()
}

/// Query from AND-ed filter groups and sort orders
pub fn make_search_query<G, F>(filter_groups: G, sort_orders: &[SortOrder]) -> Query
where
    G: IntoIterator,
    G::Item: IntoIterator<Item = F>,
    F: Into<Filter>,
{
    let mut search = SearchQuery::new();
    for group in filter_groups {
        search = search.filter_group(group);
    }
    for order in sort_orders {
        search = search.sort_order(order.clone());
    }
    search.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_make_search_query() {
        let query = SearchQuery::new()
            .filter_group([
                Filter::new("a", 1).condition("gt"),
                Filter::new("b", 2).condition("eq"),
            ])
            .filter_group([Filter::new("c", 3)])
            .page_size(12)
            .current_page(4)
            .build();

        let expected: Query = [
            ("searchCriteria[pageSize]", json!(12)),
            ("searchCriteria[currentPage]", json!(4)),
            ("searchCriteria[filter_groups][0][filters][0][field]", json!("a")),
            ("searchCriteria[filter_groups][0][filters][0][value]", json!(1)),
            ("searchCriteria[filter_groups][0][filters][0][condition_type]", json!("gt")),
            ("searchCriteria[filter_groups][0][filters][1][field]", json!("b")),
            ("searchCriteria[filter_groups][0][filters][1][value]", json!(2)),
            ("searchCriteria[filter_groups][0][filters][1][condition_type]", json!("eq")),
            ("searchCriteria[filter_groups][1][filters][0][field]", json!("c")),
            ("searchCriteria[filter_groups][1][filters][0][value]", json!(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(query, expected);
    }

    #[test]
    fn test_make_search_query_from_tuples() {
        let query = make_search_query(
            vec![vec![("a", json!(1), "gt")], vec![("c", json!(3), "eq")]],
            &[SortOrder::desc("increment_id")],
        );
        assert_eq!(
            query.get("searchCriteria[filter_groups][1][filters][0][field]"),
            Some(&json!("c"))
        );
        assert_eq!(
            query.get("searchCriteria[sortOrders][0][field]"),
            Some(&json!("increment_id"))
        );
        assert_eq!(
            query.get("searchCriteria[sortOrders][0][direction]"),
            Some(&json!("DESC"))
        );
    }

    #[test]
    fn test_make_search_query_sort_only() {
        let query = make_search_query(Vec::<Vec<Filter>>::new(), &[SortOrder::asc("sku")]);
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_make_field_value_query() {
        let query = make_field_value_query("status", "awaiting_shipping", None);
        let expected: Query = [
            ("searchCriteria[filter_groups][0][filters][0][field]", json!("status")),
            ("searchCriteria[filter_groups][0][filters][0][value]", json!("awaiting_shipping")),
        ]
        .into_iter()
        .collect();
        assert_eq!(query, expected);
    }

    #[test]
    fn test_make_field_value_query_with_condition_and_sort() {
        let query = SearchQuery::new()
            .filter(Filter::eq("source_code", "default"))
            .page_size(34)
            .current_page(42)
            .sort_order(("sku", "desc"))
            .build();

        let expected: Query = [
            ("searchCriteria[filter_groups][0][filters][0][field]", json!("source_code")),
            ("searchCriteria[filter_groups][0][filters][0][value]", json!("default")),
            ("searchCriteria[filter_groups][0][filters][0][condition_type]", json!("eq")),
            ("searchCriteria[pageSize]", json!(34)),
            ("searchCriteria[currentPage]", json!(42)),
            ("searchCriteria[sortOrders][0][field]", json!("sku")),
            ("searchCriteria[sortOrders][0][direction]", json!("desc")),
        ]
        .into_iter()
        .collect();
        assert_eq!(query, expected);
    }

    #[test]
    fn test_filter_is_in() {
        let filter = Filter::is_in("sku", ["A1", "B2", "C3"]);
        assert_eq!(filter.value, json!("A1,B2,C3"));
        assert_eq!(filter.condition_type.as_deref(), Some("in"));
    }
}

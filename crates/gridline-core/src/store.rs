//! Data store: original records plus the derived view (sort → filter → page).

use crate::key::{KeyField, RowKey};
use crate::value::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// The opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Lowercase name, as used in markup.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// The single active sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Column key
    pub key: String,
    /// Direction
    #[serde(default)]
    pub order: SortOrder,
}

impl SortState {
    /// Ascending sort on a column.
    #[must_use]
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending sort on a column.
    #[must_use]
    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Accepted raw values per column, AND-combined across columns.
///
/// Absent values are matched as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    filters: BTreeMap<String, BTreeSet<String>>,
}

impl FilterState {
    /// Create an empty filter state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accepted values of a column. An empty set clears the filter.
    ///
    /// Returns whether a filter is active on the column afterwards.
    pub fn set<I, S>(&mut self, key: impl Into<String>, values: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.filters.remove(&key);
            false
        } else {
            self.filters.insert(key, values);
            true
        }
    }

    /// Remove the filter of a column.
    pub fn clear(&mut self, key: &str) {
        self.filters.remove(key);
    }

    /// Accepted values of a column.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.filters.get(key)
    }

    /// Check if a column is filtered.
    #[must_use]
    pub fn is_active(&self, key: &str) -> bool {
        self.filters.contains_key(key)
    }

    /// Check if no column is filtered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filtered column keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Check a record against every filter.
    #[must_use]
    pub fn accepts(&self, record: &Record) -> bool {
        self.filters.iter().all(|(key, accepted)| {
            let value = record.display(key).unwrap_or_default();
            accepted.contains(&value)
        })
    }
}

/// Paging configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingOptions {
    /// Whether the view is split into pages
    #[serde(default)]
    pub enabled: bool,
    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

const fn default_page_size() -> usize {
    10
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            page_size: default_page_size(),
        }
    }
}

impl PagingOptions {
    /// Paging with the given page size.
    #[must_use]
    pub const fn pages_of(page_size: usize) -> Self {
        Self {
            enabled: true,
            page_size,
        }
    }
}

/// Paging position, recomputed on every view derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PagingState {
    /// Current page, 1-based
    pub current_page: usize,
    /// Records per page
    pub page_size: usize,
    /// Records after filtering
    pub total_records: usize,
    /// Number of pages, at least 1
    pub total_pages: usize,
}

impl PagingState {
    /// Compute paging for a record count, clamping the requested page.
    #[must_use]
    pub fn new(requested_page: usize, page_size: usize, total_records: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_records.div_ceil(page_size).max(1);
        Self {
            current_page: requested_page.clamp(1, total_pages),
            page_size,
            total_records,
            total_pages,
        }
    }

    /// A single page holding every record.
    #[must_use]
    pub fn single(total_records: usize) -> Self {
        Self {
            current_page: 1,
            page_size: total_records.max(1),
            total_records,
            total_pages: 1,
        }
    }

    /// Check if a page number exists.
    #[must_use]
    pub const fn has_page(&self, page: usize) -> bool {
        page >= 1 && page <= self.total_pages
    }

    /// Index range of the current page within the filtered records.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let start = (self.current_page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.total_records);
        start.min(end)..end
    }
}

/// Sort records in place, nulls last regardless of direction. Stable.
pub fn sort_records(records: &mut [&Record], sort: &SortState) {
    records.sort_by(|a, b| {
        let a = a.get(&sort.key).filter(|v| !v.is_empty());
        let b = b.get(&sort.key).filter(|v| !v.is_empty());
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => match sort.order {
                SortOrder::Asc => a.compare(b),
                SortOrder::Desc => b.compare(a),
            },
        }
    });
}

/// The displayed slice of the data.
#[derive(Debug, Clone)]
pub struct View<'a> {
    /// Records of the current page, in display order
    pub rows: Vec<&'a Record>,
    /// Paging position
    pub paging: PagingState,
}

/// Owns the original records and the view parameters.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    records: Vec<Record>,
    sort: Option<SortState>,
    filters: FilterState,
    paging: PagingOptions,
    current_page: usize,
}

impl DataStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(paging: PagingOptions) -> Self {
        Self {
            paging,
            current_page: 1,
            ..Self::default()
        }
    }

    /// Replace all records, keeping the current page when it still exists.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.current_page = self.paging_state().current_page;
    }

    /// Original records.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of original records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Active sort.
    #[must_use]
    pub const fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Set or clear the sort.
    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
    }

    /// Active filters.
    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Set the accepted values of a column and go back to page 1.
    ///
    /// Returns whether the column is filtered afterwards.
    pub fn set_filter<I, S>(&mut self, key: &str, values: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current_page = 1;
        self.filters.set(key, values)
    }

    /// Paging configuration.
    #[must_use]
    pub const fn paging_options(&self) -> PagingOptions {
        self.paging
    }

    /// Requested page.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Go to a page. Returns `false` (and changes nothing) when out of range.
    pub fn goto_page(&mut self, page: usize) -> bool {
        if !self.paging_state().has_page(page) {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Sorted and filtered records across all pages.
    #[must_use]
    pub fn filtered(&self) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self.records.iter().collect();
        if let Some(sort) = &self.sort {
            sort_records(&mut rows, sort);
        }
        rows.retain(|r| self.filters.accepts(r));
        rows
    }

    fn paging_for(&self, total: usize) -> PagingState {
        if self.paging.enabled {
            PagingState::new(self.current_page, self.paging.page_size, total)
        } else {
            PagingState::single(total)
        }
    }

    /// Paging position of the current view.
    #[must_use]
    pub fn paging_state(&self) -> PagingState {
        let total = if self.filters.is_empty() {
            self.records.len()
        } else {
            self.records.iter().filter(|r| self.filters.accepts(r)).count()
        };
        self.paging_for(total)
    }

    /// Derive the view: sort, filter, then take the current page.
    #[must_use]
    pub fn view(&self) -> View<'_> {
        let rows = self.filtered();
        let paging = self.paging_for(rows.len());
        let range = paging.range();
        View {
            rows: rows[range].to_vec(),
            paging,
        }
    }

    /// Find an original record by key.
    #[must_use]
    pub fn find(&self, key_field: &KeyField, key: &RowKey) -> Option<&Record> {
        self.position(key_field, key).map(|i| &self.records[i])
    }

    fn position(&self, key_field: &KeyField, key: &RowKey) -> Option<usize> {
        if key_field.is_empty() {
            return None;
        }
        self.records.iter().position(|r| key_field.key_of(r) == *key)
    }

    /// Index of a record borrowed from this store.
    #[must_use]
    pub fn index_of(&self, record: &Record) -> Option<usize> {
        self.records.iter().position(|r| std::ptr::eq(r, record))
    }

    /// Replace the record at `index` with a new record array.
    ///
    /// Returns `false` when the index is out of range.
    pub fn replace_at(&mut self, index: usize, record: Record) -> bool {
        if index >= self.records.len() {
            return false;
        }
        let mut records = self.records.clone();
        records[index] = record;
        self.records = records;
        true
    }

    /// Distinct display values of a column over the original records,
    /// sorted, with the empty value last.
    #[must_use]
    pub fn distinct_values(&self, key: &str) -> Vec<String> {
        let values: BTreeSet<String> = self
            .records
            .iter()
            .map(|r| r.display(key).unwrap_or_default())
            .collect();
        let (mut present, empty): (Vec<String>, Vec<String>) =
            values.into_iter().partition(|v| !v.is_empty());
        present.extend(empty);
        present
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;
    use proptest::prelude::*;

    fn rec(field: &str, value: impl Into<CellValue>) -> Record {
        Record::new().cell(field, value)
    }

    fn values(view: &View<'_>, field: &str) -> Vec<String> {
        view.rows
            .iter()
            .map(|r| r.display(field).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_sort_nulls_last_ascending() {
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records(vec![rec("n", "b"), rec("n", "a"), rec("n", CellValue::Empty)]);
        store.set_sort(Some(SortState::asc("n")));
        assert_eq!(values(&store.view(), "n"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_sort_nulls_last_descending() {
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records(vec![rec("n", CellValue::Empty), rec("n", "a"), rec("n", "b")]);
        store.set_sort(Some(SortState::desc("n")));
        assert_eq!(values(&store.view(), "n"), vec!["b", "a", ""]);
    }

    #[test]
    fn test_sort_numbers_numerically() {
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records(vec![rec("n", 10), rec("n", 9), rec("n", 100)]);
        store.set_sort(Some(SortState::asc("n")));
        assert_eq!(values(&store.view(), "n"), vec!["9", "10", "100"]);
    }

    #[test]
    fn test_filter_and_clear() {
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records(vec![rec("s", "X"), rec("s", "Y"), rec("s", "X")]);

        assert!(store.set_filter("s", ["X"]));
        assert_eq!(values(&store.view(), "s"), vec!["X", "X"]);

        assert!(!store.set_filter("s", Vec::<String>::new()));
        assert_eq!(store.view().rows.len(), 3);
    }

    #[test]
    fn test_filters_and_combined() {
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records(vec![
            Record::new().cell("a", "1").cell("b", "x"),
            Record::new().cell("a", "1").cell("b", "y"),
            Record::new().cell("a", "2").cell("b", "x"),
        ]);
        store.set_filter("a", ["1"]);
        store.set_filter("b", ["x"]);
        assert_eq!(store.view().rows.len(), 1);
    }

    #[test]
    fn test_paging_25_records() {
        let mut store = DataStore::new(PagingOptions::pages_of(10));
        store.set_records((0..25).map(|i| rec("i", i)).collect());

        let view = store.view();
        assert_eq!(view.paging.total_pages, 3);
        assert_eq!(values(&view, "i").first().map(String::as_str), Some("0"));
        assert_eq!(view.rows.len(), 10);

        assert!(store.goto_page(3));
        let view = store.view();
        assert_eq!(values(&view, "i"), vec!["20", "21", "22", "23", "24"]);

        assert!(!store.goto_page(4));
        assert!(!store.goto_page(0));
        assert_eq!(store.current_page(), 3);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut store = DataStore::new(PagingOptions::pages_of(2));
        store.set_records((0..6).map(|i| rec("i", i)).collect());
        store.goto_page(3);
        store.set_filter("i", ["1", "2", "3"]);
        assert_eq!(store.current_page(), 1);
        assert_eq!(store.view().paging.total_pages, 2);
    }

    #[test]
    fn test_paging_disabled_single_page() {
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records((0..25).map(|i| rec("i", i)).collect());
        let view = store.view();
        assert_eq!(view.rows.len(), 25);
        assert_eq!(view.paging.total_pages, 1);
    }

    #[test]
    fn test_paging_empty() {
        let paging = PagingState::new(1, 10, 0);
        assert_eq!(paging.total_pages, 1);
        assert_eq!(paging.range(), 0..0);
    }

    #[test]
    fn test_find_by_key() {
        let kf = KeyField::parse("id");
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records(vec![
            Record::new().cell("id", 1).cell("v", "a"),
            Record::new().cell("id", 2).cell("v", "b"),
        ]);

        let key = RowKey::new("2");
        assert_eq!(store.find(&kf, &key).and_then(|r| r.display("v")), Some("b".into()));
        assert!(store.find(&kf, &RowKey::new("9")).is_none());
        assert!(store.find(&KeyField::default(), &key).is_none());
    }

    #[test]
    fn test_index_of_and_replace_at() {
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records(vec![rec("v", "a"), rec("v", "a")]);
        let second = store.view().rows[1];
        assert_eq!(store.index_of(second), Some(1));
        assert_eq!(store.index_of(&rec("v", "a")), None);

        assert!(store.replace_at(1, rec("v", "b")));
        assert_eq!(store.records()[1].display("v"), Some("b".into()));
        assert!(!store.replace_at(2, Record::new()));
    }

    #[test]
    fn test_distinct_values_empty_last() {
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records(vec![
            rec("s", "b"),
            rec("s", CellValue::Empty),
            rec("s", "a"),
            rec("s", "b"),
        ]);
        assert_eq!(store.distinct_values("s"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_shrinking_data_clamps_page() {
        let mut store = DataStore::new(PagingOptions::pages_of(10));
        store.set_records((0..25).map(|i| rec("n", i)).collect());
        assert!(store.goto_page(3));

        store.set_records((0..5).map(|i| rec("n", i)).collect());
        assert_eq!(store.current_page(), 1);
        assert_eq!(store.view().paging.current_page, 1);

        store.set_records((0..25).map(|i| rec("n", i)).collect());
        assert_eq!(store.current_page(), 1);
        assert_eq!(values(&store.view(), "n")[0], "0");
    }

    #[test]
    fn test_sort_mixed_kinds() {
        let mut store = DataStore::new(PagingOptions::default());
        store.set_records(vec![
            rec("v", "n10"),
            rec("v", 9.0),
            rec("v", CellValue::Empty),
            rec("v", true),
            rec("v", "10"),
            rec("v", 100.0),
        ]);
        store.set_sort(Some(SortState::asc("v")));
        assert_eq!(values(&store.view(), "v"), vec!["9", "100", "true", "10", "n10", ""]);

        store.set_sort(Some(SortState::desc("v")));
        assert_eq!(values(&store.view(), "v"), vec!["n10", "10", "true", "100", "9", ""]);
    }

    fn mixed_value() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            (-50i32..50).prop_map(|n| CellValue::Number(f64::from(n))),
            (0u32..200).prop_map(|n| CellValue::Text(n.to_string())),
            (0u32..200).prop_map(|n| CellValue::Text(format!("n{n}"))),
            any::<bool>().prop_map(CellValue::Bool),
            Just(CellValue::Number(f64::NAN)),
            Just(CellValue::Empty),
        ]
    }

    proptest! {
        #[test]
        fn prop_sort_mixed_column_is_ordered(
            cells in prop::collection::vec(mixed_value(), 0..120),
            descending in any::<bool>(),
        ) {
            let mut store = DataStore::new(PagingOptions::default());
            store.set_records(cells.into_iter().map(|v| rec("v", v)).collect());
            let sort = if descending { SortState::desc("v") } else { SortState::asc("v") };
            store.set_sort(Some(sort));

            let sorted: Vec<CellValue> = store
                .filtered()
                .iter()
                .map(|r| r.get("v").cloned().unwrap_or_default())
                .collect();
            let first_empty = sorted.iter().position(CellValue::is_empty).unwrap_or(sorted.len());
            prop_assert!(sorted[first_empty..].iter().all(CellValue::is_empty));
            for pair in sorted[..first_empty].windows(2) {
                let order = if descending { pair[1].compare(&pair[0]) } else { pair[0].compare(&pair[1]) };
                prop_assert_ne!(order, Ordering::Greater);
            }
        }
    }

    #[test]
    fn test_sort_order_toggle() {
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.toggled().as_str(), "asc");
    }
}

//! Grid configuration manifest.

use crate::error::{ConfigError, ConfigIssue};
use gridline_core::column::find_column;
use gridline_core::date::is_valid_format;
use gridline_core::{
    ActionSpec, ColumnNode, FormatOptions, FormatterRegistry, KeyField, PagingOptions, Record,
    SortState, StyleOptions, DEFAULT_EMPTY_MESSAGE,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Grid configuration loaded from YAML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Column tree; inferred from the first record when empty
    #[serde(default)]
    pub columns: Vec<ColumnNode>,
    /// Comma-separated fields identifying a record
    #[serde(default)]
    pub key_field: KeyField,
    /// Where the records come from
    #[serde(default)]
    pub source: Option<SourceConfig>,
    /// Initial sort
    #[serde(default)]
    pub sort: Option<SortState>,
    /// Paging configuration
    #[serde(default)]
    pub paging: PagingOptions,
    /// Visual options
    #[serde(default)]
    pub style: StyleOptions,
    /// Row actions shown in a trailing column
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
    /// Title of the action column
    #[serde(default = "default_actions_title")]
    pub actions_title: String,
    /// Whether rows can be edited inline
    #[serde(default)]
    pub editable: bool,
    /// strftime-style format for `date` columns
    #[serde(default)]
    pub date_format: Option<String>,
    /// Text shown for missing values
    #[serde(default)]
    pub null_placeholder: String,
    /// Message shown when there are no rows
    #[serde(default = "default_empty_message")]
    pub empty_message: String,
}

fn default_actions_title() -> String {
    "Actions".to_string()
}

fn default_empty_message() -> String {
    DEFAULT_EMPTY_MESSAGE.to_string()
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            key_field: KeyField::default(),
            source: None,
            sort: None,
            paging: PagingOptions::default(),
            style: StyleOptions::default(),
            actions: Vec::new(),
            actions_title: default_actions_title(),
            editable: false,
            date_format: None,
            null_placeholder: String::new(),
            empty_message: default_empty_message(),
        }
    }
}

/// How records are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// `source` is a URL returning a JSON array
    Url,
    /// `source` is the JSON array itself
    Json,
    /// Any other mode; nothing is loaded
    #[serde(other)]
    Unsupported,
}

/// Data source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source mode
    pub mode: SourceMode,
    /// URL string or inline records
    #[serde(default)]
    pub source: serde_json::Value,
}

impl SourceConfig {
    /// A URL source.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            mode: SourceMode::Url,
            source: serde_json::Value::String(url.into()),
        }
    }

    /// An inline JSON source.
    #[must_use]
    pub const fn json(records: serde_json::Value) -> Self {
        Self {
            mode: SourceMode::Json,
            source: records,
        }
    }

    /// The URL of a `url` source.
    #[must_use]
    pub fn as_url(&self) -> Option<&str> {
        match self.mode {
            SourceMode::Url => self.source.as_str(),
            _ => None,
        }
    }

    /// Records of a `json` source; `None` when the mode differs or the value
    /// is not an array. Non-object entries are skipped.
    #[must_use]
    pub fn inline_records(&self) -> Option<Vec<Record>> {
        if self.mode != SourceMode::Json {
            return None;
        }
        let items = self.source.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|item| Record::from_json(item.clone()))
                .collect(),
        )
    }
}

impl GridConfig {
    /// Parse a configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Parse a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Cell format options derived from this configuration.
    #[must_use]
    pub fn format_options(&self) -> FormatOptions {
        let options = FormatOptions::default().null_placeholder(self.null_placeholder.clone());
        match &self.date_format {
            Some(format) => options.date_format(format.clone()),
            None => options,
        }
    }

    /// Check the configuration against the registered formatters.
    #[must_use]
    pub fn validate(&self, registry: &FormatterRegistry) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.key_field.is_empty() {
            issues.push(ConfigIssue::MissingKeyField);
        }

        if let Some(source) = &self.source {
            match source.mode {
                SourceMode::Unsupported => issues.push(ConfigIssue::UnsupportedSourceMode),
                SourceMode::Json if !source.source.is_array() => {
                    issues.push(ConfigIssue::InvalidInlineData);
                }
                _ => {}
            }
        }

        if let Some(format) = &self.date_format {
            if !is_valid_format(format) {
                issues.push(ConfigIssue::InvalidDateFormat(format.clone()));
            }
        }

        let mut seen = HashSet::new();
        check_columns(&self.columns, registry, &mut seen, &mut issues);

        if let Some(sort) = &self.sort {
            if !self.columns.is_empty() && find_column(&self.columns, &sort.key).is_none() {
                issues.push(ConfigIssue::UnknownSortColumn(sort.key.clone()));
            }
        }

        if self.paging.enabled && self.paging.page_size == 0 {
            issues.push(ConfigIssue::ZeroPageSize);
        }

        issues
    }
}

fn check_columns<'a>(
    columns: &'a [ColumnNode],
    registry: &FormatterRegistry,
    seen: &mut HashSet<&'a str>,
    issues: &mut Vec<ConfigIssue>,
) {
    for column in columns {
        if !seen.insert(column.key.as_str()) {
            issues.push(ConfigIssue::DuplicateColumn(column.key.clone()));
        }
        if let Some(renderer) = &column.renderer {
            if !registry.contains(renderer) {
                issues.push(ConfigIssue::UnknownRenderer {
                    column: column.key.clone(),
                    renderer: renderer.clone(),
                });
            }
        }
        check_columns(&column.children, registry, seen, issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridline_core::{CellValue, DataType, SortOrder};

    const EXAMPLE_YAML: &str = r#"
key_field: "region, id"
columns:
  - key: id
    title: ID
    index: 0
  - key: details
    title: Details
    index: 1
    children:
      - key: name
        title: Name
        index: 0
      - key: joined
        title: Joined
        index: 1
        datatype: date
source:
  mode: json
  source:
    - { id: 1, region: eu, name: Ann, joined: "2024-01-02" }
    - { id: 2, region: us, name: Bob, joined: null }
sort:
  key: name
  order: desc
paging:
  enabled: true
  page_size: 25
actions:
  - name: edit
    label: Edit
date_format: "%d/%m/%Y"
null_placeholder: "-"
"#;

    #[test]
    fn test_parse_config() {
        let config = GridConfig::from_yaml(EXAMPLE_YAML).unwrap();
        assert_eq!(config.key_field.fields(), &["region", "id"]);
        assert_eq!(config.columns.len(), 2);
        assert_eq!(config.columns[1].children[1].datatype, Some(DataType::Date));
        assert_eq!(config.sort.as_ref().map(|s| s.order), Some(SortOrder::Desc));
        assert_eq!(config.paging, PagingOptions::pages_of(25));
        assert_eq!(config.actions[0].label, "Edit");
        assert_eq!(config.empty_message, "No Data Available");
        assert!(config.style.striped);
    }

    #[test]
    fn test_inline_records() {
        let config = GridConfig::from_yaml(EXAMPLE_YAML).unwrap();
        let records = config.source.as_ref().and_then(SourceConfig::inline_records).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].display("name"), Some("Ann".to_string()));
        assert_eq!(records[1].get("joined"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_defaults() {
        let config = GridConfig::from_yaml("columns: []").unwrap();
        assert_eq!(config, GridConfig::default());
        assert!(!config.paging.enabled);
        assert_eq!(config.paging.page_size, 10);
        assert_eq!(config.null_placeholder, "");
    }

    #[test]
    fn test_from_json() {
        let config = GridConfig::from_json(
            r#"{"key_field": "id", "source": {"mode": "url", "source": "/api/rows"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.source.as_ref().and_then(SourceConfig::as_url),
            Some("/api/rows")
        );
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            GridConfig::from_yaml("columns: [unclosed"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_unknown_mode_is_unsupported() {
        let config = GridConfig::from_yaml("source: { mode: ftp, source: x }").unwrap();
        let source = config.source.as_ref().unwrap();
        assert_eq!(source.mode, SourceMode::Unsupported);
        assert!(source.inline_records().is_none());
        assert!(config
            .validate(&FormatterRegistry::new())
            .contains(&ConfigIssue::UnsupportedSourceMode));
    }

    #[test]
    fn test_validate_clean() {
        let config = GridConfig::from_yaml(EXAMPLE_YAML).unwrap();
        assert!(config.validate(&FormatterRegistry::new()).is_empty());
    }

    #[test]
    fn test_validate_issues() {
        let config = GridConfig {
            columns: vec![
                ColumnNode::new("a", "A").renderer("money"),
                ColumnNode::new("a", "A again"),
            ],
            sort: Some(SortState::asc("zzz")),
            date_format: Some("%Q".to_string()),
            source: Some(SourceConfig::json(serde_json::json!({"not": "array"}))),
            paging: PagingOptions::pages_of(0),
            ..GridConfig::default()
        };
        let issues = config.validate(&FormatterRegistry::new());
        assert!(issues.contains(&ConfigIssue::MissingKeyField));
        assert!(issues.contains(&ConfigIssue::InvalidInlineData));
        assert!(issues.contains(&ConfigIssue::InvalidDateFormat("%Q".to_string())));
        assert!(issues.contains(&ConfigIssue::DuplicateColumn("a".to_string())));
        assert!(issues.contains(&ConfigIssue::UnknownSortColumn("zzz".to_string())));
        assert!(issues.contains(&ConfigIssue::ZeroPageSize));
        assert!(issues.contains(&ConfigIssue::UnknownRenderer {
            column: "a".to_string(),
            renderer: "money".to_string(),
        }));
    }

    #[test]
    fn test_registered_renderer_passes() {
        let config = GridConfig {
            key_field: KeyField::parse("id"),
            columns: vec![ColumnNode::new("price", "Price").renderer("money")],
            ..GridConfig::default()
        };
        let registry = FormatterRegistry::new().with(
            "money",
            |v: &CellValue, _: &Record, _: &FormatOptions| format!("<td>${}</td>", v.display()),
        );
        assert!(config.validate(&registry).is_empty());
    }

    #[test]
    fn test_format_options() {
        let config = GridConfig::from_yaml(EXAMPLE_YAML).unwrap();
        let options = config.format_options();
        assert_eq!(options.null_placeholder, "-");
        assert_eq!(options.date_format.as_deref(), Some("%d/%m/%Y"));
    }

    #[test]
    fn test_roundtrip() {
        let config = GridConfig::from_yaml(EXAMPLE_YAML).unwrap();
        let yaml = config.to_yaml().unwrap();
        let config2 = GridConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config2.key_field, config.key_field);
        assert_eq!(config2.columns, config.columns);
    }
}

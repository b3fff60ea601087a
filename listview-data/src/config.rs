//! View configuration — a TOML file describing one list view.
//!
//! ```toml
//! key_field = "id"
//! per_page = 20
//! debounce_ms = 250
//!
//! [[schema.fields]]
//! name = "customer"
//! kind = "text"
//! searchable = true
//!
//! [[schema.fields]]
//! name = "status"
//! kind = "category"
//!
//! [defaults.selectors]
//! status = "paid"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use listview_core::debounce::RANGE_DEBOUNCE;
use listview_core::{Bound, Criteria, Debouncer, FieldKind, Schema};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub schema: Schema,
    /// Column holding each record's identity.
    #[serde(default)]
    pub key_field: Option<String>,
    /// Criteria the view starts from and `reset` returns to.
    #[serde(default)]
    pub defaults: Criteria,
    /// Rows per page; 0 shows everything.
    #[serde(default)]
    pub per_page: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    RANGE_DEBOUNCE.as_millis() as u64
}

impl ViewConfig {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            key_field: None,
            defaults: Criteria::default(),
            per_page: 0,
            debounce_ms: default_debounce_ms(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn debouncer<T>(&self) -> Debouncer<T> {
        Debouncer::new(self.debounce())
    }

    /// Check the defaults against the schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for f in &self.schema.fields {
            if !seen.insert(f.name.as_str()) {
                return Err(invalid(format!("duplicate field '{}'", f.name)));
            }
        }
        if let Some(key) = &self.key_field {
            if key.trim().is_empty() {
                return Err(invalid("key_field is empty".into()));
            }
        }

        for field in self.defaults.selectors.keys() {
            match self.schema.kind_of(field) {
                None => return Err(invalid(format!("selector on unknown field '{field}'"))),
                Some(k) if !k.is_textual() => {
                    return Err(invalid(format!("selector on non-categorical field '{field}'")))
                }
                Some(_) => {}
            }
        }
        for (field, range) in &self.defaults.ranges {
            let kind = self
                .schema
                .kind_of(field)
                .ok_or_else(|| invalid(format!("range on unknown field '{field}'")))?;
            for b in [range.min, range.max].into_iter().flatten() {
                let fits = matches!(
                    (kind, b),
                    (FieldKind::Number, Bound::Number(_)) | (FieldKind::Date, Bound::Date(_))
                );
                if !fits {
                    return Err(invalid(format!("range bound {b} does not fit field '{field}'")));
                }
            }
        }
        if let Some(sort) = &self.defaults.sort {
            if self.schema.field(&sort.field).is_none() {
                return Err(invalid(format!("sort on unknown field '{}'", sort.field)));
            }
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listview_core::{Direction, SortKey};

    const ORDERS: &str = r#"
key_field = "id"
per_page = 20

[[schema.fields]]
name = "id"
kind = "text"

[[schema.fields]]
name = "customer"
kind = "text"
searchable = true

[[schema.fields]]
name = "status"
kind = "category"

[[schema.fields]]
name = "total"
kind = "number"
label = "Total"

[[schema.fields]]
name = "placed_on"
kind = "date"

[defaults]
search = ""

[defaults.selectors]
status = "paid"

[defaults.ranges.total]
min = 10.0

[defaults.sort]
field = "placed_on"
direction = "desc"
"#;

    #[test]
    fn parses_full_config() {
        let cfg = ViewConfig::from_toml(ORDERS).unwrap();
        assert_eq!(cfg.key_field.as_deref(), Some("id"));
        assert_eq!(cfg.per_page, 20);
        assert_eq!(cfg.debounce_ms, 250);
        assert_eq!(cfg.schema.fields.len(), 5);
        assert!(cfg.schema.field("customer").unwrap().searchable);
        assert_eq!(cfg.defaults.selectors["status"], "paid");
        assert_eq!(cfg.defaults.ranges["total"].min, Some(Bound::Number(10.0)));
        assert_eq!(
            cfg.defaults.sort,
            Some(SortKey {
                field: "placed_on".into(),
                direction: Direction::Desc
            })
        );
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = ViewConfig::from_toml(
            "[[schema.fields]]\nname = \"title\"\nkind = \"text\"\n",
        )
        .unwrap();
        assert!(cfg.defaults.is_default());
        assert_eq!(cfg.per_page, 0);
        assert_eq!(cfg.debounce(), RANGE_DEBOUNCE);
    }

    #[test]
    fn rejects_selector_on_number() {
        let bad = ORDERS.replace("status = \"paid\"", "total = \"5\"");
        let err = ViewConfig::from_toml(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(m) if m.contains("non-categorical")));
    }

    #[test]
    fn rejects_unknown_sort_field() {
        let bad = ORDERS.replace("field = \"placed_on\"", "field = \"shipped_on\"");
        assert!(matches!(
            ViewConfig::from_toml(&bad),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_date_bound_on_number() {
        let bad = ORDERS.replace("min = 10.0", "min = \"2024-01-01\"");
        assert!(ViewConfig::from_toml(&bad).is_err());
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            ViewConfig::from_toml("schema = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            ViewConfig::from_file(Path::new("/nonexistent/view.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}

//! Panel layouts and the built-in presets.

use facet_model::{FieldBinding, FieldKind, StoreKind};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};

/// One scalar control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarSpec {
    pub key: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

/// One multi-select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSpec {
    pub key: String,
    /// Allowed values. Empty means anything goes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

/// The panel's sort control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(default = "default_sort_key")]
    pub key: String,
    /// Sortable fields in display order.
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

fn default_sort_key() -> String {
    "sort".to_string()
}

/// Everything a [`crate::FilterPanel`] needs to mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub name: String,
    /// Path the panel lives at, used when no URL is given.
    pub path: String,
    /// Coordination group shared by all of the panel's fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub store: StoreKind,
    #[serde(default)]
    pub scalars: Vec<ScalarSpec>,
    #[serde(default)]
    pub selections: Vec<SelectionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
}

impl PanelConfig {
    /// Storefront catalog: price range, stock toggle, tags, three sort keys.
    pub fn catalog() -> Self {
        Self {
            name: "catalog".to_string(),
            path: "/catalog".to_string(),
            group: Some("catalog".to_string()),
            store: StoreKind::Tab,
            scalars: vec![
                scalar("minPrice", FieldKind::Number),
                scalar("maxPrice", FieldKind::Number),
                scalar("inStock", FieldKind::Flag),
            ],
            selections: vec![SelectionSpec {
                key: "tags".to_string(),
                options: Vec::new(),
                delay_ms: None,
            }],
            sort: Some(sort_spec(["price", "title", "popularity"])),
        }
    }

    /// Admin order search: free text, status filter, date range.
    pub fn admin_orders() -> Self {
        Self {
            name: "admin-orders".to_string(),
            path: "/admin/orders".to_string(),
            group: Some("admin-orders".to_string()),
            store: StoreKind::Tab,
            scalars: vec![
                scalar("q", FieldKind::Text),
                scalar("from", FieldKind::Text),
                scalar("to", FieldKind::Text),
            ],
            selections: vec![SelectionSpec {
                key: "status".to_string(),
                options: ["pending", "paid", "shipped", "refunded", "cancelled"]
                    .map(String::from)
                    .to_vec(),
                delay_ms: None,
            }],
            sort: Some(sort_spec(["created", "total", "customer"])),
        }
    }

    pub fn presets() -> Vec<Self> {
        vec![Self::catalog(), Self::admin_orders()]
    }

    /// Binding for one of this panel's keys, with the panel's group and store.
    pub fn binding(&self, key: &str, delay_ms: Option<u64>) -> FieldBinding {
        let mut binding = FieldBinding::new(key).with_store(self.store);
        if let Some(group) = &self.group {
            binding = binding.in_group(group.as_str());
        }
        if let Some(delay_ms) = delay_ms {
            binding = binding.with_delay_ms(delay_ms);
        }
        binding
    }

    /// All bindings in declaration order: scalars, selections, then sort.
    ///
    /// This is also the stagger slot order.
    pub fn bindings(&self) -> Vec<FieldBinding> {
        let scalars = self
            .scalars
            .iter()
            .map(|spec| self.binding(&spec.key, spec.delay_ms));
        let selections = self
            .selections
            .iter()
            .map(|spec| self.binding(&spec.key, spec.delay_ms));
        let sort = self
            .sort
            .iter()
            .map(|spec| self.binding(&spec.key, spec.delay_ms));
        scalars.chain(selections).chain(sort).collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.bindings().into_iter().map(|binding| binding.key).collect()
    }

    pub fn scalar(&self, key: &str) -> Option<&ScalarSpec> {
        self.scalars.iter().find(|spec| spec.key == key)
    }

    pub fn selection(&self, key: &str) -> Option<&SelectionSpec> {
        self.selections.iter().find(|spec| spec.key == key)
    }

    pub fn validate(&self) -> Result<()> {
        for binding in self.bindings() {
            binding.validate().map_err(|source| StateError::Binding {
                panel: self.name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

fn scalar(key: &str, kind: FieldKind) -> ScalarSpec {
    ScalarSpec {
        key: key.to_string(),
        kind,
        delay_ms: None,
    }
}

fn sort_spec<const N: usize>(fields: [&str; N]) -> SortSpec {
    SortSpec {
        key: default_sort_key(),
        fields: fields.map(String::from).to_vec(),
        delay_ms: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_bindings_follow_declaration_order() {
        let keys = PanelConfig::catalog().keys();
        assert_eq!(keys, ["minPrice", "maxPrice", "inStock", "tags", "sort"]);
    }

    #[test]
    fn bindings_carry_group_and_store() {
        let mut config = PanelConfig::admin_orders();
        config.store = StoreKind::Local;
        let binding = config.binding("q", Some(200));
        assert_eq!(binding.group.as_deref(), Some("admin-orders"));
        assert_eq!(binding.store, StoreKind::Local);
        assert_eq!(binding.delay_ms, Some(200));
    }

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: PanelConfig = serde_json::from_str(
            r#"{"name":"users","path":"/admin/users","sort":{"fields":["name"]}}"#,
        )
        .unwrap();
        assert_eq!(config.store, StoreKind::Tab);
        assert_eq!(config.sort.unwrap().key, "sort");
        assert!(config.scalars.is_empty());
    }

    #[test]
    fn blank_key_is_rejected() {
        let mut config = PanelConfig::catalog();
        config.scalars.push(scalar(" ", FieldKind::Text));
        assert!(matches!(config.validate(), Err(StateError::Binding { .. })));
    }
}

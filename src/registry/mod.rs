//! Property category registry
//!
//! The portal tracks 8 property categories, each downloaded and resumed
//! independently. The registry is the single definition of the set: stable
//! ASCII identifiers (used as progress-store keys), Korean display labels
//! (used in output file names and the portal form), and the fixed order the
//! orchestrator walks them in.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Embedded registry data
const REGISTRY_JSON: &str = include_str!("categories.json");

/// Global registry instance (loaded once)
static REGISTRY: Lazy<Result<CategoryRegistry, RegistryError>> =
    Lazy::new(|| CategoryRegistry::from_json(REGISTRY_JSON));

/// A single property category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: String,
    label: String,
    description: String,
}

impl Category {
    /// Stable identifier, used as the progress-store key. Never renamed.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display label as the portal names the category.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Registry of the portal's property categories.
///
/// Iteration order is the embedded file order and is the orchestrator's
/// category processing order.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    #[allow(dead_code)]
    schema_version: String,
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// Load the embedded registry.
    ///
    /// This is a singleton operation - the registry is loaded once and cached.
    pub fn load() -> Result<&'static Self, &'static RegistryError> {
        REGISTRY.as_ref()
    }

    /// Parse registry from JSON string
    fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawRegistry = serde_json::from_str(json)
            .map_err(|e| RegistryError::ParseError(format!("Failed to parse registry: {e}")))?;

        if raw.categories.is_empty() {
            return Err(RegistryError::ParseError(
                "registry contains no categories".to_string(),
            ));
        }

        Ok(Self {
            schema_version: raw.schema_version,
            categories: raw.categories,
        })
    }

    /// All categories, in orchestration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by its stable identifier.
    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// Raw registry structure for deserialization
#[derive(Debug, Deserialize)]
struct RawRegistry {
    schema_version: String,
    #[allow(dead_code)]
    last_updated: String,
    categories: Vec<Category>,
}

/// Errors that can occur when working with the registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Failed to parse registry JSON
    #[error("registry parse error: {0}")]
    ParseError(String),

    /// Category not found in registry
    #[error("category not found: {0}")]
    NotFound(String),
}

//! Entity naming and alias resolution.
//!
//! Entities are identified by a canonical store name supplied statically through
//! the [`Entity`] trait; no runtime type inspection is involved.

use std::collections::HashMap;

/// Metadata for a queryable entity.
///
/// # Example
/// ```ignore
/// struct Book;
///
/// impl fluentq::Entity for Book {
///     fn entity_name() -> &'static str {
///         "Book"
///     }
/// }
/// ```
pub trait Entity {
    /// The canonical store name used in FROM/JOIN clauses.
    fn entity_name() -> &'static str;
}

/// A resolved reference to an entity by its store name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    name: String,
}

impl EntityRef {
    /// Reference an entity by its store name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Reference the entity `E`.
    pub fn of<E: Entity>() -> Self {
        Self::named(E::entity_name())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An entity bound to an alias in the FROM or JOIN clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasedEntity {
    pub entity: EntityRef,
    pub alias: String,
}

impl AliasedEntity {
    pub fn new(entity: EntityRef, alias: impl Into<String>) -> Self {
        Self {
            entity,
            alias: alias.into(),
        }
    }
}

/// Entity name to alias bindings of one query.
///
/// Lookups fall back to the query's default alias when an entity was never
/// registered through `from()` or `join()`.
#[derive(Debug, Clone)]
pub struct AliasMap {
    default_alias: String,
    bindings: HashMap<String, String>,
}

impl AliasMap {
    pub fn new(default_alias: impl Into<String>) -> Self {
        Self {
            default_alias: default_alias.into(),
            bindings: HashMap::new(),
        }
    }

    /// The alias of the primary entity.
    pub fn default_alias(&self) -> &str {
        &self.default_alias
    }

    /// Bind `entity` to `alias`, replacing any previous binding.
    pub fn bind(&mut self, entity: &EntityRef, alias: impl Into<String>) {
        self.bindings.insert(entity.name().to_string(), alias.into());
    }

    /// Alias bound to `entity`, or the default alias.
    pub fn resolve(&self, entity: &EntityRef) -> &str {
        self.bindings
            .get(entity.name())
            .map(String::as_str)
            .unwrap_or(&self.default_alias)
    }

    /// Whether `alias` was bound explicitly (the default alias is not).
    pub fn is_bound_alias(&self, alias: &str) -> bool {
        self.bindings.values().any(|a| a == alias)
    }

    /// Drop all explicit bindings.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

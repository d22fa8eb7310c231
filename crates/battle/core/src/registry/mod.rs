//! Definition registries with parent/child inheritance.
//!
//! Content (species, skills, items, equipment, passives) is registered in its
//! raw form, where every field is optional and a definition may name a
//! `parent`. [`Registry::get`] resolves the chain lazily: ancestors are merged
//! root-first, a present child field overrides the parent's, and list fields
//! are replaced wholesale. Resolved definitions are cached per id.
//!
//! Resolution never fails hard. A missing parent ends the chain at the last
//! node that was found, and a parent chain that loops back on itself stops at
//! the repeated id, whose raw node becomes the root. Both cases are logged.

mod catalog;

pub use catalog::{ActionSource, Catalog, ResolvedAction};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{BattleError, ErrorSeverity, report};

/// Template data keyed by id, optionally inheriting from a parent.
pub trait Definition: Clone + fmt::Debug {
    /// Kind name used in log messages (e.g. `"species"`).
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn parent(&self) -> Option<&str>;

    /// Merges `self` over an already resolved `parent`.
    ///
    /// Fields present on `self` win; the result keeps `self`'s id.
    fn inherit(&self, parent: &Self) -> Self;
}

/// Overlays optional fields of `$child` onto `$parent`, producing a new value.
///
/// Every listed field must be an `Option`; unlisted fields are taken from the
/// child.
#[macro_export]
macro_rules! inherit_fields {
    ($child:expr, $parent:expr; $($field:ident),+ $(,)?) => {{
        let mut merged = ($child).clone();
        $(
            if merged.$field.is_none() {
                merged.$field = ($parent).$field.clone();
            }
        )+
        merged
    }};
}

/// Errors raised while resolving a definition chain.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{kind} definition '{id}' has a cyclic parent chain; using its raw form")]
    Cycle { kind: &'static str, id: String },

    #[error("{kind} definition '{id}' not found")]
    NotFound { kind: &'static str, id: String },
}

impl BattleError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Cycle { .. } => "REGISTRY_CYCLE",
            Self::NotFound { .. } => "REGISTRY_NOT_FOUND",
        }
    }
}

/// Store of raw definitions plus a cache of resolved ones.
#[derive(Debug)]
pub struct Registry<D: Definition> {
    raw: HashMap<String, Arc<D>>,
    resolved: RwLock<HashMap<String, Arc<D>>>,
}

impl<D: Definition> Default for Registry<D> {
    fn default() -> Self {
        Self {
            raw: HashMap::new(),
            resolved: RwLock::new(HashMap::new()),
        }
    }
}

impl<D: Definition> Registry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a raw definition, replacing any previous one with the same id.
    ///
    /// Clears the resolution cache since descendants may inherit from it.
    pub fn register(&mut self, def: D) {
        self.raw.insert(def.id().to_owned(), Arc::new(def));
        self.resolved
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn extend(&mut self, defs: impl IntoIterator<Item = D>) {
        for def in defs {
            self.register(def);
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.raw.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.raw.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// The unresolved definition as registered.
    pub fn raw(&self, id: &str) -> Option<Arc<D>> {
        self.raw.get(id).cloned()
    }

    /// Resolves `id`, treating a missing definition as an error.
    pub fn require(&self, id: &str) -> Result<Arc<D>, RegistryError> {
        self.get(id).ok_or_else(|| RegistryError::NotFound {
            kind: D::KIND,
            id: id.to_owned(),
        })
    }

    /// Resolves an id ignoring ASCII case, preferring an exact match.
    pub fn find_ignore_case(&self, id: &str) -> Option<Arc<D>> {
        if self.raw.contains_key(id) {
            return self.get(id);
        }
        let key = self
            .ids()
            .into_iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(id))?
            .to_owned();
        self.get(&key)
    }

    /// Resolves `id` through its parent chain.
    ///
    /// Returns `None` only when `id` itself is not registered.
    pub fn get(&self, id: &str) -> Option<Arc<D>> {
        if let Some(hit) = self.cached(id) {
            return Some(hit);
        }
        let requested = self.raw.get(id)?.clone();

        let mut chain = vec![requested.clone()];
        let mut visited: HashSet<&str> = HashSet::from([id]);
        let mut base: Option<Arc<D>> = None;
        let mut cyclic = false;
        let mut next = requested.parent();

        while let Some(parent_id) = next {
            if let Some(hit) = self.cached(parent_id) {
                base = Some(hit);
                break;
            }
            if visited.contains(parent_id) {
                report(&RegistryError::Cycle {
                    kind: D::KIND,
                    id: parent_id.to_owned(),
                });
                cyclic = true;
                base = self.raw.get(parent_id).cloned();
                break;
            }
            let Some(parent) = self.raw.get(parent_id) else {
                report(&RegistryError::NotFound {
                    kind: D::KIND,
                    id: parent_id.to_owned(),
                });
                break;
            };
            visited.insert(parent_id);
            chain.push(parent.clone());
            next = parent.parent();
        }

        let mut merged = Vec::with_capacity(chain.len());
        let mut acc = base;
        for node in chain.iter().rev() {
            let resolved = match &acc {
                Some(parent) => Arc::new(node.inherit(parent)),
                None => node.clone(),
            };
            merged.push(resolved.clone());
            acc = Some(resolved);
        }

        let mut cache = self
            .resolved
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for def in merged {
            if !cyclic || def.id() == id {
                cache.entry(def.id().to_owned()).or_insert(def);
            }
        }
        cache.get(id).cloned()
    }

    fn cached(&self, id: &str) -> Option<Arc<D>> {
        self.resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

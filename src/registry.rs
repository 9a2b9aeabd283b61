//! The module registry: ownership and discovery of reasoning modules.
//!
//! The registry owns the `module_id → module` map plus two inverted
//! indexes built from each module's coverage metadata: `topic → modules`
//! and `keyword → modules`. Registration initializes the module
//! synchronously first; a module must be fully loaded before it becomes
//! discoverable. Registration is an administrative operation performed
//! before serving traffic—the indexes are immutable during steady-state
//! query processing, so concurrent reads need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::LoadError;
use crate::metadata::ModuleMetadata;
use crate::module::ReasoningModule;
use crate::node::ModuleId;

/// Registry statistics for operational visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStatistics {
    /// Number of registered modules.
    pub module_count: usize,
    /// Total nodes across all registered modules.
    pub node_count: usize,
    /// Number of distinct indexed topics.
    pub topic_count: usize,
    /// Number of distinct indexed keywords.
    pub keyword_count: usize,
}

/// Central registry of reasoning modules.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<ModuleId, Arc<dyn ReasoningModule>>,
    metadata: HashMap<ModuleId, ModuleMetadata>,
    topic_index: HashMap<String, Vec<ModuleId>>,
    keyword_index: HashMap<String, Vec<ModuleId>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module: initializes it, then indexes its coverage.
    ///
    /// Idempotent per module ID: re-registering replaces the module after
    /// removing the stale index entries first.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` when the module's fixtures fail integrity
    /// checks; the module is not registered in that case.
    pub fn register(&mut self, module: Arc<dyn ReasoningModule>) -> Result<(), LoadError> {
        module.initialize()?;

        let metadata = module.metadata();
        let module_id = metadata.module_id.clone();

        if self.modules.contains_key(&module_id) {
            self.unregister(&module_id);
        }

        for topic in &metadata.coverage.topics {
            self.topic_index
                .entry(topic.to_lowercase())
                .or_default()
                .push(module_id.clone());
        }
        for keyword in &metadata.coverage.keywords {
            self.keyword_index
                .entry(keyword.to_lowercase())
                .or_default()
                .push(module_id.clone());
        }

        let node_count = module.tree().map(crate::tree::LogicTree::len).unwrap_or(0);
        log::info!("registered module {module_id} ({node_count} nodes)");

        self.metadata.insert(module_id.clone(), metadata);
        self.modules.insert(module_id, module);
        Ok(())
    }

    /// Unregisters a module and removes its index entries.
    ///
    /// Unknown IDs are a no-op.
    pub fn unregister(&mut self, module_id: &ModuleId) {
        let Some(metadata) = self.metadata.remove(module_id) else {
            return;
        };

        for topic in &metadata.coverage.topics {
            let key = topic.to_lowercase();
            if let Some(ids) = self.topic_index.get_mut(&key) {
                ids.retain(|id| id != module_id);
                if ids.is_empty() {
                    self.topic_index.remove(&key);
                }
            }
        }
        for keyword in &metadata.coverage.keywords {
            let key = keyword.to_lowercase();
            if let Some(ids) = self.keyword_index.get_mut(&key) {
                ids.retain(|id| id != module_id);
                if ids.is_empty() {
                    self.keyword_index.remove(&key);
                }
            }
        }

        self.modules.remove(module_id);
        log::info!("unregistered module {module_id}");
    }

    /// Looks up a module by ID.
    #[must_use]
    pub fn module(&self, module_id: &ModuleId) -> Option<Arc<dyn ReasoningModule>> {
        self.modules.get(module_id).cloned()
    }

    /// Metadata of a registered module.
    #[must_use]
    pub fn metadata(&self, module_id: &ModuleId) -> Option<&ModuleMetadata> {
        self.metadata.get(module_id)
    }

    /// All registered module IDs, sorted.
    #[must_use]
    pub fn module_ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.modules.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if no module is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module IDs covering the given topics, ranked by matched-topic count
    /// so more specific modules rank above broadly-tagged ones. Ties break
    /// by static authority weight descending, then module ID ascending for
    /// determinism.
    #[must_use]
    pub fn modules_by_topics(&self, topics: &[String]) -> Vec<ModuleId> {
        let mut scores: HashMap<&ModuleId, usize> = HashMap::new();
        for topic in topics {
            if let Some(ids) = self.topic_index.get(&topic.to_lowercase()) {
                for id in ids {
                    *scores.entry(id).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(&ModuleId, usize)> = scores.into_iter().collect();
        ranked.sort_by(|(a_id, a_count), (b_id, b_count)| {
            b_count
                .cmp(a_count)
                .then_with(|| {
                    let a_weight = self.metadata.get(*a_id).map_or(0.0, |m| m.authority_weight);
                    let b_weight = self.metadata.get(*b_id).map_or(0.0, |m| m.authority_weight);
                    b_weight.total_cmp(&a_weight)
                })
                .then_with(|| a_id.cmp(b_id))
        });

        ranked.into_iter().map(|(id, _)| id.clone()).collect()
    }

    /// Module IDs whose coverage lists the given keyword.
    #[must_use]
    pub fn modules_by_keyword(&self, keyword: &str) -> Vec<ModuleId> {
        self.keyword_index
            .get(&keyword.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Cardinalities of the registry's maps and indexes.
    #[must_use]
    pub fn statistics(&self) -> RegistryStatistics {
        let node_count = self
            .modules
            .values()
            .filter_map(|m| m.tree().ok())
            .map(crate::tree::LogicTree::len)
            .sum();
        RegistryStatistics {
            module_count: self.modules.len(),
            node_count,
            topic_count: self.topic_index.len(),
            keyword_count: self.keyword_index.len(),
        }
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.module_ids())
            .field("topics", &self.topic_index.len())
            .field("keywords", &self.keyword_index.len())
            .finish()
    }
}

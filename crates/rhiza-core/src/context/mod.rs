// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Context lifecycle management.
//!
//! A *context* is a bounded period of host activity — typically one loaded
//! scene — that owns its own pool of scoped instances. Each context moves
//! through Uninitialized → Active (pool exists, accepting resolutions) →
//! Destroyed (pool cleared, disposal hooks fired). Pools for several
//! still-loaded contexts may coexist (additive loading); exactly one
//! context is *current* for name-resolution purposes.

mod catalog;
mod constraint;

pub use catalog::ContextCatalog;
pub use constraint::ContextConstraint;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::binding::{ErasedInstance, ServiceKey};
use crate::host::ContextSource;

/// Name of the anonymous root context.
///
/// Scoped resolutions that happen before any context name is known land
/// here; the pool is created lazily, which tolerates out-of-order
/// initialization. Entering a real context later does not migrate
/// root-pool instances.
pub const ROOT_CONTEXT: &str = "";

/// One context's instance pool plus its disposal bag.
///
/// Insertion order is retained so disposal can run in reverse: an
/// instance is disposed before anything it was built from.
#[derive(Default)]
struct ContextPool {
    instances: HashMap<ServiceKey, ErasedInstance>,
    order: Vec<ServiceKey>,
}

impl ContextPool {
    fn get(&self, key: ServiceKey) -> Option<ErasedInstance> {
        self.instances.get(&key).cloned()
    }

    /// First write wins: if the key is already pooled, the existing
    /// instance is returned and the candidate is discarded.
    fn insert(&mut self, key: ServiceKey, instance: ErasedInstance) -> ErasedInstance {
        if let Some(existing) = self.instances.get(&key) {
            return existing.clone();
        }
        self.instances.insert(key, instance.clone());
        self.order.push(key);
        instance
    }

    fn dispose(self) -> usize {
        let mut disposed = 0;
        for key in self.order.iter().rev() {
            if let Some(instance) = self.instances.get(key) {
                if let Some(hook) = instance.disposer() {
                    hook.dispose();
                    disposed += 1;
                }
            }
        }
        disposed
    }
}

/// Tracks the current context and owns every per-context instance pool.
///
/// Reached through the context methods on [`Registry`](crate::Registry);
/// hosts call [`enter`](Self::enter) on context load and
/// [`exit`](Self::exit) on unload from their own lifecycle notifications.
pub struct ContextManager {
    catalog: RwLock<ContextCatalog>,
    pools: RwLock<HashMap<String, ContextPool>>,
    current: RwLock<Option<String>>,
    source: RwLock<Option<Arc<dyn ContextSource>>>,
}

impl ContextManager {
    pub(crate) fn new() -> Self {
        Self {
            catalog: RwLock::new(ContextCatalog::default()),
            pools: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            source: RwLock::new(None),
        }
    }

    /// Replaces the context catalog.
    pub fn set_catalog(&self, catalog: ContextCatalog) {
        *self.catalog.write() = catalog;
    }

    /// A copy of the current catalog.
    #[must_use]
    pub fn catalog(&self) -> ContextCatalog {
        self.catalog.read().clone()
    }

    /// Installs the lazy current-context source.
    pub fn set_source(&self, source: Arc<dyn ContextSource>) {
        *self.source.write() = Some(source);
    }

    /// Activates `name`: creates its pool if absent and marks it current.
    /// Idempotent when the context is already active.
    pub fn enter(&self, name: &str) {
        self.pools.write().entry(name.to_string()).or_default();
        *self.current.write() = Some(name.to_string());
        log::debug!("context `{name}` entered");
    }

    /// Destroys `name`: fires every disposal hook in its pool (reverse
    /// insertion order, each exactly once), clears the pool, and removes
    /// it from the active set. Clears the current marker if it names this
    /// context. A no-op for contexts that were never entered.
    pub fn exit(&self, name: &str) {
        let pool = self.pools.write().remove(name);
        {
            let mut current = self.current.write();
            if current.as_deref() == Some(name) {
                *current = None;
            }
        }
        if let Some(pool) = pool {
            let disposed = pool.dispose();
            log::debug!("context `{name}` exited, {disposed} instance(s) disposed");
        }
    }

    /// The cached current context name, lazily refreshed from the
    /// installed [`ContextSource`] when unset.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        if let Some(name) = self.current.read().clone() {
            return Some(name);
        }
        let source = self.source.read().clone();
        let name = source.and_then(|source| source.active_context())?;
        *self.current.write() = Some(name.clone());
        Some(name)
    }

    /// Catalog index of the current context, when it is cataloged.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        let name = self.current()?;
        self.catalog.read().index_of(&name)
    }

    /// Whether `name` currently owns a pool.
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.pools.read().contains_key(name)
    }

    /// Names of every context that currently owns a pool, unordered.
    #[must_use]
    pub fn active_contexts(&self) -> Vec<String> {
        self.pools.read().keys().cloned().collect()
    }

    /// The pool name scoped resolutions effectively target right now.
    pub(crate) fn effective_context(&self) -> String {
        self.current().unwrap_or_else(|| ROOT_CONTEXT.to_string())
    }

    pub(crate) fn cached_get(&self, context: &str, key: ServiceKey) -> Option<ErasedInstance> {
        self.pools.read().get(context).and_then(|pool| pool.get(key))
    }

    /// Caches into the named pool, creating the pool lazily. First write
    /// wins on double resolution.
    pub(crate) fn cache(
        &self,
        context: &str,
        key: ServiceKey,
        instance: ErasedInstance,
    ) -> ErasedInstance {
        self.pools
            .write()
            .entry(context.to_string())
            .or_default()
            .insert(key, instance)
    }

    /// Disposes every still-open pool and clears the current marker. The
    /// catalog is configuration and survives.
    pub(crate) fn dispose_all(&self) {
        let pools: Vec<(String, ContextPool)> = self.pools.write().drain().collect();
        for (name, pool) in pools {
            let disposed = pool.dispose();
            log::trace!("pool `{name}` cleared, {disposed} instance(s) disposed");
        }
        *self.current.write() = None;
    }
}

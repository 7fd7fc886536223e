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

//! The service registry.
//!
//! The [`Registry`] owns every registration, the singleton pool, the
//! identifier index, and (through its [`ContextManager`]) the per-context
//! pools. Consumers share it behind an `Arc` handed out by the application
//! bootstrap — there is no global accessor.
//!
//! Resolution returns `DiResult<Option<Arc<T>>>`: `Err` for a missing
//! registration or a construction failure, `Ok(None)` when a context
//! constraint gates the binding, `Ok(Some)` otherwise.
//!
//! # Example
//!
//! ```rust
//! use rhiza_core::{Lifetime, Registry};
//!
//! struct FrameBudget {
//!     micros: u64,
//! }
//!
//! let registry = Registry::new();
//! registry.register_factory(Lifetime::Singleton, |_| Ok(FrameBudget { micros: 16_600 }));
//!
//! let budget = registry.resolve::<FrameBudget>().unwrap().unwrap();
//! assert_eq!(budget.micros, 16_600);
//! ```

mod build;
mod scan;

pub use scan::RegistrationEntry;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::binding::{ErasedInstance, ServiceBinding, ServiceKey};
use crate::context::{ContextCatalog, ContextManager};
use crate::dispose::Dispose;
use crate::error::{DiError, DiResult};
use crate::host::{ComponentHost, ContextSource};
use crate::inject::{Construct, Injectable};
use crate::lifetime::Lifetime;

/// Maps service identities to implementations and hands out instances.
///
/// All maps sit behind their own locks so the registry can be shared
/// `Arc<Registry>`-style, but no lock is ever held while a factory runs —
/// factories re-enter the registry to resolve their own dependencies.
pub struct Registry {
    bindings: RwLock<HashMap<ServiceKey, ServiceBinding>>,
    named: RwLock<HashMap<String, ServiceKey>>,
    singletons: RwLock<HashMap<ServiceKey, ErasedInstance>>,
    contexts: ContextManager,
    host: RwLock<Option<Arc<dyn ComponentHost>>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            named: RwLock::new(HashMap::new()),
            singletons: RwLock::new(HashMap::new()),
            contexts: ContextManager::new(),
            host: RwLock::new(None),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────

    /// Registers a binding, replacing any prior binding under the same
    /// service identity. If the binding carries an identifier, the
    /// secondary index is updated too. Overwriting is not an error — the
    /// scanner double-registers freely and the last write wins.
    pub fn register(&self, binding: ServiceBinding) {
        let key = binding.service();
        if let Some(identifier) = binding.identifier() {
            let previous = self
                .named
                .write()
                .insert(identifier.to_string(), key);
            if previous.is_some_and(|prev| prev != key) {
                log::trace!("identifier `{identifier}` now points at `{key}`");
            }
        }
        log::trace!(
            "registered `{}` as `{key}` ({:?})",
            binding.implementation(),
            binding.lifetime()
        );
        self.bindings.write().insert(key, binding);
    }

    /// Registers `T` under its own type, constructed and member-injected
    /// through its derived (or hand-written) impls.
    pub fn register_type<T>(&self, lifetime: Lifetime)
    where
        T: Construct + Injectable + Send + Sync + 'static,
    {
        self.register(ServiceBinding::new::<T>(lifetime).with_factory(Arc::new(
            |registry: &Registry| {
                let mut value = T::construct(registry)?;
                value.inject(registry)?;
                Ok(ErasedInstance::new(Arc::new(value)))
            },
        )));
    }

    /// Registers `T` under its own type with a closure as the complete
    /// construction recipe. The closure resolves whatever it needs itself;
    /// no member-injection pass runs afterwards.
    pub fn register_factory<T, F>(&self, lifetime: Lifetime, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Registry) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register(ServiceBinding::new::<T>(lifetime).with_factory(Arc::new(
            move |registry: &Registry| Ok(ErasedInstance::new(Arc::new(factory(registry)?))),
        )));
    }

    /// Like [`register_factory`](Self::register_factory), additionally
    /// recording the instance's [`Dispose`] hook so context teardown can
    /// fire it.
    pub fn register_disposable_factory<T, F>(&self, lifetime: Lifetime, factory: F)
    where
        T: Dispose,
        F: Fn(&Registry) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register(ServiceBinding::new::<T>(lifetime).with_factory(Arc::new(
            move |registry: &Registry| {
                let value = Arc::new(factory(registry)?);
                Ok(ErasedInstance::with_disposer(value.clone(), value))
            },
        )));
    }

    /// Registers a trait-object service with a coercion factory producing
    /// the `Arc<dyn S>`. The derive emits these for `provides(...)`
    /// declarations; hand-rolled bindings use it for manual trait wiring.
    pub fn register_trait_factory<S, F>(&self, lifetime: Lifetime, factory: F)
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&Registry) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        self.register(ServiceBinding::new::<S>(lifetime).with_factory(Arc::new(
            move |registry: &Registry| Ok(ErasedInstance::new(factory(registry)?)),
        )));
    }

    /// Registers a pre-built instance as an effectively-singleton binding
    /// and seeds the singleton pool immediately.
    pub fn register_instance<S: ?Sized + Send + Sync + 'static>(&self, instance: Arc<S>) {
        self.register_instance_inner(instance, None);
    }

    /// [`register_instance`](Self::register_instance), additionally indexed
    /// under a string identifier.
    pub fn register_instance_named<S: ?Sized + Send + Sync + 'static>(
        &self,
        instance: Arc<S>,
        identifier: impl Into<String>,
    ) {
        self.register_instance_inner(instance, Some(identifier.into()));
    }

    fn register_instance_inner<S: ?Sized + Send + Sync + 'static>(
        &self,
        instance: Arc<S>,
        identifier: Option<String>,
    ) {
        let mut binding = ServiceBinding::new::<S>(Lifetime::Singleton);
        if let Some(identifier) = identifier {
            binding = binding.named(identifier);
        }
        let key = binding.service();
        self.register(binding);
        self.singletons
            .write()
            .insert(key, ErasedInstance::new(instance));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────

    /// Resolves the service registered under `T` — a concrete type or a
    /// `dyn Trait` object type.
    ///
    /// # Errors
    ///
    /// [`UnregisteredService`](DiError::UnregisteredService) when nothing
    /// is registered under `T`; construction errors propagate unmodified.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        let key = ServiceKey::of::<T>();
        let binding = self.binding_for(key)?;
        match build::resolve_binding(self, &binding)? {
            Some(instance) => {
                let typed = instance.downcast::<T>().ok_or_else(|| DiError::TypeMismatch {
                    service: key.type_name().to_string(),
                    expected: key.type_name(),
                })?;
                Ok(Some(typed))
            }
            None => Ok(None),
        }
    }

    /// Resolves by string identifier instead of by type.
    ///
    /// # Errors
    ///
    /// [`UnregisteredIdentifier`](DiError::UnregisteredIdentifier) when the
    /// identifier is unknown;
    /// [`TypeMismatch`](DiError::TypeMismatch) when the binding's instance
    /// is not a `T`.
    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        identifier: &str,
    ) -> DiResult<Option<Arc<T>>> {
        let key = self.named.read().get(identifier).copied().ok_or_else(|| {
            DiError::UnregisteredIdentifier {
                identifier: identifier.to_string(),
            }
        })?;
        let binding = self.binding_for(key)?;
        match build::resolve_binding(self, &binding)? {
            Some(instance) => {
                let typed = instance.downcast::<T>().ok_or_else(|| DiError::TypeMismatch {
                    service: identifier.to_string(),
                    expected: std::any::type_name::<T>(),
                })?;
                Ok(Some(typed))
            }
            None => Ok(None),
        }
    }

    /// Resolves and assigns every injection point on an existing object.
    ///
    /// Never constructs a new top-level instance — this is the entry point
    /// host components call from their own lifecycle notifications (and
    /// the explicit re-injection entry point; the duplicate-injection
    /// guard is the component's own flag).
    pub fn inject_into(&self, target: &mut dyn Injectable) -> DiResult<()> {
        target.inject(self)
    }

    fn binding_for(&self, key: ServiceKey) -> DiResult<ServiceBinding> {
        self.bindings
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| DiError::UnregisteredService {
                service: key.type_name().to_string(),
            })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Context lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Activates a context; see [`ContextManager::enter`].
    pub fn enter_context(&self, name: &str) {
        self.contexts.enter(name);
    }

    /// Destroys a context and disposes its pool; see
    /// [`ContextManager::exit`].
    pub fn exit_context(&self, name: &str) {
        self.contexts.exit(name);
    }

    /// The current context name, lazily refreshed from the installed
    /// [`ContextSource`] when unset.
    #[must_use]
    pub fn current_context(&self) -> Option<String> {
        self.contexts.current()
    }

    /// Replaces the context catalog used for index-based constraints.
    pub fn set_context_catalog(&self, catalog: ContextCatalog) {
        self.contexts.set_catalog(catalog);
    }

    /// Installs the host seam the current-context getter refreshes from.
    pub fn set_context_source(&self, source: Arc<dyn ContextSource>) {
        self.contexts.set_source(source);
    }

    /// Installs the host seam host-managed bindings are built through.
    pub fn set_component_host(&self, host: Arc<dyn ComponentHost>) {
        *self.host.write() = Some(host);
    }

    /// The context lifecycle manager, for hosts and tests that need more
    /// than the delegating methods above.
    #[must_use]
    pub fn contexts(&self) -> &ContextManager {
        &self.contexts
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reset & introspection
    // ─────────────────────────────────────────────────────────────────────

    /// Disposes every still-open context pool (hooks fire before any
    /// mapping is cleared), then clears the singleton pool, the identifier
    /// index, all bindings, and the current-context marker. The catalog
    /// survives — it is host configuration, not a registration.
    pub fn reset_all(&self) {
        self.contexts.dispose_all();
        self.singletons.write().clear();
        self.named.write().clear();
        self.bindings.write().clear();
        log::debug!("registry reset");
    }

    /// Whether anything is registered under `T`.
    #[must_use]
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.bindings.read().contains_key(&ServiceKey::of::<T>())
    }

    /// Number of live bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.read().len()
    }

    /// Number of cached singleton instances.
    #[must_use]
    pub fn singleton_count(&self) -> usize {
        self.singletons.read().len()
    }

    pub(crate) fn singleton_hit(&self, key: ServiceKey) -> Option<ErasedInstance> {
        self.singletons.read().get(&key).cloned()
    }

    /// First write wins on double resolution.
    pub(crate) fn singleton_store(
        &self,
        key: ServiceKey,
        instance: ErasedInstance,
    ) -> ErasedInstance {
        self.singletons
            .write()
            .entry(key)
            .or_insert(instance)
            .clone()
    }

    pub(crate) fn component_host(&self) -> Option<Arc<dyn ComponentHost>> {
        self.host.read().clone()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Clock {
        tick: u32,
    }

    #[test]
    fn registration_is_last_write_wins() {
        let registry = Registry::new();
        registry.register_factory(Lifetime::Transient, |_| Ok(Clock { tick: 1 }));
        registry.register_factory(Lifetime::Transient, |_| Ok(Clock { tick: 2 }));

        assert_eq!(registry.binding_count(), 1);
        let clock = registry.resolve::<Clock>().unwrap().unwrap();
        assert_eq!(clock.tick, 2);
    }

    #[test]
    fn identifier_index_is_last_write_wins() {
        let registry = Registry::new();
        registry.register_instance_named(Arc::new(Clock { tick: 1 }), "clock");
        registry.register_instance_named(Arc::new(8u64), "clock");

        let value = registry.resolve_named::<u64>("clock").unwrap().unwrap();
        assert_eq!(*value, 8);
    }

    #[test]
    fn unregistered_service_is_an_error_without_side_effects() {
        let registry = Registry::new();
        let err = registry.resolve::<Clock>().unwrap_err();
        assert!(matches!(err, DiError::UnregisteredService { .. }));
        assert_eq!(registry.singleton_count(), 0);
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let registry = Registry::new();
        let err = registry.resolve_named::<Clock>("nope").unwrap_err();
        assert!(matches!(err, DiError::UnregisteredIdentifier { .. }));
    }

    #[test]
    fn named_resolution_with_the_wrong_type_is_a_mismatch() {
        let registry = Registry::new();
        registry.register_instance_named(Arc::new(Clock { tick: 3 }), "clock");
        let err = registry.resolve_named::<String>("clock").unwrap_err();
        assert!(matches!(err, DiError::TypeMismatch { .. }));
    }

    #[test]
    fn instance_registration_seeds_the_singleton_pool() {
        let registry = Registry::new();
        registry.register_instance(Arc::new(Clock { tick: 9 }));
        assert_eq!(registry.singleton_count(), 1);

        let a = registry.resolve::<Clock>().unwrap().unwrap();
        let b = registry.resolve::<Clock>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.tick, 9);
    }

    #[test]
    fn reset_clears_bindings_pools_and_identifiers() {
        let registry = Registry::new();
        registry.register_instance_named(Arc::new(Clock { tick: 1 }), "clock");
        registry.reset_all();

        assert_eq!(registry.binding_count(), 0);
        assert_eq!(registry.singleton_count(), 0);
        assert!(matches!(
            registry.resolve::<Clock>(),
            Err(DiError::UnregisteredService { .. })
        ));
        assert!(matches!(
            registry.resolve_named::<Clock>("clock"),
            Err(DiError::UnregisteredIdentifier { .. })
        ));
    }

    #[test]
    fn inject_into_rewires_an_existing_object() {
        struct Consumer {
            clock: Option<Arc<Clock>>,
        }

        impl Injectable for Consumer {
            fn inject(&mut self, registry: &Registry) -> DiResult<()> {
                self.clock = registry.resolve::<Clock>()?;
                Ok(())
            }
        }

        let registry = Registry::new();
        registry.register_instance(Arc::new(Clock { tick: 5 }));

        let mut consumer = Consumer { clock: None };
        registry.inject_into(&mut consumer).unwrap();
        assert_eq!(consumer.clock.as_ref().unwrap().tick, 5);
    }
}

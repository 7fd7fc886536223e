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

//! Service identity and registration metadata.
//!
//! A [`ServiceKey`] names *what* is being asked for — a concrete type or a
//! `dyn Trait` object type. A [`ServiceBinding`] records everything the
//! registry knows about *how* to satisfy that key: the lifetime policy, an
//! optional string identifier, an optional context constraint, and the
//! construction path. Bindings are pure data; the construction engine in
//! [`registry`](crate::registry) interprets them.

use std::any::{self, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::context::ContextConstraint;
use crate::dispose::Dispose;
use crate::error::DiResult;
use crate::lifetime::Lifetime;
use crate::registry::Registry;

/// The abstract key a registration is looked up under.
///
/// Keys are built from a type — either a concrete one or a trait object
/// type — and compare by [`TypeId`] alone; the type name rides along for
/// diagnostics.
///
/// # Examples
///
/// ```rust
/// use rhiza_core::ServiceKey;
///
/// trait Audio: Send + Sync {}
/// struct Mixer;
///
/// assert_ne!(ServiceKey::of::<Mixer>(), ServiceKey::of::<dyn Audio>());
/// assert_eq!(ServiceKey::of::<Mixer>(), ServiceKey::of::<Mixer>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ServiceKey {
    id: TypeId,
    type_name: &'static str,
}

impl ServiceKey {
    /// Builds the key for a service identity type.
    #[must_use]
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            type_name: any::type_name::<S>(),
        }
    }

    /// Human-readable name of the keyed type, for logs and errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// A type-erased, shareable instance as the pools store it.
///
/// The erased value is always an `Arc<T>` boxed one level behind
/// `Arc<dyn Any>`, where `T` is the *service identity* type — concrete or
/// `dyn Trait`. That single convention lets [`downcast`](Self::downcast)
/// recover either shape without reflection.
pub struct ErasedInstance {
    value: Arc<dyn Any + Send + Sync>,
    disposer: Option<Arc<dyn Dispose>>,
}

impl ErasedInstance {
    /// Erases an instance with no teardown hook.
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value: Arc::new(value),
            disposer: None,
        }
    }

    /// Erases an instance together with its [`Dispose`] hook.
    ///
    /// The hook is usually the same allocation as `value`; passing a
    /// concrete `Arc` where an `Arc<dyn Dispose>` is expected coerces.
    pub fn with_disposer<T: ?Sized + Send + Sync + 'static>(
        value: Arc<T>,
        disposer: Arc<dyn Dispose>,
    ) -> Self {
        Self {
            value: Arc::new(value),
            disposer: Some(disposer),
        }
    }

    /// Recovers the typed `Arc` if `T` is the identity the instance was
    /// erased under.
    #[must_use]
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value
            .clone()
            .downcast::<Arc<T>>()
            .ok()
            .map(|outer| (*outer).clone())
    }

    pub(crate) fn disposer(&self) -> Option<&Arc<dyn Dispose>> {
        self.disposer.as_ref()
    }
}

impl Clone for ErasedInstance {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            disposer: self.disposer.clone(),
        }
    }
}

impl fmt::Debug for ErasedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedInstance")
            .field("disposable", &self.disposer.is_some())
            .finish()
    }
}

/// Construction recipe stored inside a binding.
///
/// Factories re-enter the [`Registry`] to resolve their own dependencies;
/// the registry guarantees no internal lock is held while one runs.
pub type FactoryFn = Arc<dyn Fn(&Registry) -> DiResult<ErasedInstance> + Send + Sync>;

/// Everything the registry records about one service registration.
///
/// Bindings are keyed by their service identity in the registry's primary
/// mapping; registering another binding under the same key replaces the
/// previous one silently (last-write-wins, relied on by the scanner).
#[derive(Clone)]
pub struct ServiceBinding {
    service: ServiceKey,
    implementation: &'static str,
    lifetime: Lifetime,
    identifier: Option<String>,
    constraint: Option<ContextConstraint>,
    factory: Option<FactoryFn>,
    host_managed: bool,
}

impl ServiceBinding {
    /// Starts a binding for the service identity `S` with the given
    /// lifetime. Until a factory (or the host-managed flag) is attached,
    /// resolving it fails with
    /// [`NoSuitableConstructor`](crate::DiError::NoSuitableConstructor).
    #[must_use]
    pub fn new<S: ?Sized + 'static>(lifetime: Lifetime) -> Self {
        let service = ServiceKey::of::<S>();
        Self {
            service,
            implementation: service.type_name(),
            lifetime,
            identifier: None,
            constraint: None,
            factory: None,
            host_managed: false,
        }
    }

    /// Records the concrete implementation type, for diagnostics.
    #[must_use]
    pub fn implemented_by<T: ?Sized + 'static>(mut self) -> Self {
        self.implementation = any::type_name::<T>();
        self
    }

    /// Attaches a string identifier; the registry indexes the binding under
    /// it in the secondary mapping.
    #[must_use]
    pub fn named(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Restricts construction to the contexts the constraint allows.
    /// Ignored for singleton bindings.
    #[must_use]
    pub fn constrained(mut self, constraint: ContextConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Attaches the construction recipe.
    #[must_use]
    pub fn with_factory(mut self, factory: FactoryFn) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Marks the implementation as a host-managed component: construction
    /// is delegated to the installed
    /// [`ComponentHost`](crate::ComponentHost) instead of a factory.
    #[must_use]
    pub fn host_managed(mut self) -> Self {
        self.host_managed = true;
        self
    }

    /// The service identity this binding satisfies.
    #[must_use]
    pub fn service(&self) -> ServiceKey {
        self.service
    }

    /// Type name of the concrete implementation.
    #[must_use]
    pub fn implementation(&self) -> &'static str {
        self.implementation
    }

    /// The binding's lifetime policy.
    #[must_use]
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// The string identifier, if one was attached.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// The context constraint, if one was attached.
    #[must_use]
    pub fn constraint(&self) -> Option<&ContextConstraint> {
        self.constraint.as_ref()
    }

    /// The construction recipe, if one was attached.
    #[must_use]
    pub fn factory(&self) -> Option<&FactoryFn> {
        self.factory.as_ref()
    }

    /// Whether construction is delegated to the component host.
    #[must_use]
    pub fn is_host_managed(&self) -> bool {
        self.host_managed
    }
}

impl fmt::Debug for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBinding")
            .field("service", &self.service)
            .field("implementation", &self.implementation)
            .field("lifetime", &self.lifetime)
            .field("identifier", &self.identifier)
            .field("constraint", &self.constraint)
            .field("has_factory", &self.factory.is_some())
            .field("host_managed", &self.host_managed)
            .finish()
    }
}

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

//! The construction engine.
//!
//! Given a binding, produce a fully injected instance honoring its
//! lifetime policy. Construction recurses: factories re-enter the registry
//! for their dependencies, and a per-thread frame stack turns re-entry on
//! a key already under construction into a
//! [`CircularDependency`](DiError::CircularDependency) instead of
//! unbounded recursion.

use std::cell::RefCell;

use crate::binding::{ErasedInstance, ServiceBinding, ServiceKey};
use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;
use crate::registry::Registry;

thread_local! {
    static FRAMES: RefCell<Vec<ServiceKey>> = const { RefCell::new(Vec::new()) };
}

/// Pops its key from the frame stack when construction unwinds.
struct FrameGuard;

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}

fn push_frame(key: ServiceKey) -> DiResult<FrameGuard> {
    FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        if frames.contains(&key) {
            let chain = frames
                .iter()
                .map(ServiceKey::type_name)
                .chain(std::iter::once(key.type_name()))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(DiError::CircularDependency { chain });
        }
        frames.push(key);
        Ok(FrameGuard)
    })
}

/// Resolves a binding per its lifetime policy.
///
/// `Ok(None)` is the constraint-gated outcome; every other failure is an
/// error that propagates unmodified through the recursive frames.
pub(super) fn resolve_binding(
    registry: &Registry,
    binding: &ServiceBinding,
) -> DiResult<Option<ErasedInstance>> {
    let key = binding.service();
    match binding.lifetime() {
        // Constraints do not apply to singletons.
        Lifetime::Singleton => {
            if let Some(cached) = registry.singleton_hit(key) {
                return Ok(Some(cached));
            }
            let built = construct(registry, binding)?;
            Ok(Some(registry.singleton_store(key, built)))
        }
        Lifetime::Scoped => {
            let context = registry.contexts().effective_context();
            if let Some(cached) = registry.contexts().cached_get(&context, key) {
                return Ok(Some(cached));
            }
            if !constraint_allows(registry, binding) {
                return Ok(None);
            }
            let built = construct(registry, binding)?;
            Ok(Some(registry.contexts().cache(&context, key, built)))
        }
        Lifetime::Transient => {
            if !constraint_allows(registry, binding) {
                return Ok(None);
            }
            construct(registry, binding).map(Some)
        }
    }
}

fn constraint_allows(registry: &Registry, binding: &ServiceBinding) -> bool {
    let Some(constraint) = binding.constraint() else {
        return true;
    };
    let name = registry.contexts().current().unwrap_or_default();
    let index = registry.contexts().current_index();
    let allowed = constraint.allows(&name, index);
    if !allowed {
        log::trace!(
            "`{}` gated out of context `{name}`",
            binding.implementation()
        );
    }
    allowed
}

fn construct(registry: &Registry, binding: &ServiceBinding) -> DiResult<ErasedInstance> {
    let _guard = push_frame(binding.service())?;

    if binding.is_host_managed() {
        let host = registry
            .component_host()
            .ok_or_else(|| DiError::NoSuitableConstructor {
                implementation: binding.implementation().to_string(),
            })?;
        // Host components are idempotent: an existing one is injected and
        // reused, never rebuilt.
        if let Some(existing) = host.inject_existing(binding.service(), registry)? {
            return Ok(existing);
        }
        return host.create_and_inject(binding.service(), registry);
    }

    let factory = binding
        .factory()
        .ok_or_else(|| DiError::NoSuitableConstructor {
            implementation: binding.implementation().to_string(),
        })?;
    factory(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::require;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Ping {
        _pong: Arc<Pong>,
    }

    #[derive(Debug)]
    struct Pong {
        _ping: Arc<Ping>,
    }

    #[test]
    fn mutual_recursion_is_reported_as_a_cycle() {
        let registry = Registry::new();
        registry.register_factory(Lifetime::Transient, |r: &Registry| {
            Ok(Ping {
                _pong: require(r.resolve::<Pong>()?)?,
            })
        });
        registry.register_factory(Lifetime::Transient, |r: &Registry| {
            Ok(Pong {
                _ping: require(r.resolve::<Ping>()?)?,
            })
        });

        let err = registry.resolve::<Ping>().unwrap_err();
        match err {
            DiError::CircularDependency { chain } => {
                assert!(chain.contains("Ping"), "chain was `{chain}`");
                assert!(chain.contains("Pong"), "chain was `{chain}`");
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn the_frame_stack_unwinds_after_a_cycle_error() {
        let registry = Registry::new();
        registry.register_factory(Lifetime::Transient, |r: &Registry| {
            Ok(Ping {
                _pong: require(r.resolve::<Pong>()?)?,
            })
        });
        registry.register_factory(Lifetime::Transient, |r: &Registry| {
            Ok(Pong {
                _ping: require(r.resolve::<Ping>()?)?,
            })
        });

        assert!(registry.resolve::<Ping>().is_err());
        // A later, well-formed resolution must not see stale frames.
        registry.register_factory(Lifetime::Transient, |_| Ok(42u32));
        assert_eq!(*registry.resolve::<u32>().unwrap().unwrap(), 42);
    }

    #[test]
    fn binding_without_a_factory_has_no_constructor() {
        let registry = Registry::new();
        registry.register(crate::ServiceBinding::new::<u32>(Lifetime::Transient));
        let err = registry.resolve::<u32>().unwrap_err();
        assert!(matches!(err, DiError::NoSuitableConstructor { .. }));
    }

    #[test]
    fn host_managed_binding_without_a_host_has_no_constructor() {
        #[derive(Debug)]
        struct HudOverlay;
        let registry = Registry::new();
        registry.register(
            crate::ServiceBinding::new::<HudOverlay>(Lifetime::Scoped).host_managed(),
        );
        let err = registry.resolve::<HudOverlay>().unwrap_err();
        assert!(matches!(err, DiError::NoSuitableConstructor { .. }));
    }

    #[test]
    fn failed_construction_leaves_no_pool_entry() {
        struct Flaky;
        let registry = Registry::new();
        registry.register_factory::<Flaky, _>(Lifetime::Scoped, |_| {
            Err(DiError::UnregisteredService {
                service: "missing dependency".to_string(),
            })
        });

        registry.enter_context("Menu");
        assert!(registry.resolve::<Flaky>().is_err());
        assert!(registry
            .contexts()
            .cached_get("Menu", ServiceKey::of::<Flaky>())
            .is_none());
    }
}

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

//! Host-managed component construction through the `ComponentHost` seam.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rhiza_core::{
    ComponentHost, ContextSource, DiError, DiResult, ErasedInstance, Lifetime, Registry,
    ServiceBinding, ServiceKey,
};

struct HudOverlay {
    label: &'static str,
}

/// Stands in for the host's live object graph: at most one `HudOverlay`
/// exists, and asking again must return the same one.
#[derive(Default)]
struct FakeHost {
    existing: Mutex<Option<Arc<HudOverlay>>>,
    created: AtomicUsize,
}

impl ComponentHost for FakeHost {
    fn inject_existing(
        &self,
        component: ServiceKey,
        _registry: &Registry,
    ) -> DiResult<Option<ErasedInstance>> {
        if component != ServiceKey::of::<HudOverlay>() {
            return Ok(None);
        }
        Ok(self
            .existing
            .lock()
            .unwrap()
            .clone()
            .map(ErasedInstance::new))
    }

    fn create_and_inject(
        &self,
        _component: ServiceKey,
        _registry: &Registry,
    ) -> DiResult<ErasedInstance> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let fresh = Arc::new(HudOverlay { label: "spawned" });
        *self.existing.lock().unwrap() = Some(fresh.clone());
        Ok(ErasedInstance::new(fresh))
    }
}

#[test]
fn host_components_are_never_double_constructed() {
    let registry = Registry::new();
    let host = Arc::new(FakeHost::default());
    registry.set_component_host(host.clone());
    registry.register(ServiceBinding::new::<HudOverlay>(Lifetime::Transient).host_managed());

    let first = registry.resolve::<HudOverlay>().unwrap().unwrap();
    let second = registry.resolve::<HudOverlay>().unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(host.created.load(Ordering::SeqCst), 1);
    assert_eq!(first.label, "spawned");
}

#[test]
fn an_existing_host_component_is_reused_as_is() {
    let registry = Registry::new();
    let host = Arc::new(FakeHost::default());
    let placed = Arc::new(HudOverlay { label: "from-scene" });
    *host.existing.lock().unwrap() = Some(placed.clone());
    registry.set_component_host(host.clone());
    registry.register(ServiceBinding::new::<HudOverlay>(Lifetime::Transient).host_managed());

    let resolved = registry.resolve::<HudOverlay>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&placed, &resolved));
    assert_eq!(host.created.load(Ordering::SeqCst), 0);
}

#[test]
fn host_managed_binding_without_a_host_fails() {
    let registry = Registry::new();
    registry.register(ServiceBinding::new::<HudOverlay>(Lifetime::Transient).host_managed());

    assert!(matches!(
        registry.resolve::<HudOverlay>(),
        Err(DiError::NoSuitableConstructor { .. })
    ));
}

struct SceneProbe;

impl ContextSource for SceneProbe {
    fn active_context(&self) -> Option<String> {
        Some("Harbor".to_string())
    }
}

#[test]
fn the_current_context_getter_refreshes_from_the_host() {
    let registry = Registry::new();
    assert_eq!(registry.current_context(), None);

    registry.set_context_source(Arc::new(SceneProbe));
    assert_eq!(registry.current_context().as_deref(), Some("Harbor"));

    // Explicit transitions take precedence over the lazy refresh.
    registry.enter_context("Depths");
    assert_eq!(registry.current_context().as_deref(), Some("Depths"));
}

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

//! End-to-end coverage of the derive + scanner path: discovery, unit
//! filtering, failure recovery, and the generated injection code.

use std::sync::Arc;

use rhiza_core::{DiError, Registry};
use rhiza_macros::Injectable;

trait Pathfinder: Send + Sync {
    fn strategy(&self) -> &'static str;
}

#[derive(Injectable)]
#[injectable(singleton, provides(dyn Pathfinder))]
struct GridPathfinder;

impl Pathfinder for GridPathfinder {
    fn strategy(&self) -> &'static str {
        "grid"
    }
}

#[derive(Injectable)]
#[injectable(singleton, name = "frame_clock")]
struct FrameClock {
    frame: u64,
}

#[derive(Injectable)]
#[injectable(scoped, contexts("Menu"))]
struct MenuOverlay;

#[derive(Injectable)]
#[injectable(transient)]
struct RoutePlanner {
    #[inject]
    pathfinder: Arc<dyn Pathfinder>,
    #[inject(name = "frame_clock")]
    clock: Arc<FrameClock>,
    #[inject]
    overlay: Option<Arc<MenuOverlay>>,
    steps: u32,
}

mod fixtures {
    use rhiza_macros::Injectable;

    #[derive(Injectable)]
    #[injectable(transient)]
    pub struct ScratchBuffer;
}

// A deliberately failing hand-written entry; the scanner must log it and
// keep going.
rhiza_core::__support::inventory::submit! {
    rhiza_core::RegistrationEntry {
        type_name: "BrokenService",
        module: module_path!(),
        register: |_| Err(rhiza_core::DiError::UnregisteredService {
            service: "BrokenService".to_string(),
        }),
    }
}

#[test]
fn scanning_registers_every_annotated_type_and_skips_failures() {
    let _ = env_logger::builder().is_test(true).try_init();

    let registry = Registry::new();
    let registered = registry.scan_and_register();

    // Five annotated types; the broken manual entry is skipped.
    assert_eq!(registered, 5);
    assert!(registry.is_registered::<GridPathfinder>());
    assert!(registry.is_registered::<dyn Pathfinder>());
    assert!(registry.is_registered::<FrameClock>());
    assert!(registry.is_registered::<MenuOverlay>());
    assert!(registry.is_registered::<RoutePlanner>());
    assert!(registry.is_registered::<fixtures::ScratchBuffer>());
}

#[test]
fn scanning_one_unit_filters_by_module_path() {
    let registry = Registry::new();
    let registered = registry.scan_unit(concat!(module_path!(), "::fixtures"));

    assert_eq!(registered, 1);
    assert!(registry.is_registered::<fixtures::ScratchBuffer>());
    assert!(!registry.is_registered::<GridPathfinder>());
}

#[test]
fn rescanning_is_harmless_last_write_wins() {
    let registry = Registry::new();
    let first = registry.scan_and_register();
    let second = registry.scan_and_register();
    assert_eq!(first, second);
    assert!(registry.is_registered::<dyn Pathfinder>());
}

#[test]
fn generated_construction_resolves_typed_named_and_optional_fields() {
    let registry = Registry::new();
    registry.scan_and_register();

    registry.enter_context("Boot");
    let planner = registry.resolve::<RoutePlanner>().unwrap().unwrap();
    assert_eq!(planner.pathfinder.strategy(), "grid");
    assert_eq!(planner.clock.frame, 0, "unmarked fields come from Default");
    assert!(planner.overlay.is_none(), "gated optional dependency");
    assert_eq!(planner.steps, 0);

    registry.enter_context("Menu");
    let planner = registry.resolve::<RoutePlanner>().unwrap().unwrap();
    assert!(planner.overlay.is_some());
}

#[test]
fn provided_trait_and_self_identity_cache_independently() {
    let registry = Registry::new();
    registry.scan_and_register();

    let as_trait = registry.resolve::<dyn Pathfinder>().unwrap().unwrap();
    let as_self = registry.resolve::<GridPathfinder>().unwrap().unwrap();
    assert_eq!(as_trait.strategy(), as_self.strategy());

    // Each singleton identity keeps its own cached instance.
    let trait_again = registry.resolve::<dyn Pathfinder>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&as_trait, &trait_again));
}

#[derive(Default, Injectable)]
#[injectable(no_scan)]
struct HudController {
    #[inject]
    pathfinder: Option<Arc<dyn Pathfinder>>,
    armed: bool,
}

#[test]
fn inject_into_wires_an_existing_consumer() {
    let registry = Registry::new();
    registry.scan_and_register();

    let mut hud = HudController::default();
    assert!(hud.pathfinder.is_none());
    registry.inject_into(&mut hud).unwrap();
    assert_eq!(hud.pathfinder.as_ref().unwrap().strategy(), "grid");
    assert!(!hud.armed);

    // Re-injection is idempotent at the member level; the duplicate guard
    // belongs to the consumer.
    registry.inject_into(&mut hud).unwrap();
    assert!(hud.pathfinder.is_some());
}

#[test]
fn mandatory_injection_points_surface_missing_registrations() {
    let registry = Registry::new();
    // Nothing scanned: RoutePlanner's own binding is absent, and so are
    // its dependencies.
    assert!(matches!(
        registry.resolve::<RoutePlanner>(),
        Err(DiError::UnregisteredService { .. })
    ));
}

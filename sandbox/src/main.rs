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

// Rhiza Sandbox
// Walks the container through a host's typical frame of life: bootstrap,
// scan, context transitions, scoped teardown, reset.

use std::sync::Arc;

use anyhow::Result;
use rhiza_core::{ContextCatalog, Dispose, Registry};
use rhiza_macros::Injectable;

trait DiagnosticsSink: Send + Sync {
    fn record(&self, line: &str);
}

#[derive(Injectable)]
#[injectable(singleton, provides(dyn DiagnosticsSink))]
struct LogDiagnostics;

impl DiagnosticsSink for LogDiagnostics {
    fn record(&self, line: &str) {
        log::info!("[diag] {line}");
    }
}

#[derive(Injectable)]
#[injectable(singleton, name = "frame_clock")]
struct FrameClock {
    frame: u64,
}

/// Lives only while the Arena context does; torn down on context exit.
#[derive(Injectable)]
#[injectable(scoped, contexts("Arena"), dispose)]
struct ArenaSession {
    #[inject]
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl ArenaSession {
    fn heartbeat(&self) {
        self.diagnostics.record("arena session alive");
    }
}

impl Dispose for ArenaSession {
    fn dispose(&self) {
        self.diagnostics.record("arena session torn down");
    }
}

#[derive(Injectable)]
#[injectable(transient)]
struct PathQuery {
    #[inject]
    diagnostics: Arc<dyn DiagnosticsSink>,
    #[inject(name = "frame_clock")]
    clock: Arc<FrameClock>,
}

impl PathQuery {
    fn run(&self) {
        self.diagnostics
            .record(&format!("path query issued at frame {}", self.clock.frame));
    }
}

fn main() -> Result<()> {
    env_logger::init();

    // The bootstrap owns the registry and shares it by Arc; there is no
    // global accessor.
    let registry = Arc::new(Registry::new());
    registry.set_context_catalog(ContextCatalog::from_names(["Boot", "Arena"]));

    let discovered = registry.scan_and_register();
    log::info!("discovered {discovered} service(s)");

    registry.enter_context("Boot");
    anyhow::ensure!(
        registry.resolve::<ArenaSession>()?.is_none(),
        "the arena session must be gated out of Boot"
    );
    registry
        .resolve::<PathQuery>()?
        .expect("unconstrained transient")
        .run();

    registry.enter_context("Arena");
    registry
        .resolve::<ArenaSession>()?
        .expect("Arena is active")
        .heartbeat();

    registry.exit_context("Arena");
    registry.reset_all();
    log::info!("shutdown clean");
    Ok(())
}

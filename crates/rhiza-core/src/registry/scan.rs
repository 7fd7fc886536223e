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

//! Bulk registration of annotated types.
//!
//! Where a reflection-based container scans loaded code for annotated
//! classes, this one walks an [`inventory`]-collected table of
//! [`RegistrationEntry`] values. `#[derive(Injectable)]` submits one entry
//! per annotated type at link time; hand-written entries can be submitted
//! with `inventory::submit!` directly. The scanner is a convenience layer
//! over [`Registry::register`] — everything it does can be done manually.

use crate::error::DiResult;
use crate::registry::Registry;

/// One annotated type's self-registration hook, collected at link time.
///
/// `module` is the `module_path!()` of the type's declaration site and is
/// what [`scan_unit`](Registry::scan_unit) filters on — a *code unit* here
/// is a crate or module-path prefix.
pub struct RegistrationEntry {
    /// Name of the annotated type, for logs.
    pub type_name: &'static str,
    /// Declaration-site module path.
    pub module: &'static str,
    /// Registers the type's binding(s) against a registry.
    pub register: fn(&Registry) -> DiResult<()>,
}

inventory::collect!(RegistrationEntry);

impl Registry {
    /// Registers every collected entry across all linked code.
    ///
    /// Returns the number of entries registered. A failing entry is
    /// logged at `warn` and skipped; it never aborts the scan.
    pub fn scan_and_register(&self) -> usize {
        self.scan_filtered(None)
    }

    /// Registers the collected entries of one code unit — entries whose
    /// declaration-site module path starts with `module_prefix`.
    pub fn scan_unit(&self, module_prefix: &str) -> usize {
        self.scan_filtered(Some(module_prefix))
    }

    fn scan_filtered(&self, module_prefix: Option<&str>) -> usize {
        let mut registered = 0;
        for entry in inventory::iter::<RegistrationEntry> {
            if let Some(prefix) = module_prefix {
                if !entry.module.starts_with(prefix) {
                    continue;
                }
            }
            match (entry.register)(self) {
                Ok(()) => registered += 1,
                Err(err) => {
                    log::warn!(
                        "skipping `{}` from `{}`: {err}",
                        entry.type_name,
                        entry.module
                    );
                }
            }
        }
        log::debug!("scan registered {registered} type(s)");
        registered
    }
}

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

//! # Rhiza Core
//!
//! A runtime dependency-injection container for game-style hosts: a
//! registry mapping abstract service identities to concrete
//! implementations, with lifetime policies (Singleton / Scoped /
//! Transient), context-scoped instance pools that are disposed on context
//! exit, and compile-time injection metadata supplied by
//! `#[derive(Injectable)]` from the companion `rhiza-macros` crate.
//!
//! The container has no global accessor: the application bootstrap owns
//! the [`Registry`] and shares it behind an `Arc` with whoever needs it.
//! All operations are synchronous and run on the host's update thread;
//! the internal maps carry their own locks only so the `Arc` can be
//! shared freely.

#![warn(missing_docs)]

pub mod binding;
pub mod context;
pub mod dispose;
pub mod error;
pub mod host;
pub mod inject;
pub mod lifetime;
pub mod registry;

pub use binding::{ErasedInstance, FactoryFn, ServiceBinding, ServiceKey};
pub use context::{ContextCatalog, ContextConstraint, ContextManager, ROOT_CONTEXT};
pub use dispose::Dispose;
pub use error::{DiError, DiResult};
pub use host::{ComponentHost, ContextSource};
pub use inject::{Construct, Injectable};
pub use lifetime::Lifetime;
pub use registry::{RegistrationEntry, Registry};

/// Support surface for macro-generated code. Not a public API.
#[doc(hidden)]
pub mod __support {
    pub use crate::inject::require;
    pub use inventory;
}

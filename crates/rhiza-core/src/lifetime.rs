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

//! Lifetime policies governing caching and destruction timing.

/// How long a resolved instance lives and who caches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One instance for the whole application, created lazily on first
    /// resolution and cached in the singleton pool until
    /// [`reset_all`](crate::Registry::reset_all). Context constraints do
    /// not apply to singletons.
    Singleton,

    /// One instance per context. Cached in the pool of the context that was
    /// current at first resolution and destroyed (with its disposal hook,
    /// if declared) when that context exits.
    Scoped,

    /// A fresh instance on every resolution. The container caches nothing
    /// and takes no responsibility for the instance after returning it.
    Transient,
}

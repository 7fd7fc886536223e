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

//! Optional teardown capability for context-scoped instances.

/// Structured teardown for instances owned by a context pool.
///
/// A scoped instance whose registration declares the capability (the
/// `dispose` option of the derive, or
/// [`register_disposable_factory`](crate::Registry::register_disposable_factory))
/// gets `dispose` called exactly once when its context exits or when the
/// registry is reset. Hooks run in reverse insertion order, so an instance
/// is disposed before anything it was built from.
///
/// Transient instances belong to their requester and never receive the
/// hook; singletons outlive every context and are simply dropped on reset.
pub trait Dispose: Send + Sync + 'static {
    /// Release whatever the instance holds. Called at most once.
    fn dispose(&self);
}

//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Named targets and their operations.
//!
//! A [`TargetObject`] is a table of named operations built once at service
//! composition time. Only operations registered with
//! [`rpc_method`](TargetObject::rpc_method) or
//! [`rpc_void_method`](TargetObject::rpc_void_method) carry the exposed
//! marker; [`local_method`](TargetObject::local_method) entries are resolvable
//! by name but rejected by dispatch.

use crate::codec::{RemoteError, Value};
use crate::router::DispatchError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future produced by a [`Handler`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, RemoteError>> + Send>>;

/// A type-erased operation: takes the call's arguments, yields its result.
pub type Handler = Arc<dyn Fn(Vec<Value>) -> HandlerFuture + Send + Sync>;

/// One named operation of a target.
#[derive(Clone)]
pub struct Method {
    name: String,
    exposed: bool,
    handler: Handler,
}

impl Method {
    /// The operation's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the operation may be called remotely.
    pub fn is_exposed(&self) -> bool {
        self.exposed
    }

    /// Runs the operation.
    pub fn invoke(&self, args: Vec<Value>) -> HandlerFuture {
        (self.handler)(args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("exposed", &self.exposed)
            .finish_non_exhaustive()
    }
}

/// An invocable object: an ordered list of named operations.
///
/// # Examples
///
/// ```rust
/// use seqrpc::codec::{RemoteError, Value};
/// use seqrpc::router::TargetObject;
///
/// let calculator = TargetObject::new()
///     .rpc_method("add", |args: Vec<Value>| async move {
///         let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
///         Ok(Value::Long(sum))
///     })
///     .local_method("reset", |_| async { Ok(Value::Null) });
///
/// assert!(calculator.method("add").is_some_and(|m| m.is_exposed()));
/// assert!(calculator.method("reset").is_some_and(|m| !m.is_exposed()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TargetObject {
    methods: Vec<Method>,
}

impl TargetObject {
    /// Creates a target with no operations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a remotely callable operation.
    #[must_use]
    pub fn rpc_method<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
    {
        self.with_method(name, true, f)
    }

    /// Adds a remotely callable operation that answers with the void sentinel.
    #[must_use]
    pub fn rpc_void_method<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), RemoteError>> + Send + 'static,
    {
        let f = Arc::new(f);
        self.with_method(name, true, move |args| {
            let f = f.clone();
            async move { (*f)(args).await.map(|()| Value::void()) }
        })
    }

    /// Adds an operation that dispatch refuses to call.
    #[must_use]
    pub fn local_method<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
    {
        self.with_method(name, false, f)
    }

    fn with_method<F, Fut>(mut self, name: impl Into<String>, exposed: bool, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
    {
        let handler: Handler =
            Arc::new(move |args: Vec<Value>| -> HandlerFuture { Box::pin(f(args)) });
        self.methods.push(Method {
            name: name.into(),
            exposed,
            handler,
        });
        self
    }

    /// The first operation named `name`.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// All operations in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }
}

/// Target objects served by a router, keyed by name.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: RwLock<HashMap<String, Arc<TargetObject>>>,
}

impl TargetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `target` under `name`, returning any target it replaces.
    pub fn register(
        &self,
        name: impl Into<String>,
        target: TargetObject,
    ) -> Option<Arc<TargetObject>> {
        self.targets.write().insert(name.into(), Arc::new(target))
    }

    /// Removes the target registered under `name`.
    pub fn unregister(&self, name: &str) -> Option<Arc<TargetObject>> {
        self.targets.write().remove(name)
    }

    /// The target registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<TargetObject>> {
        self.targets.read().get(name).cloned()
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.targets.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.targets.read().is_empty()
    }

    /// Finds the exposed operation `method` on target `target`.
    ///
    /// # Errors
    ///
    /// Returns the matching [`DispatchError`] when the target or method is
    /// missing, or the method is not exposed.
    pub fn resolve(&self, target: &str, method: &str) -> Result<Method, DispatchError> {
        let object = self
            .get(target)
            .ok_or_else(|| DispatchError::UnresolvedTarget {
                target: target.to_string(),
            })?;
        let found = object
            .method(method)
            .ok_or_else(|| DispatchError::UnresolvedMethod {
                target: target.to_string(),
                method: method.to_string(),
            })?;
        if !found.is_exposed() {
            return Err(DispatchError::MethodNotExposed {
                target: target.to_string(),
                method: method.to_string(),
            });
        }
        Ok(found.clone())
    }
}

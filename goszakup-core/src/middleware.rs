//! Middleware trait for wrapping `UpstreamClient` implementations.

use std::any::{Any, TypeId};
use std::sync::Arc;

use async_trait::async_trait;
use goszakup_types::GoszakupError;

use crate::client::{CallContext, UpstreamClient};

/// Position requirement for middleware in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewarePosition {
    /// This middleware must be outermost (applied last, handles requests first).
    Outermost,
    /// This middleware must be outside (closer to the caller than) the given type.
    OuterThan(TypeId),
    /// This middleware must be inside (closer to the raw client than) the given type.
    InnerThan(TypeId),
    /// No position requirement.
    Any,
}

/// Validation context passed to middleware during stack validation.
pub struct ValidationContext<'a> {
    stack: &'a [MiddlewareDescriptor],
    current_index: usize,
}

impl<'a> ValidationContext<'a> {
    /// Create a new validation context.
    #[must_use]
    pub const fn new(stack: &'a [MiddlewareDescriptor], current_index: usize) -> Self {
        Self {
            stack,
            current_index,
        }
    }

    /// Check if a middleware type exists anywhere in the stack.
    #[must_use]
    pub fn has_middleware(&self, type_id: TypeId) -> bool {
        self.stack.iter().any(|m| m.type_id() == type_id)
    }

    /// Check if a middleware type exists outer than (closer to the caller than)
    /// the middleware currently being validated. The stack is stored
    /// outermost-first, so "outer" means lower indices.
    #[must_use]
    pub fn has_middleware_outer(&self, type_id: TypeId) -> bool {
        self.stack[..self.current_index]
            .iter()
            .any(|m| m.type_id() == type_id)
    }

    /// Check if a middleware type exists inner than the middleware currently
    /// being validated.
    #[must_use]
    pub fn has_middleware_inner(&self, type_id: TypeId) -> bool {
        self.stack[self.current_index + 1..]
            .iter()
            .any(|m| m.type_id() == type_id)
    }

    /// All middleware type IDs in the stack, ordered outermost to innermost.
    #[must_use]
    pub fn middleware_types(&self) -> Vec<TypeId> {
        self.stack
            .iter()
            .map(MiddlewareDescriptor::type_id)
            .collect()
    }

    /// This middleware's position in the stack (0 = outermost).
    #[must_use]
    pub const fn current_position(&self) -> usize {
        self.current_index
    }

    /// Total number of middleware in the stack.
    #[must_use]
    pub const fn stack_size(&self) -> usize {
        self.stack.len()
    }
}

/// Internal descriptor for tracking middleware in the builder.
pub struct MiddlewareDescriptor {
    middleware: Box<dyn Middleware>,
    type_id: TypeId,
    name: &'static str,
}

impl MiddlewareDescriptor {
    /// Create a new descriptor from a concrete middleware implementation.
    pub fn new<M: Middleware + 'static>(middleware: M) -> Self {
        let name = middleware.name();
        Self {
            middleware: Box::new(middleware),
            type_id: TypeId::of::<M>(),
            name,
        }
    }

    /// The type ID of the wrapped middleware.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable name of the wrapped middleware.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Reference to the wrapped middleware trait object.
    #[must_use]
    pub fn middleware(&self) -> &dyn Middleware {
        &*self.middleware
    }

    /// Consume this descriptor and extract the boxed middleware.
    #[must_use]
    pub fn into_middleware(self) -> Box<dyn Middleware> {
        self.middleware
    }
}

/// Trait implemented by client middleware layers: caching, blacklisting, quota
/// enforcement. A middleware consumes an inner `UpstreamClient` and returns a
/// wrapped client that augments or restricts its behavior.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Apply this middleware to wrap an inner client and return the wrapped client.
    fn apply(self: Box<Self>, inner: Arc<dyn UpstreamClient>) -> Arc<dyn UpstreamClient>;

    /// Human-readable middleware name for introspection/logging.
    fn name(&self) -> &'static str;

    /// Opaque configuration snapshot for serialization/inspection.
    fn config_json(&self) -> serde_json::Value;

    /// Validate this middleware's position and dependencies in the stack.
    ///
    /// # Errors
    /// Returns an error if validation fails (missing dependency, wrong order).
    fn validate(&self, _ctx: &ValidationContext) -> Result<(), GoszakupError> {
        Ok(())
    }

    /// Get this middleware as `&dyn Any` for downcasting during tests/inspection.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }

    /// Called before delegating to the inner client. Middleware that gates calls
    /// (blacklist, quota) returns an error here to short-circuit the call.
    ///
    /// # Errors
    /// Returns an error to reject the call before it reaches the inner client.
    async fn pre_call(&self, _ctx: &CallContext) -> Result<(), GoszakupError> {
        Ok(())
    }

    /// Called on an error returned by the inner client, letting middleware react
    /// (e.g. start a blacklist cool-down) before the error propagates further.
    fn map_error(&self, err: GoszakupError, _ctx: &CallContext) -> GoszakupError {
        err
    }
}

/// Helper macro for middleware to check dependencies without hardcoding strings.
#[macro_export]
macro_rules! require_middleware_outer {
    ($ctx:expr, $middleware_type:ty, $msg:expr) => {
        if !$ctx.has_middleware_outer(std::any::TypeId::of::<$middleware_type>()) {
            return Err($crate::GoszakupError::Validation(format!(
                "{}: {} must be outside (outermost from) this middleware",
                $msg,
                std::any::type_name::<$middleware_type>()
            )));
        }
    };
}

/// Helper macro for middleware to check that a dependency exists anywhere in the stack.
#[macro_export]
macro_rules! require_middleware {
    ($ctx:expr, $middleware_type:ty, $msg:expr) => {
        if !$ctx.has_middleware(std::any::TypeId::of::<$middleware_type>()) {
            return Err($crate::GoszakupError::Validation(format!(
                "{}: {} must be present in the stack",
                $msg,
                std::any::type_name::<$middleware_type>()
            )));
        }
    };
}

/// Helper macro to check middleware is inner than another.
#[macro_export]
macro_rules! require_middleware_inner {
    ($ctx:expr, $middleware_type:ty, $msg:expr) => {
        if !$ctx.has_middleware_inner(std::any::TypeId::of::<$middleware_type>()) {
            return Err($crate::GoszakupError::Validation(format!(
                "{}: {} must be inside (innermost from) this middleware",
                $msg,
                std::any::type_name::<$middleware_type>()
            )));
        }
    };
}

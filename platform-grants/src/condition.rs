//! # Conditions
//!
//! Conditions gate individual grant edges. Internally there is exactly one
//! contract, the async [`Condition`] trait; the adapters in this module let
//! callers write conditions as plain predicates, as futures, or in
//! completion-handle style.
//!
//! ```
//! use platform_grants::condition::{self, Completion, Context};
//!
//! // Synchronous predicate
//! let is_owner = condition::predicate(|ctx: &Context| ctx.get_i64("userId") == Some(2));
//!
//! // Future-returning condition
//! let is_deleter = condition::from_async(|ctx: Context| async move {
//!     Ok::<_, condition::ConditionError>(ctx.get_i64("userId") == Some(3))
//! });
//!
//! // Completion-handle condition
//! let is_reviewer = condition::from_callback(|ctx: &Context, done: Completion| {
//!     done.ok(ctx.get_str("team") == Some("review"));
//!     None
//! });
//! # let _ = (is_owner, is_deleter, is_reviewer);
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use tokio::sync::oneshot;

pub use crate::error::ConditionError;

/// Caller-supplied context that conditions are evaluated against.
///
/// Always a JSON object; an empty object when the caller supplies nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Value);

impl Default for Context {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.into(), value.into());
        }
    }

    /// Look up a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up an integer value.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Look up a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Access the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Context {
    /// Non-object values are replaced by an empty object.
    fn from(value: Value) -> Self {
        if value.is_object() {
            Self(value)
        } else {
            Self::default()
        }
    }
}

/// An asynchronous predicate gating a grant edge.
#[async_trait]
pub trait Condition: Send + Sync {
    /// Evaluate against the caller's context.
    ///
    /// `Ok(false)` denies the edge; `Err` aborts the whole check.
    async fn evaluate(&self, ctx: &Context) -> Result<bool, ConditionError>;
}

/// Synchronous, infallible predicate.
pub struct Predicate<F>(F);

#[async_trait]
impl<F> Condition for Predicate<F>
where
    F: Fn(&Context) -> bool + Send + Sync,
{
    async fn evaluate(&self, ctx: &Context) -> Result<bool, ConditionError> {
        Ok((self.0)(ctx))
    }
}

/// Wrap a synchronous predicate.
pub fn predicate<F>(f: F) -> Predicate<F>
where
    F: Fn(&Context) -> bool + Send + Sync,
{
    Predicate(f)
}

/// Synchronous predicate with an error channel.
pub struct Fallible<F>(F);

#[async_trait]
impl<F> Condition for Fallible<F>
where
    F: Fn(&Context) -> Result<bool, ConditionError> + Send + Sync,
{
    async fn evaluate(&self, ctx: &Context) -> Result<bool, ConditionError> {
        (self.0)(ctx)
    }
}

/// Wrap a synchronous predicate that may fail.
pub fn fallible<F>(f: F) -> Fallible<F>
where
    F: Fn(&Context) -> Result<bool, ConditionError> + Send + Sync,
{
    Fallible(f)
}

/// Future-returning condition.
pub struct AsyncCondition<F>(F);

#[async_trait]
impl<F, Fut> Condition for AsyncCondition<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, ConditionError>> + Send + 'static,
{
    async fn evaluate(&self, ctx: &Context) -> Result<bool, ConditionError> {
        (self.0)(ctx.clone()).await
    }
}

/// Wrap a function returning a future. The context is handed over by value
/// so the future can own it.
pub fn from_async<F, Fut>(f: F) -> AsyncCondition<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, ConditionError>> + Send + 'static,
{
    AsyncCondition(f)
}

/// One-shot completion handle passed to callback-style conditions.
///
/// Consumed on use, so a single handle can settle at most once.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<Result<bool, ConditionError>>,
}

impl Completion {
    /// Settle with an outcome.
    pub fn complete(self, result: Result<bool, ConditionError>) {
        // The receiver is gone once another settlement won the race.
        let _ = self.tx.send(result);
    }

    /// Settle successfully.
    pub fn ok(self, granted: bool) {
        self.complete(Ok(granted));
    }

    /// Settle with a failure.
    pub fn fail(self, err: ConditionError) {
        self.complete(Err(err));
    }
}

/// Condition written against a [`Completion`] handle, optionally also
/// returning a future.
///
/// Whichever settles first wins. If the handle is dropped unused and no
/// future is returned the condition fails instead of hanging.
pub struct CallbackCondition<F>(F);

#[async_trait]
impl<F> Condition for CallbackCondition<F>
where
    F: Fn(&Context, Completion) -> Option<BoxFuture<'static, Result<bool, ConditionError>>>
        + Send
        + Sync,
{
    async fn evaluate(&self, ctx: &Context) -> Result<bool, ConditionError> {
        let (tx, mut rx) = oneshot::channel();
        let returned = (self.0)(ctx, Completion { tx });

        match returned {
            None => rx.await.unwrap_or_else(|_| {
                Err(ConditionError::new(
                    "condition dropped its completion handle without settling",
                ))
            }),
            Some(fut) => {
                tokio::select! {
                    biased;
                    Ok(signalled) = &mut rx => signalled,
                    // The future may have settled the handle itself before resolving.
                    resolved = fut => rx.try_recv().unwrap_or(resolved),
                }
            }
        }
    }
}

/// Wrap a completion-handle style condition.
pub fn from_callback<F>(f: F) -> CallbackCondition<F>
where
    F: Fn(&Context, Completion) -> Option<BoxFuture<'static, Result<bool, ConditionError>>>
        + Send
        + Sync,
{
    CallbackCondition(f)
}

//! Request-scoped correlation context.
//!
//! # States
//! ```text
//! Created ──activate()──▶ Active ──finalize()──▶ Finalized
//! ```
//! - Created: on inbound-request entry, message ID assigned
//! - Active: handler runs; errors appended, outbound calls read the message ID
//! - Finalized: errors drained into the event; later reports are dropped
//!
//! # Design Decisions
//! - Cloning shares the same context (`Arc` inside)
//! - Appends and finalization serialize on one mutex so no record is lost

use std::error::Error;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::error::ErrorRecord;

/// Lifecycle state of a correlation context.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Created = 0,
    Active = 1,
    Finalized = 2,
}

impl From<u8> for ContextState {
    fn from(val: u8) -> Self {
        match val {
            1 => ContextState::Active,
            2 => ContextState::Finalized,
            _ => ContextState::Created,
        }
    }
}

/// Per-request correlation state shared with handlers and outbound observers.
#[derive(Debug, Clone)]
pub struct CorrelationContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    message_id: Uuid,
    project_id: String,
    state: AtomicU8,
    errors: Mutex<Vec<ErrorRecord>>,
}

impl CorrelationContext {
    /// Create a context with a fresh message ID.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_message_id(Uuid::new_v4(), project_id)
    }

    /// Create a context with a known message ID.
    pub fn with_message_id(message_id: Uuid, project_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                message_id,
                project_id: project_id.into(),
                state: AtomicU8::new(ContextState::Created as u8),
                errors: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn message_id(&self) -> Uuid {
        self.inner.message_id
    }

    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    pub fn state(&self) -> ContextState {
        ContextState::from(self.inner.state.load(Ordering::Acquire))
    }

    /// Move from Created to Active. No effect in any other state.
    pub fn activate(&self) {
        let _ = self.inner.state.compare_exchange(
            ContextState::Created as u8,
            ContextState::Active as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Record an application error against this request. Never fails.
    pub fn report_error<E>(&self, err: &E)
    where
        E: Error + 'static,
    {
        self.record(ErrorRecord::from_error(err));
    }

    /// Append a prepared error record.
    pub fn record(&self, record: ErrorRecord) {
        let mut errors = self.lock_errors();
        if self.accepts(&record) {
            errors.push(record);
        }
    }

    /// Append `record` unless one with the same type and message is already held.
    pub fn record_if_absent(&self, record: ErrorRecord) {
        let mut errors = self.lock_errors();
        let seen = errors
            .iter()
            .any(|e| e.error_type == record.error_type && e.message == record.message);
        if !seen && self.accepts(&record) {
            errors.push(record);
        }
    }

    fn accepts(&self, record: &ErrorRecord) -> bool {
        if self.state() == ContextState::Finalized {
            tracing::debug!(
                message_id = %self.inner.message_id,
                error_type = %record.error_type,
                "Error reported after event was built, dropping"
            );
            return false;
        }
        true
    }

    /// Snapshot of the errors recorded so far.
    pub fn errors(&self) -> Vec<ErrorRecord> {
        self.lock_errors().clone()
    }

    /// Transition to Finalized and drain the recorded errors in append order.
    pub fn finalize(&self) -> Vec<ErrorRecord> {
        let mut errors = self.lock_errors();
        self.inner
            .state
            .store(ContextState::Finalized as u8, Ordering::Release);
        std::mem::take(&mut *errors)
    }

    fn lock_errors(&self) -> MutexGuard<'_, Vec<ErrorRecord>> {
        self.inner
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Record `err` against the request identified by `ctx`.
pub fn report_error<E>(ctx: &CorrelationContext, err: &E)
where
    E: Error + 'static,
{
    ctx.report_error(err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Boom(usize);

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom #{}", self.0)
        }
    }

    impl Error for Boom {}

    #[test]
    fn test_lifecycle_transitions() {
        let ctx = CorrelationContext::new("proj");
        assert_eq!(ctx.state(), ContextState::Created);

        ctx.activate();
        assert_eq!(ctx.state(), ContextState::Active);

        ctx.finalize();
        assert_eq!(ctx.state(), ContextState::Finalized);

        // no transition back
        ctx.activate();
        assert_eq!(ctx.state(), ContextState::Finalized);
    }

    #[test]
    fn test_clones_share_state() {
        let ctx = CorrelationContext::new("proj");
        let handle = ctx.clone();
        handle.report_error(&Boom(1));

        assert_eq!(ctx.message_id(), handle.message_id());
        assert_eq!(ctx.errors().len(), 1);
    }

    #[test]
    fn test_finalize_drains_in_order_and_drops_late_reports() {
        let ctx = CorrelationContext::new("proj");
        ctx.activate();
        report_error(&ctx, &Boom(1));
        report_error(&ctx, &Boom(2));

        let drained = ctx.finalize();
        let messages: Vec<_> = drained.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["boom #1", "boom #2"]);

        ctx.report_error(&Boom(3));
        assert!(ctx.errors().is_empty());
        assert!(ctx.finalize().is_empty());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = CorrelationContext::new("proj");
        let b = CorrelationContext::new("proj");
        assert_ne!(a.message_id(), b.message_id());
    }

    #[tokio::test]
    async fn test_concurrent_reports_are_not_lost() {
        let ctx = CorrelationContext::new("proj");
        ctx.activate();

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let ctx = ctx.clone();
                tokio::spawn(async move { ctx.report_error(&Boom(i)) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let mut seen: Vec<_> = ctx.finalize().into_iter().map(|r| r.message).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn test_record_if_absent_skips_known_errors() {
        let ctx = CorrelationContext::new("proj");
        ctx.activate();
        ctx.report_error(&Boom(1));

        ctx.record_if_absent(ErrorRecord::from_error(&Boom(1)));
        assert_eq!(ctx.errors().len(), 1);

        ctx.record_if_absent(ErrorRecord::from_error(&Boom(2)));
        assert_eq!(ctx.errors().len(), 2);
    }
}

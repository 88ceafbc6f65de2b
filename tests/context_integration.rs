//! Integration tests for context-aware validation and shared rule sets.
//!
//! Rule sets are built once and shared across concurrent validations; a
//! context only carries cancellation and deadlines into the rules that ask
//! for it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use weir::prelude::*;
use weir::rule::{each, length, required, with_context};
use weir::FaultKind;

// ============================================================================
// Helpers
// ============================================================================

/// A context-aware rule standing in for an external lookup.
fn lookup(calls: Arc<AtomicUsize>) -> impl Rule {
    with_context(move |ctx: &Context, v: &Value| {
        ctx.check()?;
        calls.fetch_add(1, Ordering::SeqCst);
        match v.as_str() {
            Some(s) if s.starts_with("user-") => Ok(()),
            _ => Err(RuleError::new("validation_unknown_user", "unknown user").into()),
        }
    })
}

fn profile(name: &str, owner: &str) -> Value {
    Value::from([
        ("Name", Value::from(name)),
        ("Owner", Value::from(owner)),
        ("Tags", Value::from(vec!["a", "bb"])),
    ])
}

fn profile_rule(calls: Arc<AtomicUsize>) -> MapRule {
    map(vec![
        key!("Name", required(), length(3, 16)),
        key!("Owner", required(), lookup(calls)),
        key!("Tags", each(rules![length(1, 2)])).optional(),
    ])
}

// ============================================================================
// Cancellation and deadlines
// ============================================================================

#[test]
fn cancelled_context_aborts_with_cancellation_fault() {
    let calls = Arc::new(AtomicUsize::new(0));
    let rule = profile_rule(Arc::clone(&calls));
    let ctx = Context::background();
    ctx.cancel();

    let err = validate_map(&profile("alice", "user-1"), &rule, Some(&ctx)).unwrap_err();
    assert_eq!(err.as_internal().map(|e| e.kind()), Some(FaultKind::Cancelled));
    assert_eq!(err.to_string(), "context canceled");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn expired_deadline_aborts_with_deadline_fault() {
    let rule = profile_rule(Arc::new(AtomicUsize::new(0)));
    let ctx = Context::with_deadline(Instant::now() - Duration::from_millis(1));

    let err = validate_map(&profile("alice", "user-1"), &rule, Some(&ctx)).unwrap_err();
    assert_eq!(
        err.as_internal().map(|e| e.kind()),
        Some(FaultKind::DeadlineExceeded)
    );
    assert_eq!(err.to_string(), "context deadline exceeded");
}

#[test]
fn live_context_reports_violations() {
    let calls = Arc::new(AtomicUsize::new(0));
    let rule = profile_rule(Arc::clone(&calls));
    let ctx = Context::with_timeout(Duration::from_secs(60));

    assert!(validate_map(&profile("alice", "user-1"), &rule, Some(&ctx)).is_ok());
    let err = validate_map(&profile("al", "bob"), &rule, Some(&ctx)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Name: the length must be between 3 and 16; Owner: unknown user."
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn child_context_shares_cancellation() {
    let parent = Context::background();
    let child = parent.child_with_deadline(Instant::now() + Duration::from_secs(60));
    let rule = profile_rule(Arc::new(AtomicUsize::new(0)));

    assert!(validate_map(&profile("alice", "user-1"), &rule, Some(&child)).is_ok());
    parent.cancel();
    let err = validate_map(&profile("alice", "user-1"), &rule, Some(&child)).unwrap_err();
    assert_eq!(err.as_internal().map(|e| e.kind()), Some(FaultKind::Cancelled));
}

// ============================================================================
// Shared rule sets across tasks
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_rule_set_across_tasks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let rule = Arc::new(profile_rule(Arc::clone(&calls)));

    let mut handles = Vec::new();
    for i in 0..32 {
        let rule = Arc::clone(&rule);
        handles.push(tokio::spawn(async move {
            let owner = if i % 2 == 0 { format!("user-{}", i) } else { format!("bot-{}", i) };
            let value = profile("alice", &owner);
            let ctx = Context::background();
            validate_map(&value, &rule, Some(&ctx)).map_err(|e| e.to_string())
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        if i % 2 == 0 {
            assert!(result.is_ok(), "task {} failed: {:?}", i, result);
        } else {
            assert_eq!(result.unwrap_err(), "Owner: unknown user.");
        }
    }
    assert_eq!(calls.load(Ordering::SeqCst), 32);
}

#[tokio::test]
async fn cancelling_one_context_does_not_affect_others() {
    let rule = Arc::new(profile_rule(Arc::new(AtomicUsize::new(0))));
    let cancelled = Context::background();
    cancelled.cancel();
    let live = Context::background();

    let a = {
        let rule = Arc::clone(&rule);
        tokio::spawn(async move { validate_map(&profile("alice", "user-1"), &rule, Some(&cancelled)) })
    };
    let b = {
        let rule = Arc::clone(&rule);
        tokio::spawn(async move { validate_map(&profile("alice", "user-1"), &rule, Some(&live)) })
    };

    assert!(a.await.unwrap().unwrap_err().is_internal());
    assert!(b.await.unwrap().is_ok());
}

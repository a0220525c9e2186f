//! Shared breaker behaviour across threads and tasks

use circuit_guard::test_utils::CallProbe;
use circuit_guard::{BreakerConfig, CircuitBreaker, ManualClock};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_concurrent_failures_open_exactly_once() {
    let clock = Arc::new(ManualClock::new());
    let config = BreakerConfig {
        failure_threshold: 10,
        cooldown: Duration::from_secs(60),
    };
    let breaker = Arc::new(CircuitBreaker::with_clock("shared", config, clock).unwrap());
    let probe = Arc::new(CallProbe::new());

    // Listeners run under the breaker lock, so the latch sees outcomes in order
    let opened = Arc::new(AtomicUsize::new(0));
    let was_broken = Arc::new(AtomicBool::new(false));
    let opened_counter = Arc::clone(&opened);
    breaker.on_failure(move |status| {
        if status.is_broken() && !was_broken.swap(true, Ordering::SeqCst) {
            opened_counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let breaker = Arc::clone(&breaker);
            let probe = Arc::clone(&probe);
            thread::spawn(move || {
                for _ in 0..50 {
                    breaker.guarded_call(|| probe.fail());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(breaker.is_broken());
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    // Failures of calls admitted before the circuit opened may land on the
    // broken state; those are recorded but not counted.
    assert_eq!(breaker.failure_count(), 10);

    let status = breaker.status();
    assert_eq!(status.calls.attempts, 400);
    assert_eq!(
        status.calls.successes + status.calls.failures + status.calls.rejections,
        400
    );
    assert_eq!(status.calls.failures, probe.failures());
}

#[test]
fn test_lock_is_not_held_while_operation_runs() {
    let breaker = Arc::new(CircuitBreaker::with_threshold(3, Duration::from_secs(1)).unwrap());
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let worker = {
        let breaker = Arc::clone(&breaker);
        thread::spawn(move || {
            breaker.guarded_call(|| {
                entered_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                Ok::<_, anyhow::Error>(())
            });
        })
    };

    entered_rx.recv().unwrap();

    // Inspection and other calls proceed while the first operation is blocked
    assert!(breaker.is_healthy());
    assert_eq!(breaker.failure_count(), 0);
    breaker.guarded_call(|| Err(anyhow::anyhow!("unrelated failure")));
    assert_eq!(breaker.failure_count(), 1);

    release_tx.send(()).unwrap();
    worker.join().unwrap();

    assert_eq!(breaker.status().calls.successes, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_calls_share_one_breaker() {
    let breaker = Arc::new(CircuitBreaker::with_threshold(5, Duration::from_secs(30)).unwrap());
    let ran_after_open = Arc::new(AtomicBool::new(false));

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let breaker = Arc::clone(&breaker);
        tasks.push(tokio::spawn(async move {
            breaker
                .attempt_async(|| async {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Err::<(), _>(anyhow::anyhow!("upstream timeout"))
                })
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert!(breaker.is_broken());

    let flag = Arc::clone(&ran_after_open);
    let outcome = breaker
        .attempt_async(|| async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(())
        })
        .await;

    assert!(outcome.is_rejected());
    assert!(!ran_after_open.load(Ordering::SeqCst));
}

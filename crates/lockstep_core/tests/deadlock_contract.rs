//! Documents the caller contract: a missing member deadlocks the team.
//!
//! There is no error to catch. The test gives the short-handed team a bounded
//! time to return, asserts that nobody did, and abandons the blocked threads.
//! They keep waiting until the test process exits, which is why this lives in
//! its own test binary.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use lockstep_core::{ParkingBarrier, Rendezvous, SpinBarrier, SpinPolicy};

const GRACE: Duration = Duration::from_millis(300);

/// Starts `callers` threads that each call `wait()` once; reports whether any returned.
fn any_caller_returns<B: Rendezvous + 'static>(barrier: Arc<B>, callers: usize) -> bool {
    let (returned_tx, returned_rx) = bounded(callers);

    for member in 0..callers {
        let barrier = Arc::clone(&barrier);
        let returned_tx = returned_tx.clone();
        std::thread::Builder::new()
            .name(format!("short-handed-{member}"))
            .spawn(move || {
                barrier.wait();
                let _ = returned_tx.send(member);
            })
            .unwrap();
    }

    match returned_rx.recv_timeout(GRACE) {
        Ok(_) => true,
        Err(RecvTimeoutError::Timeout) => false,
        Err(RecvTimeoutError::Disconnected) => panic!("caller thread died"),
    }
}

#[test]
fn test_three_of_four_spin_members_block_forever() {
    // Yield early so the abandoned spinners do not hog the test machine.
    let barrier = Arc::new(SpinBarrier::with_policy(4, SpinPolicy::yielding_after(16)));
    assert!(!any_caller_returns(Arc::clone(&barrier), 3));

    assert_eq!(barrier.arrived(), 3);
    assert_eq!(barrier.cycles(), 0);
}

#[test]
fn test_three_of_four_parked_members_block_forever() {
    let barrier = Arc::new(ParkingBarrier::new(4));
    assert!(!any_caller_returns(Arc::clone(&barrier), 3));

    assert_eq!(barrier.arrived(), 3);
    assert_eq!(barrier.cycles(), 0);
}

#[test]
fn test_full_team_returns_within_grace_period() {
    let barrier = Arc::new(SpinBarrier::new(4));
    assert!(any_caller_returns(Arc::clone(&barrier), 4));
}

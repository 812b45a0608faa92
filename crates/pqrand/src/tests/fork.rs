// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use serial_test::serial;

use crate::fork::{ForkMarker, simulate_fork};
use crate::source::SecureRandomSource;
use crate::support::test_utils::{MockEntropySource, MockEntropySourceBehaviour};
use crate::system::SystemEntropySource;

#[test]
#[serial(fork_generation)]
fn test_marker_is_stable_without_fork() {
    assert_eq!(ForkMarker::current(), ForkMarker::current());
    assert_ne!(ForkMarker::current(), ForkMarker::UNSET);
}

#[test]
#[serial(fork_generation)]
fn test_simulated_fork_changes_marker() {
    let before = ForkMarker::current();
    simulate_fork();
    let after = ForkMarker::current();

    assert_ne!(before, after);
}

#[test]
#[serial(fork_generation)]
fn test_duplicated_state_repeats_output_without_fork() {
    // Baseline for the fork tests below: a byte-for-byte copy of a seeded
    // generator reproduces the original's next output.
    let parent = SecureRandomSource::new(SystemEntropySource::new());
    let mut warmup = [0u8; 32];
    parent.fill(&mut warmup).expect("Failed to fill(..) (warmup)");

    let child = parent.duplicate_for_test();
    let mut parent_out = [0u8; 32];
    let mut child_out = [0u8; 32];
    parent.fill(&mut parent_out).expect("Failed to fill(..) (parent)");
    child.fill(&mut child_out).expect("Failed to fill(..) (child)");

    assert_eq!(parent_out, child_out);
}

#[test]
#[serial(fork_generation)]
fn test_simulated_fork_children_diverge() {
    let parent = SecureRandomSource::new(SystemEntropySource::new());
    let mut warmup = [0u8; 32];
    parent.fill(&mut warmup).expect("Failed to fill(..) (warmup)");

    // Two children holding the exact pre-fork state.
    let first_child = parent.duplicate_for_test();
    let second_child = parent.duplicate_for_test();
    simulate_fork();

    let mut first_out = [0u8; 32];
    let mut second_out = [0u8; 32];
    first_child.fill(&mut first_out).expect("Failed to fill(..) (first child)");
    second_child.fill(&mut second_out).expect("Failed to fill(..) (second child)");

    assert_ne!(first_out, second_out);
}

#[test]
#[serial(fork_generation)]
fn test_simulated_fork_forces_reseed() {
    let source = SecureRandomSource::new(MockEntropySource::new(MockEntropySourceBehaviour::None));
    let mut buf = [0u8; 16];

    source.fill(&mut buf).expect("Failed to fill(..) (#0)");
    source.fill(&mut buf).expect("Failed to fill(..) (#1)");
    assert_eq!(source.entropy().call_count(), 1);

    simulate_fork();

    source.fill(&mut buf).expect("Failed to fill(..) (#2)");
    assert_eq!(source.entropy().call_count(), 2);
    assert_eq!(source.bytes_since_reseed_for_test(), 16);
}

#[cfg(unix)]
mod unix {
    use core::time::Duration;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use crate::error::EntropyError;
    use crate::source::SecureRandomSource;
    use crate::system::SystemEntropySource;
    use crate::traits::EntropySource;

    const LEN: usize = 32;
    const CHILD_ALARM_SECS: libc::c_uint = 5;

    /// Entropy source whose reads take `delay`, like an OS pool that is not
    /// ready yet.
    struct SlowEntropy {
        delay: Duration,
        inner: SystemEntropySource,
    }

    impl EntropySource for SlowEntropy {
        fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
            thread::sleep(self.delay);
            self.inner.fill_bytes(dest)
        }
    }

    /// Forks; the child fills LEN bytes with `child_fill` and writes them to
    /// a pipe. A child that does not finish within CHILD_ALARM_SECS is killed
    /// by SIGALRM. Returns the child's bytes after reaping it.
    fn fill_in_forked_child(
        child_fill: impl Fn(&mut [u8]) -> Result<(), EntropyError>,
        parent_work: impl FnOnce(),
    ) -> [u8; LEN] {
        let mut fds = [0 as libc::c_int; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0, "Failed to pipe(..)");

        match unsafe { libc::fork() } {
            -1 => panic!("Failed to fork()"),
            0 => {
                // Child: no allocation, no unwinding.
                unsafe { libc::alarm(CHILD_ALARM_SECS) };

                let mut out = [0u8; LEN];
                let code = match child_fill(&mut out) {
                    Ok(()) => {
                        let written = unsafe {
                            libc::write(fds[1], out.as_ptr() as *const libc::c_void, LEN)
                        };
                        if written == LEN as isize { 0 } else { 1 }
                    }
                    Err(_) => 2,
                };

                unsafe { libc::_exit(code) };
            }
            child_pid => {
                unsafe { libc::close(fds[1]) };

                parent_work();

                let mut child_out = [0u8; LEN];
                let read = unsafe {
                    libc::read(fds[0], child_out.as_mut_ptr() as *mut libc::c_void, LEN)
                };

                let mut status: libc::c_int = 0;
                unsafe {
                    libc::waitpid(child_pid, &mut status, 0);
                    libc::close(fds[0]);
                }

                assert!(
                    libc::WIFEXITED(status),
                    "child did not exit normally (signal {})",
                    libc::WTERMSIG(status)
                );
                assert_eq!(libc::WEXITSTATUS(status), 0, "child failed to fill or write");
                assert_eq!(read, LEN as isize, "short read from child");

                child_out
            }
        }
    }

    #[test]
    fn test_forked_child_does_not_repeat_parent_stream() {
        let source = SecureRandomSource::new(SystemEntropySource::new());
        let mut warmup = [0u8; LEN];
        source.fill(&mut warmup).expect("Failed to fill(..) (warmup)");

        // Without reseeding, the child would output exactly what the parent
        // outputs next.
        let mut parent_out = [0u8; LEN];
        let child_out = fill_in_forked_child(
            |out| source.fill(out),
            || {
                source.fill(&mut parent_out).expect("Failed to fill(..) (parent)");
            },
        );

        assert_ne!(child_out, parent_out);
    }

    #[test]
    fn test_sibling_children_do_not_share_a_stream() {
        let source = SecureRandomSource::new(SystemEntropySource::new());
        let mut warmup = [0u8; LEN];
        source.fill(&mut warmup).expect("Failed to fill(..) (warmup)");

        let first = fill_in_forked_child(|out| source.fill(out), || {});
        let second = fill_in_forked_child(|out| source.fill(out), || {});

        assert_ne!(first, second);
    }

    #[test]
    fn test_fork_during_slow_reseed_does_not_block_child() {
        let source = SecureRandomSource::new(SlowEntropy {
            delay: Duration::from_millis(500),
            inner: SystemEntropySource::new(),
        });

        thread::scope(|scope| {
            let reseeding = scope.spawn(|| {
                let mut buf = [0u8; LEN];
                source.fill(&mut buf).expect("Failed to fill(..) (reseeding thread)");
            });

            // Fork while the other thread is inside the 500 ms seed read.
            thread::sleep(Duration::from_millis(100));
            let child_out = fill_in_forked_child(|out| source.fill(out), || {});

            assert!(child_out.iter().any(|b| *b != 0));
            reseeding.join().expect("Failed to join()");
        });
    }

    /// Sets the flag on drop, so a failing assertion still stops the busy
    /// thread before `thread::scope` joins it.
    struct StopOnDrop<'a>(&'a AtomicBool);

    impl Drop for StopOnDrop<'_> {
        fn drop(&mut self) {
            self.0.store(true, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_fork_while_global_is_busy_does_not_block_child() {
        let stop = AtomicBool::new(false);

        thread::scope(|scope| {
            let stop_guard = StopOnDrop(&stop);
            let busy = scope.spawn(|| {
                let mut buf = vec![0u8; 64 * 1024];
                while !stop.load(Ordering::Relaxed) {
                    crate::fill(&mut buf).expect("Failed to fill(..) (busy thread)");
                }
            });

            for _ in 0..20 {
                let child_out = fill_in_forked_child(|out| crate::fill(out), || {});
                assert!(child_out.iter().any(|b| *b != 0));
            }

            drop(stop_guard);
            busy.join().expect("Failed to join()");
        });
    }
}

// barrier.rs - Generation barrier shared by the coordinator and its workers

use parking_lot::{Condvar, Mutex};

use crate::partition::Block;

/// What a parked worker is told to do when released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Advance { generation: u64 },
    Halt,
}

/// A block update that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fault {
    pub block: Block,
    pub generation: u64,
    pub reason: String,
}

#[derive(Debug)]
struct State {
    epoch: u64,          // bumped once per release
    signal: Signal,
    remaining: usize,    // workers yet to report in this epoch
    faults: Vec<Fault>,
}

/// Release/completion barrier for one coordinator and a fixed set of workers.
///
/// The coordinator releases every worker at once by bumping the epoch, then
/// sleeps until all of them have reported. Workers sleep on the condition
/// variable between generations, they never spin. A halt is just a release
/// carrying [`Signal::Halt`], so shutting down or aborting after a fault
/// wakes every parked worker.
#[derive(Debug)]
pub(crate) struct GenerationBarrier {
    parties: usize,
    state: Mutex<State>,
    released: Condvar,
    finished: Condvar,
}

impl GenerationBarrier {
    pub fn new(parties: usize) -> Self {
        Self {
            parties,
            state: Mutex::new(State {
                epoch: 0,
                signal: Signal::Halt,
                remaining: 0,
                faults: Vec::new(),
            }),
            released: Condvar::new(),
            finished: Condvar::new(),
        }
    }

    /// Coordinator side: releases all workers for `generation` and blocks
    /// until every one has reported. Returns the faults reported, if any.
    pub fn advance(&self, generation: u64) -> Vec<Fault> {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.signal = Signal::Advance { generation };
        state.remaining = self.parties;
        state.faults.clear();
        self.released.notify_all();

        while state.remaining > 0 {
            self.finished.wait(&mut state);
        }
        std::mem::take(&mut state.faults)
    }

    /// Coordinator side: releases all workers with a halt signal.
    pub fn halt(&self) {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.signal = Signal::Halt;
        state.remaining = 0;
        self.released.notify_all();
    }

    /// Worker side: parks until the epoch moves past `seen`.
    pub fn wait_for_signal(&self, seen: &mut u64) -> Signal {
        let mut state = self.state.lock();
        while state.epoch == *seen {
            self.released.wait(&mut state);
        }
        *seen = state.epoch;
        state.signal
    }

    /// Worker side: reports completion of the current generation.
    pub fn report(&self, fault: Option<Fault>) {
        let mut state = self.state.lock();
        if let Some(fault) = fault {
            state.faults.push(fault);
        }
        state.remaining = state.remaining.saturating_sub(1);
        if state.remaining == 0 {
            self.finished.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn advance_waits_for_every_worker() {
        let parties = 4;
        let barrier = Arc::new(GenerationBarrier::new(parties));
        let work = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..parties)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                let work = Arc::clone(&work);
                thread::spawn(move || {
                    let mut seen = 0;
                    let mut rounds = 0;
                    while let Signal::Advance { .. } = barrier.wait_for_signal(&mut seen) {
                        work.fetch_add(1, Ordering::SeqCst);
                        rounds += 1;
                        barrier.report(None);
                    }
                    rounds
                })
            })
            .collect();

        for generation in 1..=3 {
            assert!(barrier.advance(generation).is_empty());
            assert_eq!(work.load(Ordering::SeqCst), parties * generation as usize);
        }
        barrier.halt();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 3);
        }
    }

    #[test]
    fn faults_are_returned_to_the_coordinator() {
        let barrier = Arc::new(GenerationBarrier::new(1));
        let worker = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut seen = 0;
                while let Signal::Advance { generation } = barrier.wait_for_signal(&mut seen) {
                    let block = Block {
                        row: 0,
                        col: 0,
                        index: 0,
                        row_offset: 0,
                        col_offset: 0,
                        rows: 1,
                        cols: 1,
                    };
                    barrier.report(Some(Fault { block, generation, reason: "bad".into() }));
                }
            })
        };

        let faults = barrier.advance(5);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].generation, 5);

        barrier.halt();
        worker.join().unwrap();
    }

    #[test]
    fn halt_releases_parked_workers_without_an_advance() {
        let barrier = Arc::new(GenerationBarrier::new(3));
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut seen = 0;
                    barrier.wait_for_signal(&mut seen)
                })
            })
            .collect();

        barrier.halt();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Signal::Halt);
        }
    }
}

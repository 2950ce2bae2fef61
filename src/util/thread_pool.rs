use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use crossbeam::channel::{Receiver, Sender};
use log::{error, trace};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Number of submitted tasks that did not finish yet, with a condition variable that is signalled
/// whenever it drops to zero.
#[derive(Default)]
struct Outstanding {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Outstanding {
    fn lock(&self) -> MutexGuard<'_, usize> {
        // tasks run outside of the lock, a poisoned counter is still consistent
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish_one(&self) {
        let mut count = self.lock();
        *count -= 1;
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// A fixed set of worker threads pulling boxed tasks from one shared FIFO channel.
pub struct ThreadPool {
    sender: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    outstanding: Arc<Outstanding>,
}

impl ThreadPool {
    pub fn new(size: usize) -> std::io::Result<Self> {
        let size = size.max(1);
        let (sender, receiver) = crossbeam::channel::unbounded::<Task>();
        let outstanding = Arc::new(Outstanding::default());

        let workers = (0..size)
            .map(|index| {
                let receiver = receiver.clone();
                let outstanding = outstanding.clone();
                std::thread::Builder::new()
                    .name(format!("umbra-worker-{}", index))
                    .spawn(move || worker_loop(receiver, outstanding))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        trace!("Started thread pool with {} workers", size);
        Ok(Self {
            sender: Some(sender),
            workers,
            outstanding,
        })
    }

    /// One worker per hardware thread.
    pub fn with_available_parallelism() -> std::io::Result<Self> {
        let size = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::new(size)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn submit<F: FnOnce() + Send + 'static>(&self, task: F) {
        let Some(sender) = &self.sender else {
            return;
        };

        *self.outstanding.lock() += 1;
        if sender.send(Box::new(task)).is_err() {
            // every worker is gone, nobody is going to run it
            self.outstanding.finish_one();
            error!("Thread pool has no workers left, dropping a task");
        }
    }

    /// Blocks until every task submitted so far has run.
    pub fn wait(&self) {
        let mut count = self.outstanding.lock();
        while *count > 0 {
            count = self
                .outstanding
                .idle
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // closing the channel ends the workers once the queue ran empty
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("A thread pool worker panicked outside of a task");
            }
        }
    }
}

fn worker_loop(receiver: Receiver<Task>, outstanding: Arc<Outstanding>) {
    while let Ok(task) = receiver.recv() {
        if catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!("A thread pool task panicked");
        }
        outstanding.finish_one();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::ThreadPool;

    #[test_log::test]
    fn wait_returns_after_all_tasks_ran_once() -> Result<(), anyhow::Error> {
        let pool = ThreadPool::new(4)?;
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..8 {
            let counter = counter.clone();
            pool.submit(move || {
                std::thread::sleep(Duration::from_millis(5));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        pool.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 8);
        Ok(())
    }

    #[test_log::test]
    fn wait_without_tasks_returns() -> Result<(), anyhow::Error> {
        let pool = ThreadPool::new(2)?;
        pool.wait();
        assert_eq!(pool.size(), 2);
        assert_eq!(ThreadPool::new(0)?.size(), 1);
        Ok(())
    }

    #[test_log::test]
    fn panicking_task_does_not_block_wait() -> Result<(), anyhow::Error> {
        let pool = ThreadPool::new(1)?;
        let counter = Arc::new(AtomicUsize::new(0));
        pool.submit(|| panic!("task failure"));
        let after = counter.clone();
        pool.submit(move || {
            after.fetch_add(1, Ordering::SeqCst);
        });

        pool.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test_log::test]
    fn pool_is_reusable_and_drains_on_drop() -> Result<(), anyhow::Error> {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = ThreadPool::new(3)?;
            for round in 1..=2 {
                for _ in 0..5 {
                    let counter = counter.clone();
                    pool.submit(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    });
                }
                pool.wait();
                assert_eq!(counter.load(Ordering::SeqCst), round * 5);
            }

            for _ in 0..5 {
                let counter = counter.clone();
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 15);
        Ok(())
    }
}

//! Background jobs polled from the GUI thread.
//!
//! Each job runs on its own thread with a current-thread tokio runtime and reports
//! back through a channel that the frame loop polls without blocking.

use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tokio::runtime::Builder;

pub struct AsyncJob<T> {
    receiver: Option<Receiver<Result<T>>>,
}

impl<T: Send + 'static> AsyncJob<T> {
    /// Run the future built by `builder` on a fresh worker thread.
    ///
    /// The future itself need not be `Send`; only the builder crosses threads.
    pub fn spawn<FutBuilder, Fut>(builder: FutBuilder) -> Self
    where
        FutBuilder: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(builder()),
                Err(e) => Err(anyhow!("Failed to create async runtime: {}", e)),
            };
            let _ = tx.send(result);
        });
        Self::new(rx)
    }
}

impl<T> AsyncJob<T> {
    pub fn new(receiver: Receiver<Result<T>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Returns Some(result) once the job has finished, None while it is still running
    pub fn poll(&mut self) -> Option<Result<T>> {
        let rx = self.receiver.as_ref()?;
        match rx.try_recv() {
            Ok(res) => {
                self.receiver = None;
                Some(res)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                Some(Err(anyhow!("Worker task disconnected")))
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait<T>(job: &mut AsyncJob<T>) -> Result<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(res) = job.poll() {
                return res;
            }
            assert!(Instant::now() < deadline, "job did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_spawned_job_delivers_result() {
        let mut job = AsyncJob::spawn(|| async { Ok(21 * 2) });
        assert_eq!(wait(&mut job).unwrap(), 42);
        assert!(!job.is_running());
        assert!(job.poll().is_none());
    }

    #[test]
    fn test_spawned_job_delivers_error() {
        let mut job: AsyncJob<()> = AsyncJob::spawn(|| async { Err(anyhow!("boom")) });
        assert_eq!(wait(&mut job).unwrap_err().to_string(), "boom");
    }

    #[test]
    fn test_dropped_sender_reports_disconnect() {
        let (tx, rx) = mpsc::channel::<Result<()>>();
        drop(tx);
        let mut job = AsyncJob::new(rx);
        assert!(job.is_running());
        assert!(job.poll().unwrap().is_err());
        assert!(!job.is_running());
    }
}

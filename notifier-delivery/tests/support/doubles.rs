//! In-process stand-ins for the transport and the sleeper

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use notifier_common::Signal;
use notifier_delivery::{Message, Sleeper, Transport, TransportError, TransportResponse};
use tokio::sync::broadcast;

/// One scripted answer from [`ScriptedTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Status(u16),
    ConnectionRefused,
}

/// Plays back scripted answers, then repeats `fallback` forever.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    attempts: AtomicUsize,
    subjects: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Step>, fallback: Step) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            attempts: AtomicUsize::new(0),
            subjects: Mutex::new(Vec::new()),
        }
    }

    /// `times` copies of `step`, followed by `then` forever.
    pub fn repeat(step: Step, times: usize, then: Step) -> Self {
        Self::new(std::iter::repeat_n(step, times), then)
    }

    pub fn always(step: Step) -> Self {
        Self::new([], step)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Subjects of every message submitted, in order.
    pub fn subjects(&self) -> Vec<String> {
        self.subjects.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, message: &Message) -> Result<TransportResponse, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.subjects
            .lock()
            .unwrap()
            .push(message.subject().to_string());

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        match step {
            Step::Status(status) => Ok(TransportResponse {
                status,
                body: format!("status {status}"),
            }),
            Step::ConnectionRefused => Err(TransportError::ConnectionFailed(
                "Connection refused".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Records every requested delay and returns immediately.
///
/// Optionally broadcasts [`Signal::Shutdown`] once a given number of waits
/// has been recorded, which is the only way to end a sequence that never
/// succeeds.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
    shutdown_after: Option<(usize, broadcast::Sender<Signal>)>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown_after(waits: usize, sender: broadcast::Sender<Signal>) -> Self {
        Self {
            delays: Mutex::new(Vec::new()),
            shutdown_after: Some((waits, sender)),
        }
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        let waits = {
            let mut delays = self.delays.lock().unwrap();
            delays.push(delay);
            delays.len()
        };

        if let Some((limit, sender)) = &self.shutdown_after {
            if waits == *limit {
                let _ = sender.send(Signal::Shutdown);
            }
        }
    }
}

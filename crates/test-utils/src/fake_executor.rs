use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use buildagent::exec::{ExecFailure, ExecOutcome, ProcessExecutor, ProcessOutput, ProcessSpec};
use buildagent::types::BoxFuture;

/// What the fake executor observed, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecEvent {
    Started(String),
    Finished(String),
}

/// A fake executor that:
/// - records every spec it was asked to run
/// - records start/finish events keyed by `program args...`
/// - succeeds with exit code 0 unless the program was marked as failing
/// - optionally sleeps per program, so tests can observe overlap.
#[derive(Clone, Default)]
pub struct FakeProcessExecutor {
    specs: Arc<Mutex<Vec<ProcessSpec>>>,
    events: Arc<Mutex<Vec<ExecEvent>>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl FakeProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every run of `program` exits with status 1.
    pub fn failing(mut self, program: &str) -> Self {
        self.failing.insert(program.to_string());
        self
    }

    /// Every run of `program` takes `delay` before finishing.
    pub fn delay(mut self, program: &str, delay: Duration) -> Self {
        self.delays.insert(program.to_string(), delay);
        self
    }

    pub fn specs(&self) -> Vec<ProcessSpec> {
        self.specs.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<ExecEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Keys of started executions, in start order.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ExecEvent::Started(key) => Some(key),
                ExecEvent::Finished(_) => None,
            })
            .collect()
    }

    pub fn key(spec: &ProcessSpec) -> String {
        std::iter::once(spec.program.as_str())
            .chain(spec.arguments.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ProcessExecutor for FakeProcessExecutor {
    fn execute<'a>(&'a self, spec: ProcessSpec) -> BoxFuture<'a, ExecOutcome> {
        Box::pin(async move {
            let key = Self::key(&spec);
            self.specs.lock().unwrap().push(spec.clone());
            self.events.lock().unwrap().push(ExecEvent::Started(key.clone()));

            if let Some(delay) = self.delays.get(&spec.program) {
                tokio::time::sleep(*delay).await;
            }

            self.events.lock().unwrap().push(ExecEvent::Finished(key));

            if self.failing.contains(&spec.program) {
                return Err(ExecFailure::NonZeroExit {
                    program: spec.program.clone(),
                    code: 1,
                    output: ProcessOutput {
                        exit_code: 1,
                        ..ProcessOutput::default()
                    },
                });
            }

            Ok(ProcessOutput::default())
        })
    }
}

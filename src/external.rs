//! Wrapper around a command-line aligner speaking tabular BLAST output.
//!
//! Queries are streamed to the child's stdin by a writer thread as
//! `>` records, one sequence per line. A reader thread parses hit blocks from
//! stdout and forwards them over a bounded channel, closing with an explicit
//! end message. Both threads are joined and the exit status checked before
//! any result is returned; on failure partial results are dropped.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;

use crate::btop::{HitBlocks, HitRecord};
use crate::error::{AlignError, Result};
use crate::traits::BioSequence;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

fn default_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAlignerConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Hit blocks buffered between the reader thread and the caller.
    #[serde(default = "default_capacity")]
    pub channel_capacity: usize,
}

impl ExternalAlignerConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

enum Message {
    Block(Vec<HitRecord>),
    Failed(AlignError),
    End,
}

fn process_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(AlignError::Process(msg.into()))
}

pub struct ExternalAligner {
    config: ExternalAlignerConfig,
}

impl ExternalAligner {
    pub fn new(config: ExternalAlignerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExternalAlignerConfig {
        &self.config
    }

    fn spawn(&self) -> Result<Child> {
        Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AlignError::Process(format!("cannot start {}: {e}", self.config.program)))
    }

    /// Runs the aligner over `queries`; one hit block per query, in order.
    pub fn run<S: BioSequence>(&self, queries: &[S]) -> Result<Vec<Vec<HitRecord>>> {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!("external_aligner", program = %self.config.program, queries = queries.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut child = self.spawn()?;
        let (Some(stdin), Some(stdout), Some(mut stderr)) = (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            return process_error("child process pipes unavailable");
        };
        let (sender, receiver): (Sender<Message>, Receiver<Message>) = bounded(self.config.channel_capacity);

        let (collected, written, diagnostics) = thread::scope(|scope| {
            let writer = scope.spawn(move || -> std::io::Result<()> {
                let mut out = BufWriter::new(stdin);
                for (i, query) in queries.iter().enumerate() {
                    writeln!(out, ">{i}")?;
                    writeln!(out, "{query}")?;
                }
                out.flush()
                // stdin dropped here: end of input for the child
            });
            scope.spawn(move || reader_thread(stdout, sender));
            let diagnostics = scope.spawn(move || {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text);
                text
            });

            let mut blocks = Vec::with_capacity(queries.len());
            let mut failure = None;
            for message in receiver.iter() {
                match message {
                    Message::Block(block) => blocks.push(block),
                    Message::Failed(e) => {
                        failure = Some(e);
                        break;
                    }
                    Message::End => break,
                }
            }
            // Unblock the reader if we stopped early.
            drop(receiver);
            let written = writer.join();
            let diagnostics = diagnostics.join().unwrap_or_default();
            (failure.map_or(Ok(blocks), Err), written, diagnostics)
        });

        let status = child.wait()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(status = ?status.code(), "external aligner exited");
        if !status.success() {
            #[cfg(feature = "tracing")]
            tracing::warn!(stderr = %diagnostics.trim(), "external aligner failed");
            return process_error(format!(
                "{} exited with {status}: {}",
                self.config.program,
                diagnostics.trim()
            ));
        }
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return process_error(format!("writing queries failed: {e}")),
            Err(_) => return process_error("query writer panicked"),
        }
        let blocks = collected?;
        if blocks.len() != queries.len() {
            return process_error(format!(
                "output closed after {} of {} queries",
                blocks.len(),
                queries.len()
            ));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(blocks = blocks.len(), hits = blocks.iter().map(Vec::len).sum::<usize>(), "hit blocks parsed");
        Ok(blocks)
    }
}

fn reader_thread<R: Read>(stdout: R, sender: Sender<Message>) {
    for block in HitBlocks::new(BufReader::new(stdout)) {
        let message = match block {
            Ok(block) => Message::Block(block),
            Err(e) => {
                let _ = sender.send(Message::Failed(e));
                return;
            }
        };
        if sender.send(message).is_err() {
            return;
        }
    }
    let _ = sender.send(Message::End);
}

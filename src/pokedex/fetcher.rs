//! Background lookup worker
//!
//! Lookups block on the network, so they run on a dedicated thread. The UI
//! loop sends jobs and drains completions without ever waiting.

use super::{fetch_random_subject, LookupError, PokemonLookup, RetryPolicy, Subject};
use crate::game::RoundToken;

use std::io;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;

/// Work for the fetcher thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    /// Load the distractor name listing
    Catalog,
    /// Find a random usable subject for a round
    Subject(RoundToken),
}

/// Result of a job
#[derive(Debug)]
pub enum Completion {
    Catalog(Result<Vec<String>, LookupError>),
    Subject {
        token: RoundToken,
        result: Result<Subject, LookupError>,
    },
}

/// Settings the worker needs for its lookups
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    /// Ids are drawn from `1..=roster_size`, which is also the listing size
    pub roster_size: u32,
    pub retry: RetryPolicy,
}

/// Handle to the lookup worker thread
pub struct Fetcher {
    tx: Sender<Job>,
    rx: Receiver<Completion>,
    alive: bool,
}

impl Fetcher {
    /// Start the worker. It stops when the handle is dropped.
    pub fn spawn<L>(lookup: L, settings: FetchSettings) -> io::Result<Self>
    where
        L: PokemonLookup + 'static,
    {
        let (job_tx, job_rx) = channel::<Job>();
        let (done_tx, done_rx) = channel::<Completion>();

        thread::Builder::new()
            .name("fetcher".to_string())
            .spawn(move || {
                let mut rng = rand::rng();
                while let Ok(job) = job_rx.recv() {
                    let completion = match job {
                        Job::Catalog => {
                            Completion::Catalog(lookup.list_names(settings.roster_size))
                        }
                        Job::Subject(token) => {
                            let result = fetch_random_subject(
                                &lookup,
                                settings.roster_size,
                                settings.retry,
                                &mut rng,
                                thread::sleep,
                            );
                            Completion::Subject { token, result }
                        }
                    };
                    if done_tx.send(completion).is_err() {
                        break;
                    }
                }
                tracing::debug!("Fetcher stopped");
            })?;

        Ok(Fetcher {
            tx: job_tx,
            rx: done_rx,
            alive: true,
        })
    }

    /// Ask for the name listing
    pub fn request_catalog(&mut self) {
        self.send(Job::Catalog);
    }

    /// Ask for a subject on behalf of round `token`
    pub fn request_subject(&mut self, token: RoundToken) {
        self.send(Job::Subject(token));
    }

    fn send(&mut self, job: Job) {
        if self.tx.send(job).is_err() {
            tracing::error!("Fetcher thread is gone, dropping {job:?}");
            self.alive = false;
        }
    }

    /// Try to receive one completion (non-blocking)
    pub fn try_recv(&mut self) -> Option<Completion> {
        match self.rx.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.alive = false;
                None
            }
        }
    }

    /// Receive every pending completion
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        while let Some(completion) = self.try_recv() {
            completions.push(completion);
        }
        completions
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

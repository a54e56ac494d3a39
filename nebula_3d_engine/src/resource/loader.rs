/// Background file reads for the resource manager
///
/// Loader threads only fetch bytes; decoding and every state change happen
/// on the thread calling `ResourceManager::update()`. With zero threads the
/// reads run inline during `poll()`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crate::error::{Error, Result};
use crate::file_system::FileSystem;
use crate::resource::{ResourceKey, ResourcePath};

pub(crate) struct LoadRequest {
    pub key: ResourceKey,
    pub ticket: u32,
    pub path: ResourcePath,
}

pub(crate) struct LoadCompletion {
    pub key: ResourceKey,
    pub ticket: u32,
    pub path: ResourcePath,
    pub result: Result<Vec<u8>>,
}

impl LoadRequest {
    fn execute(self, file_system: &dyn FileSystem) -> LoadCompletion {
        let result = file_system.read(&self.path);
        LoadCompletion {
            key: self.key,
            ticket: self.ticket,
            path: self.path,
            result,
        }
    }
}

pub(crate) struct Loader {
    file_system: Arc<dyn FileSystem>,
    requests: Option<Sender<LoadRequest>>,
    completions: Option<Receiver<LoadCompletion>>,
    inline_queue: VecDeque<LoadRequest>,
    workers: Vec<JoinHandle<()>>,
    pending: usize,
}

impl Loader {
    pub fn new(file_system: Arc<dyn FileSystem>, thread_count: usize) -> Result<Self> {
        let mut loader = Self {
            file_system,
            requests: None,
            completions: None,
            inline_queue: VecDeque::new(),
            workers: Vec::with_capacity(thread_count),
            pending: 0,
        };
        if thread_count == 0 {
            return Ok(loader);
        }

        let (request_tx, request_rx) = unbounded::<LoadRequest>();
        let (completion_tx, completion_rx) = unbounded::<LoadCompletion>();

        for i in 0..thread_count {
            let requests = request_rx.clone();
            let completions = completion_tx.clone();
            let file_system = loader.file_system.clone();

            let worker = std::thread::Builder::new()
                .name(format!("nebula3d-loader-{}", i))
                .spawn(move || {
                    for request in requests.iter() {
                        crate::engine_trace!("nebula3d::Loader", "Reading {}", request.path);
                        if completions.send(request.execute(&*file_system)).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|e| Error::InitializationFailed(format!("Cannot spawn loader thread {}: {}", i, e)))?;
            loader.workers.push(worker);
        }

        loader.requests = Some(request_tx);
        loader.completions = Some(completion_rx);
        Ok(loader)
    }

    /// Queue a read
    pub fn request(&mut self, request: LoadRequest) {
        self.pending += 1;
        let request = match &self.requests {
            Some(sender) => match sender.send(request) {
                Ok(()) => return,
                Err(failed) => failed.0,
            },
            None => request,
        };
        self.inline_queue.push_back(request);
    }

    /// Collect finished reads without blocking
    pub fn poll(&mut self) -> Vec<LoadCompletion> {
        let mut done = Vec::new();
        while let Some(request) = self.inline_queue.pop_front() {
            done.push(request.execute(&*self.file_system));
        }
        if let Some(receiver) = &self.completions {
            done.extend(receiver.try_iter());
        }
        self.pending -= done.len();
        done
    }

    /// Block until at least one read finishes (or nothing is in flight)
    pub fn wait(&mut self) -> Vec<LoadCompletion> {
        if self.pending == 0 || !self.inline_queue.is_empty() {
            return self.poll();
        }
        let first = match &self.completions {
            Some(receiver) => receiver.recv().ok(),
            None => None,
        };
        match first {
            Some(first) => {
                self.pending -= 1;
                let mut done = vec![first];
                done.extend(self.poll());
                done
            }
            None => {
                crate::engine_error!("nebula3d::Loader", "Loader threads are gone, dropping {} pending reads", self.pending);
                self.pending = 0;
                Vec::new()
            }
        }
    }

    /// Reads queued or in flight
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        // Closing both channels ends the worker loops
        self.requests = None;
        self.completions = None;
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

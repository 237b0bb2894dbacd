//! Background analysis.
//!
//! Each ticket is decoded and analyzed on its own thread. Results come back
//! over a channel and the host commits them with
//! [`Engine::analysis_completed`](crate::engine::Engine::analysis_completed),
//! which drops anything superseded in the meantime.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use image::RgbaImage;

use crate::config::AnalysisConfig;
use crate::engine::{AnalysisTicket, Completion};
use crate::error::{AnalysisError, ConfigError};
use crate::pipeline::analyze;
use crate::pipeline::extract::load_image;
use crate::pipeline::sample::Raster;

#[derive(Debug)]
pub struct AnalysisWorker {
    config: AnalysisConfig,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl AnalysisWorker {
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (tx, rx) = mpsc::channel();
        Ok(Self { config, tx, rx })
    }

    /// Decode with `decode` and analyze on a background thread.
    ///
    /// Exactly one [`Completion`] is sent per ticket, also when `decode` or
    /// the analysis panics.
    pub fn submit<F>(&self, ticket: AnalysisTicket, decode: F)
    where
        F: FnOnce() -> Result<RgbaImage, AnalysisError> + Send + 'static,
    {
        let tx = self.tx.clone();
        let config = self.config;
        let generation = ticket.generation;
        thread::spawn(move || {
            let run = || decode().and_then(|image| analyze(&Raster::from_image(&image), &config));
            let result = panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|_| {
                tracing::warn!(generation, "image analysis panicked");
                Err(AnalysisError::DecodeUnavailable(
                    "image analysis panicked".to_string(),
                ))
            });
            // the receiver lives as long as the worker; a send error only means the host is gone
            if tx.send(Completion { generation, result }).is_err() {
                tracing::debug!(generation, "worker dropped before analysis finished");
            }
        });
    }

    /// Analyze the image file at `path`.
    pub fn submit_path(&self, ticket: AnalysisTicket, path: PathBuf) {
        self.submit(ticket, move || load_image(&path));
    }

    /// Wait up to `timeout`; `None` if nothing finished in time.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Finished analyses that are already waiting.
    pub fn drain(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }
}

//! Line-driven interactive session over the engine.
//!
//! One command per line:
//!
//! ```text
//! image <path>   analyze a new image in the background
//! clear          drop the current image
//! shuffle        next palette background (turns auto on)
//! auto           toggle auto mode
//! bg <hex>       set the background by hand (turns auto off)
//! fg <hex>       set the foreground by hand (turns auto off)
//! wait           block until the current image is analyzed
//! show           print the current theme
//! quit           end the session
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::color::Color;
use crate::config::EngineConfig;
use crate::engine::{Engine, ImageRef, Phase, Side};
use crate::error::ConfigError;
use crate::theme::CardTheme;
use crate::worker::AnalysisWorker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Image(PathBuf),
    Clear,
    Shuffle,
    Auto,
    Manual(Side, Color),
    Wait,
    Show,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(v, r)| (v, r.trim()));
        let color = |side| -> Result<Command> {
            let color = Color::from_hex(rest).with_context(|| format!("bad color {rest:?}"))?;
            Ok(Command::Manual(side, color))
        };
        match verb {
            "image" if !rest.is_empty() => Ok(Command::Image(PathBuf::from(rest))),
            "image" => bail!("usage: image <path>"),
            "clear" => Ok(Command::Clear),
            "shuffle" | "regenerate" => Ok(Command::Shuffle),
            "auto" => Ok(Command::Auto),
            "bg" => color(Side::Background),
            "fg" => color(Side::Foreground),
            "wait" => Ok(Command::Wait),
            "show" => Ok(Command::Show),
            "quit" | "exit" => Ok(Command::Quit),
            other => bail!("unknown command {other:?}"),
        }
    }
}

/// Upper bound on a single `wait` for a pending analysis.
const WAIT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Session {
    engine: Engine,
    worker: AnalysisWorker,
}

impl Session {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            worker: AnalysisWorker::new(config.analysis)?,
            engine: Engine::new(config)?,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Process commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    writeln!(out, "error: {e:#}")?;
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            self.execute(command, out)?;
        }
        Ok(())
    }

    /// Run one command and print the resulting state.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        self.commit_finished();
        match command {
            Command::Image(path) => {
                match self.engine.image_changed(ImageRef::from(path.as_path())) {
                    Some(ticket) => {
                        writeln!(
                            out,
                            "analyzing {} (generation {})",
                            path.display(),
                            ticket.generation
                        )?;
                        self.worker.submit_path(ticket, path);
                    }
                    None => writeln!(out, "image unchanged")?,
                }
                return Ok(());
            }
            Command::Clear => self.engine.image_cleared(),
            Command::Shuffle => {
                if let Err(e) = self.engine.regenerate() {
                    writeln!(out, "error: {e}")?;
                    return Ok(());
                }
            }
            Command::Auto => {
                self.engine.toggle_auto();
            }
            Command::Manual(side, color) => {
                if self.engine.auto_mode() {
                    self.engine.toggle_auto();
                }
                self.engine.set_manual_color(side, color)?;
            }
            Command::Wait => self.wait(out)?,
            Command::Show | Command::Quit => {}
        }
        self.show(out)
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        let snapshot = self.engine.snapshot();
        if snapshot.phase == Phase::Analyzing {
            writeln!(out, "(analysis of generation {} pending)", snapshot.generation)?;
        }
        if let Some(err) = self.engine.last_error() {
            writeln!(out, "(last analysis failed: {err})")?;
        }
        out.write_all(CardTheme::from_snapshot(&snapshot).serialize().as_bytes())?;
        Ok(())
    }

    fn commit_finished(&mut self) {
        for completion in self.worker.drain() {
            self.engine.analysis_completed(completion);
        }
    }

    fn wait<W: Write>(&mut self, out: &mut W) -> Result<()> {
        while self.engine.phase() == Phase::Analyzing {
            match self.worker.recv_timeout(WAIT_TIMEOUT) {
                Some(completion) => {
                    self.engine.analysis_completed(completion);
                }
                None => {
                    writeln!(
                        out,
                        "gave up waiting after {}s; analysis still pending",
                        WAIT_TIMEOUT.as_secs()
                    )?;
                    break;
                }
            }
        }
        Ok(())
    }
}

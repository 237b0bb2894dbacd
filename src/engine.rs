//! Selection state machine.
//!
//! [`Engine`] owns the palette, rotation index, auto/manual mode and the
//! analysis generation. Every change goes through one of its transition
//! methods; analysis itself runs elsewhere and reports back with the
//! generation it was started for, so late results for a replaced image are
//! dropped instead of overwriting newer state.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::color::Color;
use crate::config::EngineConfig;
use crate::error::{AnalysisError, ConfigError, TransitionError};
use crate::pipeline::rank::Palette;
use crate::pipeline::select::{select_pair, ColorPair, DEFAULT_PAIR};

/// Monotonic counter tagging one image-analysis pass.
pub type Generation = u64;

/// Logical identity of an image, used to tell a new image from the current one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&Path> for ImageRef {
    fn from(path: &Path) -> Self {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self(canonical.display().to_string())
    }
}

impl From<&str> for ImageRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Analyzing,
    Ready,
}

/// Which side of the pair a manual color applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Background,
    Foreground,
}

/// Work order handed out by [`Engine::image_changed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub generation: Generation,
    pub image: ImageRef,
}

/// Result of a finished analysis, tagged with the generation it ran for.
#[derive(Debug, Clone)]
pub struct Completion {
    pub generation: Generation,
    pub result: Result<Palette, AnalysisError>,
}

/// What the host needs to render after a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub generation: Generation,
    pub phase: Phase,
    pub palette: Palette,
    pub pair: ColorPair,
    pub auto_mode: bool,
    pub rotation: usize,
    pub can_regenerate: bool,
}

/// Transition vocabulary for message-driven hosts.
#[derive(Debug, Clone)]
pub enum Event {
    ImageChanged(ImageRef),
    ImageCleared,
    AnalysisCompleted(Completion),
    Regenerate,
    ToggleAuto,
    ManualColorSet(Side, Color),
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run analysis for this ticket and feed the result back.
    Analyze(AnalysisTicket),
    /// State changed.
    Updated,
    /// Nothing changed (same image, or a stale completion).
    Ignored,
}

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    generation: Generation,
    phase: Phase,
    image: Option<ImageRef>,
    palette: Palette,
    rotation: usize,
    auto_mode: bool,
    pair: ColorPair,
    last_error: Option<AnalysisError>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_valid_config(EngineConfig::default())
    }
}

impl Engine {
    /// Build an engine; `config` is validated first.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: EngineConfig) -> Self {
        Self {
            config,
            generation: 0,
            phase: Phase::Ready,
            image: None,
            palette: Palette::empty(),
            rotation: 0,
            auto_mode: true,
            pair: DEFAULT_PAIR,
            last_error: None,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn pair(&self) -> ColorPair {
        self.pair
    }

    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    pub fn rotation(&self) -> usize {
        self.rotation
    }

    pub fn can_regenerate(&self) -> bool {
        !self.palette.is_empty()
    }

    /// Why the current palette is empty, if its analysis failed.
    pub fn last_error(&self) -> Option<&AnalysisError> {
        self.last_error.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            phase: self.phase,
            palette: self.palette.clone(),
            pair: self.pair,
            auto_mode: self.auto_mode,
            rotation: self.rotation,
            can_regenerate: self.can_regenerate(),
        }
    }

    /// A new image was supplied. Returns the ticket to analyze it with, or
    /// `None` when `image` is the one already current and its analysis has
    /// not failed. A failed image can be resubmitted once its source is fixed.
    pub fn image_changed(&mut self, image: ImageRef) -> Option<AnalysisTicket> {
        if self.image.as_ref() == Some(&image) && self.last_error.is_none() {
            tracing::debug!(%image, generation = self.generation, "image unchanged");
            return None;
        }
        self.generation += 1;
        self.phase = Phase::Analyzing;
        self.image = Some(image.clone());
        self.rotation = 0;
        self.last_error = None;
        self.recompute();
        tracing::debug!(%image, generation = self.generation, "analysis requested");
        Some(AnalysisTicket {
            generation: self.generation,
            image,
        })
    }

    /// The image was removed. The palette empties immediately.
    pub fn image_cleared(&mut self) {
        self.generation += 1;
        self.phase = Phase::Ready;
        self.image = None;
        self.palette = Palette::empty();
        self.rotation = 0;
        self.last_error = None;
        self.recompute();
    }

    /// Commit an analysis result. Returns `false` if it was stale and dropped.
    pub fn analysis_completed(&mut self, completion: Completion) -> bool {
        let Completion { generation, result } = completion;
        if generation != self.generation || self.phase != Phase::Analyzing {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale analysis result"
            );
            return false;
        }

        match result {
            Ok(palette) => {
                tracing::info!(generation, colors = palette.len(), "palette ready");
                self.palette = palette;
                self.last_error = None;
            }
            Err(err) => {
                tracing::warn!(generation, error = %err, "image analysis failed, using default colors");
                self.palette = Palette::empty();
                self.last_error = Some(err);
            }
        }
        self.phase = Phase::Ready;
        self.rotation = 0;
        self.recompute();
        true
    }

    /// Advance to the next palette background and switch auto mode on.
    pub fn regenerate(&mut self) -> Result<ColorPair, TransitionError> {
        if self.palette.is_empty() {
            return Err(TransitionError::EmptyPalette);
        }
        self.auto_mode = true;
        self.rotation = (self.rotation + 1) % self.palette.len();
        self.recompute();
        Ok(self.pair)
    }

    /// Flip auto mode. Returns the new mode.
    ///
    /// Entering auto restarts from the most frequent color; leaving it keeps
    /// the current pair for manual editing.
    pub fn toggle_auto(&mut self) -> bool {
        self.auto_mode = !self.auto_mode;
        if self.auto_mode {
            self.rotation = 0;
            self.recompute();
        }
        self.auto_mode
    }

    /// Overwrite one side of the pair. Only allowed in manual mode.
    pub fn set_manual_color(&mut self, side: Side, color: Color) -> Result<(), TransitionError> {
        if self.auto_mode {
            return Err(TransitionError::AutoModeActive);
        }
        match side {
            Side::Background => self.pair.background = color,
            Side::Foreground => self.pair.foreground = color,
        }
        Ok(())
    }

    /// Apply an [`Event`]; the message-style form of the methods above.
    pub fn apply(&mut self, event: Event) -> Result<Effect, TransitionError> {
        match event {
            Event::ImageChanged(image) => Ok(self
                .image_changed(image)
                .map_or(Effect::Ignored, Effect::Analyze)),
            Event::ImageCleared => {
                self.image_cleared();
                Ok(Effect::Updated)
            }
            Event::AnalysisCompleted(completion) => Ok(if self.analysis_completed(completion) {
                Effect::Updated
            } else {
                Effect::Ignored
            }),
            Event::Regenerate => self.regenerate().map(|_| Effect::Updated),
            Event::ToggleAuto => {
                self.toggle_auto();
                Ok(Effect::Updated)
            }
            Event::ManualColorSet(side, color) => {
                self.set_manual_color(side, color).map(|()| Effect::Updated)
            }
        }
    }

    fn recompute(&mut self) {
        if !self.auto_mode {
            return;
        }
        let selection = select_pair(&self.palette, self.rotation, &self.config.theme);
        self.pair = selection.pair;
    }
}

/// Thread-safe handle that serializes every transition on one engine.
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Lock the engine for a batch of reads or transitions.
    pub fn lock(&self) -> MutexGuard<'_, Engine> {
        // transitions never leave the engine half-updated, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn apply(&self, event: Event) -> Result<Effect, TransitionError> {
        self.lock().apply(event)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    fn palette(colors: &[Color]) -> Palette {
        Palette::from(colors.to_vec())
    }

    fn loaded(colors: &[Color]) -> Engine {
        let mut engine = Engine::default();
        let ticket = engine.image_changed(ImageRef::from("a.png")).unwrap();
        assert!(engine.analysis_completed(Completion {
            generation: ticket.generation,
            result: Ok(palette(colors)),
        }));
        engine
    }

    const NAVY: Color = Color::new(0, 0, 96);
    const CREAM: Color = Color::new(255, 255, 224);
    const RED: Color = Color::new(224, 0, 0);

    #[test]
    fn initial_state() {
        let engine = Engine::default();
        let snap = engine.snapshot();
        assert_eq!(snap.generation, 0);
        assert_eq!(snap.phase, Phase::Ready);
        assert!(snap.palette.is_empty());
        assert_eq!(snap.pair, DEFAULT_PAIR);
        assert!(snap.auto_mode);
        assert!(!snap.can_regenerate);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.analysis.palette_size = 0;
        assert_eq!(Engine::new(config).unwrap_err(), ConfigError::ZeroPaletteSize);

        let mut config = EngineConfig::default();
        config.theme.min_contrast = 0.0;
        assert!(Engine::new(config).is_err());

        assert!(Engine::new(EngineConfig::default()).is_ok());
    }

    #[test]
    fn image_changed_bumps_generation() {
        let mut engine = Engine::default();
        let first = engine.image_changed(ImageRef::from("a.png")).unwrap();
        let second = engine.image_changed(ImageRef::from("b.png")).unwrap();
        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(engine.phase(), Phase::Analyzing);
    }

    #[test]
    fn same_image_is_not_reanalyzed() {
        let mut engine = loaded(&[NAVY, CREAM]);
        assert_eq!(engine.image_changed(ImageRef::from("a.png")), None);
        assert_eq!(engine.generation(), 1);
        assert_eq!(engine.phase(), Phase::Ready);
    }

    #[test]
    fn failed_image_can_be_resubmitted() {
        let mut engine = Engine::default();
        let ticket = engine.image_changed(ImageRef::from("late.png")).unwrap();
        engine.analysis_completed(Completion {
            generation: ticket.generation,
            result: Err(AnalysisError::DecodeUnavailable("file not found".into())),
        });

        let retry = engine
            .image_changed(ImageRef::from("late.png"))
            .expect("failed image should be analyzed again");
        assert_eq!(retry.generation, 2);
        assert!(engine.analysis_completed(Completion {
            generation: retry.generation,
            result: Ok(palette(&[NAVY, CREAM])),
        }));
        assert!(engine.last_error().is_none());
        assert_eq!(engine.pair().background, NAVY);
        assert_eq!(engine.image_changed(ImageRef::from("late.png")), None);
    }

    #[test]
    fn completion_sets_pair() {
        let engine = loaded(&[NAVY, CREAM]);
        assert_eq!(
            engine.pair(),
            ColorPair {
                background: NAVY,
                foreground: CREAM
            }
        );
        assert!(engine.can_regenerate());
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut engine = Engine::default();
        let old = engine.image_changed(ImageRef::from("old.png")).unwrap();
        let new = engine.image_changed(ImageRef::from("new.png")).unwrap();

        assert!(!engine.analysis_completed(Completion {
            generation: old.generation,
            result: Ok(palette(&[RED])),
        }));
        assert!(engine.palette().is_empty());
        assert_eq!(engine.phase(), Phase::Analyzing);

        assert!(engine.analysis_completed(Completion {
            generation: new.generation,
            result: Ok(palette(&[NAVY, CREAM])),
        }));
        assert_eq!(engine.palette().colors(), &[NAVY, CREAM]);
    }

    #[test]
    fn duplicate_completion_is_dropped() {
        let mut engine = loaded(&[NAVY, CREAM]);
        assert!(!engine.analysis_completed(Completion {
            generation: 1,
            result: Ok(palette(&[RED])),
        }));
        assert_eq!(engine.palette().colors(), &[NAVY, CREAM]);
    }

    #[test]
    fn failed_analysis_uses_default_pair_and_keeps_mode() {
        let mut engine = loaded(&[NAVY, CREAM]);
        engine.toggle_auto();
        let ticket = engine.image_changed(ImageRef::from("broken.png")).unwrap();
        engine.analysis_completed(Completion {
            generation: ticket.generation,
            result: Err(AnalysisError::DecodeUnavailable("tainted".into())),
        });
        assert!(engine.palette().is_empty());
        assert!(!engine.auto_mode());
        assert!(engine.last_error().is_some());

        engine.toggle_auto();
        assert_eq!(engine.pair(), DEFAULT_PAIR);
    }

    #[test]
    fn regenerate_requires_palette() {
        let mut engine = Engine::default();
        assert_eq!(engine.regenerate(), Err(TransitionError::EmptyPalette));
        assert_eq!(engine.rotation(), 0);
    }

    #[test]
    fn regenerate_cycles_through_palette() {
        let colors = [NAVY, CREAM, RED];
        let mut engine = loaded(&colors);
        let mut backgrounds = vec![engine.pair().background];
        for _ in 0..colors.len() {
            backgrounds.push(engine.regenerate().unwrap().background);
        }
        assert_eq!(backgrounds, vec![NAVY, CREAM, RED, NAVY]);
        assert_eq!(engine.rotation(), 0);
    }

    #[test]
    fn regenerate_forces_auto_mode() {
        let mut engine = loaded(&[NAVY, CREAM]);
        engine.toggle_auto();
        engine.set_manual_color(Side::Background, RED).unwrap();
        let pair = engine.regenerate().unwrap();
        assert!(engine.auto_mode());
        assert_eq!(pair.background, CREAM);
    }

    #[test]
    fn leaving_auto_freezes_pair() {
        let mut engine = loaded(&[NAVY, CREAM]);
        let before = engine.pair();
        assert!(!engine.toggle_auto());
        assert_eq!(engine.pair(), before);

        engine.set_manual_color(Side::Foreground, RED).unwrap();
        assert_eq!(engine.pair().foreground, RED);
        assert_eq!(engine.pair().background, NAVY);
        assert_eq!(engine.palette().colors(), &[NAVY, CREAM]);
    }

    #[test]
    fn entering_auto_resets_rotation() {
        let mut engine = loaded(&[NAVY, CREAM, RED]);
        engine.regenerate().unwrap();
        engine.regenerate().unwrap();
        engine.toggle_auto();
        assert!(engine.toggle_auto());
        assert_eq!(engine.rotation(), 0);
        assert_eq!(engine.pair().background, NAVY);
    }

    #[test]
    fn manual_color_rejected_in_auto_mode() {
        let mut engine = loaded(&[NAVY, CREAM]);
        assert_eq!(
            engine.set_manual_color(Side::Background, RED),
            Err(TransitionError::AutoModeActive)
        );
        assert_eq!(engine.pair().background, NAVY);
    }

    #[test]
    fn manual_pair_survives_new_image() {
        let mut engine = loaded(&[NAVY, CREAM]);
        engine.toggle_auto();
        engine.set_manual_color(Side::Background, BLACK).unwrap();
        let ticket = engine.image_changed(ImageRef::from("b.png")).unwrap();
        engine.analysis_completed(Completion {
            generation: ticket.generation,
            result: Ok(palette(&[RED])),
        });
        assert_eq!(engine.pair().background, BLACK);
        assert_eq!(engine.palette().colors(), &[RED]);
    }

    #[test]
    fn image_cleared_resets_to_default() {
        let mut engine = loaded(&[NAVY, CREAM]);
        engine.regenerate().unwrap();
        engine.image_cleared();
        assert_eq!(engine.generation(), 2);
        assert_eq!(engine.phase(), Phase::Ready);
        assert!(engine.palette().is_empty());
        assert_eq!(engine.pair(), DEFAULT_PAIR);
        assert!(engine.image_changed(ImageRef::from("a.png")).is_some());
    }

    #[test]
    fn apply_routes_events() {
        let mut engine = Engine::default();
        let effect = engine
            .apply(Event::ImageChanged(ImageRef::from("a.png")))
            .unwrap();
        let Effect::Analyze(ticket) = effect else {
            panic!("expected an analysis request, got {effect:?}");
        };
        let effect = engine
            .apply(Event::AnalysisCompleted(Completion {
                generation: ticket.generation,
                result: Ok(palette(&[WHITE, BLACK])),
            }))
            .unwrap();
        assert_eq!(effect, Effect::Updated);
        assert_eq!(engine.pair().foreground, BLACK);
        assert_eq!(
            engine.apply(Event::ManualColorSet(Side::Background, RED)),
            Err(TransitionError::AutoModeActive)
        );
        assert_eq!(
            engine.apply(Event::ImageChanged(ImageRef::from("a.png"))),
            Ok(Effect::Ignored)
        );
    }

    #[test]
    fn shared_engine_serializes_commits_from_threads() {
        let shared = SharedEngine::default();
        let ticket = shared.lock().image_changed(ImageRef::from("a.png")).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let ticket = ticket.clone();
                std::thread::spawn(move || {
                    shared
                        .apply(Event::AnalysisCompleted(Completion {
                            generation: ticket.generation,
                            result: Ok(Palette::from(vec![NAVY, CREAM])),
                        }))
                        .unwrap()
                })
            })
            .collect();
        let effects: Vec<Effect> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // exactly one commit wins; the rest see a Ready phase and are dropped
        assert_eq!(effects.iter().filter(|e| **e == Effect::Updated).count(), 1);
        assert_eq!(shared.snapshot().palette.colors(), &[NAVY, CREAM]);
    }
}

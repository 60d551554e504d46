use crate::config::Rgb;
use crate::geometry::PixelPosition;

/// Sound cues the simulation asks the presentation layer to play.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SoundSignal {
    Pickup,
    Death,
}

/// Drawing and audio primitives the game core renders through.
///
/// Coordinates are arena pixels; implementations scale them as they see fit.
pub trait Presenter {
    /// Fills the square cell whose top-left corner is `corner`.
    fn draw_cell(&mut self, corner: PixelPosition, size: u32, color: Rgb);

    fn draw_circle(&mut self, center: PixelPosition, radius: u32, color: Rgb);

    fn play_sound(&mut self, signal: SoundSignal);
}

/// Presenter that records every call, for tests and headless runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingPresenter {
    pub cells: Vec<(PixelPosition, Rgb)>,
    pub circles: Vec<(PixelPosition, u32, Rgb)>,
    pub sounds: Vec<SoundSignal>,
}

impl RecordingPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets drawing calls but keeps the sound history.
    pub fn clear_frame(&mut self) {
        self.cells.clear();
        self.circles.clear();
    }
}

impl Presenter for RecordingPresenter {
    fn draw_cell(&mut self, corner: PixelPosition, _size: u32, color: Rgb) {
        self.cells.push((corner, color));
    }

    fn draw_circle(&mut self, center: PixelPosition, radius: u32, color: Rgb) {
        self.circles.push((center, radius, color));
    }

    fn play_sound(&mut self, signal: SoundSignal) {
        self.sounds.push(signal);
    }
}

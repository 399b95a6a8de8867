use crate::config::{MAX_PITCH, MIN_PITCH};

//
// ===============================
// MARK: Render-side transport
// ===============================
//

/// Output rate and playback-rate multiplier.
///
/// This struct:
/// - is real-time safe
/// - is copyable
/// - contains NO position logic (the decoder owns the position)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transport {
    /// Output sample rate (Hz)
    sample_rate: f64,

    /// Playback-rate multiplier, clamped to `MIN_PITCH..=MAX_PITCH`
    pitch: f64,
}

impl Transport {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            pitch: 1.0,
        }
    }

    // -------------------------------
    // MARK: Accessors
    // -------------------------------

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Rate handed to the decoder when rendering.
    ///
    /// Rendering at `sample_rate * pitch` and playing back at `sample_rate`
    /// shifts pitch and tempo together.
    #[inline]
    pub fn render_rate(&self) -> f64 {
        self.sample_rate * self.pitch
    }

    /// Tempo as heard, given the module tempo.
    #[inline]
    pub fn effective_bpm(&self, module_bpm: f64) -> f64 {
        if self.pitch > 0.0 {
            module_bpm / self.pitch
        } else {
            module_bpm
        }
    }

    // -------------------------------
    // MARK: Mutators (render thread)
    // -------------------------------

    /// Set the playback-rate multiplier. Non-finite values are ignored.
    pub fn set_pitch(&mut self, pitch: f64) {
        if pitch.is_finite() {
            self.pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_is_clamped() {
        let mut transport = Transport::new(48_000.0);
        transport.set_pitch(10.0);
        assert_eq!(transport.pitch(), MAX_PITCH);
        transport.set_pitch(0.0);
        assert_eq!(transport.pitch(), MIN_PITCH);
        transport.set_pitch(f64::NAN);
        assert_eq!(transport.pitch(), MIN_PITCH);
    }

    #[test]
    fn test_render_rate_and_bpm() {
        let mut transport = Transport::new(48_000.0);
        transport.set_pitch(2.0);
        assert_eq!(transport.render_rate(), 96_000.0);
        assert_eq!(transport.effective_bpm(125.0), 62.5);
    }
}

// src/config.rs
//
// Engine configuration and decoder render settings.

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;

/// Slowest playback-rate multiplier accepted by `SetPitch`.
pub const MIN_PITCH: f64 = 0.01;

/// Fastest playback-rate multiplier accepted by `SetPitch`.
pub const MAX_PITCH: f64 = 4.0;

/// Upper bound for stereo separation, in percent.
pub const MAX_STEREO_SEPARATION: u32 = 200;

/// Configuration for creating an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz (e.g., 44100.0, 48000.0).
    pub sample_rate: f64,

    /// Initial decoder render settings.
    pub render: RenderSettings,
}

impl EngineConfig {
    pub fn with_sample_rate(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            render: RenderSettings::default(),
        }
    }
}

/// Resampling interpolation used by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationFilter {
    None,
    #[default]
    Linear,
    Cubic,
    /// Windowed FIR, highest quality.
    Fir,
}

impl InterpolationFilter {
    /// Filter length code (0, 1, 2 or 4).
    pub fn code(self) -> i32 {
        match self {
            InterpolationFilter::None => 0,
            InterpolationFilter::Linear => 1,
            InterpolationFilter::Cubic => 2,
            InterpolationFilter::Fir => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(InterpolationFilter::None),
            1 => Some(InterpolationFilter::Linear),
            2 => Some(InterpolationFilter::Cubic),
            4 => Some(InterpolationFilter::Fir),
            _ => None,
        }
    }
}

/// Output dithering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dither {
    None,
    #[default]
    Default,
    Rectangular05,
    Rectangular1NoiseShaped,
}

impl Dither {
    pub fn code(self) -> i32 {
        match self {
            Dither::None => 0,
            Dither::Default => 1,
            Dither::Rectangular05 => 2,
            Dither::Rectangular1NoiseShaped => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Dither::None),
            1 => Some(Dither::Default),
            2 => Some(Dither::Rectangular05),
            3 => Some(Dither::Rectangular1NoiseShaped),
            _ => None,
        }
    }
}

/// Amiga output filter emulation (only used by 4-channel Amiga modules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmigaFilter {
    #[default]
    Auto,
    A500,
    A1200,
    Unfiltered,
}

impl AmigaFilter {
    pub fn code(self) -> i32 {
        match self {
            AmigaFilter::Auto => 0,
            AmigaFilter::A500 => 1,
            AmigaFilter::A1200 => 2,
            AmigaFilter::Unfiltered => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(AmigaFilter::Auto),
            1 => Some(AmigaFilter::A500),
            2 => Some(AmigaFilter::A1200),
            3 => Some(AmigaFilter::Unfiltered),
            _ => None,
        }
    }

    /// Name understood by libopenmpt-style decoders.
    pub fn name(self) -> &'static str {
        match self {
            AmigaFilter::Auto => "auto",
            AmigaFilter::A500 => "a500",
            AmigaFilter::A1200 => "a1200",
            AmigaFilter::Unfiltered => "unfiltered",
        }
    }
}

/// Decoder render quality settings.
///
/// The engine never interprets these; it forwards them to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub interpolation: InterpolationFilter,

    /// 0 = mono, 100 = module default, 200 = extra wide.
    pub stereo_separation: u32,

    pub dither: Dither,

    pub amiga_resampler: bool,

    pub amiga_filter: AmigaFilter,
}

impl RenderSettings {
    /// Set stereo separation, clamped to `0..=200`.
    pub fn set_stereo_separation(&mut self, separation: i32) {
        self.stereo_separation = separation.clamp(0, MAX_STEREO_SEPARATION as i32) as u32;
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            interpolation: InterpolationFilter::default(),
            stereo_separation: 100,
            dither: Dither::default(),
            amiga_resampler: false,
            amiga_filter: AmigaFilter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolation_codes_reject_gaps() {
        assert_eq!(InterpolationFilter::from_code(4), Some(InterpolationFilter::Fir));
        assert_eq!(InterpolationFilter::from_code(3), None);
        assert_eq!(InterpolationFilter::from_code(-1), None);
    }

    #[test]
    fn test_stereo_separation_clamps() {
        let mut settings = RenderSettings::default();
        settings.set_stereo_separation(350);
        assert_eq!(settings.stereo_separation, 200);
        settings.set_stereo_separation(-10);
        assert_eq!(settings.stereo_separation, 0);
    }

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert_eq!(settings.interpolation, InterpolationFilter::Linear);
        assert_eq!(settings.dither, Dither::Default);
        assert_eq!(settings.amiga_filter.name(), "auto");
        assert_eq!(EngineConfig::default().sample_rate, DEFAULT_SAMPLE_RATE);
    }
}

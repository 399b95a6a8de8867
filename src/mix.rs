// src/mix.rs
//
// Per-channel volume and panning sliders, and mirroring them (plus the
// mute flags) into the decoder.

use crate::decoder::Decoder;

/// Default channel volume.
pub const DEFAULT_VOLUME: f64 = 1.0;

/// Center panning.
pub const CENTER_PAN: f64 = 0.5;

/// Volume and panning per channel. Render thread only.
///
/// Panning here is `0.0` (left) ..= `1.0` (right). Decoders take
/// `-1.0..=1.0`; conversion happens on mirroring.
#[derive(Debug, Clone)]
pub struct ChannelMix {
    volumes: Vec<f64>,
    pans: Vec<f64>,
}

impl ChannelMix {
    pub fn new(num_channels: usize) -> Self {
        Self {
            volumes: vec![DEFAULT_VOLUME; num_channels],
            pans: vec![CENTER_PAN; num_channels],
        }
    }

    /// Initial state, with panning taken from the module defaults.
    pub fn from_decoder(decoder: &dyn Decoder) -> Self {
        let mut mix = Self::new(decoder.num_channels());
        for (channel, pan) in mix.pans.iter_mut().enumerate() {
            if let Some(decoder_pan) = decoder.default_channel_panning(channel) {
                *pan = from_decoder_pan(decoder_pan);
            }
        }
        mix
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    pub fn volume(&self, channel: usize) -> f64 {
        self.volumes.get(channel).copied().unwrap_or(0.0)
    }

    pub fn panning(&self, channel: usize) -> f64 {
        self.pans.get(channel).copied().unwrap_or(CENTER_PAN)
    }

    /// Set a volume, clamped to `0..=1`. Returns the stored value, or
    /// `None` for an invalid channel or a NaN volume.
    pub fn set_volume(&mut self, channel: usize, volume: f64) -> Option<f64> {
        if volume.is_nan() {
            return None;
        }
        let slot = self.volumes.get_mut(channel)?;
        *slot = volume.clamp(0.0, 1.0);
        Some(*slot)
    }

    /// Set a panning, clamped to `0..=1`.
    pub fn set_panning(&mut self, channel: usize, pan: f64) -> Option<f64> {
        if pan.is_nan() {
            return None;
        }
        let slot = self.pans.get_mut(channel)?;
        *slot = pan.clamp(0.0, 1.0);
        Some(*slot)
    }

    // -------------------------------
    // MARK: Mirroring
    // -------------------------------

    /// Push one channel's volume, unless it is muted.
    pub fn mirror_volume(&self, decoder: &mut dyn Decoder, channel: usize, muted: bool) {
        if !muted {
            decoder.set_channel_volume(channel, self.volume(channel));
        }
    }

    pub fn mirror_panning(&self, decoder: &mut dyn Decoder, channel: usize) {
        decoder.set_channel_panning(channel, to_decoder_pan(self.panning(channel)));
    }

    /// Push mute flags, volumes and pannings for every channel.
    ///
    /// Needed after every reposition: decoders may reset channel state on
    /// seek.
    pub fn mirror_all(&self, decoder: &mut dyn Decoder, muted: &[bool]) {
        for channel in 0..self.volumes.len() {
            let is_muted = muted.get(channel).copied().unwrap_or(false);
            decoder.set_channel_mute(channel, is_muted);
            self.mirror_volume(decoder, channel, is_muted);
            self.mirror_panning(decoder, channel);
        }
    }
}

/// `0..1` slider panning to decoder `-1..1`.
pub fn to_decoder_pan(pan: f64) -> f64 {
    pan * 2.0 - 1.0
}

/// Decoder `-1..1` panning to `0..1`.
pub fn from_decoder_pan(pan: f64) -> f64 {
    ((pan + 1.0) * 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::SimModule;

    #[test]
    fn test_values_are_clamped() {
        let mut mix = ChannelMix::new(2);
        assert_eq!(mix.set_volume(0, 1.5), Some(1.0));
        assert_eq!(mix.set_volume(1, -0.5), Some(0.0));
        assert_eq!(mix.set_panning(0, 2.0), Some(1.0));
        assert_eq!(mix.set_volume(2, 0.5), None);
        assert_eq!(mix.set_volume(0, f64::NAN), None);
        assert_eq!(mix.volume(0), 1.0);
    }

    #[test]
    fn test_pan_conversion() {
        assert_eq!(to_decoder_pan(0.0), -1.0);
        assert_eq!(to_decoder_pan(0.5), 0.0);
        assert_eq!(to_decoder_pan(1.0), 1.0);
        assert_eq!(from_decoder_pan(-1.0), 0.0);
        assert_eq!(from_decoder_pan(0.5), 0.75);
    }

    #[test]
    fn test_default_panning_from_decoder() {
        let mut sim = SimModule::new(2);
        sim.set_default_panning(1, -1.0);
        let mix = ChannelMix::from_decoder(&sim);
        assert_eq!(mix.panning(0), CENTER_PAN);
        assert_eq!(mix.panning(1), 0.0);
    }

    #[test]
    fn test_mirror_skips_volume_of_muted_channel() {
        let mut sim = SimModule::new(2);
        let mut mix = ChannelMix::new(2);
        mix.set_volume(0, 0.25);
        mix.set_volume(1, 0.75);
        mix.set_panning(1, 1.0);

        sim.set_channel_volume(1, 0.1);
        mix.mirror_all(&mut sim, &[false, true]);

        assert_eq!(sim.channel_volume(0), 0.25);
        assert_eq!(sim.channel_volume(1), 0.1);
        assert!(sim.channel_muted(1));
        assert_eq!(sim.channel_panning(1), 1.0);
    }
}

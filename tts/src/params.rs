use serde::Deserialize;

/// Frame period used when a caller does not pick one. Lower is higher pitched.
pub const DEFAULT_FPERIOD: u32 = 220;

/// Synthesis parameters for an HTS voice.
///
/// Every field is optional when deserialized, so a partial table such as
/// `{ "beta": 0.5, "uv_threshold": 0.2 }` overrides only what it names.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VoiceParams {
    pub sampling_rate: u32,
    /// Gamma stage; `0` selects mel-cepstrum.
    pub stage: u32,
    pub audio_buff_size: u32,
    /// All-pass constant.
    pub alpha: f64,
    /// Postfilter coefficient.
    pub beta: f64,
    /// Voiced/unvoiced threshold.
    pub uv_threshold: f64,
    pub gv_weight_mgc: f64,
    pub gv_weight_lf0: f64,
    pub gv_weight_lpf: f64,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            sampling_rate: 48000,
            stage: 0,
            audio_buff_size: 48000,
            alpha: 0.5,
            beta: 0.8,
            uv_threshold: 0.5,
            gv_weight_mgc: 1.0,
            gv_weight_lf0: 1.0,
            gv_weight_lpf: 1.0,
        }
    }
}

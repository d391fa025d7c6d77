//! Several EQ bands in series.

use tonal_core::{Buffer, Float, ProcessSpec, Processor};

use super::band::EqBand;
use super::filter::EqFilterKind;
use crate::params::EqParams;

/// `BANDS` [`EqBand`]s run in series, each switchable on and off.
///
/// A band that is off is still handed every block as bypassed, so it stays
/// reset and comes back without stale state.
#[derive(Debug, Clone)]
pub struct EqProcessor<F, const BANDS: usize> {
    bands: [EqBand<F>; BANDS],
    band_on: [bool; BANDS],
}

impl<F: Float, const BANDS: usize> EqProcessor<F, BANDS> {
    /// Default bands, all off.
    pub fn new() -> Self {
        Self {
            bands: core::array::from_fn(|_| EqBand::default_band()),
            band_on: [false; BANDS],
        }
    }

    /// Bands offering `kinds`, all off.
    pub fn with_filter_types(kinds: &[EqFilterKind]) -> Self {
        Self {
            bands: core::array::from_fn(|_| EqBand::with_filter_types(kinds)),
            band_on: [false; BANDS],
        }
    }

    /// Prepares every band.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            bands = BANDS,
            sample_rate = spec.sample_rate,
            "eq_processor: prepare"
        );
        for band in &mut self.bands {
            band.prepare(spec);
        }
    }

    /// Resets every band.
    pub fn reset(&mut self) {
        for band in &mut self.bands {
            band.reset();
        }
    }

    /// Band at `index`.
    pub fn band(&self, index: usize) -> &EqBand<F> {
        &self.bands[index]
    }

    /// Mutable band at `index`.
    pub fn band_mut(&mut self, index: usize) -> &mut EqBand<F> {
        &mut self.bands[index]
    }

    /// Turns band `index` on or off.
    pub fn set_band_on_off(&mut self, index: usize, on: bool) {
        self.band_on[index] = on;
    }

    /// True if band `index` is on.
    pub fn is_band_on(&self, index: usize) -> bool {
        self.band_on[index]
    }

    /// Cutoff of band `index` in Hz.
    pub fn set_cutoff_frequency(&mut self, index: usize, freq_hz: F) {
        self.bands[index].set_cutoff_frequency(freq_hz);
    }

    /// Q of band `index`.
    pub fn set_q_value(&mut self, index: usize, q: F) {
        self.bands[index].set_q_value(q);
    }

    /// Gain of band `index` in dB.
    pub fn set_gain_db(&mut self, index: usize, gain_db: F) {
        self.bands[index].set_gain_db(gain_db);
    }

    /// Filter type of band `index`.
    pub fn set_filter_type(&mut self, index: usize, filter_type: usize) {
        self.bands[index].set_filter_type(filter_type);
    }

    /// Loads a parameter snapshot. Extra entries are ignored; missing ones
    /// leave their band unchanged.
    pub fn set_parameters(&mut self, params: &EqParams) {
        for (index, band_params) in params.bands.iter().enumerate().take(BANDS) {
            band_params.apply_to(self, index);
        }
    }

    /// Runs every band over `buffer`.
    pub fn process_block(&mut self, buffer: &mut Buffer<F>) {
        for (band, &on) in self.bands.iter_mut().zip(&self.band_on) {
            band.process(buffer, !on);
        }
    }
}

impl<F: Float, const BANDS: usize> Default for EqProcessor<F, BANDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float, const BANDS: usize> Processor<F> for EqProcessor<F, BANDS> {
    fn prepare(&mut self, spec: &ProcessSpec) {
        EqProcessor::prepare(self, spec);
    }

    fn reset(&mut self) {
        EqProcessor::reset(self);
    }

    fn process(&mut self, buffer: &mut Buffer<F>) {
        self.process_block(buffer);
    }
}

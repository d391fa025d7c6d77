//! SIMD modal filter bank.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use num_complex::Complex;
use tonal_core::{Buffer, Sample, ceiling_divide};
use wide::f32x4;

use super::VecModalFilter;

/// Highest resonant frequency kept, as a fraction of the sample rate.
const MAX_FREQ_RATIO: f64 = 0.495;

/// Vector register and lane holding logical mode `index`.
#[inline]
pub const fn mode_location(index: usize) -> (usize, usize) {
    (index / VecModalFilter::LANES, index % VecModalFilter::LANES)
}

/// `ln(1000)`
const LN_1000: f32 = 6.907_755;

/// Converts a decay constant `tau` (in samples at `original_fs`) to T60
/// seconds.
///
/// The exponential overflows in `f32` once `original_fs / tau > 88`; those
/// modes get a T60 of zero and ring for a single sample.
#[inline]
pub fn tau_to_t60(tau: f32, original_fs: f32) -> f32 {
    1.0 / (libm::logf(libm::expf(original_fs / tau)) / LN_1000)
}

/// A parallel bank of up to `MAX_MODES` modal resonators summed to mono.
///
/// Logical mode `i` lives in lane `i % 4` of vector resonator `i / 4`. Every
/// per-mode setter scatters through the same helper, so the three stay in
/// agreement about that mapping.
///
/// Amplitudes can be normalized so that mode 0 has a fixed magnitude. Only
/// the first [`num_modes_to_process`](Self::num_modes_to_process) modes are
/// rendered; the others get zero amplitude and their vector resonators are
/// cleared.
///
/// # Example
///
/// ```rust
/// use tonal_synth::ModalFilterBank;
///
/// let mut bank = ModalFilterBank::<6>::new();
/// bank.prepare(48000.0, 64);
/// bank.set_mode_frequencies(&[100.0, 210.0, 330.0, 470.0, 620.0, 800.0], 1.0);
/// bank.set_mode_decays(&[1.0, 0.8, 0.6, 0.5, 0.4, 0.3]);
/// bank.set_mode_amplitudes(&[1.0, 0.5, 0.4, 0.3, 0.2, 0.1], 0.5);
///
/// let mut impulse = [0.0_f32; 64];
/// impulse[0] = 1.0;
/// bank.process(&impulse);
/// assert_eq!(bank.render_buffer().len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct ModalFilterBank<const MAX_MODES: usize> {
    modes: Vec<VecModalFilter>,
    amplitude_data: [Complex<f32>; MAX_MODES],
    amplitude_normalization_factor: f32,
    render_buffer: Buffer<f32>,
    max_freq: f32,
    num_modes_to_process: usize,
    num_vec_modes_to_process: usize,
}

impl<const MAX_MODES: usize> ModalFilterBank<MAX_MODES> {
    /// Number of vector resonators backing the bank.
    pub const NUM_VEC_MODES: usize = ceiling_divide(MAX_MODES, VecModalFilter::LANES);

    /// Creates a silent bank with every mode active.
    ///
    /// Allocates; call [`prepare`](Self::prepare) before processing.
    pub fn new() -> Self {
        Self {
            modes: (0..Self::NUM_VEC_MODES).map(|_| VecModalFilter::new()).collect(),
            amplitude_data: [Complex::new(0.0, 0.0); MAX_MODES],
            amplitude_normalization_factor: 1.0,
            render_buffer: Buffer::new(1, 0),
            max_freq: 0.0,
            num_modes_to_process: MAX_MODES,
            num_vec_modes_to_process: Self::NUM_VEC_MODES,
        }
    }

    /// Prepares every resonator for `sample_rate` and sizes the render
    /// buffer for blocks of up to `max_block_size` samples.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            max_block_size,
            max_modes = MAX_MODES,
            "modal_bank: prepare"
        );

        self.max_freq = (MAX_FREQ_RATIO * sample_rate) as f32;
        self.render_buffer.set_max_size(1, max_block_size);
        for mode in &mut self.modes {
            mode.prepare(sample_rate as f32);
        }
    }

    /// Clears every resonator.
    pub fn reset(&mut self) {
        for mode in &mut self.modes {
            mode.reset();
        }
    }

    /// Sets real mode amplitudes.
    ///
    /// A positive `normalize` scales the bank so mode 0 has magnitude
    /// `normalize`; zero or negative disables normalization. Missing modes
    /// get zero amplitude.
    pub fn set_mode_amplitudes(&mut self, amps: &[f32], normalize: f32) {
        for (i, amp) in self.amplitude_data.iter_mut().enumerate() {
            *amp = Complex::new(amps.get(i).copied().unwrap_or(0.0), 0.0);
        }
        self.update_amplitude_normalization_factor(normalize);
        self.set_mode_amplitudes_internal();
    }

    /// Sets complex mode amplitudes. See
    /// [`set_mode_amplitudes`](Self::set_mode_amplitudes) for `normalize`.
    pub fn set_mode_amplitudes_complex(&mut self, amps: &[Complex<f32>], normalize: f32) {
        for (i, amp) in self.amplitude_data.iter_mut().enumerate() {
            *amp = amps.get(i).copied().unwrap_or_default();
        }
        self.update_amplitude_normalization_factor(normalize);
        self.set_mode_amplitudes_internal();
    }

    /// Sets complex mode amplitudes from split real and imaginary arrays.
    pub fn set_mode_amplitudes_split(&mut self, re: &[f32], im: &[f32], normalize: f32) {
        for (i, amp) in self.amplitude_data.iter_mut().enumerate() {
            *amp = Complex::new(
                re.get(i).copied().unwrap_or(0.0),
                im.get(i).copied().unwrap_or(0.0),
            );
        }
        self.update_amplitude_normalization_factor(normalize);
        self.set_mode_amplitudes_internal();
    }

    /// Sets mode frequencies to `base_frequencies * multiplier`.
    ///
    /// Modes landing above `0.495 fs` are silenced by tuning them to 0 Hz.
    pub fn set_mode_frequencies(&mut self, base_frequencies: &[f32], multiplier: f32) {
        let max_freq = self.max_freq;
        scatter_modes(
            &mut self.modes,
            |index| {
                let freq = base_frequencies
                    .get(index)
                    .filter(|_| index < MAX_MODES)
                    .map_or(0.0, |f| f * multiplier);
                if freq > max_freq { 0.0 } else { freq }
            },
            |mode, lanes| mode.set_freq(f32x4::from(lanes)),
        );
    }

    /// Sets mode decays as T60 times in seconds.
    pub fn set_mode_decays(&mut self, t60s: &[f32]) {
        scatter_modes(
            &mut self.modes,
            |index| {
                t60s.get(index)
                    .copied()
                    .filter(|_| index < MAX_MODES)
                    .unwrap_or(0.0)
            },
            |mode, lanes| mode.set_decay(f32x4::from(lanes)),
        );
    }

    /// Sets mode decays from `tau` constants measured at `original_fs`,
    /// scaling each resulting T60 by `decay_factor`.
    pub fn set_mode_decays_from_taus(&mut self, taus: &[f32], original_fs: f32, decay_factor: f32) {
        scatter_modes(
            &mut self.modes,
            |index| {
                taus.get(index)
                    .copied()
                    .filter(|_| index < MAX_MODES)
                    .unwrap_or(1.0)
            },
            |mode, lanes| {
                let t60 = lanes.map(|tau| tau_to_t60(tau, original_fs) * decay_factor);
                mode.set_decay(f32x4::from(t60));
            },
        );
    }

    /// Limits rendering to the first `num_modes` modes.
    ///
    /// Amplitudes are recomputed with the trailing modes zeroed, and every
    /// dropped mode has its state cleared, including the upper lanes of a
    /// partially active vector resonator.
    pub fn set_num_modes_to_process(&mut self, num_modes: usize) {
        debug_assert!(num_modes <= MAX_MODES, "num_modes {} > {}", num_modes, MAX_MODES);
        let num_modes = num_modes.min(MAX_MODES);

        self.num_modes_to_process = num_modes;
        self.num_vec_modes_to_process = ceiling_divide(num_modes, VecModalFilter::LANES);
        self.set_mode_amplitudes_internal();

        for mode in &mut self.modes[self.num_vec_modes_to_process..] {
            mode.reset();
        }
        let first_dropped_lane = num_modes % VecModalFilter::LANES;
        if first_dropped_lane != 0 {
            self.modes[num_modes / VecModalFilter::LANES].clear_lanes(first_dropped_lane);
        }
    }

    /// Number of logical modes being rendered.
    pub fn num_modes_to_process(&self) -> usize {
        self.num_modes_to_process
    }

    /// Scale applied to every stored amplitude.
    pub fn amplitude_normalization_factor(&self) -> f32 {
        self.amplitude_normalization_factor
    }

    /// Vector resonators, in mode order.
    pub fn modes(&self) -> &[VecModalFilter] {
        &self.modes
    }

    /// Processes one sample through vector resonator `vec_index` and returns
    /// its four lane outputs.
    #[inline]
    pub fn process_sample(&mut self, vec_index: usize, x: f32) -> f32x4 {
        self.modes[vec_index].process_sample(x)
    }

    /// Renders `block` through every active mode into the render buffer.
    pub fn process(&mut self, block: &[f32]) {
        self.process_with_modulation(block, |_, _, _| {});
    }

    /// Like [`process`](Self::process), calling `modulator(resonator,
    /// vec_index, n)` before each vector resonator processes sample `n`.
    ///
    /// Resonators are rendered one after another, so the callback sees every
    /// sample of vector mode 0, then every sample of vector mode 1, and so on.
    pub fn process_with_modulation<M>(&mut self, block: &[f32], mut modulator: M)
    where
        M: FnMut(&mut VecModalFilter, usize, usize),
    {
        let num_samples = block.len().min(self.render_buffer.max_samples());
        debug_assert_eq!(num_samples, block.len(), "block larger than prepared size");

        self.render_buffer.set_current_size(1, num_samples);
        self.render_buffer.clear();
        let render = self.render_buffer.channel_mut(0);

        for (vec_index, mode) in self.modes[..self.num_vec_modes_to_process]
            .iter_mut()
            .enumerate()
        {
            for (n, (out, &x)) in render.iter_mut().zip(block).enumerate() {
                modulator(mode, vec_index, n);
                *out += Sample::reduce_add(mode.process_sample(x));
            }
        }
    }

    /// Mono output of the last `process` call.
    pub fn render_buffer(&self) -> &[f32] {
        self.render_buffer.channel(0)
    }

    fn update_amplitude_normalization_factor(&mut self, normalize: f32) {
        let lowest_mode_mag = self.amplitude_data.first().map_or(0.0, |a| a.norm());
        self.amplitude_normalization_factor = if normalize > 0.0 && lowest_mode_mag > 0.0 {
            normalize / lowest_mode_mag
        } else {
            1.0
        };
    }

    fn set_mode_amplitudes_internal(&mut self) {
        let amps = &self.amplitude_data;
        let factor = self.amplitude_normalization_factor;
        let active = self.num_modes_to_process;
        scatter_modes(
            &mut self.modes,
            |index| {
                if index < active {
                    amps[index] * factor
                } else {
                    Complex::default()
                }
            },
            |mode, lanes| {
                mode.set_amp(
                    f32x4::from(lanes.map(|a| a.re)),
                    f32x4::from(lanes.map(|a| a.im)),
                );
            },
        );
    }
}

impl<const MAX_MODES: usize> Default for ModalFilterBank<MAX_MODES> {
    fn default() -> Self {
        Self::new()
    }
}

/// Gathers one value per lane with `per_mode(mode_index)` and hands each
/// vector resonator its four values.
fn scatter_modes<T: Copy + Default>(
    modes: &mut [VecModalFilter],
    mut per_mode: impl FnMut(usize) -> T,
    mut per_vec_mode: impl FnMut(&mut VecModalFilter, [T; VecModalFilter::LANES]),
) {
    for (vec_index, mode) in modes.iter_mut().enumerate() {
        let mut lanes = [T::default(); VecModalFilter::LANES];
        for (lane, value) in lanes.iter_mut().enumerate() {
            *value = per_mode(vec_index * VecModalFilter::LANES + lane);
        }
        per_vec_mode(mode, lanes);
    }
}

//! Tonal Synth - modal synthesis for the tonal DSP engine
//!
//! A mode is a decaying sinusoid: a resonant frequency, a T60 decay time and
//! a complex amplitude setting its level and phase. Summing many modes
//! excited by the same input models struck or plucked bodies, bells, plates
//! and springs.
//!
//! # Core Components
//!
//! - [`ModalFilter`] - single complex one-pole ("phasor") resonator
//! - [`VecModalFilter`] - four resonators evaluated in one `f32x4`
//! - [`ModalFilterBank`] - a fixed-capacity bank of modes rendered to a mono
//!   buffer, with per-mode setters, normalization and partial activation
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! tonal-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example: Struck Bar
//!
//! ```rust
//! use tonal_synth::ModalFilterBank;
//!
//! // Inharmonic partials of a free bar
//! let ratios = [1.0, 2.756, 5.404, 8.933];
//! let freqs = ratios.map(|r| 220.0 * r);
//!
//! let mut bar = ModalFilterBank::<4>::new();
//! bar.prepare(48000.0, 256);
//! bar.set_mode_frequencies(&freqs, 1.0);
//! bar.set_mode_decays(&[2.0, 1.2, 0.7, 0.4]);
//! bar.set_mode_amplitudes(&[1.0, 0.6, 0.4, 0.25], 0.2);
//!
//! let mut strike = [0.0_f32; 256];
//! strike[0] = 1.0;
//! bar.process(&strike);
//! assert!(bar.render_buffer().iter().any(|&y| y != 0.0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod modal;

pub use modal::{ModalFilter, ModalFilterBank, VecModalFilter, mode_location, tau_to_t60};

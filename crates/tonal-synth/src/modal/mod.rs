//! Modal synthesis: complex one-pole resonators and a SIMD bank of them.
//!
//! - [`ModalFilter`] - one resonator, generic over the float type
//! - [`VecModalFilter`] - four resonators packed into `f32x4` lanes
//! - [`ModalFilterBank`] - up to `MAX_MODES` resonators summed to mono

mod bank;
mod filter;
mod simd;

pub use bank::{ModalFilterBank, mode_location, tau_to_t60};
pub use filter::ModalFilter;
pub use simd::VecModalFilter;

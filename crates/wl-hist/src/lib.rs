//! Bin-indexed histograms backing the Wang-Landau estimator.
//!
//! One [`Histogram`] type serves the visit counts H, the accumulated log
//! density of states G and the reference counts S. Bins are half-open and a
//! lookup outside the window is a [`wl_core::WlError::Domain`] error.

mod flatness;
mod histogram;

pub use flatness::Flatness;
pub use histogram::Histogram;

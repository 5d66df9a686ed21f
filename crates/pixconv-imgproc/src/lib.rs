#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// accelerator backends honoring the multi-pass contract.
pub mod accel;

/// image filtering module.
pub mod filter;

/// image comparison metrics module.
pub mod metrics;

/// module containing the multi-threaded pass engine.
pub mod parallel;

pub mod probe;

pub use probe::{HttpProber, Probe, ProbeError, ProbeResult};

//! Scheduled surfaces - the fixed set of publication channels.

pub mod registry;

pub use registry::{ScheduledSurface, SurfaceRegistry};

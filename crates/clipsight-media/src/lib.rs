//! Media plumbing for the Clipsight analysis pipeline.
//!
//! This crate covers everything between "a video source" and "ordered
//! per-frame detections":
//! - [`source`]: acquiring a local copy of a URL or file source
//! - [`probe`]: best-effort technical metadata via FFprobe
//! - [`sampler`]: representative still-frame extraction via FFmpeg
//! - [`detect`]: the three-tier object-detection backend cascade

pub mod detect;
pub mod error;
pub mod probe;
pub mod sampler;
pub mod source;

pub use detect::{detect_batch, select_backend, DetectionBackend, DetectorConfig};
pub use error::{MediaError, MediaResult};
pub use probe::probe_metadata;
pub use sampler::{sample_frames, Frame, FrameBatch, SamplerConfig};
pub use source::{LocalVideo, VideoSource};

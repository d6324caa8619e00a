//! Audio resources: the backend seam, resource events, readiness gating and streaming

mod error;
pub mod http_backend;
pub mod probe;
pub mod readiness;
pub mod resource;
pub mod scripted;

pub use error::{AudioError, PlaybackError};
pub use http_backend::{HttpBackend, HttpBackendConfig};
pub use probe::{probe_stream, DecoderInfo, ProbeReport};
pub use readiness::{await_ready, GateOutcome, Readiness, ReadinessGate, DEFAULT_READINESS_TIMEOUT};
pub use resource::{EventSink, MediaBackend, MediaResource, ResourceEvent, ResourceToken, TaggedEvent};
pub use scripted::{PlayResponse, ScriptedBackend, ScriptedCall};

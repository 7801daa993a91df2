// Detection Module
// AI-content detection organized into:
// - patterns: lexical profile (sentence rhythm, stock phrases, personal voice)
// - fallback: heuristic scoring over the profile
// - remote: chat-model verdict parsing
// - detector: remote-then-fallback orchestration

pub mod patterns;
pub mod fallback;
pub mod remote;
pub mod detector;

pub use patterns::{analyze_text_patterns, GENERIC_PHRASES};
pub use fallback::{fallback_detection, fallback_likelihood, FALLBACK_REASONING};
pub use remote::{parse_verdict, remote_detection, remote_likelihood, RemoteVerdict};
pub use detector::{detect, detect_with_source, DetectionSource};

// AcademicFlow Core Services

pub mod text_processor;
pub mod config_store;
pub mod providers;
pub mod detection;
pub mod assistant;

pub use config_store::*;
pub use providers::*;

pub use detection::{
    analyze_text_patterns,
    detect,
    detect_with_source,
    fallback_detection,
    DetectionSource,
};
pub use assistant::{assist, generate_citation, verify_citations};

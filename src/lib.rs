pub mod api;
pub mod dialect;
pub mod document;
pub mod error;
pub mod normalize;
pub mod segmenter;
pub mod validators;
mod assembler;
mod sections;

pub use api::{analyze_batch, analyze_capture, CaptureAnalysis, DeviceCapture, DeviceReport};
pub use dialect::Dialect;
pub use document::DeviceDocument;
pub use error::NetdocError;

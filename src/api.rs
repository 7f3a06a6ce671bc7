//! Public entry points.
//!
//! [`analyze_capture`] turns one device's raw CLI capture into a
//! [`CaptureAnalysis`] holding the canonical document, ready for JSON or
//! YAML serialization. [`analyze_batch`] runs many captures across a worker
//! pool; each device parses independently and a failure stays confined to
//! its own report.

use crate::assembler::assemble;
use crate::dialect::{resolve_dialect, Dialect};
use crate::document::DeviceDocument;
use crate::error::NetdocError;
use crate::segmenter::segment;
use log::info;
use rayon::prelude::*;
use serde::{Serialize, Serializer};

/// The result of successfully analyzing one capture. Owns the document
/// outright; the parser keeps no reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureAnalysis {
    pub document: DeviceDocument,
}

impl Serialize for CaptureAnalysis {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.document.serialize(serializer)
    }
}

impl CaptureAnalysis {
    /// Serializes the document into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the document into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }
}

/// Analyzes one device's combined CLI captures.
///
/// This is the primary entry point. The blob is segmented, the dialect
/// resolved (sniffed from the text, falling back to `hint`), every section
/// parser run, and the normalized document assembled. `device_id` only tags
/// the output and its diagnostics; it never influences parsing.
///
/// # Errors
///
/// Returns [`NetdocError`] only when no dialect can be resolved — every
/// other problem is recorded in the document's `diagnostics` instead of
/// failing the parse.
pub fn analyze_capture(
    source: &str,
    device_id: &str,
    hint: Option<Dialect>,
) -> Result<CaptureAnalysis, NetdocError> {
    let sections = segment(source);
    let dialect = resolve_dialect(&sections, hint, source, device_id)?;
    info!("analyzing capture for {device_id} as {dialect}");
    let document = assemble(&sections, dialect, device_id);
    Ok(CaptureAnalysis { document })
}

/// One device's raw capture in a batch request.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapture {
    pub device_id: String,
    pub source: String,
    pub hint: Option<Dialect>,
}

/// The per-device outcome of a batch run.
#[derive(Debug)]
pub struct DeviceReport {
    pub device_id: String,
    pub result: Result<CaptureAnalysis, NetdocError>,
}

/// Analyzes a batch of captures in parallel. Each parse is an independent,
/// side-effect-free transform, so devices fan out across the rayon pool with
/// no shared state; result order follows input order.
pub fn analyze_batch(captures: Vec<DeviceCapture>) -> Vec<DeviceReport> {
    captures
        .into_par_iter()
        .map(|capture| DeviceReport {
            result: analyze_capture(&capture.source, &capture.device_id, capture.hint),
            device_id: capture.device_id,
        })
        .collect()
}

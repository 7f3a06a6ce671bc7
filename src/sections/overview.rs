//! Device overview: hostname, platform, software version, serial, role.

use super::{lines_of, outcome, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::{DeviceRole, Overview};
use crate::segmenter::{Section, SectionKind};
use log::debug;

pub fn parse(sections: &[Section], dialect: Dialect) -> SectionOutcome<Overview> {
    let config = lines_of(sections, &[SectionKind::ConfigGlobal]);
    let version = lines_of(sections, &[SectionKind::Version]);

    let mut overview = Overview {
        vendor: dialect.vendor_tag().to_string(),
        ..Overview::default()
    };

    // The hostname comes from the explicit naming directive only. Prompt
    // decoration is cosmetic, may lag the configured name, and is discarded
    // by the segmenter before it ever reaches this parser.
    let directive = dialect.naming_directive();
    for line in &config {
        if let Some(rest) = line
            .trim_start()
            .strip_prefix(directive)
            .filter(|r| r.starts_with(char::is_whitespace))
        {
            if let Some(name) = rest.split_whitespace().next() {
                overview.hostname = Some(name.to_string());
            }
        }
    }

    for line in &version {
        parse_version_line(line, &mut overview);
    }
    if overview.role_hint.is_none() {
        overview.role_hint = overview.model.as_deref().and_then(role_from_model);
    }

    debug!(
        "overview: hostname={:?} model={:?}",
        overview.hostname, overview.model
    );
    let records = [
        overview.hostname.is_some(),
        overview.model.is_some(),
        overview.serial_number.is_some(),
        overview.software_version.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();
    let saw_input = !config.is_empty() || !version.is_empty();
    outcome(overview, Vec::new(), saw_input, records)
}

fn parse_version_line(line: &str, overview: &mut Overview) {
    let trimmed = line.trim();

    // Software version, either family.
    if overview.software_version.is_none() {
        if let Some(idx) = trimmed.find("Version ") {
            let tail = &trimmed[idx + "Version ".len()..];
            let version: String = tail
                .chars()
                .take_while(|c| !c.is_whitespace() && *c != ',')
                .collect();
            if version.chars().any(|c| c.is_ascii_digit()) {
                overview.software_version = Some(version);
            }
        }
    }

    if let Some((key, value)) = trimmed.split_once(':') {
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if key.contains("model number") || key == "model" {
            overview.model = Some(value.to_string());
        } else if key.contains("serial number") || key.starts_with("esn") {
            overview.serial_number = Some(value.to_string());
        }
        return;
    }

    // The uptime banner names the platform:
    // `Quidway S5720-28X-SI-AC Routing Switch uptime is 12 weeks` or
    // `cisco WS-C2960X-48TS-L (...) processor`.
    if overview.model.is_none() {
        if let Some(idx) = trimmed.find(" uptime is ") {
            let head: Vec<&str> = trimmed[..idx].split_whitespace().collect();
            if head.len() >= 2 {
                overview.model = Some(head[1].to_string());
            }
        } else if let Some(rest) = trimmed.strip_prefix("cisco ") {
            if let Some(model) = rest.split_whitespace().next() {
                if model.chars().any(|c| c.is_ascii_digit()) {
                    overview.model = Some(model.to_string());
                }
            }
        }
    }
}

/// Coarse role classification from the platform string. Only a hint; absent
/// when the model does not give it away.
fn role_from_model(model: &str) -> Option<DeviceRole> {
    let upper = model.to_ascii_uppercase();
    const SWITCH_MARKERS: &[&str] = &["WS-C", "C9200", "C9300", "C9500", "S5", "S6", "CE", "C2960", "C3560", "C3850"];
    const ROUTER_MARKERS: &[&str] = &["ISR", "ASR", "CSR", "C8", "AR", "NE"];
    if SWITCH_MARKERS.iter().any(|m| upper.starts_with(m)) {
        return Some(DeviceRole::Switch);
    }
    if ROUTER_MARKERS.iter().any(|m| upper.starts_with(m)) {
        return Some(DeviceRole::Router);
    }
    None
}

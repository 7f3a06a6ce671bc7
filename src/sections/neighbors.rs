//! Discovery-protocol neighbors (CDP and LLDP).
//!
//! Both the multi-line detail format and the one-row brief tables are
//! handled. Cross-protocol duplicates are left in place here; the
//! normalizer collapses them once all sections are parsed.

use super::{outcome, sections_of, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::{DiscoveryProtocol, Neighbor};
use crate::normalize::canonical_interface;
use crate::segmenter::{Section, SectionKind};
use crate::validators::is_interface_name;
use log::debug;

pub fn parse(sections: &[Section], dialect: Dialect) -> SectionOutcome<Vec<Neighbor>> {
    let mut neighbors = Vec::new();
    let mut warnings = Vec::new();
    let mut saw_input = false;

    for section in sections_of(sections, &[SectionKind::Neighbors]) {
        saw_input = true;
        let protocol = section_protocol(section);
        let before = neighbors.len();
        parse_detail_blocks(&section.lines, dialect, protocol, &mut neighbors);
        if neighbors.len() == before {
            parse_brief_rows(&section.lines, dialect, protocol, &mut neighbors, &mut warnings);
        }
    }

    let records = neighbors.len();
    debug!("neighbors: {records} records");
    outcome(neighbors, warnings, saw_input, records)
}

/// The command banner says which protocol produced the section; the detail
/// line shapes are the fallback when the banner is missing.
fn section_protocol(section: &Section) -> DiscoveryProtocol {
    if let Some(banner) = &section.banner {
        if banner.contains("lldp") {
            return DiscoveryProtocol::Lldp;
        }
        if banner.contains("cdp") {
            return DiscoveryProtocol::Cdp;
        }
    }
    if section
        .lines
        .iter()
        .any(|l| l.contains("Port ID (outgoing port)"))
    {
        DiscoveryProtocol::Cdp
    } else {
        DiscoveryProtocol::Lldp
    }
}

/// `show cdp neighbors detail` blocks:
/// ```text
/// Device ID: CORE1.example.com
/// Platform: cisco WS-C3850,  Capabilities: Switch IGMP
/// Interface: GigabitEthernet0/1,  Port ID (outgoing port): GigabitEthernet1/0/24
/// ```
fn parse_detail_blocks(
    lines: &[String],
    dialect: Dialect,
    protocol: DiscoveryProtocol,
    neighbors: &mut Vec<Neighbor>,
) {
    let mut pending: Option<Neighbor> = None;
    for line in lines {
        let trimmed = line.trim();
        if let Some(device) = trimmed
            .strip_prefix("Device ID:")
            .or_else(|| trimmed.strip_prefix("System Name:"))
        {
            if let Some(done) = pending.take() {
                neighbors.push(done);
            }
            pending = Some(Neighbor {
                device_id: device.trim().to_string(),
                local_interface: String::new(),
                remote_interface: None,
                platform: None,
                capabilities: Vec::new(),
                protocol,
            });
            continue;
        }
        let Some(neighbor) = &mut pending else { continue };

        if let Some(rest) = trimmed.strip_prefix("Platform:") {
            let platform = rest.split(',').next().unwrap_or("").trim();
            if !platform.is_empty() {
                neighbor.platform = Some(platform.to_string());
            }
        }
        if let Some(idx) = trimmed.find("Capabilities:") {
            neighbor.capabilities = trimmed[idx + "Capabilities:".len()..]
                .split([' ', ','])
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(rest) = trimmed.strip_prefix("Interface:") {
            let local = rest.split(',').next().unwrap_or("").trim();
            neighbor.local_interface = canonical_interface(local, dialect);
            if let Some(idx) = trimmed.find("Port ID (outgoing port):") {
                let remote = trimmed[idx + "Port ID (outgoing port):".len()..].trim();
                neighbor.remote_interface = Some(canonical_interface(remote, dialect));
            }
        }
        if let Some(rest) = trimmed.strip_prefix("Port ID:") {
            neighbor.remote_interface = Some(canonical_interface(rest.trim(), dialect));
        }
    }
    if let Some(done) = pending.take() {
        neighbors.push(done);
    }
}

/// Brief rows. IOS leads with the device id
/// (`CORE1   Gi0/1   150   S I   WS-C3850   Gi1/0/24`), VRP's LLDP brief
/// leads with the local interface
/// (`GE0/0/1   CORE1   GE1/0/24   108`).
fn parse_brief_rows(
    lines: &[String],
    dialect: Dialect,
    protocol: DiscoveryProtocol,
    neighbors: &mut Vec<Neighbor>,
    warnings: &mut Vec<String>,
) {
    for line in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            continue;
        }

        if is_interface_name(tokens[0]) {
            // Local-interface-first layout.
            let Some(remote) = tokens.get(2).filter(|t| is_interface_name(t)) else {
                warnings.push(format!("neighbor row without interfaces: {}", line.trim()));
                continue;
            };
            neighbors.push(Neighbor {
                device_id: tokens[1].to_string(),
                local_interface: canonical_interface(tokens[0], dialect),
                remote_interface: Some(canonical_interface(remote, dialect)),
                platform: None,
                capabilities: Vec::new(),
                protocol,
            });
            continue;
        }

        // Device-id-first layout: local interface is the second token, the
        // remote port the last.
        if tokens.len() >= 4 && is_interface_name(tokens[1]) {
            let Some(remote) = tokens.last().filter(|t| is_interface_name(t)) else {
                continue;
            };
            let capabilities = tokens[2..tokens.len() - 1]
                .iter()
                .filter(|t| t.len() <= 2 && t.chars().all(|c| c.is_ascii_uppercase()))
                .map(|t| t.to_string())
                .collect();
            neighbors.push(Neighbor {
                device_id: tokens[0].to_string(),
                local_interface: canonical_interface(tokens[1], dialect),
                remote_interface: Some(canonical_interface(remote, dialect)),
                platform: None,
                capabilities,
                protocol,
            });
        }
    }
}

//! Spanning-tree state: protocol variant, root role, per-instance records.

use super::{outcome, sections_of, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::{SpanningTree, StpInstance, StpVariant};
use crate::normalize::canonical_interface;
use crate::segmenter::{Section, SectionKind};
use crate::validators::is_interface_name;
use std::collections::BTreeMap;

pub fn parse(sections: &[Section], dialect: Dialect) -> SectionOutcome<Option<SpanningTree>> {
    let mut saw_input = false;
    let mut state = StpState::default();
    for section in sections_of(sections, &[SectionKind::SpanningTree]) {
        saw_input = true;
        match dialect {
            Dialect::Ios => state.parse_ios(&section.lines),
            Dialect::Vrp => state.parse_vrp(&section.lines),
        }
    }

    let mut warnings = Vec::new();
    let records = state.instances.len();
    let value = if saw_input && (records > 0 || state.protocol.is_some()) {
        let protocol = state.protocol.unwrap_or_else(|| {
            warnings.push("spanning-tree variant not reported; assuming dialect default".to_string());
            match dialect {
                Dialect::Ios => StpVariant::Pvst,
                Dialect::Vrp => StpVariant::Mstp,
            }
        });
        let instances: Vec<StpInstance> = state.instances.into_values().collect();
        Some(SpanningTree {
            protocol,
            is_root: instances.iter().any(|i| i.is_root),
            instances,
        })
    } else {
        None
    };
    outcome(value, warnings, saw_input, records)
}

#[derive(Default)]
struct StpState {
    protocol: Option<StpVariant>,
    instances: BTreeMap<u16, StpInstance>,
    current: Option<u16>,
    in_root_block: bool,
}

impl StpState {
    fn instance(&mut self, id: u16) -> &mut StpInstance {
        self.instances.entry(id).or_insert_with(|| StpInstance {
            instance: id,
            is_root: false,
            root_id: None,
            bridge_id: None,
            priority: None,
            root_port: None,
        })
    }

    /// IOS `show spanning-tree`: a `VLAN0010` heading opens an instance,
    /// followed by indented `Root ID` / `Bridge ID` blocks.
    fn parse_ios(&mut self, lines: &[String]) {
        for line in lines {
            let trimmed = line.trim();

            if let Some(id) = trimmed
                .strip_prefix("VLAN")
                .and_then(|rest| rest.parse::<u16>().ok())
            {
                self.current = Some(id);
                self.in_root_block = false;
                self.instance(id);
                continue;
            }
            let Some(current) = self.current else { continue };

            if let Some(rest) = trimmed.strip_prefix("Spanning tree enabled protocol ") {
                self.protocol = match rest.trim() {
                    "ieee" => Some(StpVariant::Pvst),
                    "rstp" => Some(StpVariant::RapidPvst),
                    "mstp" => Some(StpVariant::Mstp),
                    _ => self.protocol,
                };
            } else if trimmed.starts_with("Root ID") {
                self.in_root_block = true;
                if let Some(priority) = last_number(trimmed) {
                    self.instance(current).priority = Some(priority);
                }
            } else if trimmed.starts_with("Bridge ID") {
                self.in_root_block = false;
            } else if let Some(address) = trimmed.strip_prefix("Address") {
                let address = address.trim().to_string();
                let in_root_block = self.in_root_block;
                let instance = self.instance(current);
                if in_root_block {
                    instance.root_id = Some(address);
                } else {
                    instance.bridge_id = Some(address);
                }
            } else if trimmed.contains("This bridge is the root") {
                self.instance(current).is_root = true;
            } else {
                // Interface role rows: `Gi0/1   Root FWD 4  128.1  P2p`
                let mut tokens = trimmed.split_whitespace();
                if let (Some(first), Some(role)) = (tokens.next(), tokens.next()) {
                    if is_interface_name(first) && role == "Root" {
                        self.instance(current).root_port =
                            Some(canonical_interface(first, Dialect::Ios));
                    }
                }
            }
        }
    }

    /// VRP `display stp` and its `brief` table.
    fn parse_vrp(&mut self, lines: &[String]) {
        let mut cist_bridge: Option<String> = None;
        let mut cist_root: Option<String> = None;
        for line in lines {
            let trimmed = line.trim();

            if let Some(idx) = trimmed.find("[Mode ") {
                let mode: String = trimmed[idx + "[Mode ".len()..]
                    .chars()
                    .take_while(|c| *c != ']')
                    .collect();
                self.protocol = match mode.as_str() {
                    "MSTP" => Some(StpVariant::Mstp),
                    "RSTP" => Some(StpVariant::Rstp),
                    "STP" => Some(StpVariant::Pvst),
                    _ => self.protocol,
                };
            } else if let Some(value) = trimmed.strip_prefix("CIST Bridge") {
                cist_bridge = value.trim_start_matches([':', ' ']).split_whitespace().next().map(str::to_string);
            } else if let Some(value) = trimmed.strip_prefix("CIST Root/ERPC") {
                cist_root = value.trim_start_matches([':', ' ']).split_whitespace().next().map(str::to_string);
            } else {
                // Brief rows: ` 0    GigabitEthernet0/0/1  ROOT  FORWARDING  NONE`
                let tokens: Vec<&str> = trimmed.split_whitespace().collect();
                if tokens.len() >= 3 {
                    if let Ok(id) = tokens[0].parse::<u16>() {
                        if is_interface_name(tokens[1]) {
                            let instance = self.instance(id);
                            if tokens[2].eq_ignore_ascii_case("root") {
                                instance.root_port =
                                    Some(canonical_interface(tokens[1], Dialect::Vrp));
                            }
                        }
                    }
                }
            }
        }

        if cist_bridge.is_some() || cist_root.is_some() {
            let is_root = match (&cist_bridge, &cist_root) {
                (Some(bridge), Some(root)) => bridge_mac(bridge) == bridge_mac(root),
                _ => false,
            };
            let instance = self.instance(0);
            instance.bridge_id = cist_bridge;
            instance.root_id = cist_root;
            instance.is_root = is_root;
            if let Some(root_id) = &instance.root_id {
                if let Some((priority, _)) = root_id.split_once('.') {
                    instance.priority = priority.parse().ok();
                }
            }
        }
    }
}

/// `32768.00e0-fc11-2233` → the MAC part, for root-vs-bridge comparison.
fn bridge_mac(id: &str) -> &str {
    id.split_once('.').map_or(id, |(_, mac)| mac)
}

fn last_number(line: &str) -> Option<u32> {
    line.split_whitespace().rev().find_map(|t| t.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionStatus;
    use crate::segmenter::segment;

    #[test]
    fn test_ios_root_bridge_instance() {
        let source = "\
SW1#show spanning-tree
VLAN0010
  Spanning tree enabled protocol rstp
  Root ID    Priority    24586
             Address     0011.2233.4455
             This bridge is the root
  Bridge ID  Priority    24586  (priority 24576 sys-id-ext 10)
             Address     0011.2233.4455
Interface           Role Sts Cost      Prio.Nbr Type
Gi0/1               Desg FWD 4         128.1    P2p
";
        let parsed = parse(&segment(source), Dialect::Ios);
        let stp = parsed.value.unwrap();
        assert_eq!(stp.protocol, StpVariant::RapidPvst);
        assert!(stp.is_root);
        assert_eq!(stp.instances.len(), 1);
        assert_eq!(stp.instances[0].instance, 10);
        assert_eq!(stp.instances[0].root_id.as_deref(), Some("0011.2233.4455"));
        assert_eq!(stp.instances[0].priority, Some(24586));
    }

    #[test]
    fn test_ios_non_root_with_root_port() {
        let source = "\
SW1#show spanning-tree
VLAN0020
  Spanning tree enabled protocol ieee
  Root ID    Priority    24596
             Address     00aa.bb11.cc22
  Bridge ID  Priority    32788
             Address     0011.2233.4455
Interface           Role Sts Cost      Prio.Nbr Type
Gi0/1               Root FWD 4         128.1    P2p
Gi0/2               Altn BLK 4         128.2    P2p
";
        let parsed = parse(&segment(source), Dialect::Ios);
        let stp = parsed.value.unwrap();
        assert_eq!(stp.protocol, StpVariant::Pvst);
        assert!(!stp.is_root);
        assert_eq!(
            stp.instances[0].root_port.as_deref(),
            Some("GigabitEthernet0/1")
        );
    }

    #[test]
    fn test_vrp_cist_root_detection() {
        let source = "\
<SW>display stp
-------[CIST Global Info][Mode MSTP]-------
CIST Bridge         :24576.0011-2233-4455
CIST Root/ERPC      :24576.0011-2233-4455 / 0
";
        let parsed = parse(&segment(source), Dialect::Vrp);
        let stp = parsed.value.unwrap();
        assert_eq!(stp.protocol, StpVariant::Mstp);
        assert!(stp.is_root);
        assert_eq!(stp.instances[0].priority, Some(24576));
    }

    #[test]
    fn test_absent_section_yields_none() {
        let parsed = parse(&[], Dialect::Ios);
        assert!(parsed.value.is_none());
        assert_eq!(parsed.status, SectionStatus::Failed);
    }
}

//! Interfaces and link-aggregation groups.
//!
//! Records are merged from two directions: configuration blocks (mode,
//! VLANs, addresses, bundling) and status tables (admin/oper state). The
//! merge key is the canonical interface name, so abbreviated spellings in a
//! status table land on the record created from the config block.
//!
//! Aggregates accumulate in a map keyed by group id for the whole parse.
//! Both the per-interface bundling line and the summary table feed the same
//! accumulator; the assembler flattens it exactly once, which is what keeps
//! a group mentioned in both views from appearing twice.

use super::{outcome, sections_of, trailing_id, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::{AggregateGroup, Interface, SwitchportMode};
use crate::normalize::canonical_interface;
use crate::segmenter::{Section, SectionKind};
use crate::validators::{is_interface_name, parse_vlan_id, parse_vlan_ranges, Cidr};
use log::debug;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceSet {
    pub interfaces: Vec<Interface>,
    pub aggregates: BTreeMap<u32, AggregateGroup>,
}

struct InterfaceParser {
    dialect: Dialect,
    interfaces: BTreeMap<String, Interface>,
    aggregates: BTreeMap<u32, AggregateGroup>,
    warnings: Vec<String>,
}

pub fn parse(sections: &[Section], dialect: Dialect) -> SectionOutcome<InterfaceSet> {
    let mut parser = InterfaceParser {
        dialect,
        interfaces: BTreeMap::new(),
        aggregates: BTreeMap::new(),
        warnings: Vec::new(),
    };

    let mut saw_input = false;
    for section in sections_of(sections, &[SectionKind::ConfigInterface]) {
        saw_input = true;
        parser.parse_config_block(&section.lines);
    }
    for section in sections_of(sections, &[SectionKind::InterfaceStatus]) {
        saw_input = true;
        parser.parse_status_lines(&section.lines);
    }
    for section in sections_of(sections, &[SectionKind::EtherChannel]) {
        saw_input = true;
        match dialect {
            Dialect::Ios => parser.parse_etherchannel_summary(&section.lines),
            Dialect::Vrp => parser.parse_eth_trunk_output(&section.lines),
        }
    }

    debug!(
        "interfaces: {} records, {} aggregates",
        parser.interfaces.len(),
        parser.aggregates.len()
    );
    let record_count = parser.interfaces.len() + parser.aggregates.len();
    let value = InterfaceSet {
        interfaces: parser.interfaces.into_values().collect(),
        aggregates: parser.aggregates,
    };
    outcome(value, parser.warnings, saw_input, record_count)
}

impl InterfaceParser {
    fn entry(&mut self, canonical_name: String) -> &mut Interface {
        self.interfaces
            .entry(canonical_name.clone())
            .or_insert_with(|| Interface::new(canonical_name))
    }

    /// Registers membership of `member` in aggregate `id`, creating the
    /// group on first mention. Set semantics on members make repeated
    /// mentions idempotent.
    fn join_aggregate(&mut self, id: u32, member: Option<String>) -> &mut AggregateGroup {
        let prefix = self.dialect.aggregate_prefix();
        let group = self.aggregates.entry(id).or_insert_with(|| AggregateGroup {
            name: format!("{prefix}{id}"),
            members: Default::default(),
            mode: None,
        });
        if let Some(member) = member {
            group.members.insert(member);
        }
        group
    }

    fn parse_config_block(&mut self, lines: &[String]) {
        let Some(opener) = lines.first() else {
            return;
        };
        let Some(raw_name) = opener.trim_start().strip_prefix("interface ") else {
            self.warnings
                .push(format!("interface block without opener: {opener}"));
            return;
        };
        let name = canonical_interface(raw_name, self.dialect);
        if !is_interface_name(&name) {
            self.warnings
                .push(format!("invalid interface name skipped: {raw_name}"));
            return;
        }

        // The aggregate interface's own block (`interface Port-channel1`)
        // registers the group.
        let own_aggregate = name
            .starts_with(self.dialect.aggregate_prefix())
            .then(|| trailing_id(&name))
            .flatten();
        if let Some(id) = own_aggregate {
            self.join_aggregate(id, None);
        }
        self.entry(name.clone());

        for line in &lines[1..] {
            let body = line.trim_start();
            let result = match self.dialect {
                Dialect::Ios => self.apply_ios_config(&name, own_aggregate, body),
                Dialect::Vrp => self.apply_vrp_config(&name, own_aggregate, body),
            };
            if let Err(warning) = result {
                self.warnings.push(warning);
            }
        }
    }

    fn apply_ios_config(
        &mut self,
        name: &str,
        own_aggregate: Option<u32>,
        body: &str,
    ) -> Result<(), String> {
        if let Some(text) = body.strip_prefix("description ") {
            self.entry(name.to_string()).description = Some(text.trim().to_string());
        } else if body == "shutdown" {
            self.entry(name.to_string()).admin_up = false;
        } else if let Some(mode) = body.strip_prefix("switchport mode ") {
            self.entry(name.to_string()).switchport_mode = match mode.trim() {
                "access" => Some(SwitchportMode::Access),
                "trunk" => Some(SwitchportMode::Trunk),
                other => return Err(format!("{name}: unknown switchport mode {other}")),
            };
        } else if let Some(vlan) = body.strip_prefix("switchport access vlan ") {
            self.entry(name.to_string()).access_vlan = Some(
                parse_vlan_id(vlan.trim())
                    .ok_or_else(|| format!("{name}: invalid access vlan {vlan}"))?,
            );
        } else if let Some(vlan) = body.strip_prefix("switchport trunk native vlan ") {
            self.entry(name.to_string()).native_vlan = Some(
                parse_vlan_id(vlan.trim())
                    .ok_or_else(|| format!("{name}: invalid native vlan {vlan}"))?,
            );
        } else if let Some(list) = body
            .strip_prefix("switchport trunk allowed vlan add ")
            .or_else(|| body.strip_prefix("switchport trunk allowed vlan "))
        {
            let ranges = parse_vlan_ranges(list.trim())
                .ok_or_else(|| format!("{name}: invalid allowed vlan list {list}"))?;
            self.entry(name.to_string()).allowed_vlans.extend(ranges);
        } else if let Some(rest) = body.strip_prefix("ip address ") {
            let mut words = rest.split_whitespace();
            if let (Some(addr), Some(mask)) = (words.next(), words.next()) {
                let cidr = Cidr::from_network_and_mask(addr, mask)
                    .ok_or_else(|| format!("{name}: invalid address {addr} {mask}"))?;
                // `secondary` addresses are not tracked; the first wins.
                let entry = self.entry(name.to_string());
                if entry.address.is_none() {
                    entry.address = Some(cidr);
                }
            }
        } else if let Some(rest) = body.strip_prefix("channel-group ") {
            let mut words = rest.split_whitespace();
            let id: u32 = words
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| format!("{name}: invalid channel-group: {rest}"))?;
            self.entry(name.to_string()).aggregate_id = Some(id);
            let mode = match (words.next(), words.next()) {
                (Some("mode"), Some(mode)) => Some(mode.to_string()),
                _ => None,
            };
            let group = self.join_aggregate(id, Some(name.to_string()));
            if group.mode.is_none() {
                group.mode = mode;
            }
        } else if body == "lacp mode active" || body.starts_with("lacp ") {
            if let Some(id) = own_aggregate {
                self.join_aggregate(id, None).mode = Some("lacp".to_string());
            }
        }
        Ok(())
    }

    fn apply_vrp_config(
        &mut self,
        name: &str,
        own_aggregate: Option<u32>,
        body: &str,
    ) -> Result<(), String> {
        if let Some(text) = body.strip_prefix("description ") {
            self.entry(name.to_string()).description = Some(text.trim().to_string());
        } else if body == "shutdown" {
            self.entry(name.to_string()).admin_up = false;
        } else if body == "undo shutdown" {
            self.entry(name.to_string()).admin_up = true;
        } else if let Some(mode) = body.strip_prefix("port link-type ") {
            self.entry(name.to_string()).switchport_mode = match mode.trim() {
                "access" => Some(SwitchportMode::Access),
                "trunk" => Some(SwitchportMode::Trunk),
                "hybrid" => Some(SwitchportMode::Hybrid),
                other => return Err(format!("{name}: unknown link-type {other}")),
            };
        } else if let Some(vlan) = body.strip_prefix("port default vlan ") {
            self.entry(name.to_string()).access_vlan = Some(
                parse_vlan_id(vlan.trim())
                    .ok_or_else(|| format!("{name}: invalid default vlan {vlan}"))?,
            );
        } else if let Some(vlan) = body.strip_prefix("port trunk pvid vlan ") {
            self.entry(name.to_string()).native_vlan = Some(
                parse_vlan_id(vlan.trim())
                    .ok_or_else(|| format!("{name}: invalid pvid {vlan}"))?,
            );
        } else if let Some(list) = body.strip_prefix("port trunk allow-pass vlan ") {
            let ranges = parse_vlan_ranges(list.trim())
                .ok_or_else(|| format!("{name}: invalid allow-pass list {list}"))?;
            self.entry(name.to_string()).allowed_vlans.extend(ranges);
        } else if let Some(rest) = body.strip_prefix("ip address ") {
            let mut words = rest.split_whitespace();
            if let (Some(addr), Some(mask)) = (words.next(), words.next()) {
                let cidr = Cidr::from_network_and_mask(addr, mask)
                    .ok_or_else(|| format!("{name}: invalid address {addr} {mask}"))?;
                let entry = self.entry(name.to_string());
                if entry.address.is_none() {
                    entry.address = Some(cidr);
                }
            }
        } else if let Some(id) = body.strip_prefix("eth-trunk ") {
            let id: u32 = id
                .trim()
                .parse()
                .map_err(|_| format!("{name}: invalid eth-trunk id {id}"))?;
            self.entry(name.to_string()).aggregate_id = Some(id);
            self.join_aggregate(id, Some(name.to_string()));
        } else if let Some(mode) = body.strip_prefix("mode ") {
            if let Some(id) = own_aggregate {
                self.join_aggregate(id, None).mode = Some(mode.trim().to_ascii_lowercase());
            }
        }
        Ok(())
    }

    /// Status tables: `show ip interface brief` / `show interfaces` /
    /// `display interface brief`. Rows are located by validating the first
    /// token as an interface name; headers and legends fail that check.
    fn parse_status_lines(&mut self, lines: &[String]) {
        for line in lines {
            let trimmed = line.trim_start();

            // Long form: `GigabitEthernet0/1 is up, line protocol is up`.
            if let Some((head, tail)) = trimmed.split_once(" is ") {
                if is_interface_name(head) && tail.contains("line protocol is") {
                    let name = canonical_interface(head, self.dialect);
                    let admin_down = tail.starts_with("administratively down");
                    let oper = tail
                        .rsplit("line protocol is ")
                        .next()
                        .map(|s| s.trim_start().starts_with("up"));
                    let entry = self.entry(name);
                    entry.admin_up = !admin_down;
                    entry.oper_up = oper;
                    continue;
                }
            }

            let mut tokens = trimmed.split_whitespace();
            let Some(first) = tokens.next() else { continue };
            if !is_interface_name(first) {
                continue;
            }
            let rest: Vec<&str> = tokens.collect();
            if rest.is_empty() {
                continue;
            }
            let name = canonical_interface(first, self.dialect);
            match self.dialect {
                Dialect::Ios => {
                    // `... administratively down down` or `... up up`
                    let admin_down = trimmed.contains("administratively down");
                    let oper = rest.last().map(|s| *s == "up");
                    let entry = self.entry(name);
                    entry.admin_up = !admin_down;
                    entry.oper_up = oper;
                }
                Dialect::Vrp => {
                    // `<name> <phy> <protocol> ...`; an admin-down port shows
                    // its physical state as `*down`.
                    let phy = rest[0];
                    let entry = self.entry(name);
                    entry.admin_up = phy != "*down";
                    entry.oper_up = Some(phy == "up");
                }
            }
        }
    }

    /// `show etherchannel summary` rows:
    /// `1      Po1(SU)         LACP      Gi0/1(P)  Gi0/2(P)`
    fn parse_etherchannel_summary(&mut self, lines: &[String]) {
        for line in lines {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 2 {
                continue;
            }
            let Ok(id) = tokens[0].parse::<u32>() else {
                continue;
            };
            let bundle = tokens[1].split('(').next().unwrap_or("");
            if !bundle.to_ascii_lowercase().starts_with("po") {
                continue;
            }
            self.join_aggregate(id, None);
            for token in &tokens[2..] {
                let port = token.split('(').next().unwrap_or("");
                if port.eq_ignore_ascii_case("lacp")
                    || port.eq_ignore_ascii_case("pagp")
                    || port == "-"
                {
                    // config-sourced mode wins over the summary column
                    let group = self.join_aggregate(id, None);
                    if port != "-" && group.mode.is_none() {
                        group.mode = Some(port.to_ascii_lowercase());
                    }
                    continue;
                }
                if is_interface_name(port) {
                    let member = canonical_interface(port, self.dialect);
                    self.entry(member.clone()).aggregate_id = Some(id);
                    self.join_aggregate(id, Some(member));
                }
            }
        }
    }

    /// `display eth-trunk` output: a heading per trunk followed by member
    /// rows.
    fn parse_eth_trunk_output(&mut self, lines: &[String]) {
        let mut current: Option<u32> = None;
        for line in lines {
            let trimmed = line.trim();
            if let Some(head) = trimmed.strip_suffix("'s state information is:") {
                current = trailing_id(head);
                if let Some(id) = current {
                    self.join_aggregate(id, None);
                }
                continue;
            }
            if let Some(mode) = trimmed.strip_prefix("WorkingMode:") {
                if let Some(id) = current {
                    self.join_aggregate(id, None).mode =
                        Some(mode.trim().to_ascii_lowercase());
                }
                continue;
            }
            let Some(id) = current else { continue };
            let Some(first) = trimmed.split_whitespace().next() else {
                continue;
            };
            if is_interface_name(first) && !first.starts_with("Eth-Trunk") {
                let member = canonical_interface(first, self.dialect);
                self.entry(member.clone()).aggregate_id = Some(id);
                self.join_aggregate(id, Some(member));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionStatus;
    use crate::segmenter::segment;

    const IOS_CONFIG: &str = "\
interface GigabitEthernet0/1
 description uplink to core
 switchport mode trunk
 switchport trunk native vlan 99
 switchport trunk allowed vlan 10,20,30-40
 channel-group 1 mode active
!
interface GigabitEthernet0/2
 switchport mode access
 switchport access vlan 10
 shutdown
!
interface Vlan10
 ip address 10.0.10.1 255.255.255.0
!
interface Port-channel1
 description agg uplink
 switchport mode trunk
!
";

    fn by_name<'a>(set: &'a InterfaceSet, name: &str) -> &'a Interface {
        set.interfaces
            .iter()
            .find(|i| i.name == name)
            .unwrap_or_else(|| panic!("interface {name} missing"))
    }

    #[test]
    fn test_ios_config_blocks() {
        let sections = segment(IOS_CONFIG);
        let parsed = parse(&sections, Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Success);

        let uplink = by_name(&parsed.value, "GigabitEthernet0/1");
        assert_eq!(uplink.description.as_deref(), Some("uplink to core"));
        assert_eq!(uplink.switchport_mode, Some(SwitchportMode::Trunk));
        assert_eq!(uplink.native_vlan, Some(99));
        assert_eq!(uplink.allowed_vlans.len(), 3);
        assert_eq!(uplink.aggregate_id, Some(1));
        assert!(uplink.admin_up);

        let access = by_name(&parsed.value, "GigabitEthernet0/2");
        assert_eq!(access.switchport_mode, Some(SwitchportMode::Access));
        assert_eq!(access.access_vlan, Some(10));
        assert!(!access.admin_up);

        let svi = by_name(&parsed.value, "Vlan10");
        assert_eq!(svi.address.unwrap().to_string(), "10.0.10.0/24");
    }

    #[test]
    fn test_aggregate_reported_twice_collapses_once() {
        // Config mentions the group via channel-group and the interface
        // block; the summary table mentions it again with both members.
        let source = format!(
            "{IOS_CONFIG}SW1#show etherchannel summary\n1      Po1(SU)         LACP      Gi0/1(P)  Gi0/2(P)\n"
        );
        let sections = segment(&source);
        let parsed = parse(&sections, Dialect::Ios);

        assert_eq!(parsed.value.aggregates.len(), 1);
        let group = &parsed.value.aggregates[&1];
        assert_eq!(group.name, "Port-channel1");
        assert_eq!(
            group.members.iter().cloned().collect::<Vec<_>>(),
            vec![
                "GigabitEthernet0/1".to_string(),
                "GigabitEthernet0/2".to_string()
            ]
        );
        assert_eq!(group.mode.as_deref(), Some("active"));
    }

    #[test]
    fn test_status_table_merges_by_canonical_name() {
        let source = "\
interface GigabitEthernet0/1
 description uplink
!
SW1#show ip interface brief
Interface              IP-Address      OK? Method Status                Protocol
GigabitEthernet0/1     unassigned      YES unset  up                    up
GigabitEthernet0/2     unassigned      YES unset  administratively down down
";
        let sections = segment(source);
        let parsed = parse(&sections, Dialect::Ios);

        let uplink = by_name(&parsed.value, "GigabitEthernet0/1");
        assert_eq!(uplink.description.as_deref(), Some("uplink"));
        assert_eq!(uplink.oper_up, Some(true));
        let down = by_name(&parsed.value, "GigabitEthernet0/2");
        assert!(!down.admin_up);
        assert_eq!(down.oper_up, Some(false));
    }

    #[test]
    fn test_vrp_config_and_trunk_membership() {
        let source = "\
interface GigabitEthernet0/0/1
 description uplink
 port link-type trunk
 port trunk pvid vlan 99
 port trunk allow-pass vlan 10 20 30 to 40
 eth-trunk 1
#
interface Eth-Trunk1
 mode lacp
#
<ACC4>display interface brief
Interface                   PHY   Protocol InUti OutUti   inErrors  outErrors
GigabitEthernet0/0/1        up    up       0.01%  0.01%          0          0
GigabitEthernet0/0/2        *down down         0%     0%          0          0
<ACC4>display eth-trunk 1
Eth-Trunk1's state information is:
WorkingMode: LACP
PortName                      Status   Weight
GigabitEthernet0/0/1          Up       1
";
        let sections = segment(source);
        let parsed = parse(&sections, Dialect::Vrp);

        let uplink = by_name(&parsed.value, "GigabitEthernet0/0/1");
        assert_eq!(uplink.switchport_mode, Some(SwitchportMode::Trunk));
        assert_eq!(uplink.native_vlan, Some(99));
        assert_eq!(uplink.aggregate_id, Some(1));
        assert_eq!(uplink.oper_up, Some(true));

        let down = by_name(&parsed.value, "GigabitEthernet0/0/2");
        assert!(!down.admin_up);

        assert_eq!(parsed.value.aggregates.len(), 1);
        let trunk = &parsed.value.aggregates[&1];
        assert_eq!(trunk.name, "Eth-Trunk1");
        assert_eq!(trunk.mode.as_deref(), Some("lacp"));
        assert!(trunk.members.contains("GigabitEthernet0/0/1"));
    }

    #[test]
    fn test_bad_vlan_list_is_warned_not_fatal() {
        let source = "\
interface GigabitEthernet0/1
 switchport trunk allowed vlan 10,bogus
 switchport mode trunk
!
";
        let sections = segment(source);
        let parsed = parse(&sections, Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Partial);
        assert_eq!(parsed.warnings.len(), 1);
        let iface = by_name(&parsed.value, "GigabitEthernet0/1");
        assert_eq!(iface.switchport_mode, Some(SwitchportMode::Trunk));
        assert!(iface.allowed_vlans.is_empty());
    }

    #[test]
    fn test_no_input_is_failed() {
        let parsed = parse(&[], Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Failed);
        assert!(parsed.value.interfaces.is_empty());
    }
}

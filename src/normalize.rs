//! Cross-cutting normalization: canonical interface spellings, cross-section
//! deduplication, and deterministic ordering of every collection.
//!
//! This stage is pure and total. It never fails; anything odd it notices is
//! resolved by a deterministic tie-break and reported as a warning.

use crate::dialect::Dialect;
use crate::document::{DeviceDocument, Neighbor};
use log::debug;
use std::cmp::Ordering;

/// Rewrites an interface name into its canonical dialect spelling by
/// expanding the abbreviated type prefix: `Gi0/1` → `GigabitEthernet0/1`,
/// `XGE0/0/1` → `XGigabitEthernet0/0/1`, `Po1` → `Port-channel1`.
///
/// The alphabetic prefix must match a table entry exactly (case-insensitive);
/// unknown prefixes pass through unchanged so an unusual interface family is
/// preserved rather than mangled.
pub fn canonical_interface(name: &str, dialect: Dialect) -> String {
    let name = name.trim().trim_end_matches(',');
    let split = name
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphabetic() && *c != '-')
        .map_or(name.len(), |(i, _)| i);
    let (prefix, rest) = name.split_at(split);
    if prefix.is_empty() {
        return name.to_string();
    }
    // `-` is legal inside a type prefix (Eth-Trunk, Port-channel) but a
    // trailing one belongs to the position part, not the prefix.
    let prefix_trimmed = prefix.trim_end_matches('-');
    let lowered = prefix_trimmed.to_ascii_lowercase();
    for (abbrev, expansion) in dialect.interface_expansions() {
        if lowered == *abbrev {
            let tail = &name[prefix_trimmed.len()..];
            return format!("{expansion}{tail}");
        }
    }
    name.to_string()
}

/// Natural-order comparison for interface names: alphabetic runs compare
/// case-insensitively, digit runs compare numerically, so
/// `GigabitEthernet0/2` sorts before `GigabitEthernet0/10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let na = take_number(&mut ai);
                    let nb = take_number(&mut bi);
                    match na.cmp(&nb) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    let ca = ca.to_ascii_lowercase();
                    let cb = cb.to_ascii_lowercase();
                    match ca.cmp(&cb) {
                        Ordering::Equal => {
                            ai.next();
                            bi.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

fn take_number(iter: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut value: u64 = 0;
    while let Some(c) = iter.peek().copied() {
        if let Some(d) = c.to_digit(10) {
            value = value.saturating_mul(10).saturating_add(u64::from(d));
            iter.next();
        } else {
            break;
        }
    }
    value
}

/// Merges discovery records that describe the same adjacency seen through
/// both protocols. Key: peer device id + local interface. The record from
/// the later section occurrence wins on disagreement; each collapse is
/// reported so the consumer can see that two sources were merged.
pub fn dedup_neighbors(neighbors: Vec<Neighbor>, warnings: &mut Vec<String>) -> Vec<Neighbor> {
    let mut merged: Vec<Neighbor> = Vec::new();
    for neighbor in neighbors {
        if let Some(existing) = merged.iter_mut().find(|n| {
            n.device_id == neighbor.device_id && n.local_interface == neighbor.local_interface
        }) {
            if existing.protocol != neighbor.protocol {
                warnings.push(format!(
                    "neighbor {} on {} reported by both discovery protocols; keeping the later record",
                    neighbor.device_id, neighbor.local_interface
                ));
            }
            *existing = neighbor;
        } else {
            merged.push(neighbor);
        }
    }
    merged
}

/// Sorts every document collection by its stable key. Run once, right before
/// assembly freezes the document.
pub fn sort_document(document: &mut DeviceDocument) {
    document
        .interfaces
        .sort_by(|a, b| natural_cmp(&a.name, &b.name));
    document.vlans.sort();
    document
        .routing
        .static_routes
        .sort_by_key(|r| (r.network, r.next_hop));
    if let Some(ospf) = &mut document.routing.ospf {
        ospf.areas.sort();
        ospf.areas.dedup();
        ospf.interfaces.sort();
        ospf.interfaces.dedup();
        ospf.neighbors.sort_by_key(|n| n.neighbor_id);
    }
    if let Some(bgp) = &mut document.routing.bgp {
        bgp.peers.sort_by_key(|p| p.address);
    }
    if let Some(eigrp) = &mut document.routing.eigrp {
        eigrp.neighbors.sort_by_key(|n| n.address);
        eigrp.learned_routes.sort();
        eigrp.learned_routes.dedup();
    }
    if let Some(rip) = &mut document.routing.rip {
        rip.peers.sort();
        rip.peers.dedup();
        rip.learned_routes.sort();
        rip.learned_routes.dedup();
    }
    if let Some(stp) = &mut document.spanning_tree {
        stp.instances.sort_by_key(|i| i.instance);
    }
    document.acls.sort_by(|a, b| a.name.cmp(&b.name));
    document
        .mac_table
        .sort_by_key(|e| (e.vlan, e.address));
    document.arp_table.sort_by_key(|e| e.address);
    document.neighbors.sort_by(|a, b| {
        natural_cmp(&a.local_interface, &b.local_interface)
            .then_with(|| a.device_id.cmp(&b.device_id))
    });
    document
        .redundancy_groups
        .sort_by_key(|g| (g.group_id, g.protocol as u8));
    document.system.syslog_hosts.sort();
    document.system.syslog_hosts.dedup();
    document.diagnostics.sort_by_key(|r| r.domain);
    debug!("document collections sorted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DiscoveryProtocol;

    #[test]
    fn test_canonical_interface_ios() {
        assert_eq!(
            canonical_interface("Gi0/1", Dialect::Ios),
            "GigabitEthernet0/1"
        );
        assert_eq!(
            canonical_interface("Te1/0/48", Dialect::Ios),
            "TenGigabitEthernet1/0/48"
        );
        assert_eq!(canonical_interface("Po1", Dialect::Ios), "Port-channel1");
        assert_eq!(canonical_interface("Vl10", Dialect::Ios), "Vlan10");
        assert_eq!(
            canonical_interface("GigabitEthernet0/1", Dialect::Ios),
            "GigabitEthernet0/1"
        );
        assert_eq!(
            canonical_interface("gi0/1.100", Dialect::Ios),
            "GigabitEthernet0/1.100"
        );
    }

    #[test]
    fn test_canonical_interface_vrp() {
        assert_eq!(
            canonical_interface("GE0/0/1", Dialect::Vrp),
            "GigabitEthernet0/0/1"
        );
        assert_eq!(
            canonical_interface("XGE0/0/1", Dialect::Vrp),
            "XGigabitEthernet0/0/1"
        );
        assert_eq!(
            canonical_interface("Eth-Trunk1", Dialect::Vrp),
            "Eth-Trunk1"
        );
        assert_eq!(canonical_interface("Vlanif100", Dialect::Vrp), "Vlanif100");
    }

    #[test]
    fn test_canonical_interface_unknown_prefix_passthrough() {
        assert_eq!(
            canonical_interface("Dialer1", Dialect::Ios),
            "Dialer1"
        );
    }

    #[test]
    fn test_natural_cmp_orders_numerically() {
        assert_eq!(
            natural_cmp("GigabitEthernet0/2", "GigabitEthernet0/10"),
            Ordering::Less
        );
        assert_eq!(
            natural_cmp("GigabitEthernet0/10", "GigabitEthernet0/2"),
            Ordering::Greater
        );
        assert_eq!(
            natural_cmp("Eth-Trunk1", "GigabitEthernet0/0/1"),
            Ordering::Less
        );
        assert_eq!(natural_cmp("Vlan10", "Vlan10"), Ordering::Equal);
    }

    #[test]
    fn test_dedup_neighbors_later_record_wins() {
        let cdp = Neighbor {
            device_id: "CORE1".to_string(),
            local_interface: "GigabitEthernet0/1".to_string(),
            remote_interface: Some("GigabitEthernet1/0/24".to_string()),
            platform: Some("WS-C3850".to_string()),
            capabilities: vec!["Switch".to_string()],
            protocol: DiscoveryProtocol::Cdp,
        };
        let lldp = Neighbor {
            platform: None,
            capabilities: vec!["Bridge".to_string()],
            protocol: DiscoveryProtocol::Lldp,
            ..cdp.clone()
        };

        let mut warnings = Vec::new();
        let merged = dedup_neighbors(vec![cdp, lldp.clone()], &mut warnings);
        assert_eq!(merged, vec![lldp]);
        assert_eq!(warnings.len(), 1);
    }
}

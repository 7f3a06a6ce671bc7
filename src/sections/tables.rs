//! MAC and ARP tables.
//!
//! Dialect table layouts differ enough that columns are located by scanning
//! each row for a validated address token, never by fixed offsets. Header,
//! totals, and separator rows are discarded by pattern guards before any
//! row-level parsing. A data row whose interface token fails validation is
//! dropped with a warning — the interface field is required, and a null
//! placeholder is worse than an honest gap.

use super::{outcome, sections_of, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::{ArpEntryKind, ArpTableEntry, MacEntryKind, MacTableEntry};
use crate::normalize::canonical_interface;
use crate::segmenter::{Section, SectionKind};
use crate::validators::{is_interface_name, is_table_noise, parse_ipv4, parse_vlan_id, MacAddress};
use log::debug;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

pub fn parse_mac_table(
    sections: &[Section],
    dialect: Dialect,
) -> SectionOutcome<Vec<MacTableEntry>> {
    let mut entries: BTreeMap<(Option<u16>, MacAddress), MacTableEntry> = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut saw_input = false;

    for section in sections_of(sections, &[SectionKind::MacTable]) {
        saw_input = true;
        for line in &section.lines {
            if is_table_noise(line) {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some((mac_idx, address)) = tokens
                .iter()
                .enumerate()
                .find_map(|(i, t)| MacAddress::parse(t).map(|mac| (i, mac)))
            else {
                continue; // not a data row
            };

            let vlan = tokens[..mac_idx]
                .iter()
                .chain(tokens.get(mac_idx + 1..).unwrap_or_default())
                .find_map(|t| parse_vlan_id(t.split('/').next().unwrap_or(t)));
            let entry_type = tokens
                .iter()
                .find_map(|t| mac_entry_kind(t))
                .unwrap_or(MacEntryKind::Dynamic);
            // The port column sits to the right of the address; scanning for
            // the last validating token keeps short type codes (`D-0`) from
            // being mistaken for it.
            let interface = tokens
                .iter()
                .skip(mac_idx + 1)
                .filter(|t| is_interface_name(t))
                .last()
                .map(|t| canonical_interface(t, dialect));

            match interface {
                Some(interface) => {
                    entries.insert(
                        (vlan, address),
                        MacTableEntry {
                            address,
                            vlan,
                            interface,
                            entry_type,
                        },
                    );
                }
                None => warnings.push(format!(
                    "mac table row without a valid interface dropped: {}",
                    line.trim()
                )),
            }
        }
    }

    let records = entries.len();
    debug!("mac table: {records} entries");
    outcome(
        entries.into_values().collect(),
        warnings,
        saw_input,
        records,
    )
}

pub fn parse_arp_table(
    sections: &[Section],
    dialect: Dialect,
) -> SectionOutcome<Vec<ArpTableEntry>> {
    let mut entries: BTreeMap<Ipv4Addr, ArpTableEntry> = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut saw_input = false;

    for section in sections_of(sections, &[SectionKind::ArpTable]) {
        saw_input = true;
        for line in &section.lines {
            if is_table_noise(line) {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some((ip_idx, address)) = tokens
                .iter()
                .enumerate()
                .find_map(|(i, t)| parse_ipv4(t).map(|addr| (i, addr)))
            else {
                continue;
            };
            let Some((mac_idx, mac)) = tokens
                .iter()
                .enumerate()
                .find_map(|(i, t)| MacAddress::parse(t).map(|mac| (i, mac)))
            else {
                warnings.push(format!(
                    "arp row without a hardware address dropped: {}",
                    line.trim()
                ));
                continue;
            };

            let interface = tokens
                .iter()
                .skip(mac_idx + 1)
                .filter(|t| is_interface_name(t) && !t.eq_ignore_ascii_case("arpa"))
                .last()
                .map(|t| canonical_interface(t, dialect));
            let Some(interface) = interface else {
                warnings.push(format!(
                    "arp row without a valid interface dropped: {}",
                    line.trim()
                ));
                continue;
            };

            // Age sits between address and MAC (IOS) or right after the MAC
            // (VRP); a bare `-` or an `I` type code marks the device's own
            // address, an `S` code a configured entry.
            let age_minutes = tokens
                .iter()
                .skip(ip_idx + 1)
                .take_while(|t| !is_interface_name(t))
                .find_map(|t| t.parse::<u32>().ok());
            let type_token = tokens.get(mac_idx + 1).copied().unwrap_or_default();
            let entry_type = if type_token.starts_with('I') || tokens.iter().any(|t| *t == "-") {
                if age_minutes.is_none() {
                    ArpEntryKind::Interface
                } else {
                    ArpEntryKind::Dynamic
                }
            } else if type_token.starts_with('S') {
                ArpEntryKind::Static
            } else {
                ArpEntryKind::Dynamic
            };

            entries.insert(
                address,
                ArpTableEntry {
                    address,
                    mac,
                    interface,
                    age_minutes,
                    entry_type,
                },
            );
        }
    }

    let records = entries.len();
    debug!("arp table: {records} entries");
    outcome(
        entries.into_values().collect(),
        warnings,
        saw_input,
        records,
    )
}

fn mac_entry_kind(token: &str) -> Option<MacEntryKind> {
    match token.to_ascii_lowercase().as_str() {
        "dynamic" => Some(MacEntryKind::Dynamic),
        "static" => Some(MacEntryKind::Static),
        "secure" | "security" => Some(MacEntryKind::Secure),
        "blackhole" => Some(MacEntryKind::Blackhole),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionStatus;
    use crate::segmenter::segment;

    const IOS_MAC: &str = "\
SW1#show mac address-table
          Mac Address Table
-------------------------------------------
Vlan    Mac Address       Type        Ports
----    -----------       --------    -----
  10    0011.2233.4455    DYNAMIC     Gi0/2
  10    00aa.bb11.cc22    STATIC      Po1
Total Mac Addresses for this criterion: 2
";

    #[test]
    fn test_ios_mac_rows_and_garbage() {
        let parsed = parse_mac_table(&segment(IOS_MAC), Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Success);
        assert_eq!(parsed.value.len(), 2);
        let first = &parsed.value[0];
        assert_eq!(first.address.to_string(), "00:11:22:33:44:55");
        assert_eq!(first.vlan, Some(10));
        assert_eq!(first.interface, "GigabitEthernet0/2");
        assert_eq!(first.entry_type, MacEntryKind::Dynamic);
        assert_eq!(parsed.value[1].interface, "Port-channel1");
        assert_eq!(parsed.value[1].entry_type, MacEntryKind::Static);
    }

    #[test]
    fn test_vrp_mac_rows() {
        let source = "\
<SW>display mac-address
MAC address table of slot 0:
-------------------------------------------------------------------------------
MAC Address    VLAN/       PEVLAN CEVLAN Port            Type      LSP/LSR-ID
               VSI/SI                                              MAC-Tunnel
-------------------------------------------------------------------------------
0011-2233-4455 10          -      -      GE0/0/2         dynamic   -
00aa-bb11-cc22 10          -      -      Eth-Trunk1      static    -
-------------------------------------------------------------------------------
Total matching items on slot 0 displayed = 2
";
        let parsed = parse_mac_table(&segment(source), Dialect::Vrp);
        assert_eq!(parsed.value.len(), 2);
        assert_eq!(parsed.value[0].interface, "GigabitEthernet0/0/2");
        assert_eq!(parsed.value[1].interface, "Eth-Trunk1");
        assert_eq!(parsed.value[1].entry_type, MacEntryKind::Static);
    }

    #[test]
    fn test_mac_row_with_bad_interface_is_dropped_not_nulled() {
        let source = "\
SW1#show mac address-table
  10    0011.2233.4455    DYNAMIC     Gi0/2
  10    00aa.bb11.cc22    DYNAMIC     ???
";
        let parsed = parse_mac_table(&segment(source), Dialect::Ios);
        assert_eq!(parsed.value.len(), 1);
        assert_eq!(parsed.status, SectionStatus::Partial);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_mac_duplicate_rows_collapse() {
        let source = "\
SW1#show mac address-table
  10    0011.2233.4455    DYNAMIC     Gi0/2
  10    0011.2233.4455    DYNAMIC     Gi0/2
";
        let parsed = parse_mac_table(&segment(source), Dialect::Ios);
        assert_eq!(parsed.value.len(), 1);
    }

    #[test]
    fn test_ios_arp_rows() {
        let source = "\
SW1#show ip arp
Protocol  Address          Age (min)  Hardware Addr   Type   Interface
Internet  10.0.10.2               12  0011.2233.4455  ARPA   Vlan10
Internet  10.0.10.1                -  00aa.bb11.cc22  ARPA   Vlan10
";
        let parsed = parse_arp_table(&segment(source), Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Success);
        assert_eq!(parsed.value.len(), 2);
        let own = parsed
            .value
            .iter()
            .find(|e| e.address == "10.0.10.1".parse::<Ipv4Addr>().unwrap())
            .unwrap();
        assert_eq!(own.age_minutes, None);
        assert_eq!(own.entry_type, ArpEntryKind::Interface);
        let learned = parsed
            .value
            .iter()
            .find(|e| e.address == "10.0.10.2".parse::<Ipv4Addr>().unwrap())
            .unwrap();
        assert_eq!(learned.age_minutes, Some(12));
        assert_eq!(learned.entry_type, ArpEntryKind::Dynamic);
        assert_eq!(learned.interface, "Vlan10");
    }

    #[test]
    fn test_vrp_arp_rows_and_totals() {
        let source = "\
<SW>display arp
IP ADDRESS      MAC ADDRESS    EXPIRE(M) TYPE        INTERFACE   VPN-INSTANCE
------------------------------------------------------------------------------
10.0.10.2       0011-2233-4455 12        D-0         Vlanif10
10.0.10.1       00e0-fc11-2233           I -         Vlanif10
------------------------------------------------------------------------------
Total:2         Dynamic:1      Static:0  Interface:1
";
        let parsed = parse_arp_table(&segment(source), Dialect::Vrp);
        assert_eq!(parsed.value.len(), 2);
        let own = parsed
            .value
            .iter()
            .find(|e| e.address == "10.0.10.1".parse::<Ipv4Addr>().unwrap())
            .unwrap();
        assert_eq!(own.entry_type, ArpEntryKind::Interface);
        assert!(parsed.value.iter().all(|e| !e.interface.is_empty()));
    }

    #[test]
    fn test_arp_garbage_header_total_rows_rejected() {
        // Header, totals, and separator rows plus two valid rows: exactly
        // two entries, none with a missing interface.
        let source = "\
SW1#show ip arp
Protocol  Address          Age (min)  Hardware Addr   Type   Interface
========
Internet  10.0.10.2               12  0011.2233.4455  ARPA   Vlan10
Internet  10.0.10.3               33  0011.2233.4466  ARPA   Vlan10
Total: 42
";
        let parsed = parse_arp_table(&segment(source), Dialect::Ios);
        assert_eq!(parsed.value.len(), 2);
        assert_eq!(parsed.status, SectionStatus::Success);
    }

    #[test]
    fn test_no_input_is_failed() {
        assert_eq!(
            parse_mac_table(&[], Dialect::Ios).status,
            SectionStatus::Failed
        );
        assert_eq!(
            parse_arp_table(&[], Dialect::Vrp).status,
            SectionStatus::Failed
        );
    }
}

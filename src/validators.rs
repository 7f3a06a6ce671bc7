//! Literal validators shared by every section parser.
//!
//! All functions here are pure checks over single tokens or single lines.
//! Section parsers locate table columns by scanning for a token that passes
//! one of these validators instead of relying on fixed column offsets, so the
//! checks are deliberately strict: a token either matches the canonical shape
//! exactly or it is rejected.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Returns `true` if `token` is a bare dotted-quad IPv4 literal.
pub fn is_ipv4(token: &str) -> bool {
    parse_ipv4(token).is_some()
}

/// Parses a bare dotted-quad IPv4 literal. Rejects surrounding garbage,
/// prefix lengths, and anything the standard library parser rejects.
pub fn parse_ipv4(token: &str) -> Option<Ipv4Addr> {
    token.parse::<Ipv4Addr>().ok()
}

/// An IPv4 network in canonical prefix notation.
///
/// Both vendor spellings of a route destination collapse into this one shape:
/// the combined `10.0.0.0/24` form and the legacy two-field
/// `10.0.0.0 255.255.255.0` form. Host bits below the mask are zeroed on
/// construction so equal networks compare equal regardless of how sloppily
/// they were written in the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cidr {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl Cidr {
    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Option<Self> {
        if prefix_len > 32 {
            return None;
        }
        let mask = if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_len))
        };
        Some(Cidr {
            network: Ipv4Addr::from(u32::from(address) & mask),
            prefix_len,
        })
    }

    /// Parses the combined `a.b.c.d/len` form.
    pub fn from_prefix(token: &str) -> Option<Self> {
        let (addr, len) = token.split_once('/')?;
        Cidr::new(parse_ipv4(addr)?, len.parse().ok()?)
    }

    /// Parses the legacy two-field form: a network address plus a separate
    /// contiguous netmask token.
    pub fn from_network_and_mask(network: &str, mask: &str) -> Option<Self> {
        let mask = u32::from(parse_ipv4(mask)?);
        if mask.count_ones() != mask.leading_ones() {
            return None; // non-contiguous mask
        }
        Cidr::new(parse_ipv4(network)?, mask.count_ones() as u8)
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// The catch-all route destination, `0.0.0.0/0`.
    pub fn is_default(&self) -> bool {
        self.prefix_len == 0 && self.network == Ipv4Addr::UNSPECIFIED
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for Cidr {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cidr::from_prefix(s).ok_or(())
    }
}

impl Serialize for Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Cidr::from_prefix(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid network prefix: {s}")))
    }
}

/// A layer-2 hardware address, stored as raw octets and rendered in the
/// canonical lowercase colon-separated spelling.
///
/// Accepts the three spellings found across the supported dialects:
/// `aa:bb:cc:dd:ee:ff`, `aabb.ccdd.eeff`, and `aabb-ccdd-eeff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn parse(token: &str) -> Option<Self> {
        let groups: Vec<&str> = if token.contains(':') {
            token.split(':').collect()
        } else if token.contains('.') {
            token.split('.').collect()
        } else {
            token.split('-').collect()
        };

        let hex: String = match groups.len() {
            6 if groups.iter().all(|g| g.len() == 2) => groups.concat(),
            3 if groups.iter().all(|g| g.len() == 4) => groups.concat(),
            _ => return None,
        };

        let mut octets = [0u8; 6];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).ok()?;
            octets[i] = u8::from_str_radix(pair, 16).ok()?;
        }
        Some(MacAddress(octets))
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MacAddress::parse(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid hardware address: {s}")))
    }
}

pub fn is_mac(token: &str) -> bool {
    MacAddress::parse(token).is_some()
}

/// Checks whether a token has the canonical shape of an interface name:
/// an alphabetic type prefix followed by a slot/port position containing at
/// least one digit, e.g. `GigabitEthernet0/0/1`, `Eth-Trunk1`, `Vlanif100`,
/// `Gi0/1.100`.
///
/// Hardware-address literals in the dotted vendor spelling would otherwise
/// satisfy the shape (`aabb.ccdd.eeff` starts with a letter), so they are
/// excluded explicitly.
pub fn is_interface_name(token: &str) -> bool {
    if token.is_empty() || is_mac(token) {
        return false;
    }
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    token.chars().any(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | ':'))
}

/// Lines the segmenter drops outright: blanks, pagination artifacts, and
/// separator/banner decoration rows.
pub fn is_garbage_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return true;
    }
    if trimmed.contains("--More--")
        || trimmed.contains("---- More ----")
        || trimmed.starts_with("Press any key to continue")
    {
        return true;
    }
    // Separator rows: nothing but ruling characters (and the odd `+` column
    // joint), at least three of them.
    let ruling = trimmed
        .chars()
        .filter(|c| matches!(c, '-' | '=' | '*' | '_' | '+'))
        .count();
    ruling >= 3 && trimmed.chars().all(|c| matches!(c, '-' | '=' | '*' | '_' | '+' | ' '))
}

/// Table decoration the MAC/ARP parsers discard before row-level parsing:
/// column headers, totals rows, and aging/flag legends. Data rows are never
/// matched because they lead with an address or VLAN token.
pub fn is_table_noise(line: &str) -> bool {
    let trimmed = line.trim_start();
    const NOISE_PREFIXES: &[&str] = &[
        "Total:",
        "Total ",
        "Dynamic:",
        "Static:",
        "Flags:",
        "Codes:",
        "Aging",
        "MAC address table",
        "Mac Address Table",
        "MAC Address",
        "Mac Address",
        "IP ADDRESS",
        "Internet Address",
        "Protocol  Address",
        "Address         ",
        "Vlan    ",
        "VLAN ID",
        "EXPIRE",
    ];
    NOISE_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

/// An inclusive VLAN id range. Single ids are stored with `from == to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VlanRange {
    pub from: u16,
    pub to: u16,
}

impl VlanRange {
    pub fn single(id: u16) -> Self {
        VlanRange { from: id, to: id }
    }

    pub fn contains(&self, id: u16) -> bool {
        (self.from..=self.to).contains(&id)
    }
}

/// Parses an allowed-VLAN list in either dialect spelling:
/// comma/hyphen (`1-5,10,20-30`) or space/`to` (`1 to 5 10 20 to 30`).
/// Ids outside 1..=4094 or malformed fragments reject the whole token.
pub fn parse_vlan_ranges(text: &str) -> Option<Vec<VlanRange>> {
    let tokens: Vec<&str> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return None;
    }

    let mut ranges: Vec<VlanRange> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token.eq_ignore_ascii_case("to") {
            // `A to B` extends the previously pushed single id.
            let last = ranges.pop()?;
            if last.from != last.to {
                return None;
            }
            let to = parse_vlan_id(tokens.get(i + 1)?)?;
            if to < last.from {
                return None;
            }
            ranges.push(VlanRange { from: last.from, to });
            i += 2;
        } else if let Some((a, b)) = token.split_once('-') {
            let from = parse_vlan_id(a)?;
            let to = parse_vlan_id(b)?;
            if to < from {
                return None;
            }
            ranges.push(VlanRange { from, to });
            i += 1;
        } else {
            ranges.push(VlanRange::single(parse_vlan_id(token)?));
            i += 1;
        }
    }
    Some(ranges)
}

pub fn parse_vlan_id(token: &str) -> Option<u16> {
    let id: u16 = token.parse().ok()?;
    (1..=4094).contains(&id).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_literals() {
        assert!(is_ipv4("10.0.0.1"));
        assert!(is_ipv4("255.255.255.255"));
        assert!(!is_ipv4("10.0.0"));
        assert!(!is_ipv4("10.0.0.256"));
        assert!(!is_ipv4("10.0.0.1/24"));
        assert!(!is_ipv4("10.0.0.1a"));
    }

    #[test]
    fn test_cidr_combined_and_two_field_forms_agree() {
        let combined = Cidr::from_prefix("192.168.50.0/24").unwrap();
        let two_field = Cidr::from_network_and_mask("192.168.50.0", "255.255.255.0").unwrap();
        assert_eq!(combined, two_field);
        assert_eq!(combined.to_string(), "192.168.50.0/24");
    }

    #[test]
    fn test_cidr_default_route_equivalence() {
        let a = Cidr::from_prefix("0.0.0.0/0").unwrap();
        let b = Cidr::from_network_and_mask("0.0.0.0", "0.0.0.0").unwrap();
        assert_eq!(a, b);
        assert!(a.is_default());
        assert!(!Cidr::from_prefix("10.0.0.0/8").unwrap().is_default());
    }

    #[test]
    fn test_cidr_zeroes_host_bits() {
        let sloppy = Cidr::from_network_and_mask("10.0.10.7", "255.255.255.0").unwrap();
        assert_eq!(sloppy.to_string(), "10.0.10.0/24");
    }

    #[test]
    fn test_cidr_rejects_bad_input() {
        assert!(Cidr::from_prefix("10.0.0.0/33").is_none());
        assert!(Cidr::from_prefix("10.0.0.0").is_none());
        assert!(Cidr::from_network_and_mask("10.0.0.0", "255.0.255.0").is_none());
    }

    #[test]
    fn test_mac_spellings_normalize() {
        let colon = MacAddress::parse("00:11:22:33:44:55").unwrap();
        let dotted = MacAddress::parse("0011.2233.4455").unwrap();
        let dashed = MacAddress::parse("0011-2233-4455").unwrap();
        assert_eq!(colon, dotted);
        assert_eq!(colon, dashed);
        assert_eq!(colon.to_string(), "00:11:22:33:44:55");
    }

    #[test]
    fn test_mac_rejects_bad_input() {
        assert!(MacAddress::parse("0011.2233").is_none());
        assert!(MacAddress::parse("zz11.2233.4455").is_none());
        assert!(MacAddress::parse("00:11:22:33:44").is_none());
        assert!(MacAddress::parse("GigabitEthernet0/1").is_none());
    }

    #[test]
    fn test_interface_name_shapes() {
        assert!(is_interface_name("GigabitEthernet0/0/1"));
        assert!(is_interface_name("Gi0/1.100"));
        assert!(is_interface_name("Eth-Trunk1"));
        assert!(is_interface_name("Vlanif100"));
        assert!(is_interface_name("Serial0/0/0:0"));
        assert!(!is_interface_name("10.0.0.1"));
        assert!(!is_interface_name("aabb.ccdd.eeff"));
        assert!(!is_interface_name("Interface"));
        assert!(!is_interface_name(""));
    }

    #[test]
    fn test_garbage_lines() {
        assert!(is_garbage_line(""));
        assert!(is_garbage_line("   "));
        assert!(is_garbage_line("----------------"));
        assert!(is_garbage_line("====  ===="));
        assert!(is_garbage_line("------+-------------+-----------"));
        assert!(is_garbage_line(" --More-- "));
        assert!(!is_garbage_line("S     192.168.50.0/24 [200/0] via 10.0.10.253"));
        assert!(!is_garbage_line("interface GigabitEthernet0/1"));
    }

    #[test]
    fn test_table_noise_rows() {
        assert!(is_table_noise("Total: 42"));
        assert!(is_table_noise("Dynamic: 40"));
        assert!(is_table_noise("Vlan    Mac Address       Type        Ports"));
        assert!(is_table_noise("Internet Address  Physical Address"));
        assert!(!is_table_noise("  10    0011.2233.4455    DYNAMIC     Gi0/2"));
    }

    #[test]
    fn test_vlan_ranges_comma_hyphen() {
        let ranges = parse_vlan_ranges("1-5,10,20-30").unwrap();
        assert_eq!(
            ranges,
            vec![
                VlanRange { from: 1, to: 5 },
                VlanRange::single(10),
                VlanRange { from: 20, to: 30 },
            ]
        );
    }

    #[test]
    fn test_vlan_ranges_space_to() {
        let ranges = parse_vlan_ranges("10 20 30 to 40").unwrap();
        assert_eq!(
            ranges,
            vec![
                VlanRange::single(10),
                VlanRange::single(20),
                VlanRange { from: 30, to: 40 },
            ]
        );
    }

    #[test]
    fn test_vlan_ranges_reject_malformed() {
        assert!(parse_vlan_ranges("").is_none());
        assert!(parse_vlan_ranges("5-1").is_none());
        assert!(parse_vlan_ranges("0,10").is_none());
        assert!(parse_vlan_ranges("4095").is_none());
        assert!(parse_vlan_ranges("10 to").is_none());
        assert!(parse_vlan_ranges("abc").is_none());
    }
}

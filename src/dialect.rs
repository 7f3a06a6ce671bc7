//! The closed set of supported vendor dialects.
//!
//! Everything dialect-specific lives on the [`Dialect`] enum: the naming
//! directive, the aggregate-interface family, interface abbreviation
//! expansion tables, and the ACL qualifier keywords. Adding a dialect means
//! adding a variant and filling in its tables here; nothing elsewhere in the
//! crate branches on vendor strings.

use crate::error::DialectError;
use crate::segmenter::Section;
use log::debug;
use miette::NamedSource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// The `show`-verb family: `hostname` directive, `name#` prompts,
    /// `!` block terminators, `Port-channel` aggregates.
    Ios,
    /// The `display`-verb family: `sysname` directive, `<name>` prompts,
    /// `#` block terminators, `Eth-Trunk` aggregates.
    Vrp,
}

impl Dialect {
    /// Vendor tag recorded in the document overview.
    pub fn vendor_tag(&self) -> &'static str {
        match self {
            Dialect::Ios => "cisco-ios",
            Dialect::Vrp => "huawei-vrp",
        }
    }

    /// The configuration directive that sets the device name. Prompt
    /// decoration never does.
    pub(crate) fn naming_directive(&self) -> &'static str {
        match self {
            Dialect::Ios => "hostname",
            Dialect::Vrp => "sysname",
        }
    }

    /// The interface-name prefix of this dialect's aggregate family.
    pub(crate) fn aggregate_prefix(&self) -> &'static str {
        match self {
            Dialect::Ios => "Port-channel",
            Dialect::Vrp => "Eth-Trunk",
        }
    }

    /// Qualifier keywords that may sit next to an ACL identifier and must be
    /// skipped when extracting it.
    pub(crate) fn acl_keywords(&self) -> &'static [&'static str] {
        match self {
            Dialect::Ios => &["extended", "standard", "resequence"],
            Dialect::Vrp => &["advance", "basic", "name", "number", "match-order"],
        }
    }

    /// Abbreviation-expansion table for interface type prefixes. Matching is
    /// case-insensitive and exact over the full alphabetic prefix of a name.
    pub(crate) fn interface_expansions(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Dialect::Ios => &[
                ("tengigabitethernet", "TenGigabitEthernet"),
                ("hundredgige", "HundredGigE"),
                ("twentyfivegige", "TwentyFiveGigE"),
                ("fortygigabitethernet", "FortyGigabitEthernet"),
                ("gigabitethernet", "GigabitEthernet"),
                ("fastethernet", "FastEthernet"),
                ("port-channel", "Port-channel"),
                ("ethernet", "Ethernet"),
                ("loopback", "Loopback"),
                ("serial", "Serial"),
                ("tunnel", "Tunnel"),
                ("vlan", "Vlan"),
                ("mgmt", "mgmt"),
                ("twe", "TwentyFiveGigE"),
                ("hu", "HundredGigE"),
                ("fo", "FortyGigabitEthernet"),
                ("te", "TenGigabitEthernet"),
                ("gi", "GigabitEthernet"),
                ("fa", "FastEthernet"),
                ("po", "Port-channel"),
                ("lo", "Loopback"),
                ("se", "Serial"),
                ("tu", "Tunnel"),
                ("vl", "Vlan"),
                ("eth", "Ethernet"),
            ],
            Dialect::Vrp => &[
                ("xgigabitethernet", "XGigabitEthernet"),
                ("gigabitethernet", "GigabitEthernet"),
                ("eth-trunk", "Eth-Trunk"),
                ("ethernet", "Ethernet"),
                ("loopback", "LoopBack"),
                ("vlanif", "Vlanif"),
                ("meth", "MEth"),
                ("xge", "XGigabitEthernet"),
                ("ge", "GigabitEthernet"),
                ("lo", "LoopBack"),
                ("eth", "Ethernet"),
                ("nve", "Nve"),
                ("tunnel", "Tunnel"),
                ("vbdif", "Vbdif"),
            ],
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.vendor_tag())
    }
}

/// Evidence counters accumulated while sniffing.
#[derive(Debug, Default, Clone, Copy)]
struct Scores {
    ios: u32,
    vrp: u32,
}

/// Classifies the dialect from distinguishing tokens in the segmented
/// capture. Pure and side-effect free; returns `None` when the evidence is
/// absent or tied, so the caller can fall back to its hint instead of
/// acting on a low-confidence guess.
pub fn sniff_dialect(sections: &[Section]) -> Option<Dialect> {
    let mut scores = Scores::default();
    for section in sections {
        if let Some(banner) = &section.banner {
            score_banner(banner, &mut scores);
        }
        for line in &section.lines {
            score_line(line, &mut scores);
        }
    }
    debug!("dialect sniff scores: ios={} vrp={}", scores.ios, scores.vrp);
    match scores.ios.cmp(&scores.vrp) {
        std::cmp::Ordering::Greater => Some(Dialect::Ios),
        std::cmp::Ordering::Less => Some(Dialect::Vrp),
        std::cmp::Ordering::Equal => None,
    }
}

/// Command-echo banners carry the strongest evidence: the verb and the
/// prompt decoration shape.
fn score_banner(banner: &str, scores: &mut Scores) {
    if banner.contains("show ") {
        scores.ios += 2;
    }
    if banner.contains("display ") {
        scores.vrp += 2;
    }
    score_line(banner, scores);
}

fn score_line(line: &str, scores: &mut Scores) {
    let trimmed = line.trim_start();

    if trimmed.starts_with("hostname ") {
        scores.ios += 3;
    }
    if trimmed.starts_with("sysname ") {
        scores.vrp += 3;
    }
    // `ip route-static` must be checked before the plain `ip route` form.
    if trimmed.starts_with("ip route-static ") {
        scores.vrp += 2;
    } else if trimmed.starts_with("ip route ") {
        scores.ios += 2;
    }
    if trimmed.starts_with("undo ") {
        scores.vrp += 2;
    }
    if trimmed.starts_with("switchport ") {
        scores.ios += 2;
    }
    if trimmed.starts_with("port link-type ") || trimmed.starts_with("port trunk ") {
        scores.vrp += 2;
    }
    if line.contains("Eth-Trunk") {
        scores.vrp += 1;
    }
    if line.contains("Port-channel") || line.contains("port-channel") {
        scores.ios += 1;
    }
    if line.contains("Cisco IOS") {
        scores.ios += 3;
    }
    if line.contains("VRP (R) software") || line.contains("Huawei") {
        scores.vrp += 3;
    }

    // Prompt decoration shapes.
    if let Some(first) = trimmed.split_whitespace().next() {
        if first.len() > 1 && !first.starts_with('#') && (first.ends_with('#') || first.ends_with('>'))
        {
            scores.ios += 2;
        }
    }
    if (trimmed.starts_with('<') && trimmed.contains('>'))
        || (trimmed.starts_with('[') && trimmed.contains(']'))
    {
        scores.vrp += 2;
    }
}

/// Resolves the dialect for a capture: sniffed evidence wins, the caller's
/// hint breaks ties, and with neither this is a hard `UnknownDialect` error.
pub fn resolve_dialect(
    sections: &[Section],
    hint: Option<Dialect>,
    source: &str,
    capture_name: &str,
) -> Result<Dialect, DialectError> {
    if let Some(dialect) = sniff_dialect(sections) {
        return Ok(dialect);
    }
    if let Some(dialect) = hint {
        debug!("dialect sniffing inconclusive, using caller hint {dialect}");
        return Ok(dialect);
    }
    let span_len = source.lines().next().map_or(0, str::len);
    Err(DialectError::UnknownDialect {
        src: NamedSource::new(capture_name.to_string(), source.to_string()),
        span: (0, span_len).into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::segment;

    #[test]
    fn test_sniff_ios_tokens() {
        let sections = segment("hostname ACC4\n!\ninterface GigabitEthernet0/1\n switchport mode trunk\n");
        assert_eq!(sniff_dialect(&sections), Some(Dialect::Ios));
    }

    #[test]
    fn test_sniff_vrp_tokens() {
        let sections = segment("sysname ACC4\n#\ninterface GigabitEthernet0/0/1\n port link-type trunk\n eth-trunk 1\n");
        assert_eq!(sniff_dialect(&sections), Some(Dialect::Vrp));
    }

    #[test]
    fn test_sniff_prompt_and_verb_shapes() {
        let ios = segment("SW1#show vlan brief\n10 users active\n");
        assert_eq!(sniff_dialect(&ios), Some(Dialect::Ios));
        let vrp = segment("<ACC4>display arp\n10.0.10.2  0011-2233-4455  12  D-0  Vlanif10\n");
        assert_eq!(sniff_dialect(&vrp), Some(Dialect::Vrp));
    }

    #[test]
    fn test_sniff_inconclusive_is_none() {
        let sections = segment("some free text\nwith no vendor tokens at all\n");
        assert_eq!(sniff_dialect(&sections), None);
    }

    #[test]
    fn test_resolve_falls_back_to_hint() {
        let sections = segment("nothing distinguishing\n");
        let resolved = resolve_dialect(&sections, Some(Dialect::Vrp), "nothing distinguishing\n", "dev1");
        assert_eq!(resolved.unwrap(), Dialect::Vrp);
    }

    #[test]
    fn test_resolve_fails_closed_without_hint() {
        let sections = segment("nothing distinguishing\n");
        let resolved = resolve_dialect(&sections, None, "nothing distinguishing\n", "dev1");
        assert!(resolved.is_err());
    }

    #[test]
    fn test_expansion_tables_cover_aggregates() {
        assert_eq!(Dialect::Ios.aggregate_prefix(), "Port-channel");
        assert_eq!(Dialect::Vrp.aggregate_prefix(), "Eth-Trunk");
    }
}

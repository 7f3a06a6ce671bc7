//! Splits a raw capture blob into ordered, tagged sections.
//!
//! A section is the run of lines that followed a command-echo banner
//! (`SW1#show vlan brief`, `<ACC4>display arp`) or a running-config block
//! opener (`interface GigabitEthernet0/1`, `router ospf 1`, `acl number
//! 3001`). Segmentation is purely structural: no values are interpreted
//! here, garbage lines are dropped, and anything unrecognizable is carried
//! through under [`SectionKind::Unknown`] so the caller can report it as
//! unparsed input. Segmentation never fails.

use crate::validators::is_garbage_line;
use log::trace;

/// The command output or configuration block a run of lines belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    // == Running-config blocks ==
    /// Top-level configuration lines (naming directive, static routes,
    /// NTP/syslog targets, ...).
    ConfigGlobal,
    /// An `interface ...` block.
    ConfigInterface,
    /// A `vlan ...` block or batch declaration.
    ConfigVlan,
    /// A routing-protocol block (`router ospf 1`, `bgp 65001`, ...).
    ConfigRouter,
    /// An access-list block or run of one-line access-list entries.
    ConfigAcl,

    // == Command outputs ==
    Version,
    InterfaceStatus,
    EtherChannel,
    VlanTable,
    SpanningTree,
    RouteTable,
    OspfOverview,
    OspfNeighbors,
    BgpSummary,
    Eigrp,
    Rip,
    AccessLists,
    MacTable,
    ArpTable,
    Neighbors,
    Redundancy,
    Ntp,
    Logging,
    Resources,

    /// Anything the segmenter could not attribute to a known command or
    /// block. Ignored by every section parser, surfaced in diagnostics.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    /// The raw command-echo line that introduced this section, when one did.
    /// Config blocks keep their opener in `lines` instead.
    pub banner: Option<String>,
    pub lines: Vec<String>,
}

/// Command banners, checked in order; the first prefix match wins, so more
/// specific spellings sit above their generic fallbacks.
const COMMANDS: &[(&str, SectionKind)] = &[
    ("show running-config", SectionKind::ConfigGlobal),
    ("show startup-config", SectionKind::ConfigGlobal),
    ("display current-configuration", SectionKind::ConfigGlobal),
    ("display saved-configuration", SectionKind::ConfigGlobal),
    ("show version", SectionKind::Version),
    ("display version", SectionKind::Version),
    ("show inventory", SectionKind::Version),
    ("display esn", SectionKind::Version),
    ("display device", SectionKind::Version),
    ("show ip interface", SectionKind::InterfaceStatus),
    ("show interfaces", SectionKind::InterfaceStatus),
    ("show interface", SectionKind::InterfaceStatus),
    ("display interface", SectionKind::InterfaceStatus),
    ("show etherchannel", SectionKind::EtherChannel),
    ("display eth-trunk", SectionKind::EtherChannel),
    ("show vlan", SectionKind::VlanTable),
    ("display vlan", SectionKind::VlanTable),
    ("show spanning-tree", SectionKind::SpanningTree),
    ("display stp", SectionKind::SpanningTree),
    ("show ip route", SectionKind::RouteTable),
    ("display ip routing-table", SectionKind::RouteTable),
    ("show ip ospf neighbor", SectionKind::OspfNeighbors),
    ("display ospf peer", SectionKind::OspfNeighbors),
    ("show ip ospf", SectionKind::OspfOverview),
    ("display ospf", SectionKind::OspfOverview),
    ("show ip bgp summary", SectionKind::BgpSummary),
    ("show bgp summary", SectionKind::BgpSummary),
    ("display bgp peer", SectionKind::BgpSummary),
    ("show ip eigrp", SectionKind::Eigrp),
    ("show ip rip", SectionKind::Rip),
    ("display rip", SectionKind::Rip),
    ("show access-lists", SectionKind::AccessLists),
    ("show ip access-lists", SectionKind::AccessLists),
    ("display acl", SectionKind::AccessLists),
    ("show mac address-table", SectionKind::MacTable),
    ("show mac-address-table", SectionKind::MacTable),
    ("display mac-address", SectionKind::MacTable),
    ("show ip arp", SectionKind::ArpTable),
    ("show arp", SectionKind::ArpTable),
    ("display arp", SectionKind::ArpTable),
    ("show cdp neighbors", SectionKind::Neighbors),
    ("show lldp neighbors", SectionKind::Neighbors),
    ("show lldp neighbor", SectionKind::Neighbors),
    ("display lldp neighbor", SectionKind::Neighbors),
    ("show standby", SectionKind::Redundancy),
    ("show vrrp", SectionKind::Redundancy),
    ("display vrrp", SectionKind::Redundancy),
    ("show ntp", SectionKind::Ntp),
    ("display ntp-service", SectionKind::Ntp),
    ("display ntp", SectionKind::Ntp),
    ("show logging", SectionKind::Logging),
    ("display logbuffer", SectionKind::Logging),
    ("display info-center", SectionKind::Logging),
    ("show processes cpu", SectionKind::Resources),
    ("show processes memory", SectionKind::Resources),
    ("display cpu-usage", SectionKind::Resources),
    ("display cpu", SectionKind::Resources),
    ("display memory-usage", SectionKind::Resources),
    ("display memory", SectionKind::Resources),
];

/// Removes a leading shell prompt from a line, if one is present.
///
/// Recognized prompt shapes: `name#`/`name>` as the first whitespace-delimited
/// token, and the bracketed `<name>`/`[name]` decorations. Returns the
/// remainder (possibly empty, for a bare prompt line).
fn strip_prompt(line: &str) -> &str {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix('<').and_then(|r| {
        r.split_once('>')
            .filter(|(name, _)| !name.is_empty() && !name.contains(char::is_whitespace))
            .map(|(_, rest)| rest)
    }) {
        return rest.trim_start();
    }
    if let Some(rest) = trimmed.strip_prefix('[').and_then(|r| {
        r.split_once(']')
            .filter(|(name, _)| !name.is_empty() && !name.contains(char::is_whitespace))
            .map(|(_, rest)| rest)
    }) {
        return rest.trim_start();
    }
    // `SW1#show vlan brief` and `SW1> show arp`: the prompt marker ends the
    // first token or sits inside it, but never at column zero (a bare `#` is
    // the VRP block terminator, not a prompt).
    if let Some(first) = trimmed.split_whitespace().next() {
        for marker in ['#', '>'] {
            if let Some(idx) = first.find(marker) {
                if idx > 0 {
                    return trimmed[idx + 1..].trim_start();
                }
            }
        }
    }
    trimmed
}

fn classify_command(candidate: &str) -> Option<SectionKind> {
    let lowered = candidate.to_ascii_lowercase();
    COMMANDS
        .iter()
        .find(|(prefix, _)| lowered.starts_with(prefix))
        .map(|&(_, kind)| kind)
}

/// Decoration emitted around a configuration dump; carries no data.
fn is_config_decoration(line: &str) -> bool {
    line.starts_with("Building configuration")
        || line.starts_with("Current configuration")
        || line.starts_with("!Software Version")
}

/// Margin-level (column zero) configuration block openers.
fn classify_config_opener(line: &str) -> Option<SectionKind> {
    if line.starts_with("interface ") {
        return Some(SectionKind::ConfigInterface);
    }
    if line.starts_with("vlan ") {
        return Some(SectionKind::ConfigVlan);
    }
    if line.starts_with("ip access-list ")
        || line.starts_with("access-list ")
        || line.starts_with("acl ")
    {
        return Some(SectionKind::ConfigAcl);
    }
    if line.starts_with("router ") {
        return Some(SectionKind::ConfigRouter);
    }
    // VRP routing blocks open with the bare protocol name at the margin.
    let mut words = line.split_whitespace();
    if let (Some(proto), Some(arg)) = (words.next(), words.next()) {
        if matches!(proto, "ospf" | "bgp" | "rip" | "isis")
            && arg.chars().next().is_some_and(|c| c.is_ascii_digit())
        {
            return Some(SectionKind::ConfigRouter);
        }
    }
    None
}

pub struct Segmenter {
    sections: Vec<Section>,
    current: Section,
    in_config: bool,
}

impl Segmenter {
    fn new() -> Self {
        // A capture may open with a bare configuration dump, so segmentation
        // starts in config mode until a command banner says otherwise.
        Segmenter {
            sections: Vec::new(),
            current: Section {
                kind: SectionKind::ConfigGlobal,
                banner: None,
                lines: Vec::new(),
            },
            in_config: true,
        }
    }

    fn open(&mut self, kind: SectionKind, banner: Option<&str>) {
        let previous = std::mem::replace(
            &mut self.current,
            Section {
                kind,
                banner: banner.map(str::to_string),
                lines: Vec::new(),
            },
        );
        if !previous.lines.is_empty() || previous.banner.is_some() {
            self.sections.push(previous);
        }
    }

    fn feed(&mut self, raw: &str) {
        let line = raw.trim_end();
        if is_garbage_line(line) || is_config_decoration(line.trim_start()) {
            return;
        }

        let candidate = strip_prompt(line);
        let prompt_stripped = candidate != line.trim_start();
        if prompt_stripped {
            if candidate.is_empty() {
                return; // bare prompt decoration
            }
            // A prompt means a command echo: open its section, or an
            // Unknown one when the command is not in the banner table.
            trace!("command banner: {candidate}");
            let kind = classify_command(candidate).unwrap_or(SectionKind::Unknown);
            self.open(kind, Some(line));
            self.in_config = kind == SectionKind::ConfigGlobal;
            return;
        }
        if candidate.starts_with("show ") || candidate.starts_with("display ") {
            // A bare command line without prompt decoration.
            let kind = classify_command(candidate).unwrap_or(SectionKind::Unknown);
            self.open(kind, Some(line));
            self.in_config = kind == SectionKind::ConfigGlobal;
            return;
        }

        if self.in_config {
            self.feed_config_line(line);
        } else {
            self.current.lines.push(line.to_string());
        }
    }

    fn feed_config_line(&mut self, line: &str) {
        let trimmed = line.trim_start();
        let at_margin = !line.starts_with(' ') && !line.starts_with('\t');

        if at_margin {
            if trimmed == "!" || trimmed == "#" {
                // Block terminator: fall back to the global scope.
                if self.current.kind != SectionKind::ConfigGlobal {
                    self.open(SectionKind::ConfigGlobal, None);
                }
                return;
            }
            if trimmed == "end" || trimmed == "return" {
                self.open(SectionKind::Unknown, None);
                self.in_config = false;
                return;
            }
            if let Some(kind) = classify_config_opener(trimmed) {
                // Consecutive one-line ACL entries share one section.
                if !(kind == SectionKind::ConfigAcl && self.current.kind == SectionKind::ConfigAcl)
                {
                    self.open(kind, None);
                }
                self.current.lines.push(line.to_string());
                return;
            }
            if self.current.kind != SectionKind::ConfigGlobal {
                self.open(SectionKind::ConfigGlobal, None);
            }
        }
        self.current.lines.push(line.to_string());
    }

    fn finish(mut self) -> Vec<Section> {
        if !self.current.lines.is_empty() || self.current.banner.is_some() {
            self.sections.push(self.current);
        }
        self.sections
    }
}

/// Segments one device's combined captures. Order is preserved; every input
/// line either lands in exactly one section or is dropped as garbage.
pub fn segment(source: &str) -> Vec<Section> {
    let mut segmenter = Segmenter::new();
    for line in source.lines() {
        segmenter.feed(line);
    }
    let sections = segmenter.finish();
    trace!("segmented into {} sections", sections.len());
    sections
}

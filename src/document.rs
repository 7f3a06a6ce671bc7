//! The canonical Device Configuration Document.
//!
//! One document is produced per parse invocation and never mutated after
//! assembly. Every collection is sorted by a stable key before the document
//! is handed back, so parsing the same capture twice yields byte-identical
//! serialized output. Collections that must hold each logical entity exactly
//! once (aggregates, VLANs) are keyed containers rather than lists.

use crate::dialect::Dialect;
use crate::validators::{Cidr, MacAddress, VlanRange};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDocument {
    /// Caller-supplied identifier, used only to tag output and diagnostics.
    pub device_id: String,
    pub dialect: Dialect,
    pub overview: Overview,
    pub interfaces: Vec<Interface>,
    /// Link-aggregation groups keyed by aggregate id. A map, not a list:
    /// dialects report the same group once in a summary view and again per
    /// member port, and the key collapses those mentions into one entry.
    pub aggregates: BTreeMap<u32, AggregateGroup>,
    /// Sorted by id; uniqueness is enforced at insertion during parsing.
    pub vlans: Vec<Vlan>,
    pub routing: Routing,
    pub spanning_tree: Option<SpanningTree>,
    pub acls: Vec<Acl>,
    pub mac_table: Vec<MacTableEntry>,
    pub arp_table: Vec<ArpTableEntry>,
    pub neighbors: Vec<Neighbor>,
    pub redundancy_groups: Vec<RedundancyGroup>,
    pub system: SystemHealth,
    /// Per-section outcomes. Downstream consumers use this to distinguish
    /// "empty because not configured" from "empty because parsing failed".
    pub diagnostics: Vec<SectionReport>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Overview {
    /// Set only by the explicit naming directive, never by prompt text.
    pub hostname: Option<String>,
    pub vendor: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub software_version: Option<String>,
    pub role_hint: Option<DeviceRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    Router,
    Switch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// Canonical spelling; source abbreviations are expanded before assembly.
    pub name: String,
    pub description: Option<String>,
    pub admin_up: bool,
    /// `None` when no status output was present in the capture.
    pub oper_up: Option<bool>,
    pub switchport_mode: Option<SwitchportMode>,
    pub access_vlan: Option<u16>,
    pub native_vlan: Option<u16>,
    pub allowed_vlans: Vec<VlanRange>,
    pub address: Option<Cidr>,
    /// Aggregate group this port is bundled into, if any.
    pub aggregate_id: Option<u32>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Interface {
            name: name.into(),
            description: None,
            admin_up: true,
            oper_up: None,
            switchport_mode: None,
            access_vlan: None,
            native_vlan: None,
            allowed_vlans: Vec::new(),
            address: None,
            aggregate_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchportMode {
    Access,
    Trunk,
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateGroup {
    /// Canonical aggregate-interface name (`Port-channel1`, `Eth-Trunk1`).
    pub name: String,
    /// Member ports; set semantics keep repeated mentions from duplicating.
    pub members: BTreeSet<String>,
    /// Bundling protocol when reported (`lacp`, `static`, ...).
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vlan {
    pub id: u16,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Routing {
    pub static_routes: Vec<StaticRoute>,
    /// Absence of a protocol block means "not configured", never "failed".
    pub ospf: Option<OspfBlock>,
    pub bgp: Option<BgpBlock>,
    pub eigrp: Option<EigrpBlock>,
    pub rip: Option<RipBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoute {
    pub network: Cidr,
    pub next_hop: Option<Ipv4Addr>,
    pub exit_interface: Option<String>,
    pub distance: u8,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OspfBlock {
    pub process_id: u32,
    pub router_id: Option<Ipv4Addr>,
    pub areas: Vec<String>,
    pub interfaces: Vec<OspfInterface>,
    pub neighbors: Vec<OspfNeighbor>,
    pub learned_prefix_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OspfInterface {
    pub interface: String,
    pub area: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OspfNeighbor {
    pub neighbor_id: Ipv4Addr,
    pub priority: Option<u8>,
    pub state: String,
    pub role: Option<OspfRole>,
    pub address: Option<Ipv4Addr>,
    pub interface: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OspfRole {
    Dr,
    Bdr,
    DrOther,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgpBlock {
    pub local_as: u32,
    pub router_id: Option<Ipv4Addr>,
    pub peers: Vec<BgpPeer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgpPeer {
    pub address: Ipv4Addr,
    pub remote_as: u32,
    pub state: String,
    pub prefixes_received: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EigrpBlock {
    pub as_number: u32,
    pub router_id: Option<Ipv4Addr>,
    pub neighbors: Vec<EigrpNeighbor>,
    pub learned_routes: Vec<Cidr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EigrpNeighbor {
    pub address: Ipv4Addr,
    pub interface: String,
    pub holdtime_secs: Option<u32>,
    pub uptime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RipBlock {
    pub process_id: Option<u32>,
    pub version: Option<u8>,
    pub timers: Option<RipTimers>,
    pub peers: Vec<Ipv4Addr>,
    pub learned_routes: Vec<Cidr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RipTimers {
    pub update_secs: u32,
    pub invalid_secs: u32,
    pub flush_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanningTree {
    pub protocol: StpVariant,
    /// Whether this device is the root bridge for at least one instance.
    pub is_root: bool,
    pub instances: Vec<StpInstance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StpVariant {
    Pvst,
    RapidPvst,
    Rstp,
    Mstp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StpInstance {
    /// VLAN id or MST instance id, depending on the protocol variant.
    pub instance: u16,
    pub is_root: bool,
    pub root_id: Option<String>,
    pub bridge_id: Option<String>,
    pub priority: Option<u32>,
    pub root_port: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acl {
    pub name: String,
    pub kind: Option<AclKind>,
    pub rules: Vec<AclRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclKind {
    Standard,
    Extended,
    Basic,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclRule {
    pub sequence: Option<u32>,
    pub action: AclAction,
    /// Match criteria as normalized text after the action token.
    pub criteria: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    Permit,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacTableEntry {
    pub address: MacAddress,
    pub vlan: Option<u16>,
    /// Required: a row whose interface token fails validation is rejected
    /// during parsing, never emitted with a placeholder.
    pub interface: String,
    pub entry_type: MacEntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacEntryKind {
    Dynamic,
    Static,
    Secure,
    Blackhole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArpTableEntry {
    pub address: Ipv4Addr,
    pub mac: MacAddress,
    /// Required, same policy as [`MacTableEntry::interface`].
    pub interface: String,
    pub age_minutes: Option<u32>,
    pub entry_type: ArpEntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArpEntryKind {
    Dynamic,
    Static,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub device_id: String,
    pub local_interface: String,
    pub remote_interface: Option<String>,
    pub platform: Option<String>,
    pub capabilities: Vec<String>,
    pub protocol: DiscoveryProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryProtocol {
    Cdp,
    Lldp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedundancyGroup {
    pub group_id: u16,
    pub protocol: RedundancyProtocol,
    /// Role normalized across dialects: VRRP's master/backup map onto
    /// active/standby.
    pub role: RedundancyRole,
    pub priority: Option<u8>,
    pub interface: Option<String>,
    pub virtual_address: Option<Ipv4Addr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedundancyProtocol {
    Hsrp,
    Vrrp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedundancyRole {
    Active,
    Standby,
    Init,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemHealth {
    pub ntp: NtpStatus,
    pub syslog_hosts: Vec<String>,
    pub cpu_load_percent: Option<f32>,
    pub memory_used_percent: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NtpStatus {
    pub synchronized: bool,
    pub reference: Option<String>,
    pub stratum: Option<u8>,
}

// --- Diagnostics ---

/// The data domains a capture decomposes into; one report per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Overview,
    Interfaces,
    Vlans,
    SpanningTree,
    Routing,
    Acls,
    MacTable,
    ArpTable,
    Neighbors,
    Redundancy,
    System,
    /// Blob-level notes: unparsed input, cross-section tie-breaks.
    Capture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    /// All matching input parsed cleanly.
    Success,
    /// Some records extracted, some lines could not be interpreted.
    Partial,
    /// The domain produced nothing, e.g. its command output was absent or
    /// entirely malformed.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReport {
    pub domain: Domain,
    pub status: SectionStatus,
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_serializes_to_json() {
        let document = DeviceDocument {
            device_id: "dev1".to_string(),
            dialect: Dialect::Ios,
            overview: Overview {
                hostname: Some("ACC4".to_string()),
                vendor: "cisco-ios".to_string(),
                ..Overview::default()
            },
            interfaces: vec![Interface::new("GigabitEthernet0/1")],
            aggregates: BTreeMap::new(),
            vlans: vec![Vlan {
                id: 10,
                name: Some("users".to_string()),
            }],
            routing: Routing::default(),
            spanning_tree: None,
            acls: Vec::new(),
            mac_table: Vec::new(),
            arp_table: Vec::new(),
            neighbors: Vec::new(),
            redundancy_groups: Vec::new(),
            system: SystemHealth::default(),
            diagnostics: vec![SectionReport {
                domain: Domain::Overview,
                status: SectionStatus::Success,
                notes: Vec::new(),
            }],
        };

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["overview"]["hostname"], "ACC4");
        assert_eq!(json["dialect"], "ios");
        assert_eq!(json["vlans"][0]["id"], 10);
        assert_eq!(json["diagnostics"][0]["domain"], "overview");
        assert_eq!(json["diagnostics"][0]["status"], "success");

        // Round-trips through the storage format.
        let back: DeviceDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, document);
    }

    #[test]
    fn test_aggregate_map_keys_serialize_as_strings() {
        let mut aggregates = BTreeMap::new();
        aggregates.insert(
            1,
            AggregateGroup {
                name: "Port-channel1".to_string(),
                members: BTreeSet::from(["GigabitEthernet0/1".to_string()]),
                mode: Some("lacp".to_string()),
            },
        );
        let json = serde_json::to_value(&aggregates).unwrap();
        assert!(json.get("1").is_some());
        assert_eq!(json["1"]["members"][0], "GigabitEthernet0/1");
    }
}

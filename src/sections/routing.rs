//! Routing state: static routes plus the optional OSPF/BGP/EIGRP/RIP blocks.
//!
//! Static routes arrive from two directions — configuration lines and the
//! route-table view — and both the combined-prefix and network+mask forms
//! must collapse into one record, so accumulation is keyed by
//! (network, next hop). Protocol blocks are created only when the capture
//! shows the protocol configured or reporting; an absent block means "not
//! configured", never "parse failed".

use super::{first_ipv4, outcome, sections_of, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::{
    BgpBlock, BgpPeer, EigrpBlock, EigrpNeighbor, OspfBlock, OspfInterface, OspfNeighbor,
    OspfRole, RipBlock, RipTimers, Routing, StaticRoute,
};
use crate::normalize::canonical_interface;
use crate::segmenter::{Section, SectionKind};
use crate::validators::{is_interface_name, parse_ipv4, Cidr};
use log::debug;
use std::net::Ipv4Addr;

const IOS_STATIC_DISTANCE: u8 = 1;
const VRP_STATIC_DISTANCE: u8 = 60;

pub fn parse(sections: &[Section], dialect: Dialect) -> SectionOutcome<Routing> {
    let mut parser = RoutingParser {
        dialect,
        statics: Vec::new(),
        ospf: None,
        bgp: None,
        eigrp: None,
        rip: None,
        ospf_learned: 0,
        saw_route_table: false,
        warnings: Vec::new(),
        saw_input: false,
    };

    for section in sections {
        match section.kind {
            SectionKind::ConfigGlobal => parser.parse_global_config(&section.lines),
            SectionKind::ConfigRouter => parser.parse_router_block(&section.lines),
            SectionKind::RouteTable => parser.parse_route_table(&section.lines),
            _ => {}
        }
    }
    for section in sections_of(sections, &[SectionKind::OspfOverview]) {
        parser.saw_input = true;
        parser.parse_ospf_overview(&section.lines);
    }
    for section in sections_of(sections, &[SectionKind::OspfNeighbors]) {
        parser.saw_input = true;
        match dialect {
            Dialect::Ios => parser.parse_ospf_neighbor_table(&section.lines),
            Dialect::Vrp => parser.parse_ospf_peer_blocks(&section.lines),
        }
    }
    for section in sections_of(sections, &[SectionKind::BgpSummary]) {
        parser.saw_input = true;
        parser.parse_bgp_summary(&section.lines);
    }
    for section in sections_of(sections, &[SectionKind::Eigrp]) {
        parser.saw_input = true;
        parser.parse_eigrp_output(&section.lines);
    }
    for section in sections_of(sections, &[SectionKind::Rip]) {
        parser.saw_input = true;
        parser.parse_rip_output(&section.lines);
    }

    parser.finalize()
}

struct RoutingParser {
    dialect: Dialect,
    statics: Vec<StaticRoute>,
    ospf: Option<OspfBlock>,
    bgp: Option<BgpBlock>,
    eigrp: Option<EigrpBlock>,
    rip: Option<RipBlock>,
    /// OSPF-learned rows counted in the route table.
    ospf_learned: u32,
    saw_route_table: bool,
    warnings: Vec<String>,
    saw_input: bool,
}

impl RoutingParser {
    fn finalize(mut self) -> SectionOutcome<Routing> {
        if let Some(ospf) = &mut self.ospf {
            if self.saw_route_table {
                ospf.learned_prefix_count = Some(self.ospf_learned);
            }
        }
        let records = self.statics.len()
            + [
                self.ospf.is_some(),
                self.bgp.is_some(),
                self.eigrp.is_some(),
                self.rip.is_some(),
            ]
            .iter()
            .filter(|present| **present)
            .count();
        debug!(
            "routing: {} static routes, ospf={} bgp={} eigrp={} rip={}",
            self.statics.len(),
            self.ospf.is_some(),
            self.bgp.is_some(),
            self.eigrp.is_some(),
            self.rip.is_some()
        );
        let value = Routing {
            static_routes: self.statics,
            ospf: self.ospf,
            bgp: self.bgp,
            eigrp: self.eigrp,
            rip: self.rip,
        };
        outcome(value, self.warnings, self.saw_input, records)
    }

    /// Inserts or merges a static route. Key: (network, next hop). On a
    /// second mention the later record wins field-by-field where it carries
    /// information, so a config line and a route-table row describing the
    /// same route collapse into one entry.
    fn add_static(&mut self, route: StaticRoute) {
        if let Some(existing) = self
            .statics
            .iter_mut()
            .find(|r| r.network == route.network && r.next_hop == route.next_hop)
        {
            if route.exit_interface.is_some() {
                existing.exit_interface = route.exit_interface;
            }
            existing.distance = route.distance;
            return;
        }
        self.statics.push(route);
    }

    fn make_static(
        &self,
        network: Cidr,
        next_hop: Option<Ipv4Addr>,
        exit_interface: Option<String>,
        distance: u8,
    ) -> StaticRoute {
        StaticRoute {
            is_default: network.is_default(),
            network,
            next_hop,
            exit_interface,
            distance,
        }
    }

    // == Configuration ==

    fn parse_global_config(&mut self, lines: &[String]) {
        for line in lines {
            let trimmed = line.trim_start();
            let (rest, default_distance) = match self.dialect {
                Dialect::Ios => (trimmed.strip_prefix("ip route "), IOS_STATIC_DISTANCE),
                Dialect::Vrp => (trimmed.strip_prefix("ip route-static "), VRP_STATIC_DISTANCE),
            };
            let Some(rest) = rest else { continue };
            self.saw_input = true;

            let tokens: Vec<&str> = rest.split_whitespace().collect();
            if tokens.len() < 3 {
                self.warnings.push(format!("short static route line: {trimmed}"));
                continue;
            }
            let Some(network) = Cidr::from_network_and_mask(tokens[0], tokens[1]) else {
                self.warnings
                    .push(format!("invalid static route network: {trimmed}"));
                continue;
            };

            let mut next_hop = None;
            let mut exit_interface = None;
            let mut distance = default_distance;
            let mut i = 2;
            while i < tokens.len() {
                let token = tokens[i];
                if token == "preference" || token == "tag" || token == "name" {
                    if token == "preference" {
                        if let Some(value) = tokens.get(i + 1).and_then(|t| t.parse().ok()) {
                            distance = value;
                        }
                    }
                    i += 2;
                    continue;
                }
                if let Some(addr) = parse_ipv4(token) {
                    next_hop = Some(addr);
                } else if is_interface_name(token) {
                    exit_interface = Some(canonical_interface(token, self.dialect));
                } else if let Ok(value) = token.parse::<u8>() {
                    distance = value;
                }
                i += 1;
            }
            let route = self.make_static(network, next_hop, exit_interface, distance);
            self.add_static(route);
        }
    }

    fn parse_router_block(&mut self, lines: &[String]) {
        let Some(opener) = lines.first() else { return };
        self.saw_input = true;
        let tokens: Vec<&str> = opener.trim_start().split_whitespace().collect();
        // `router ospf 1` (IOS) or `ospf 1 router-id 1.1.1.1` (VRP).
        let (proto, args) = match tokens.first() {
            Some(&"router") => (
                tokens.get(1).copied().unwrap_or(""),
                tokens.get(2..).unwrap_or(&[]),
            ),
            Some(proto) => (*proto, &tokens[1..]),
            None => return,
        };
        let process: Option<u32> = args.first().and_then(|t| t.parse().ok());
        let opener_router_id = args
            .windows(2)
            .find(|w| w[0] == "router-id")
            .and_then(|w| parse_ipv4(w[1]));

        match proto {
            "ospf" => {
                let block = self.ospf.get_or_insert_with(|| empty_ospf(process.unwrap_or(1)));
                if let Some(id) = opener_router_id {
                    block.router_id = Some(id);
                }
                for line in &lines[1..] {
                    let body = line.trim_start();
                    if let Some(id) = body.strip_prefix("router-id ").and_then(parse_ipv4) {
                        block.router_id = Some(id);
                    } else if let Some(area) = body
                        .strip_prefix("area ")
                        .and_then(|a| a.split_whitespace().next())
                    {
                        block.areas.push(area.to_string());
                    } else if body.starts_with("network ") {
                        if let Some(area) = body.rsplit("area ").next().filter(|_| body.contains(" area ")) {
                            block.areas.push(area.trim().to_string());
                        }
                    }
                }
            }
            "bgp" => {
                let local_as = process.unwrap_or(0);
                let block = self.bgp.get_or_insert_with(|| BgpBlock {
                    local_as,
                    router_id: None,
                    peers: Vec::new(),
                });
                for line in &lines[1..] {
                    let body = line.trim_start();
                    if let Some(id) = body.strip_prefix("router-id ").and_then(parse_ipv4) {
                        block.router_id = Some(id);
                    } else if let Some(rest) = body
                        .strip_prefix("neighbor ")
                        .or_else(|| body.strip_prefix("peer "))
                    {
                        let words: Vec<&str> = rest.split_whitespace().collect();
                        let Some(address) = words.first().and_then(|t| parse_ipv4(t)) else {
                            continue;
                        };
                        let remote_as = words
                            .windows(2)
                            .find(|w| w[0] == "remote-as" || w[0] == "as-number")
                            .and_then(|w| w[1].parse().ok());
                        let Some(remote_as) = remote_as else { continue };
                        upsert_bgp_peer(
                            &mut block.peers,
                            address,
                            remote_as,
                            "configured".to_string(),
                            None,
                        );
                    }
                }
            }
            "eigrp" => {
                let block = self.eigrp.get_or_insert_with(|| empty_eigrp(process.unwrap_or(0)));
                if let Some(process) = process {
                    block.as_number = process;
                }
            }
            "rip" => {
                let block = self.rip.get_or_insert_with(empty_rip);
                block.process_id = process;
                let mut timers = None;
                for line in &lines[1..] {
                    let body = line.trim_start();
                    if let Some(version) = body.strip_prefix("version ").and_then(|v| v.parse().ok())
                    {
                        block.version = Some(version);
                    } else if let Some(rest) = body.strip_prefix("timers basic ") {
                        let values: Vec<u32> = rest
                            .split_whitespace()
                            .filter_map(|t| t.parse().ok())
                            .collect();
                        if let [update, invalid, _holddown, flush] = values[..] {
                            timers = Some(RipTimers {
                                update_secs: update,
                                invalid_secs: invalid,
                                flush_secs: flush,
                            });
                        }
                    }
                }
                if timers.is_some() {
                    block.timers = timers;
                }
            }
            other => {
                self.warnings
                    .push(format!("unsupported routing protocol block: {other}"));
            }
        }
    }

    // == Route table ==

    fn parse_route_table(&mut self, lines: &[String]) {
        self.saw_input = true;
        self.saw_route_table = true;
        for line in lines {
            match self.dialect {
                Dialect::Ios => self.parse_ios_route_row(line),
                Dialect::Vrp => self.parse_vrp_route_row(line),
            }
        }
    }

    /// `S*    0.0.0.0/0 [1/0] via 10.0.10.254` /
    /// `O     10.1.0.0/16 [110/2] via 10.0.10.2, 00:12:33, Vlan10`
    fn parse_ios_route_row(&mut self, line: &str) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&code) = tokens.first() else { return };
        if tokens.len() < 2 || code.len() > 4 || !code.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            return;
        }
        let Some(network) = find_cidr(&tokens[1..]) else { return };

        match code.chars().next() {
            Some('O') => self.ospf_learned += 1,
            Some('D') => {
                if let Some(eigrp) = &mut self.eigrp {
                    eigrp.learned_routes.push(network);
                }
            }
            Some('R') => {
                if let Some(rip) = &mut self.rip {
                    rip.learned_routes.push(network);
                }
            }
            Some('S') => {
                let distance = bracket_distance(line).unwrap_or(IOS_STATIC_DISTANCE);
                let next_hop = tokens
                    .windows(2)
                    .find(|w| w[0] == "via")
                    .and_then(|w| parse_ipv4(w[1].trim_end_matches(',')));
                let exit_interface = tokens
                    .last()
                    .filter(|t| is_interface_name(t))
                    .map(|t| canonical_interface(t, self.dialect));
                let route = self.make_static(network, next_hop, exit_interface, distance);
                self.add_static(route);
            }
            _ => {}
        }
    }

    /// `0.0.0.0/0   Static  60   0    RD   10.0.10.254    Vlanif10`
    fn parse_vrp_route_row(&mut self, line: &str) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return;
        }
        let Some(network) = Cidr::from_prefix(tokens[0]) else {
            return;
        };
        let proto = tokens[1];
        match proto {
            "Static" => {
                let distance: u8 = tokens[2].parse().unwrap_or(VRP_STATIC_DISTANCE);
                let next_hop = tokens[3..].iter().find_map(|t| parse_ipv4(t));
                let exit_interface = tokens
                    .last()
                    .filter(|t| is_interface_name(t))
                    .map(|t| canonical_interface(t, self.dialect));
                let route = self.make_static(network, next_hop, exit_interface, distance);
                self.add_static(route);
            }
            "OSPF" => self.ospf_learned += 1,
            "RIP" => {
                if let Some(rip) = &mut self.rip {
                    rip.learned_routes.push(network);
                }
            }
            _ => {}
        }
    }

    // == OSPF command output ==

    fn parse_ospf_overview(&mut self, lines: &[String]) {
        for line in lines {
            let trimmed = line.trim();
            // `Routing Process "ospf 1" with ID 1.1.1.1` (IOS) or
            // `OSPF Process 1 with Router ID 1.1.1.1` (VRP).
            if let Some(idx) = trimmed.find("Process") {
                let tail = &trimmed[idx..];
                let process = tail
                    .split_whitespace()
                    .find_map(|t| t.trim_matches(['"', '\'']).parse::<u32>().ok());
                let router_id = tail
                    .rsplit("ID ")
                    .next()
                    .and_then(|t| parse_ipv4(t.split_whitespace().next().unwrap_or("")));
                if process.is_some() || router_id.is_some() {
                    let block = self
                        .ospf
                        .get_or_insert_with(|| empty_ospf(process.unwrap_or(1)));
                    if let Some(id) = router_id {
                        block.router_id = Some(id);
                    }
                    continue;
                }
            }
            // Interface brief rows: `Gi0/1   1   0   10.0.10.1/24  1  DR  1/1`
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if tokens.len() >= 3 && is_interface_name(tokens[0]) && self.ospf.is_some() {
                let interface = canonical_interface(tokens[0], self.dialect);
                let area = tokens[2].to_string();
                if let Some(block) = &mut self.ospf {
                    block.interfaces.push(OspfInterface { interface, area });
                }
            }
        }
    }

    /// IOS neighbor table:
    /// `2.2.2.2   1   FULL/DR   00:00:34   10.0.10.2   Vlan10`
    fn parse_ospf_neighbor_table(&mut self, lines: &[String]) {
        for line in lines {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 4 {
                continue;
            }
            let Some(neighbor_id) = parse_ipv4(tokens[0]) else {
                continue;
            };
            let priority = tokens[1].parse().ok();
            let (state, role) = split_state_role(tokens[2]);
            let address = tokens[3..].iter().find_map(|t| parse_ipv4(t));
            let interface = tokens
                .last()
                .filter(|t| is_interface_name(t))
                .map(|t| canonical_interface(t, self.dialect));
            if interface.is_none() {
                self.warnings
                    .push(format!("ospf neighbor row without interface: {}", line.trim()));
                continue;
            }
            let block = self.ospf.get_or_insert_with(|| empty_ospf(1));
            block.neighbors.push(OspfNeighbor {
                neighbor_id,
                priority,
                state,
                role,
                address,
                interface,
            });
        }
    }

    /// VRP peer blocks, one neighbor across several lines:
    /// ```text
    ///  Area 0.0.0.0 interface 10.0.10.1(Vlanif10)'s neighbors
    ///  Router ID: 2.2.2.2          Address: 10.0.10.2
    ///    State: Full  Mode:Nbr is  Master  Priority: 1
    ///    DR: 10.0.10.2  BDR: 10.0.10.1  MTU: 0
    /// ```
    fn parse_ospf_peer_blocks(&mut self, lines: &[String]) {
        let mut current_interface: Option<(String, String)> = None;
        let mut pending: Option<OspfNeighbor> = None;

        for line in lines {
            let trimmed = line.trim();

            if let Some(process) = trimmed
                .strip_prefix("OSPF Process ")
                .and_then(|rest| rest.split_whitespace().next())
                .and_then(|t| t.parse::<u32>().ok())
            {
                let router_id = trimmed
                    .rsplit("Router ID ")
                    .next()
                    .and_then(|t| parse_ipv4(t.split_whitespace().next().unwrap_or("")));
                let block = self.ospf.get_or_insert_with(|| empty_ospf(process));
                block.process_id = process;
                if let Some(id) = router_id {
                    block.router_id = Some(id);
                }
                continue;
            }

            if trimmed.starts_with("Area ") && trimmed.contains(" interface ") {
                let area = trimmed
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .to_string();
                let interface = trimmed
                    .split('(')
                    .nth(1)
                    .and_then(|rest| rest.split(')').next())
                    .map(|name| canonical_interface(name, self.dialect));
                if let Some(interface) = interface {
                    let block = self.ospf.get_or_insert_with(|| empty_ospf(1));
                    block.areas.push(area.clone());
                    block.interfaces.push(OspfInterface {
                        interface: interface.clone(),
                        area: area.clone(),
                    });
                    current_interface = Some((interface, area));
                }
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix("Router ID:") {
                self.flush_pending_peer(&mut pending);
                let words: Vec<&str> = rest.split_whitespace().collect();
                let Some(neighbor_id) = words.first().and_then(|t| parse_ipv4(t)) else {
                    self.warnings
                        .push(format!("unparseable ospf peer header: {trimmed}"));
                    continue;
                };
                let address = words
                    .windows(2)
                    .find(|w| w[0] == "Address:")
                    .and_then(|w| parse_ipv4(w[1]));
                pending = Some(OspfNeighbor {
                    neighbor_id,
                    priority: None,
                    state: String::new(),
                    role: None,
                    address,
                    interface: current_interface.as_ref().map(|(name, _)| name.clone()),
                });
                continue;
            }

            if let Some(neighbor) = &mut pending {
                if let Some(rest) = trimmed.strip_prefix("State:") {
                    neighbor.state = rest
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string();
                    if let Some(idx) = trimmed.find("Priority:") {
                        neighbor.priority = trimmed[idx + "Priority:".len()..]
                            .split_whitespace()
                            .next()
                            .and_then(|t| t.parse().ok());
                    }
                } else if trimmed.starts_with("DR:") {
                    let dr = field_ipv4(trimmed, "DR:");
                    let bdr = field_ipv4(trimmed, "BDR:");
                    neighbor.role = match (neighbor.address, dr, bdr) {
                        (Some(addr), Some(dr), _) if addr == dr => Some(OspfRole::Dr),
                        (Some(addr), _, Some(bdr)) if addr == bdr => Some(OspfRole::Bdr),
                        (Some(_), _, _) => Some(OspfRole::DrOther),
                        _ => None,
                    };
                }
            }
        }
        self.flush_pending_peer(&mut pending);
    }

    fn flush_pending_peer(&mut self, pending: &mut Option<OspfNeighbor>) {
        if let Some(neighbor) = pending.take() {
            let block = self.ospf.get_or_insert_with(|| empty_ospf(1));
            block.neighbors.push(neighbor);
        }
    }

    // == BGP command output ==

    fn parse_bgp_summary(&mut self, lines: &[String]) {
        for line in lines {
            let trimmed = line.trim();

            // `BGP router identifier 1.1.1.1, local AS number 65001` or the
            // VRP pair of `BGP local router ID : ...` / `Local AS number : ...`.
            if trimmed.contains("router identifier") || trimmed.contains("local router ID") {
                if let Some(id) = first_ipv4(trimmed) {
                    let block = self.bgp.get_or_insert_with(empty_bgp);
                    block.router_id = Some(id);
                }
            }
            if let Some(idx) = trimmed.find("AS number") {
                let local_as = trimmed[idx..]
                    .split_whitespace()
                    .find_map(|t| t.trim_matches([',', ':']).parse::<u32>().ok());
                if let Some(local_as) = local_as {
                    let block = self.bgp.get_or_insert_with(empty_bgp);
                    block.local_as = local_as;
                }
            }

            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if tokens.len() < 4 {
                continue;
            }
            let Some(address) = parse_ipv4(tokens[0]) else {
                continue;
            };
            let Some(remote_as) = tokens[2].parse::<u32>().ok() else {
                continue;
            };
            let last = tokens[tokens.len() - 1];
            // A numeric tail is the received-prefix count of an established
            // session; otherwise the tail spells the session state out.
            let (state, prefixes) = match last.parse::<u32>() {
                Ok(count) => ("Established".to_string(), Some(count)),
                Err(_) => (titlecase(last), None),
            };
            let block = self.bgp.get_or_insert_with(empty_bgp);
            upsert_bgp_peer(&mut block.peers, address, remote_as, state, prefixes);
        }
    }

    // == EIGRP command output ==

    fn parse_eigrp_output(&mut self, lines: &[String]) {
        for line in lines {
            let trimmed = line.trim();

            if let Some(idx) = trimmed.find("AS(") {
                let as_number = trimmed[idx + 3..]
                    .split(')')
                    .next()
                    .and_then(|t| t.parse::<u32>().ok());
                if let Some(as_number) = as_number {
                    let block = self.eigrp.get_or_insert_with(|| empty_eigrp(as_number));
                    block.as_number = as_number;
                }
                if let Some(idx) = trimmed.find("ID(") {
                    let router_id = trimmed[idx + 3..]
                        .split(')')
                        .next()
                        .and_then(parse_ipv4);
                    if let Some(id) = router_id {
                        if let Some(block) = &mut self.eigrp {
                            block.router_id = Some(id);
                        }
                    }
                }
                continue;
            }

            // Topology rows: `P 10.1.0.0/16, 1 successors, FD is 28160`
            if let Some(rest) = trimmed.strip_prefix("P ") {
                let prefix = rest.split_whitespace().next().unwrap_or("");
                if let Some(network) = Cidr::from_prefix(prefix.trim_end_matches(',')) {
                    let block = self.eigrp.get_or_insert_with(|| empty_eigrp(0));
                    block.learned_routes.push(network);
                }
                continue;
            }

            // Neighbor rows: `0   10.0.10.2   Gi0/1   13  00:01:02 ...`
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if tokens.len() >= 3 && tokens[0].parse::<u32>().is_ok() {
                let Some(address) = parse_ipv4(tokens[1]) else {
                    continue;
                };
                if !is_interface_name(tokens[2]) {
                    self.warnings.push(format!(
                        "eigrp neighbor row without interface: {trimmed}"
                    ));
                    continue;
                }
                let block = self.eigrp.get_or_insert_with(|| empty_eigrp(0));
                block.neighbors.push(EigrpNeighbor {
                    address,
                    interface: canonical_interface(tokens[2], self.dialect),
                    holdtime_secs: tokens.get(3).and_then(|t| t.parse().ok()),
                    uptime: tokens.get(4).map(|t| t.to_string()),
                });
            }
        }
    }

    // == RIP command output ==

    fn parse_rip_output(&mut self, lines: &[String]) {
        let mut update = None;
        let mut invalid = None;
        let mut flush = None;

        for line in lines {
            let trimmed = line.trim();

            if let Some(value) = keyword_number(trimmed, "Update time") {
                update = Some(value);
            }
            if let Some(value) = keyword_number(trimmed, "Age time") {
                invalid = Some(value);
            }
            if let Some(value) = keyword_number(trimmed, "Garbage-collect time") {
                flush = Some(value);
            }
            if let Some(version) = keyword_number(trimmed, "Version") {
                let block = self.rip.get_or_insert_with(empty_rip);
                block.version = u8::try_from(version).ok();
            }

            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            let Some(&first) = tokens.first() else { continue };
            if let Some(network) = Cidr::from_prefix(first) {
                let block = self.rip.get_or_insert_with(empty_rip);
                block.learned_routes.push(network);
                if let Some(peer) = tokens
                    .windows(2)
                    .find(|w| w[0] == "via")
                    .and_then(|w| parse_ipv4(w[1].trim_end_matches(',')))
                {
                    block.peers.push(peer);
                }
            } else if let Some(peer) = parse_ipv4(first) {
                let block = self.rip.get_or_insert_with(empty_rip);
                block.peers.push(peer);
            }
        }

        if let (Some(update_secs), Some(invalid_secs), Some(flush_secs)) = (update, invalid, flush)
        {
            let block = self.rip.get_or_insert_with(empty_rip);
            block.timers = Some(RipTimers {
                update_secs,
                invalid_secs,
                flush_secs,
            });
        }
    }
}

fn empty_ospf(process_id: u32) -> OspfBlock {
    OspfBlock {
        process_id,
        router_id: None,
        areas: Vec::new(),
        interfaces: Vec::new(),
        neighbors: Vec::new(),
        learned_prefix_count: None,
    }
}

fn empty_bgp() -> BgpBlock {
    BgpBlock {
        local_as: 0,
        router_id: None,
        peers: Vec::new(),
    }
}

fn empty_eigrp(as_number: u32) -> EigrpBlock {
    EigrpBlock {
        as_number,
        router_id: None,
        neighbors: Vec::new(),
        learned_routes: Vec::new(),
    }
}

fn empty_rip() -> RipBlock {
    RipBlock {
        process_id: None,
        version: None,
        timers: None,
        peers: Vec::new(),
        learned_routes: Vec::new(),
    }
}

fn upsert_bgp_peer(
    peers: &mut Vec<BgpPeer>,
    address: Ipv4Addr,
    remote_as: u32,
    state: String,
    prefixes: Option<u32>,
) {
    if let Some(existing) = peers.iter_mut().find(|p| p.address == address) {
        existing.remote_as = remote_as;
        existing.state = state;
        if prefixes.is_some() {
            existing.prefixes_received = prefixes;
        }
        return;
    }
    peers.push(BgpPeer {
        address,
        remote_as,
        state,
        prefixes_received: prefixes,
    });
}

/// `FULL/DR` → ("Full", Dr); `2WAY/DROTHER` → ("2Way", DrOther).
fn split_state_role(token: &str) -> (String, Option<OspfRole>) {
    let (state, role) = match token.split_once('/') {
        Some((state, role)) => (state, Some(role)),
        None => (token, None),
    };
    let role = role.and_then(|r| match r.to_ascii_uppercase().as_str() {
        "DR" => Some(OspfRole::Dr),
        "BDR" => Some(OspfRole::Bdr),
        "DROTHER" => Some(OspfRole::DrOther),
        _ => None,
    });
    (titlecase(state), role)
}

fn titlecase(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
        }
        None => String::new(),
    }
}

fn find_cidr(tokens: &[&str]) -> Option<Cidr> {
    tokens.iter().find_map(|t| Cidr::from_prefix(t))
}

/// `[200/0]` → 200.
fn bracket_distance(line: &str) -> Option<u8> {
    let start = line.find('[')?;
    let inner = &line[start + 1..line[start..].find(']')? + start];
    inner.split('/').next()?.parse().ok()
}

/// `DR: 10.0.10.2` → the address following the key.
fn field_ipv4(line: &str, key: &str) -> Option<Ipv4Addr> {
    let idx = line.find(key)?;
    line[idx + key.len()..]
        .split_whitespace()
        .next()
        .and_then(parse_ipv4)
}

/// `Update time   :   30 sec` → 30 (first number after the keyword).
fn keyword_number(line: &str, keyword: &str) -> Option<u32> {
    let idx = line.find(keyword)?;
    line[idx + keyword.len()..]
        .split_whitespace()
        .find_map(|t| t.trim_matches(':').parse().ok())
}

//! First-hop redundancy groups (HSRP / VRRP).

use super::{outcome, sections_of, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::{RedundancyGroup, RedundancyProtocol, RedundancyRole};
use crate::normalize::canonical_interface;
use crate::segmenter::{Section, SectionKind};
use crate::validators::{is_interface_name, parse_ipv4};

pub fn parse(sections: &[Section], dialect: Dialect) -> SectionOutcome<Vec<RedundancyGroup>> {
    let mut groups: Vec<RedundancyGroup> = Vec::new();
    let mut warnings = Vec::new();
    let mut saw_input = false;

    for section in sections_of(sections, &[SectionKind::Redundancy]) {
        saw_input = true;
        let protocol = section_protocol(section, dialect);
        for line in &section.lines {
            if let Some(group) = parse_row(line, dialect, protocol) {
                // The same group can show up in both a brief and a detailed
                // view; the later mention wins.
                if let Some(existing) = groups
                    .iter_mut()
                    .find(|g| g.group_id == group.group_id && g.interface == group.interface)
                {
                    *existing = group;
                } else {
                    groups.push(group);
                }
            } else if line.trim_start().starts_with(|c: char| c.is_ascii_digit())
                && parse_ipv4(line.split_whitespace().next().unwrap_or("")).is_none()
            {
                warnings.push(format!("unparseable redundancy row: {}", line.trim()));
            }
        }
    }

    let records = groups.len();
    outcome(groups, warnings, saw_input, records)
}

fn section_protocol(section: &Section, dialect: Dialect) -> RedundancyProtocol {
    if let Some(banner) = &section.banner {
        if banner.contains("vrrp") {
            return RedundancyProtocol::Vrrp;
        }
        if banner.contains("standby") {
            return RedundancyProtocol::Hsrp;
        }
    }
    match dialect {
        Dialect::Ios => RedundancyProtocol::Hsrp,
        Dialect::Vrp => RedundancyProtocol::Vrrp,
    }
}

/// `show standby brief`:
/// `Vl10        10   110 P Active  local           10.0.10.3       10.0.10.254`
/// `display vrrp brief`:
/// `10    Master       Vlanif10                 Normal   10.0.10.254`
fn parse_row(line: &str, dialect: Dialect, protocol: RedundancyProtocol) -> Option<RedundancyGroup> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }

    let (interface, group_id, rest) = if is_interface_name(tokens[0]) {
        let id: u16 = tokens[1].parse().ok()?;
        (Some(canonical_interface(tokens[0], dialect)), id, &tokens[2..])
    } else if let Ok(id) = tokens[0].parse::<u16>() {
        let interface = tokens[1..]
            .iter()
            .find(|t| is_interface_name(t))
            .map(|t| canonical_interface(t, dialect));
        (interface, id, &tokens[1..])
    } else {
        return None;
    };

    let role = rest.iter().find_map(|t| role_from(t))?;
    let priority = rest
        .iter()
        .take_while(|t| role_from(t).is_none())
        .find_map(|t| t.parse::<u8>().ok());
    let virtual_address = rest.iter().rev().find_map(|t| parse_ipv4(t));

    Some(RedundancyGroup {
        group_id,
        protocol,
        role,
        priority,
        interface,
        virtual_address,
    })
}

/// Roles normalize across dialects: VRRP master/backup are the same concept
/// as HSRP active/standby.
fn role_from(token: &str) -> Option<RedundancyRole> {
    match token.to_ascii_lowercase().as_str() {
        "active" | "master" => Some(RedundancyRole::Active),
        "standby" | "backup" => Some(RedundancyRole::Standby),
        "init" | "initialize" | "listen" | "speak" => Some(RedundancyRole::Init),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionStatus;
    use crate::segmenter::segment;

    #[test]
    fn test_ios_standby_brief() {
        let source = "\
SW1#show standby brief
                     P indicates configured to preempt.
Interface   Grp  Pri P State   Active          Standby         Virtual IP
Vl10        10   110 P Active  local           10.0.10.3       10.0.10.254
Vl20        20   90    Standby 10.0.20.3       local           10.0.20.254
";
        let parsed = parse(&segment(source), Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Success);
        assert_eq!(parsed.value.len(), 2);

        let active = &parsed.value[0];
        assert_eq!(active.group_id, 10);
        assert_eq!(active.protocol, RedundancyProtocol::Hsrp);
        assert_eq!(active.role, RedundancyRole::Active);
        assert_eq!(active.priority, Some(110));
        assert_eq!(active.interface.as_deref(), Some("Vlan10"));
        assert_eq!(
            active.virtual_address,
            Some("10.0.10.254".parse().unwrap())
        );

        assert_eq!(parsed.value[1].role, RedundancyRole::Standby);
    }

    #[test]
    fn test_vrp_vrrp_brief_roles_normalize() {
        let source = "\
<SW>display vrrp brief
VRID  State        Interface                Type     Virtual IP
10    Master       Vlanif10                 Normal   10.0.10.254
20    Backup       Vlanif20                 Normal   10.0.20.254
";
        let parsed = parse(&segment(source), Dialect::Vrp);
        assert_eq!(parsed.value.len(), 2);
        assert_eq!(parsed.value[0].role, RedundancyRole::Active);
        assert_eq!(parsed.value[0].protocol, RedundancyProtocol::Vrrp);
        assert_eq!(parsed.value[0].interface.as_deref(), Some("Vlanif10"));
        assert_eq!(parsed.value[1].role, RedundancyRole::Standby);
    }

    #[test]
    fn test_no_input_is_failed() {
        let parsed = parse(&[], Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Failed);
    }
}

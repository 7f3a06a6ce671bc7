//! VLAN database, collected as a keyed set during parsing.
//!
//! A VLAN can be mentioned by a config declaration, a batch declaration, and
//! a table row in the same capture; the id-keyed accumulator makes the
//! uniqueness invariant hold by construction rather than by filtering.

use super::{outcome, sections_of, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::Vlan;
use crate::segmenter::{Section, SectionKind};
use crate::validators::{parse_vlan_id, parse_vlan_ranges};
use std::collections::BTreeMap;

pub fn parse(sections: &[Section], _dialect: Dialect) -> SectionOutcome<Vec<Vlan>> {
    let mut vlans: BTreeMap<u16, Option<String>> = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut saw_input = false;

    for section in sections_of(sections, &[SectionKind::ConfigVlan]) {
        saw_input = true;
        parse_config_block(&section.lines, &mut vlans, &mut warnings);
    }
    for section in sections_of(sections, &[SectionKind::VlanTable]) {
        saw_input = true;
        for line in &section.lines {
            parse_table_row(line, &mut vlans);
        }
    }

    let records = vlans.len();
    let value = vlans
        .into_iter()
        .map(|(id, name)| Vlan { id, name })
        .collect();
    outcome(value, warnings, saw_input, records)
}

fn parse_config_block(
    lines: &[String],
    vlans: &mut BTreeMap<u16, Option<String>>,
    warnings: &mut Vec<String>,
) {
    let Some(opener) = lines.first() else { return };
    let Some(decl) = opener.trim_start().strip_prefix("vlan ") else {
        return;
    };

    // `vlan batch 10 20 30 to 40` declares a whole range; a single-id
    // declaration opens a block whose body may carry the name.
    let spec = decl.strip_prefix("batch ").unwrap_or(decl);
    let Some(ranges) = parse_vlan_ranges(spec) else {
        warnings.push(format!("unparseable vlan declaration: {opener}"));
        return;
    };
    let mut declared = Vec::new();
    for range in &ranges {
        for id in range.from..=range.to {
            vlans.entry(id).or_insert(None);
            declared.push(id);
        }
    }

    // A name in the block body applies only to a single-id declaration.
    if let [id] = declared[..] {
        for line in &lines[1..] {
            let body = line.trim_start();
            let name = body
                .strip_prefix("name ")
                .or_else(|| body.strip_prefix("description "));
            if let Some(name) = name {
                vlans.insert(id, Some(name.trim().to_string()));
            }
        }
    }
}

/// `show vlan brief` / `display vlan` rows: the id leads the line. Rows from
/// the brief table carry a name column; VRP membership rows do not.
fn parse_table_row(line: &str, vlans: &mut BTreeMap<u16, Option<String>>) {
    let mut tokens = line.split_whitespace();
    let Some(id) = tokens.next().and_then(parse_vlan_id) else {
        return;
    };
    let name = tokens.next().filter(|t| {
        // Status/type words in the second column mean there is no name here.
        !matches!(
            t.to_ascii_lowercase().as_str(),
            "common" | "mux" | "enable" | "disable" | "active" | "suspended" | "dynamic"
        ) && !t.contains(':')
    });

    let entry = vlans.entry(id).or_insert(None);
    if entry.is_none() {
        *entry = name.map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionStatus;
    use crate::segmenter::segment;

    #[test]
    fn test_config_blocks_with_names() {
        let source = "\
vlan 10
 name users
!
vlan 20
 name voice
!
";
        let parsed = parse(&segment(source), Dialect::Ios);
        assert_eq!(
            parsed.value,
            vec![
                Vlan { id: 10, name: Some("users".to_string()) },
                Vlan { id: 20, name: Some("voice".to_string()) },
            ]
        );
        assert_eq!(parsed.status, SectionStatus::Success);
    }

    #[test]
    fn test_batch_declaration_expands() {
        let parsed = parse(&segment("vlan batch 10 20 30 to 32\n#\n"), Dialect::Vrp);
        let ids: Vec<u16> = parsed.value.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![10, 20, 30, 31, 32]);
    }

    #[test]
    fn test_repeated_mentions_stay_unique() {
        // Declared in config, named there, then mentioned again by the
        // table view: exactly one record, name preserved.
        let source = "\
vlan 10
 name users
!
SW1#show vlan brief
VLAN Name                             Status    Ports
10   users                            active    Gi0/2
10   users                            active    Gi0/3
";
        let parsed = parse(&segment(source), Dialect::Ios);
        assert_eq!(parsed.value.len(), 1);
        assert_eq!(parsed.value[0].name.as_deref(), Some("users"));
    }

    #[test]
    fn test_table_only_rows() {
        let source = "\
SW1#show vlan brief
VLAN Name                             Status    Ports
---- -------------------------------- ---------
1    default                          active
10   users                            active    Gi0/2
";
        let parsed = parse(&segment(source), Dialect::Ios);
        assert_eq!(parsed.value.len(), 2);
        assert_eq!(parsed.value[0].name.as_deref(), Some("default"));
    }

    #[test]
    fn test_vrp_membership_rows_have_no_name() {
        let source = "\
<SW>display vlan
VID  Type    Ports
10   common  UT:GE0/0/2(U)
";
        let parsed = parse(&segment(source), Dialect::Vrp);
        assert_eq!(parsed.value, vec![Vlan { id: 10, name: None }]);
    }

    #[test]
    fn test_no_input_is_failed() {
        let parsed = parse(&[], Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Failed);
    }
}

//! Merges section outcomes into the final immutable document.
//!
//! Assembly never fails: every domain contributes whatever it extracted,
//! each with its own report, and a document where every domain came up empty
//! is still a valid result — only `diagnostics` tells it apart from a rich
//! one.

use crate::dialect::Dialect;
use crate::document::{DeviceDocument, Domain, SectionReport, SectionStatus};
use crate::normalize::{dedup_neighbors, sort_document};
use crate::sections::interfaces::InterfaceSet;
use crate::sections::{self, SectionOutcome};
use crate::segmenter::{Section, SectionKind};
use log::debug;

/// Runs every section parser over the segmented capture and assembles the
/// document. Section parsers are independent of one another; a domain that
/// fails only darkens its own report.
pub fn assemble(sections: &[Section], dialect: Dialect, device_id: &str) -> DeviceDocument {
    let overview = sections::overview::parse(sections, dialect);
    let interface_set = sections::interfaces::parse(sections, dialect);
    let vlans = sections::vlans::parse(sections, dialect);
    let spanning_tree = sections::spanning_tree::parse(sections, dialect);
    let routing = sections::routing::parse(sections, dialect);
    let acls = sections::acl::parse(sections, dialect);
    let mac_table = sections::tables::parse_mac_table(sections, dialect);
    let arp_table = sections::tables::parse_arp_table(sections, dialect);
    let neighbors = sections::neighbors::parse(sections, dialect);
    let redundancy = sections::redundancy::parse(sections, dialect);
    let system = sections::system::parse(sections, dialect);

    let mut diagnostics = Vec::new();
    let mut capture_notes = Vec::new();

    let unknown = sections
        .iter()
        .filter(|s| s.kind == SectionKind::Unknown && !s.lines.is_empty())
        .count();
    if unknown > 0 {
        capture_notes.push(format!("{unknown} unrecognized section(s) left unparsed"));
    }

    let (overview, report) = take(Domain::Overview, overview);
    diagnostics.push(report);
    let (InterfaceSet { interfaces, aggregates }, report) =
        take(Domain::Interfaces, interface_set);
    diagnostics.push(report);
    let (vlans, report) = take(Domain::Vlans, vlans);
    diagnostics.push(report);
    let (spanning_tree, report) = take(Domain::SpanningTree, spanning_tree);
    diagnostics.push(report);
    let (routing, report) = take(Domain::Routing, routing);
    diagnostics.push(report);
    let (acls, report) = take(Domain::Acls, acls);
    diagnostics.push(report);
    let (mac_table, report) = take(Domain::MacTable, mac_table);
    diagnostics.push(report);
    let (arp_table, report) = take(Domain::ArpTable, arp_table);
    diagnostics.push(report);
    let (raw_neighbors, report) = take(Domain::Neighbors, neighbors);
    diagnostics.push(report);
    let (redundancy_groups, report) = take(Domain::Redundancy, redundancy);
    diagnostics.push(report);
    let (system, report) = take(Domain::System, system);
    diagnostics.push(report);

    let neighbors = dedup_neighbors(raw_neighbors, &mut capture_notes);
    diagnostics.push(SectionReport {
        domain: Domain::Capture,
        status: SectionStatus::Success,
        notes: capture_notes,
    });

    let mut document = DeviceDocument {
        device_id: device_id.to_string(),
        dialect,
        overview,
        interfaces,
        aggregates,
        vlans,
        routing,
        spanning_tree,
        acls,
        mac_table,
        arp_table,
        neighbors,
        redundancy_groups,
        system,
        diagnostics,
    };
    sort_document(&mut document);
    debug!(
        "assembled document for {device_id}: {} interfaces, {} diagnostics",
        document.interfaces.len(),
        document.diagnostics.len()
    );
    document
}

fn take<T>(domain: Domain, outcome: SectionOutcome<T>) -> (T, SectionReport) {
    (
        outcome.value,
        SectionReport {
            domain,
            status: outcome.status,
            notes: outcome.warnings,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::segment;

    #[test]
    fn test_empty_capture_assembles_degenerate_document() {
        let document = assemble(&[], Dialect::Ios, "dev1");
        assert!(document.interfaces.is_empty());
        assert!(document.vlans.is_empty());
        // Every domain reports Failed, but a document still exists.
        assert!(document
            .diagnostics
            .iter()
            .filter(|r| r.domain != Domain::Capture)
            .all(|r| r.status == SectionStatus::Failed));
    }

    #[test]
    fn test_unknown_sections_are_counted_not_fatal() {
        let sections = segment("SW1#show widgets\nweird line one\nweird line two\n");
        let document = assemble(&sections, Dialect::Ios, "dev1");
        let capture = document
            .diagnostics
            .iter()
            .find(|r| r.domain == Domain::Capture)
            .unwrap();
        assert_eq!(capture.status, SectionStatus::Success);
        assert!(capture.notes[0].contains("1 unrecognized"));
    }
}

//! Per-domain section parsers.
//!
//! Each submodule owns one data domain and consumes only the sections tagged
//! for it. Parsers are small line-oriented state machines sharing one
//! contract: they never fail outright — anything they cannot interpret is
//! converted into warnings at the section boundary, and the outcome status
//! tells the assembler whether the domain parsed cleanly, partially, or not
//! at all. No parser reads another parser's output.

pub mod acl;
pub mod interfaces;
pub mod neighbors;
pub mod overview;
pub mod redundancy;
pub mod routing;
pub mod spanning_tree;
pub mod system;
pub mod tables;
pub mod vlans;

use crate::document::SectionStatus;
use crate::segmenter::{Section, SectionKind};

/// What one domain parser hands to the assembler: the extracted records,
/// the section status, and warnings for lines that could not be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOutcome<T> {
    pub value: T,
    pub status: SectionStatus,
    pub warnings: Vec<String>,
}

/// Applies the shared status policy:
/// no input at all → `Failed` ("command output absent"); input but zero
/// records and warnings → `Failed`; records plus warnings → `Partial`;
/// otherwise `Success`. An empty record set with clean input stays
/// `Success` — that is "not configured", not a parse failure.
pub(crate) fn outcome<T>(
    value: T,
    mut warnings: Vec<String>,
    saw_input: bool,
    record_count: usize,
) -> SectionOutcome<T> {
    let status = if !saw_input {
        warnings.push("no matching command output in capture".to_string());
        SectionStatus::Failed
    } else if record_count == 0 && !warnings.is_empty() {
        SectionStatus::Failed
    } else if warnings.is_empty() {
        SectionStatus::Success
    } else {
        SectionStatus::Partial
    };
    SectionOutcome {
        value,
        status,
        warnings,
    }
}

/// The sections belonging to a set of kinds, in capture order.
pub(crate) fn sections_of<'a>(
    sections: &'a [Section],
    kinds: &'a [SectionKind],
) -> impl Iterator<Item = &'a Section> {
    sections.iter().filter(move |s| kinds.contains(&s.kind))
}

/// All lines of the given kinds, flattened in capture order.
pub(crate) fn lines_of<'a>(sections: &'a [Section], kinds: &'a [SectionKind]) -> Vec<&'a str> {
    sections_of(sections, kinds)
        .flat_map(|s| s.lines.iter().map(String::as_str))
        .collect()
}

/// Extracts `N` from a name with a trailing numeric id, e.g.
/// `Port-channel1` → 1, `Eth-Trunk12` → 12.
pub(crate) fn trailing_id(name: &str) -> Option<u32> {
    let digits: String = name
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

/// First token on the line that parses as an IPv4 address. Tokens are
/// stripped of adjacent punctuation first (`1.1.1.1,` in running prose).
pub(crate) fn first_ipv4(line: &str) -> Option<std::net::Ipv4Addr> {
    line.split_whitespace()
        .find_map(|t| crate::validators::parse_ipv4(t.trim_matches([',', ':', ';', '(', ')'])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_policy() {
        assert_eq!(outcome((), vec![], false, 0).status, SectionStatus::Failed);
        assert_eq!(outcome((), vec![], true, 0).status, SectionStatus::Success);
        assert_eq!(outcome((), vec![], true, 3).status, SectionStatus::Success);
        assert_eq!(
            outcome((), vec!["bad row".to_string()], true, 3).status,
            SectionStatus::Partial
        );
        assert_eq!(
            outcome((), vec!["bad row".to_string()], true, 0).status,
            SectionStatus::Failed
        );
    }

    #[test]
    fn test_trailing_id() {
        assert_eq!(trailing_id("Port-channel1"), Some(1));
        assert_eq!(trailing_id("Eth-Trunk12"), Some(12));
        assert_eq!(trailing_id("Loopback0"), Some(0));
        assert_eq!(trailing_id("mgmt"), None);
    }
}

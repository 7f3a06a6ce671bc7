//! Access lists: named and numbered, from config blocks and the
//! `show access-lists` / `display acl` views.
//!
//! The identifier never comes from a blind "first word after the verb" —
//! qualifier keywords (`extended`, `advance`, `name`, `number`, ...) can sit
//! adjacent to it and must be skipped, or the keyword is captured as the
//! name.

use super::{outcome, sections_of, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::{Acl, AclAction, AclKind, AclRule};
use crate::segmenter::{Section, SectionKind};
use log::debug;
use std::collections::BTreeMap;

pub fn parse(sections: &[Section], dialect: Dialect) -> SectionOutcome<Vec<Acl>> {
    let mut parser = AclParser {
        dialect,
        acls: BTreeMap::new(),
        current: None,
        warnings: Vec::new(),
    };

    let mut saw_input = false;
    for section in sections_of(sections, &[SectionKind::ConfigAcl, SectionKind::AccessLists]) {
        saw_input = true;
        parser.current = None;
        for line in &section.lines {
            parser.feed(line);
        }
    }

    let records = parser.acls.len();
    debug!("acls: {records} lists");
    let mut value: Vec<Acl> = parser.acls.into_values().collect();
    for acl in &mut value {
        // Stable order: explicit sequence numbers first, config order as the
        // tie-break for unnumbered rules.
        acl.rules.sort_by_key(|r| r.sequence.unwrap_or(u32::MAX));
    }
    outcome(value, parser.warnings, saw_input, records)
}

struct AclParser {
    dialect: Dialect,
    acls: BTreeMap<String, Acl>,
    current: Option<String>,
    warnings: Vec<String>,
}

impl AclParser {
    fn feed(&mut self, line: &str) {
        let trimmed = line.trim_start();

        if let Some(header) = self.match_header(trimmed) {
            match header {
                Ok((name, kind)) => {
                    let acl = self.acls.entry(name.clone()).or_insert_with(|| Acl {
                        name: name.clone(),
                        kind,
                        rules: Vec::new(),
                    });
                    if acl.kind.is_none() {
                        acl.kind = kind;
                    }
                    self.current = Some(name);
                }
                Err(warning) => {
                    self.warnings.push(warning);
                    self.current = None;
                }
            }
            return;
        }

        // `access-list 101 permit tcp any any eq 22`: header and rule in one.
        if let Some(rest) = trimmed.strip_prefix("access-list ") {
            let mut words = rest.split_whitespace();
            match words.next() {
                Some(number) if number.chars().all(|c| c.is_ascii_digit()) => {
                    let kind = numbered_kind(self.dialect, number);
                    let name = number.to_string();
                    let acl = self.acls.entry(name.clone()).or_insert_with(|| Acl {
                        name: name.clone(),
                        kind,
                        rules: Vec::new(),
                    });
                    let rule_text: Vec<&str> = words.collect();
                    match parse_rule(&rule_text.join(" ")) {
                        Some(rule) => push_rule(acl, rule),
                        None => self
                            .warnings
                            .push(format!("uninterpretable access-list entry: {trimmed}")),
                    }
                    self.current = Some(name);
                }
                _ => self
                    .warnings
                    .push(format!("access-list entry without a number: {trimmed}")),
            }
            return;
        }

        // Rule lines inside the current list.
        if looks_like_rule(trimmed) {
            let Some(current) = self.current.clone() else {
                self.warnings
                    .push(format!("access-list rule outside any list: {trimmed}"));
                return;
            };
            match parse_rule(trimmed) {
                Some(rule) => {
                    if let Some(acl) = self.acls.get_mut(&current) {
                        push_rule(acl, rule);
                    }
                }
                None => self
                    .warnings
                    .push(format!("uninterpretable rule in {current}: {trimmed}")),
            }
        }
    }

    /// Matches list headers in any of the supported spellings and extracts
    /// the identifier by skipping qualifier keywords:
    /// `ip access-list extended BLOCK-TELNET`, `acl number 3001`,
    /// `acl name FILTER advance`, `Extended IP access list BLOCK-TELNET`,
    /// `Advanced ACL 3001, 2 rules`.
    #[allow(clippy::type_complexity)]
    fn match_header(&self, line: &str) -> Option<Result<(String, Option<AclKind>), String>> {
        let lowered = line.to_ascii_lowercase();

        let tail = if let Some(rest) = line.strip_prefix("ip access-list ") {
            Some(rest)
        } else if let Some(rest) = line.strip_prefix("acl ") {
            Some(rest)
        } else if lowered.starts_with("standard ip access list ")
            || lowered.starts_with("extended ip access list ")
        {
            line.splitn(5, ' ').nth(4)
        } else if lowered.starts_with("basic acl ") || lowered.starts_with("advanced acl ") {
            line.splitn(3, ' ').nth(2)
        } else {
            None
        }?;

        let mut kind = kind_from_line(&lowered);
        let mut name = None;
        for token in tail.split_whitespace() {
            let token = token.trim_end_matches(',');
            let lowered_token = token.to_ascii_lowercase();
            if self
                .dialect
                .acl_keywords()
                .contains(&lowered_token.as_str())
            {
                if kind.is_none() {
                    kind = keyword_kind(&lowered_token);
                }
                continue;
            }
            name = Some(token.to_string());
            break;
        }

        match name {
            Some(name) => {
                // VRP spells the kind after the name (`acl name FILTER advance`).
                if kind.is_none() {
                    for token in tail.split_whitespace().map(str::to_ascii_lowercase) {
                        if let Some(found) = keyword_kind(&token) {
                            kind = Some(found);
                            break;
                        }
                    }
                }
                if kind.is_none() && name.chars().all(|c| c.is_ascii_digit()) {
                    kind = numbered_kind(self.dialect, &name);
                }
                Some(Ok((name, kind)))
            }
            None => Some(Err(format!("access-list header without identifier: {line}"))),
        }
    }
}

fn push_rule(acl: &mut Acl, rule: AclRule) {
    // The same rule may arrive from config and from the show view.
    if !acl.rules.contains(&rule) {
        acl.rules.push(rule);
    }
}

fn looks_like_rule(line: &str) -> bool {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("rule") | Some("permit") | Some("deny") => true,
        Some(token) if token.chars().all(|c| c.is_ascii_digit()) => matches!(
            words.next(),
            Some("permit") | Some("deny") | Some("rule")
        ),
        _ => false,
    }
}

/// `10 deny tcp any any eq telnet (5 matches)` or
/// `rule 5 permit ip source 10.0.0.0 0.0.0.255`.
fn parse_rule(text: &str) -> Option<AclRule> {
    let mut tokens = text.split_whitespace().peekable();
    let mut sequence = None;

    loop {
        match tokens.peek().copied() {
            Some("rule") => {
                tokens.next();
            }
            Some(token) if token.chars().all(|c| c.is_ascii_digit()) => {
                sequence = token.parse().ok();
                tokens.next();
            }
            _ => break,
        }
    }

    let action = match tokens.next() {
        Some("permit") => AclAction::Permit,
        Some("deny") => AclAction::Deny,
        _ => return None,
    };

    let criteria: Vec<&str> = tokens
        .take_while(|t| !t.starts_with('('))
        .collect();
    Some(AclRule {
        sequence,
        action,
        criteria: criteria.join(" "),
    })
}

fn kind_from_line(lowered: &str) -> Option<AclKind> {
    if lowered.contains("extended") {
        Some(AclKind::Extended)
    } else if lowered.contains("standard") {
        Some(AclKind::Standard)
    } else if lowered.contains("advance") {
        Some(AclKind::Advanced)
    } else if lowered.contains("basic") {
        Some(AclKind::Basic)
    } else {
        None
    }
}

fn keyword_kind(token: &str) -> Option<AclKind> {
    match token {
        "extended" => Some(AclKind::Extended),
        "standard" => Some(AclKind::Standard),
        "advance" | "advanced" => Some(AclKind::Advanced),
        "basic" => Some(AclKind::Basic),
        _ => None,
    }
}

fn numbered_kind(dialect: Dialect, number: &str) -> Option<AclKind> {
    let id: u32 = number.parse().ok()?;
    match dialect {
        Dialect::Ios => Some(if id < 100 {
            AclKind::Standard
        } else {
            AclKind::Extended
        }),
        Dialect::Vrp => Some(if id < 3000 {
            AclKind::Basic
        } else {
            AclKind::Advanced
        }),
    }
}

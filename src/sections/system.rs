//! System health: NTP sync state, syslog destinations, CPU/memory snapshot.

use super::{first_ipv4, outcome, SectionOutcome};
use crate::dialect::Dialect;
use crate::document::{NtpStatus, SystemHealth};
use crate::segmenter::{Section, SectionKind};

pub fn parse(sections: &[Section], dialect: Dialect) -> SectionOutcome<SystemHealth> {
    let mut health = SystemHealth::default();
    let mut saw_input = false;

    for section in sections {
        match section.kind {
            SectionKind::ConfigGlobal => {
                for line in &section.lines {
                    if parse_config_line(line, dialect, &mut health) {
                        saw_input = true;
                    }
                }
            }
            SectionKind::Ntp => {
                saw_input = true;
                for line in &section.lines {
                    parse_ntp_line(line, &mut health.ntp);
                }
            }
            SectionKind::Logging => {
                saw_input = true;
                for line in &section.lines {
                    parse_logging_line(line, &mut health);
                }
            }
            SectionKind::Resources => {
                saw_input = true;
                for line in &section.lines {
                    parse_resource_line(line, &mut health);
                }
            }
            _ => {}
        }
    }

    let records = [
        health.ntp.synchronized || health.ntp.reference.is_some(),
        !health.syslog_hosts.is_empty(),
        health.cpu_load_percent.is_some(),
        health.memory_used_percent.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();
    outcome(health, Vec::new(), saw_input, records)
}

fn parse_config_line(line: &str, dialect: Dialect, health: &mut SystemHealth) -> bool {
    let trimmed = line.trim_start();
    let host = match dialect {
        Dialect::Ios => trimmed
            .strip_prefix("logging host ")
            .or_else(|| trimmed.strip_prefix("logging ")),
        Dialect::Vrp => trimmed.strip_prefix("info-center loghost "),
    };
    if let Some(host) = host {
        if let Some(address) = host.split_whitespace().next().and_then(|t| {
            crate::validators::parse_ipv4(t)
        }) {
            let spelled = address.to_string();
            if !health.syslog_hosts.contains(&spelled) {
                health.syslog_hosts.push(spelled);
            }
            return true;
        }
        return false;
    }

    let ntp_server = match dialect {
        Dialect::Ios => trimmed.strip_prefix("ntp server "),
        Dialect::Vrp => trimmed.strip_prefix("ntp-service unicast-server "),
    };
    if let Some(server) = ntp_server {
        if health.ntp.reference.is_none() {
            health.ntp.reference = server.split_whitespace().next().map(str::to_string);
        }
        return true;
    }
    false
}

/// `Clock is synchronized, stratum 3, reference is 10.0.0.5` (IOS) or the
/// VRP triple of `clock status` / `clock stratum` / `reference clock ID`.
fn parse_ntp_line(line: &str, ntp: &mut NtpStatus) {
    let trimmed = line.trim();
    let lowered = trimmed.to_ascii_lowercase();

    if lowered.contains("clock is synchronized") || lowered.contains("clock status: synchronized") {
        ntp.synchronized = true;
    } else if lowered.contains("clock is unsynchronized")
        || lowered.contains("clock status: unsynchronized")
    {
        ntp.synchronized = false;
    }

    if let Some(idx) = lowered.find("stratum") {
        if let Some(stratum) = trimmed[idx + "stratum".len()..]
            .split_whitespace()
            .find_map(|t| t.trim_matches([':', ',']).parse().ok())
        {
            ntp.stratum = Some(stratum);
        }
    }
    if lowered.contains("reference") {
        if let Some(reference) = trimmed
            .rsplit([' ', ':'])
            .next()
            .filter(|t| !t.is_empty() && t.chars().next().is_some_and(|c| c.is_ascii_digit()))
        {
            ntp.reference = Some(reference.to_string());
        }
    }
}

fn parse_logging_line(line: &str, health: &mut SystemHealth) {
    let lowered = line.to_ascii_lowercase();
    if lowered.contains("logging to") || lowered.contains("loghost") {
        if let Some(address) = first_ipv4(line) {
            let spelled = address.to_string();
            if !health.syslog_hosts.contains(&spelled) {
                health.syslog_hosts.push(spelled);
            }
        }
    }
}

/// `CPU utilization for five seconds: 7%/0%; one minute: 9%; five minutes: 8%`,
/// `CPU Usage            : 9% Max: 20%`,
/// `Processor Pool Total:  512000000 Used:  128000000 Free:  384000000`,
/// `Memory Using Percentage Is: 34%`.
fn parse_resource_line(line: &str, health: &mut SystemHealth) {
    let trimmed = line.trim();

    if let Some(idx) = trimmed.find("five minutes:") {
        health.cpu_load_percent = percent_after(&trimmed[idx + "five minutes:".len()..]);
    } else if trimmed.starts_with("CPU Usage") || trimmed.starts_with("CPU usage") {
        if health.cpu_load_percent.is_none() {
            health.cpu_load_percent = percent_after(trimmed);
        }
    }

    if let Some(idx) = trimmed.find("Memory Using Percentage Is:") {
        health.memory_used_percent =
            percent_after(&trimmed[idx + "Memory Using Percentage Is:".len()..]);
    } else if trimmed.starts_with("Processor Pool Total:") {
        let total = number_after(trimmed, "Total:");
        let used = number_after(trimmed, "Used:");
        if let (Some(total), Some(used)) = (total, used) {
            if total > 0.0 {
                health.memory_used_percent = Some(((used / total * 100.0 * 10.0).round() / 10.0) as f32);
            }
        }
    }
}

/// First `N%` in the text, as a float.
fn percent_after(text: &str) -> Option<f32> {
    for token in text.split_whitespace() {
        let token = token.trim_matches([':', ';', ',']);
        if let Some(value) = token.strip_suffix('%') {
            // `7%/0%` keeps only the first figure.
            let value = value.split('/').next().unwrap_or(value);
            if let Ok(parsed) = value.parse() {
                return Some(parsed);
            }
        }
    }
    None
}

fn number_after(text: &str, key: &str) -> Option<f64> {
    let idx = text.find(key)?;
    text[idx + key.len()..]
        .split_whitespace()
        .next()
        .and_then(|t| t.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionStatus;
    use crate::segmenter::segment;

    #[test]
    fn test_ios_system_snapshot() {
        let source = "\
ntp server 10.0.0.5
logging host 10.0.0.6
end
SW1#show ntp status
Clock is synchronized, stratum 3, reference is 10.0.0.5
SW1#show processes cpu
CPU utilization for five seconds: 7%/0%; one minute: 9%; five minutes: 8%
SW1#show processes memory
Processor Pool Total:  512000000 Used:  128000000 Free:  384000000
";
        let parsed = parse(&segment(source), Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Success);
        let health = parsed.value;
        assert!(health.ntp.synchronized);
        assert_eq!(health.ntp.stratum, Some(3));
        assert_eq!(health.ntp.reference.as_deref(), Some("10.0.0.5"));
        assert_eq!(health.syslog_hosts, vec!["10.0.0.6".to_string()]);
        assert_eq!(health.cpu_load_percent, Some(8.0));
        assert_eq!(health.memory_used_percent, Some(25.0));
    }

    #[test]
    fn test_vrp_system_snapshot() {
        let source = "\
ntp-service unicast-server 10.0.0.5
info-center loghost 10.0.0.6
return
<SW>display ntp-service status
 clock status: synchronized
 clock stratum: 3
 reference clock ID: 10.0.0.5
<SW>display cpu-usage
CPU Usage Stat. Cycle: 60 (Second)
CPU Usage            : 9% Max: 20%
<SW>display memory-usage
 Memory Using Percentage Is: 34%
";
        let parsed = parse(&segment(source), Dialect::Vrp);
        let health = parsed.value;
        assert!(health.ntp.synchronized);
        assert_eq!(health.ntp.stratum, Some(3));
        assert_eq!(health.ntp.reference.as_deref(), Some("10.0.0.5"));
        assert_eq!(health.syslog_hosts, vec!["10.0.0.6".to_string()]);
        assert_eq!(health.cpu_load_percent, Some(9.0));
        assert_eq!(health.memory_used_percent, Some(34.0));
    }

    #[test]
    fn test_unsynchronized_clock() {
        let source = "\
SW1#show ntp status
Clock is unsynchronized, stratum 16, no reference clock
";
        let parsed = parse(&segment(source), Dialect::Ios);
        assert!(!parsed.value.ntp.synchronized);
        assert_eq!(parsed.value.ntp.stratum, Some(16));
    }

    #[test]
    fn test_no_input_is_failed() {
        let parsed = parse(&[], Dialect::Ios);
        assert_eq!(parsed.status, SectionStatus::Failed);
    }
}

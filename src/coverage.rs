//! Region/operator coverage check
//!
//! Output playlists are named `<region><operator>.m3u`. Given the expected
//! regions and operators, report which combinations have no playlist yet.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::utils::format_percentage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingPlaylist {
    pub region: String,
    pub operator: String,
}

impl MissingPlaylist {
    pub fn file_name(&self) -> String {
        format!("{}{}.m3u", self.region, self.operator)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub expected: usize,
    pub existing: usize,
    /// In region order, then operator order
    pub missing: Vec<MissingPlaylist>,
}

impl CoverageReport {
    /// Share of expected playlists present; nothing expected counts as complete
    pub fn completion(&self) -> String {
        if self.expected == 0 {
            return format_percentage(1, 1);
        }
        format_percentage(self.expected - self.missing.len(), self.expected)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.missing.is_empty() {
            out.push_str("All regions have a playlist for every operator.\n");
        } else {
            out.push_str(&format!("Missing playlists ({}):\n", self.missing.len()));
            let mut by_region: BTreeMap<&str, Vec<&MissingPlaylist>> = BTreeMap::new();
            for missing in &self.missing {
                by_region.entry(missing.region.as_str()).or_default().push(missing);
            }
            for (region, entries) in by_region {
                let operators: Vec<_> = entries.iter().map(|m| m.operator.as_str()).collect();
                out.push_str(&format!("  {region}: {}\n", operators.join(", ")));
                for entry in entries {
                    out.push_str(&format!("    - {}\n", entry.file_name()));
                }
            }
        }
        out.push('\n');
        out.push_str(&format!("Expected: {}\n", self.expected));
        out.push_str(&format!("Existing: {}\n", self.existing));
        out.push_str(&format!("Missing:  {}\n", self.missing.len()));
        out.push_str(&format!("Complete: {}\n", self.completion()));
        out
    }
}

/// Compare expected `region × operator` stems with existing playlist stems
pub fn check(regions: &[String], operators: &[String], existing_stems: &HashSet<String>) -> CoverageReport {
    let mut report = CoverageReport {
        expected: regions.len() * operators.len(),
        existing: existing_stems.len(),
        missing: Vec::new(),
    };

    for region in regions {
        for operator in operators {
            if !existing_stems.contains(&format!("{region}{operator}")) {
                report.missing.push(MissingPlaylist {
                    region: region.clone(),
                    operator: operator.clone(),
                });
            }
        }
    }
    report
}

/// Split a playlist stem into `(region, operator)` when it ends with a known operator
pub fn split_stem<'a>(stem: &'a str, operators: &[String]) -> Option<(&'a str, &'a str)> {
    operators.iter().find_map(|operator| {
        stem.strip_suffix(operator.as_str())
            .filter(|region| !region.is_empty())
            .map(|region| (region, &stem[region.len()..]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reports_missing_combinations() {
        let regions = strings(&["北京", "天津"]);
        let operators = strings(&["移动", "联通", "电信"]);
        let existing: HashSet<String> = ["北京移动", "北京联通", "北京电信", "天津联通", "其他"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let report = check(&regions, &operators, &existing);

        assert_eq!(report.expected, 6);
        assert_eq!(report.existing, 5);
        let files: Vec<_> = report.missing.iter().map(MissingPlaylist::file_name).collect();
        assert_eq!(files, vec!["天津移动.m3u", "天津电信.m3u"]);
        assert_eq!(report.completion(), "66.7%");
        assert!(report.render().contains("  天津: 移动, 电信\n"));
    }

    #[test]
    fn empty_expectation_is_complete() {
        let report = check(&[], &strings(&["移动"]), &HashSet::new());
        assert!(report.missing.is_empty());
        assert_eq!(report.completion(), "100.0%");
        assert!(report.render().ends_with("Complete: 100.0%\n"));
        assert!(report.render().starts_with("All regions"));
    }

    #[test]
    fn splits_stems_on_operator_suffix() {
        let operators = strings(&["移动", "联通", "电信"]);
        assert_eq!(split_stem("广东电信", &operators), Some(("广东", "电信")));
        assert_eq!(split_stem("电信", &operators), None);
        assert_eq!(split_stem("广东", &operators), None);
    }
}

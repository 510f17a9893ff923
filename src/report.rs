use std::fmt::Write;

use crate::model::RankedRecord;
use crate::roster::Roster;

/// Positions and scores behind the prediction, best first.
pub fn model_table(ranked: &[RankedRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3} | {:<24} | {:>4} | {:>5} | {:>5} | {:>6}",
        "#", "Driver", "Race", "Quali", "Pract", "Score"
    );
    let _ = writeln!(out, "{}", "-".repeat(64));

    for (i, r) in ranked.iter().enumerate() {
        let rec = &r.record;
        let _ = writeln!(
            out,
            "{:>3} | {:<24} | {:>4} | {:>5} | {:>5} | {:>6}",
            i + 1,
            truncate(&rec.competitor, 24),
            position(rec.race),
            position(rec.qualifying),
            position(rec.practice),
            r.score.map(|s| format!("{:.2}", s)).unwrap_or_else(|| "-".into()),
        );
    }
    out
}

/// `1. Name` per line under a banner for the predicted event.
pub fn listing(ranked: &[RankedRecord], target_event: &str) -> String {
    let banner = format!("Predicted {} Results:", target_event);
    let mut out = format!("{}\n{}\n", banner, "=".repeat(banner.chars().count()));
    for (i, r) in ranked.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, r.competitor());
    }
    out
}

/// Summary line with the car numbers, then one `number | code | name` line per driver.
pub fn roster_listing(roster: &Roster) -> String {
    let mut out = format!(
        "Current {} Driver Roster ({}): {:?}\n",
        roster.season,
        roster.event,
        roster.numbers()
    );
    let date = roster.date.map(|d| format!(", {}", d)).unwrap_or_default();
    let _ = writeln!(out, "Round {}{}", roster.round, date);
    for d in &roster.drivers {
        let _ = writeln!(
            out,
            "{:>3} | {:<3} | {}",
            d.number,
            d.code.as_deref().unwrap_or("-"),
            truncate(&d.name, 24)
        );
    }
    out
}

fn position(p: Option<u32>) -> String {
    p.map(|p| p.to_string()).unwrap_or_else(|| "-".into())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MergedRecord;

    fn ranked(name: &str, positions: [Option<u32>; 3], score: Option<f64>) -> RankedRecord {
        RankedRecord {
            record: MergedRecord {
                competitor: name.into(),
                race: positions[0],
                qualifying: positions[1],
                practice: positions[2],
            },
            score,
        }
    }

    #[test]
    fn listing_is_one_based() {
        let rows = vec![
            ranked("Lando Norris", [Some(1), Some(1), Some(2)], Some(1.1)),
            ranked("Max Verstappen", [Some(2), Some(3), Some(5)], Some(2.6)),
        ];
        let text = listing(&rows, "China GP");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Predicted China GP Results:");
        assert_eq!(lines[1].len(), lines[0].len());
        assert_eq!(lines[2..], ["1. Lando Norris", "2. Max Verstappen"]);
    }

    #[test]
    fn model_table_marks_unknowns() {
        let rows = vec![ranked("Carlos Sainz", [None, Some(6), Some(4)], None)];
        let text = model_table(&rows);
        let last = text.lines().last().unwrap();
        assert!(last.contains("Carlos Sainz"));
        assert!(last.trim_end().ends_with('-'));
        assert!(last.contains("|    - |"));
    }

    #[test]
    fn roster_lists_every_driver() {
        let body = std::fs::read_to_string("tests/fixtures/roster-2024.json").unwrap();
        let roster = crate::roster::parse_roster(2024, &body).unwrap();
        let text = roster_listing(&roster);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            r#"Current 2024 Driver Roster (Abu Dhabi Grand Prix): ["4", "55", "16", "44", "63", "1"]"#
        );
        assert_eq!(lines[1], "Round 24, 2024-12-08");
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[7], "  1 | VER | Max Verstappen");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("Short", 24), "Short");
        assert_eq!(truncate("Andrea Kimi Antonelli Junior III", 24).chars().count(), 24);
    }
}

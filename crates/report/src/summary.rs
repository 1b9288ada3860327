//! Written tour summary.

use crate::format::{thousands, thousands_f64};
use std::fmt::Write;
use tour_analysis::{Ranking, TourStats};
use tour_core::Show;

const RULE_WIDTH: usize = 72;
const SECTION_WIDTH: usize = 40;

/// Render the plain-text summary.
pub fn render_summary(title: &str, ranking: &Ranking, stats: &TourStats, top_n: usize) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    line(&mut out, &rule);
    line(&mut out, &title.to_uppercase());
    line(&mut out, &rule);
    line(&mut out, "");

    write_overview(&mut out, stats);

    section(&mut out, &format!("TOP {} SHOWS (by total tickets sold)", top_n));
    write_show_block(&mut out, &ranking.top);

    section(
        &mut out,
        &format!("BOTTOM {} SHOWS (by total tickets sold, excluding unsold)", top_n),
    );
    write_show_block(&mut out, &ranking.bottom);

    section(&mut out, "KEY INSIGHTS");
    for (i, insight) in insights(ranking, stats).iter().enumerate() {
        line(&mut out, &format!("{}. {}", i + 1, insight));
        line(&mut out, "");
    }

    line(&mut out, &rule);
    line(&mut out, "Generated by tour-sales");
    out.push_str(&rule);
    out
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn section(out: &mut String, heading: &str) {
    line(out, heading);
    line(out, &"-".repeat(SECTION_WIDTH));
}

fn write_overview(out: &mut String, stats: &TourStats) {
    section(out, "TOUR OVERVIEW");
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Total shows on tour:           {}", stats.show_count);
    let _ = writeln!(out, "Shows with sales data:         {}", stats.shows_with_sales);
    let _ = writeln!(
        out,
        "Shows with no sales data:      {} (likely not yet on sale)",
        stats.shows_without_sales
    );
    let _ = writeln!(out, "Total tickets sold (tour):     {}", thousands(stats.total_tickets));
    let _ = writeln!(out, "Average per show:              {}", thousands(stats.average_per_show));
    let _ = writeln!(
        out,
        "Median per show:               {}",
        thousands_f64(stats.median_per_show)
    );
    let _ = writeln!(
        out,
        "Total upsell tickets:          {} ({:.1}% of total)",
        thousands(stats.total_upsell_tickets),
        stats.overall_upsell_pct
    );
    line(out, "");
}

fn write_show_block(out: &mut String, shows: &[Show]) {
    if shows.is_empty() {
        line(out, "  (no shows with sales)");
        line(out, "");
        return;
    }
    for (i, show) in shows.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. Venue {}, Date {}",
            i + 1,
            show.venue_id,
            show.event_dt_text
        );
        let _ = writeln!(out, "     Concert tickets:  {:>8}", thousands(show.concert_tickets));
        let _ = writeln!(out, "     Upsell tickets:   {:>8}", thousands(show.upsell_tickets));
        let _ = writeln!(out, "     TOTAL:            {:>8}", thousands(show.total_tickets));
        let _ = writeln!(out, "     Upsell %:         {:>7.1}%", show.upsell_pct);
        line(out, "");
    }
}

/// Narrative findings, in order. Findings that need a selling show are
/// skipped when nothing sold.
fn insights(ranking: &Ranking, stats: &TourStats) -> Vec<String> {
    let mut found = Vec::new();

    if let (Some(top), Some(lowest)) = (ranking.highest(), ranking.lowest()) {
        let ratio = if lowest.total_tickets > 0 {
            top.total_tickets as f64 / lowest.total_tickets as f64
        } else {
            0.0
        };
        found.push(format!(
            "MASSIVE VARIANCE IN SHOW PERFORMANCE: The top show (Venue {}, {} tickets) \
             sold ~{:.0}x more than the lowest-selling show (Venue {}, {} tickets). \
             This suggests very different venue capacities or market demand across cities.",
            top.venue_id,
            thousands(top.total_tickets),
            ratio,
            lowest.venue_id,
            thousands(lowest.total_tickets)
        ));
    }

    if stats.shows_with_sales > 0 {
        found.push(format!(
            "UPSELL ATTACHMENT IS INCONSISTENT: Only {} of {} shows with sales data ({:.0}%) \
             have any upsell ticket sales. The overall upsell rate is just {:.1}% of total \
             tickets. This represents a significant untapped revenue opportunity.",
            stats.shows_with_upsells,
            stats.shows_with_sales,
            stats.upsell_coverage_pct(),
            stats.overall_upsell_pct
        ));
    }

    if let (Some(mean), Some(leader)) = (stats.mean_upsell_pct_with_upsells, &stats.top_upsell_show)
    {
        found.push(format!(
            "WHERE UPSELLS EXIST, THEY MATTER: Among the {} shows that DO have upsell sales, \
             the average upsell rate is {:.1}%. The highest upsell rate is at Venue {} ({:.1}%). \
             Venues with upsell infrastructure consistently generate incremental revenue.",
            stats.shows_with_upsells, mean, leader.venue_id, leader.upsell_pct
        ));
    }

    if let Some(top) = ranking.highest() {
        let mut text = format!(
            "TOP SHOWS DON'T NEED UPSELLS TO WIN: The #1 show (Venue {}) has {:.1}% upsell \
             rate; its dominance comes from concert ticket volume.",
            top.venue_id, top.upsell_pct
        );
        let leaning: Vec<String> = stats
            .upsell_leaning
            .iter()
            .map(|l| format!("Venue {} ({:.1}%)", l.venue_id, l.upsell_pct))
            .collect();
        if !leaning.is_empty() {
            let _ = write!(
                text,
                " Meanwhile, smaller shows like {} lean more heavily on upsells to boost \
                 total numbers.",
                leaning.join(" and ")
            );
        }
        found.push(text);
    }

    found.push(format!(
        "DATA GAPS: {} of {} shows have zero ticket sales rows. These should be \
         investigated; they may be future on-sale dates or data pipeline issues.",
        stats.shows_without_sales, stats.show_count
    ));

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tour_analysis::rank_shows;
    use tour_core::Event;

    fn make_show(id: &str, venue: &str, concert: u64, upsell: u64) -> Show {
        let event = Event::new(
            id,
            "Super Awesome Tour",
            venue,
            Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap(),
        );
        Show::new(&event, concert, upsell, Vec::new())
    }

    fn tour() -> Vec<Show> {
        vec![
            make_show("a", "100", 36_000, 1_000),
            make_show("b", "200", 20_000, 0),
            make_show("c", "300", 1_600, 400),
            make_show("d", "400", 900, 100),
            make_show("e", "500", 0, 0),
        ]
    }

    #[test]
    fn test_summary_sections() {
        let shows = tour();
        let ranking = rank_shows(&shows, 2);
        let stats = TourStats::from_shows(&shows);

        let text = render_summary("Neon Harbor - Super Awesome Tour", &ranking, &stats, 2);

        assert!(text.starts_with(&"=".repeat(72)));
        assert!(text.contains("NEON HARBOR - SUPER AWESOME TOUR"));
        assert!(text.contains("Total shows on tour:           5"));
        assert!(text.contains("Shows with no sales data:      1 (likely not yet on sale)"));
        assert!(text.contains("Total tickets sold (tour):     60,000"));
        assert!(text.contains("TOP 2 SHOWS"));
        assert!(text.contains("  1. Venue 100, Date 2024-01-01T20:00:00+00:00"));
        assert!(text.contains("     TOTAL:              37,000"));
        assert!(text.contains("     Upsell %:             2.7%"));
        assert!(text.contains("BOTTOM 2 SHOWS"));
        assert!(text.contains("DATA GAPS: 1 of 5 shows"));
        assert!(text.ends_with(&"=".repeat(72)));
    }

    #[test]
    fn test_insights() {
        let shows = tour();
        let ranking = rank_shows(&shows, 2);
        let stats = TourStats::from_shows(&shows);

        let found = insights(&ranking, &stats);
        assert_eq!(found.len(), 5);
        // 37,000 / 1,000
        assert!(found[0].contains("~37x"), "{}", found[0]);
        assert!(found[1].contains("Only 3 of 4 shows"));
        assert!(found[2].contains("Venue 300 (20.0%)"));
        assert!(found[3].contains("Venue 300 (20.0%) and Venue 400 (10.0%)"), "{}", found[3]);
    }

    #[test]
    fn test_summary_without_sales() {
        let shows = vec![make_show("e", "500", 0, 0)];
        let ranking = rank_shows(&shows, 2);
        let stats = TourStats::from_shows(&shows);

        let text = render_summary("Tour", &ranking, &stats, 2);
        assert!(text.contains("(no shows with sales)"));
        assert!(!text.contains("MASSIVE VARIANCE"));
        assert!(text.contains("1. DATA GAPS: 1 of 1 shows"));
    }

    #[test]
    fn test_summary_prints_source_date() {
        let event =
            Event::from_source("a", "Super Awesome Tour", "1", "2024-03-09T20:00:00-05:00").unwrap();
        let shows = vec![Show::new(&event, 100, 5, Vec::new())];
        let ranking = rank_shows(&shows, 1);
        let stats = TourStats::from_shows(&shows);

        let text = render_summary("Tour", &ranking, &stats, 1);
        assert!(text.contains("  1. Venue 1, Date 2024-03-09T20:00:00-05:00"), "{}", text);
        assert!(!text.contains("2024-03-10"));
    }
}

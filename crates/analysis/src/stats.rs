//! Tour-wide statistics over the aggregated shows.

use ordered_float::OrderedFloat;
use serde::Serialize;
use statrs::statistics::{Data, Median, Statistics};
use std::cmp::Reverse;
use tour_core::{upsell_percentage, EventId, Show, VenueId};

/// A show singled out for its upsell rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsellLeader {
    pub concert_id: EventId,
    pub venue_id: VenueId,
    pub total_tickets: u64,
    pub upsell_pct: f64,
}

impl From<&Show> for UpsellLeader {
    fn from(show: &Show) -> Self {
        Self {
            concert_id: show.concert_id.clone(),
            venue_id: show.venue_id.clone(),
            total_tickets: show.total_tickets,
            upsell_pct: show.upsell_pct,
        }
    }
}

/// Summary numbers for the whole tour.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TourStats {
    /// Concerts on the tour (one show each).
    pub show_count: usize,
    /// Shows that sold at least one ticket.
    pub shows_with_sales: usize,
    /// Shows with no sales rows.
    pub shows_without_sales: usize,
    /// Tickets across all shows.
    pub total_tickets: u64,
    /// Upsell tickets across all shows.
    pub total_upsell_tickets: u64,
    /// total_upsell_tickets / total_tickets * 100.
    pub overall_upsell_pct: f64,
    /// Integer average over selling shows.
    pub average_per_show: u64,
    /// Median total over selling shows.
    pub median_per_show: f64,
    /// Sample standard deviation of totals over selling shows (0 with fewer than two).
    pub std_dev_per_show: f64,
    /// Selling shows with at least one upsell ticket.
    pub shows_with_upsells: usize,
    /// Mean upsell rate among `shows_with_upsells`.
    pub mean_upsell_pct_with_upsells: Option<f64>,
    /// Highest upsell rate on the tour.
    pub top_upsell_show: Option<UpsellLeader>,
    /// Average total for selling shows with upsell sales.
    pub avg_tickets_with_upsells: f64,
    /// Average total for selling shows without upsell sales.
    pub avg_tickets_without_upsells: f64,
    /// Below-median shows with the highest upsell rates, highest first.
    pub upsell_leaning: Vec<UpsellLeader>,
}

impl TourStats {
    /// Number of below-median shows reported in `upsell_leaning`.
    pub const UPSELL_LEANING_COUNT: usize = 2;

    /// Compute statistics from the full show list.
    pub fn from_shows(shows: &[Show]) -> Self {
        let with_sales: Vec<&Show> = shows.iter().filter(|s| s.has_sales()).collect();
        let (with_upsells, without_upsells): (Vec<&Show>, Vec<&Show>) =
            with_sales.iter().copied().partition(|s| s.has_upsell_sales());

        let total_tickets: u64 = shows.iter().map(|s| s.total_tickets).sum();
        let total_upsell_tickets: u64 = shows.iter().map(|s| s.upsell_tickets).sum();

        let totals: Vec<f64> = with_sales.iter().map(|s| s.total_tickets as f64).collect();
        let median_per_show = if totals.is_empty() {
            0.0
        } else {
            Data::new(totals.clone()).median()
        };
        let std_dev_per_show = if totals.len() < 2 {
            0.0
        } else {
            totals.iter().std_dev()
        };

        let mean_upsell_pct_with_upsells = if with_upsells.is_empty() {
            None
        } else {
            Some(with_upsells.iter().map(|s| s.upsell_pct).mean())
        };

        // Ties go to the show that comes first in ranking order:
        // more tickets, then lower concert id.
        let top_upsell_show = with_upsells
            .iter()
            .max_by_key(|s| {
                (OrderedFloat(s.upsell_pct), s.total_tickets, Reverse(s.concert_id.clone()))
            })
            .map(|&s| UpsellLeader::from(s));

        let mut leaning: Vec<&Show> = with_upsells
            .iter()
            .copied()
            .filter(|s| (s.total_tickets as f64) < median_per_show)
            .collect();
        leaning.sort_by_key(|s| (Reverse(OrderedFloat(s.upsell_pct)), s.concert_id.clone()));
        let upsell_leaning = leaning
            .into_iter()
            .take(Self::UPSELL_LEANING_COUNT)
            .map(UpsellLeader::from)
            .collect();

        Self {
            show_count: shows.len(),
            shows_with_sales: with_sales.len(),
            shows_without_sales: shows.len() - with_sales.len(),
            total_tickets,
            total_upsell_tickets,
            overall_upsell_pct: upsell_percentage(total_upsell_tickets, total_tickets),
            average_per_show: if with_sales.is_empty() {
                0
            } else {
                total_tickets / with_sales.len() as u64
            },
            median_per_show,
            std_dev_per_show,
            shows_with_upsells: with_upsells.len(),
            mean_upsell_pct_with_upsells,
            top_upsell_show,
            avg_tickets_with_upsells: average_total(&with_upsells),
            avg_tickets_without_upsells: average_total(&without_upsells),
            upsell_leaning,
        }
    }

    /// Share of selling shows that sold any upsell tickets, in percent.
    pub fn upsell_coverage_pct(&self) -> f64 {
        if self.shows_with_sales > 0 {
            self.shows_with_upsells as f64 / self.shows_with_sales as f64 * 100.0
        } else {
            0.0
        }
    }
}

fn average_total(shows: &[&Show]) -> f64 {
    if shows.is_empty() {
        0.0
    } else {
        shows.iter().map(|s| s.total_tickets as f64).sum::<f64>() / shows.len() as f64
    }
}

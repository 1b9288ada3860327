//! Top/bottom show selection.

use serde::Serialize;
use tour_core::{EventId, Show};
use tracing::debug;

/// Best and worst selling shows. Shows without sales are never in either list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ranking {
    /// Highest totals first.
    pub top: Vec<Show>,
    /// The lowest totals, still in descending order (the lowest is last).
    pub bottom: Vec<Show>,
}

impl Ranking {
    /// Concert ids present in both lists.
    ///
    /// Non-empty when fewer than `2 * n` shows have sales.
    pub fn overlap(&self) -> Vec<&EventId> {
        self.top
            .iter()
            .filter(|t| self.bottom.iter().any(|b| b.concert_id == t.concert_id))
            .map(|t| &t.concert_id)
            .collect()
    }

    /// Lowest selling show, if any show sold.
    pub fn lowest(&self) -> Option<&Show> {
        self.bottom.last()
    }

    /// Highest selling show, if any show sold.
    pub fn highest(&self) -> Option<&Show> {
        self.top.first()
    }
}

/// Select the top and bottom `n` shows from a list sorted descending by total.
///
/// Both lists are drawn from the shows that sold at least one ticket. When
/// fewer than `2 * n` such shows exist the lists overlap.
pub fn rank_shows(shows: &[Show], n: usize) -> Ranking {
    let with_sales: Vec<&Show> = shows.iter().filter(|s| s.has_sales()).collect();

    let top: Vec<Show> = with_sales.iter().take(n).map(|&s| s.clone()).collect();
    let bottom: Vec<Show> = with_sales[with_sales.len().saturating_sub(n)..]
        .iter()
        .map(|&s| s.clone())
        .collect();

    let ranking = Ranking { top, bottom };
    let overlap = ranking.overlap();
    if !overlap.is_empty() {
        debug!(
            n,
            with_sales = with_sales.len(),
            overlap = overlap.len(),
            "top and bottom lists overlap"
        );
    }

    ranking
}

use std::collections::BTreeMap;

use super::model::{Dataset, LaunchRecord, Outcome, PayloadRange, SiteFilter};

// ---------------------------------------------------------------------------
// Pie chart: outcome composition for a site
// ---------------------------------------------------------------------------

/// Number of records per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub success: usize,
    pub failure: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.success += 1,
            Outcome::Failure => self.failure += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.failure
    }

    /// Fraction of successful launches, `None` when nothing was counted.
    pub fn success_rate(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            n => Some(self.success as f64 / n as f64),
        }
    }
}

/// Chart description for the success pie.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub counts: OutcomeCounts,
}

impl PieChart {
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    /// Non-empty groups, success first.
    pub fn slices(&self) -> Vec<(Outcome, usize)> {
        [
            (Outcome::Success, self.counts.success),
            (Outcome::Failure, self.counts.failure),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect()
    }
}

/// Count outcomes for the selected site (or all of them).
///
/// A site name that does not occur in the dataset yields zero counts.
pub fn pie_chart(dataset: &Dataset, site: &SiteFilter) -> PieChart {
    let mut counts = OutcomeCounts::default();
    for rec in dataset.records.iter().filter(|r| site.matches(&r.site)) {
        counts.record(rec.outcome);
    }

    let title = match site {
        SiteFilter::All => "Total Success Launches".to_string(),
        SiteFilter::Site(s) => format!("Success vs. Failure for {s}"),
    };

    PieChart { title, counts }
}

// ---------------------------------------------------------------------------
// Scatter chart: payload vs. outcome
// ---------------------------------------------------------------------------

/// One plotted launch.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    pub booster_category: String,
    pub flight_number: Option<u32>,
    pub booster_version: Option<String>,
}

impl From<&LaunchRecord> for ScatterPoint {
    fn from(rec: &LaunchRecord) -> Self {
        Self {
            payload_mass_kg: rec.payload_mass_kg,
            outcome: rec.outcome,
            booster_category: rec.booster_category.clone(),
            flight_number: rec.flight_number,
            booster_version: rec.booster_version.clone(),
        }
    }
}

/// Chart description for the payload scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    /// Points in dataset order.
    pub points: Vec<ScatterPoint>,
}

impl ScatterChart {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points grouped by booster category, one series per category.
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&ScatterPoint>> {
        let mut grouped: BTreeMap<&str, Vec<&ScatterPoint>> = BTreeMap::new();
        for p in &self.points {
            grouped.entry(p.booster_category.as_str()).or_default().push(p);
        }
        grouped
    }
}

/// Select launches for the site and inclusive payload range.
///
/// An inverted range, or one that misses every payload, gives an empty chart.
pub fn scatter_chart(dataset: &Dataset, site: &SiteFilter, payload: PayloadRange) -> ScatterChart {
    let points = dataset
        .records
        .iter()
        .filter(|r| site.matches(&r.site))
        .filter(|r| payload.contains(r.payload_mass_kg))
        .map(ScatterPoint::from)
        .collect();

    let title = match site {
        SiteFilter::All => "Payload vs. Mission Outcome for All Sites".to_string(),
        SiteFilter::Site(s) => format!("Payload vs. Mission Outcome for {s}"),
    };

    ScatterChart { title, points }
}

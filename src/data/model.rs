use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Column names of the launch records table
// ---------------------------------------------------------------------------

pub const COL_SITE: &str = "Launch Site";
pub const COL_PAYLOAD: &str = "Payload Mass (kg)";
pub const COL_CLASS: &str = "class";
pub const COL_BOOSTER_CATEGORY: &str = "Booster Version Category";
pub const COL_FLIGHT_NUMBER: &str = "Flight Number";
pub const COL_BOOSTER_VERSION: &str = "Booster Version";

/// UI value of the "all sites" sentinel.
pub const ALL_SITES: &str = "ALL";

// ---------------------------------------------------------------------------
// Outcome – the binary `class` column
// ---------------------------------------------------------------------------

/// Launch outcome. Stored as `1` (success) / `0` (failure) in the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// Interpret a numeric class value. Only exact 0 and 1 are accepted.
    pub fn from_class(class: f64) -> Option<Self> {
        if class == 1.0 {
            Some(Outcome::Success)
        } else if class == 0.0 {
            Some(Outcome::Failure)
        } else {
            None
        }
    }

    /// Value on the scatter chart's y axis.
    pub fn as_class(self) -> f64 {
        match self {
            Outcome::Success => 1.0,
            Outcome::Failure => 0.0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "Success"),
            Outcome::Failure => write!(f, "Failure"),
        }
    }
}

// ---------------------------------------------------------------------------
// LaunchRecord – one row of the table
// ---------------------------------------------------------------------------

/// A single launch attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRecord {
    pub site: String,
    /// Payload mass in kilograms, never negative.
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    /// Used for colouring only, never for filtering.
    pub booster_category: String,
    pub flight_number: Option<u32>,
    pub booster_version: Option<String>,
}

#[cfg(test)]
impl LaunchRecord {
    pub fn new(site: &str, payload_mass_kg: f64, outcome: Outcome, booster_category: &str) -> Self {
        Self {
            site: site.to_string(),
            payload_mass_kg,
            outcome,
            booster_category: booster_category.to_string(),
            flight_number: None,
            booster_version: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection – what the user has picked in the controls
// ---------------------------------------------------------------------------

/// Site selector: every site, or one named site.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SiteFilter {
    #[default]
    All,
    Site(String),
}

impl SiteFilter {
    /// Parse the control value; `"ALL"` is the sentinel, anything else a site name.
    pub fn from_value(value: &str) -> Self {
        if value == ALL_SITES {
            SiteFilter::All
        } else {
            SiteFilter::Site(value.to_string())
        }
    }

    pub fn matches(&self, site: &str) -> bool {
        match self {
            SiteFilter::All => true,
            SiteFilter::Site(s) => s == site,
        }
    }

    /// Label shown in the site selector.
    pub fn label(&self) -> &str {
        match self {
            SiteFilter::All => "All Sites",
            SiteFilter::Site(s) => s,
        }
    }
}

/// Inclusive payload interval in kg. `lower > upper` is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadRange {
    pub lower: f64,
    pub upper: f64,
}

impl PayloadRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, mass: f64) -> bool {
        self.lower <= mass && mass <= self.upper
    }

    pub fn is_inverted(&self) -> bool {
        self.lower > self.upper
    }
}

/// Current control values. Rebuilt from the widgets, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub site: SiteFilter,
    pub payload: PayloadRange,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// All launch records plus pre-computed column indices. Read-only after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<LaunchRecord>,
    /// Sorted distinct site names.
    pub sites: BTreeSet<String>,
    /// Sorted distinct booster version categories.
    pub booster_categories: BTreeSet<String>,
    /// Observed `(min, max)` payload, `None` for an empty table.
    pub payload_extent: Option<(f64, f64)>,
}

impl Dataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<LaunchRecord>) -> Self {
        let mut sites = BTreeSet::new();
        let mut booster_categories = BTreeSet::new();
        let mut payload_extent: Option<(f64, f64)> = None;

        for rec in &records {
            sites.insert(rec.site.clone());
            booster_categories.insert(rec.booster_category.clone());
            let m = rec.payload_mass_kg;
            payload_extent = Some(match payload_extent {
                Some((lo, hi)) => (lo.min(m), hi.max(m)),
                None => (m, m),
            });
        }

        Dataset {
            records,
            sites,
            booster_categories,
            payload_extent,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

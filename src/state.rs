use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::{DashboardConfig, SliderBounds};
use crate::data::aggregate::{PieChart, ScatterChart, pie_chart, scatter_chart};
use crate::data::model::{Dataset, PayloadRange, Selection, SiteFilter};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Widgets never recompute charts themselves: they call the setters below,
/// which rerun the aggregators once per actual change.
pub struct AppState {
    /// Loaded once at startup, never mutated.
    pub dataset: Arc<Dataset>,

    /// Current control values.
    pub selection: Selection,

    /// Display bounds of the payload sliders.
    pub slider: SliderBounds,

    /// Booster category colours for the scatter chart.
    pub color_map: ColorMap,

    /// Cached chart descriptions for the current selection.
    pub pie: PieChart,
    pub scatter: ScatterChart,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, config: &DashboardConfig) -> Self {
        let slider = config.payload_slider;
        let selection = Selection {
            site: SiteFilter::from_value(&config.default_site),
            payload: default_payload_range(&dataset, slider),
        };
        let pie = pie_chart(&dataset, &selection.site);
        let scatter = scatter_chart(&dataset, &selection.site, selection.payload);
        let color_map = ColorMap::new(&dataset.booster_categories);

        Self {
            dataset,
            selection,
            slider,
            color_map,
            pie,
            scatter,
        }
    }

    /// Site selector changed: both charts depend on it.
    pub fn set_site(&mut self, site: SiteFilter) {
        if self.selection.site == site {
            return;
        }
        log::debug!("Site selection changed to {site:?}");
        self.selection.site = site;
        self.pie = pie_chart(&self.dataset, &self.selection.site);
        self.refresh_scatter();
    }

    /// Payload range changed: only the scatter chart depends on it.
    pub fn set_payload_range(&mut self, payload: PayloadRange) {
        if self.selection.payload == payload {
            return;
        }
        log::debug!(
            "Payload range changed to [{}, {}] kg",
            payload.lower,
            payload.upper
        );
        self.selection.payload = payload;
        self.refresh_scatter();
    }

    /// Restore the data-derived payload range.
    pub fn reset_payload_range(&mut self) {
        self.set_payload_range(default_payload_range(&self.dataset, self.slider));
    }

    /// Entries of the site selector: "All Sites" first, then each site.
    pub fn site_options(&self) -> Vec<SiteFilter> {
        std::iter::once(SiteFilter::All)
            .chain(self.dataset.sites.iter().cloned().map(SiteFilter::Site))
            .collect()
    }

    fn refresh_scatter(&mut self) {
        self.scatter = scatter_chart(&self.dataset, &self.selection.site, self.selection.payload);
        log::debug!(
            "{}: {} of {} launches shown",
            self.scatter.title,
            self.scatter.len(),
            self.dataset.len()
        );
    }
}

/// The dataset's `[min, max]` payload, or the full slider span when empty.
fn default_payload_range(dataset: &Dataset, slider: SliderBounds) -> PayloadRange {
    match dataset.payload_extent {
        Some((lo, hi)) => PayloadRange::new(lo, hi),
        None => PayloadRange::new(slider.min, slider.max),
    }
}

//! One pass from (dataset, selection) to everything the dashboard shows.

use super::aggregate::Kpis;
use super::filter::{filter_companies, FilterSelection};
use super::model::{Company, Dataset, Round};
use super::project::{
    bubble_points, join_rounds, project_table, timeline_points, treemap, BubblePoint,
    TableView, TimelinePoint, TreemapNode, DISPLAY_COLUMNS,
};

/// Companies passing the selection and their rounds, borrowed from the
/// dataset.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub companies: Vec<&'a Company>,
    pub rounds: Vec<&'a Round>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, selection: &FilterSelection) -> Self {
        let companies = filter_companies(&dataset.companies, selection);
        let rounds = join_rounds(&companies, &dataset.rounds);
        FilteredView { companies, rounds }
    }
}

/// Owned outputs for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub kpis: Kpis,
    pub bubbles: Vec<BubblePoint>,
    pub timeline: Vec<TimelinePoint>,
    pub treemap: TreemapNode,
    pub table: TableView,
}

impl DashboardView {
    /// Recompute every output. Pure; call it on each selection change.
    pub fn compute(dataset: &Dataset, selection: &FilterSelection) -> Self {
        let view = FilteredView::new(dataset, selection);
        log::debug!(
            "Filter selected {} of {} companies, {} rounds",
            view.companies.len(),
            dataset.companies.len(),
            view.rounds.len()
        );

        DashboardView {
            kpis: Kpis::compute(&view.companies),
            bubbles: bubble_points(&view.companies),
            timeline: timeline_points(&view.rounds),
            treemap: treemap(&view.companies),
            table: project_table(&view.companies, &dataset.companies, &DISPLAY_COLUMNS),
        }
    }

    /// Nothing passed the filters.
    pub fn is_empty(&self) -> bool {
        self.kpis.startups == 0
    }
}

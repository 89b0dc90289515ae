use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::{Category, FilterSelection};
use crate::data::loader::{Loader, Upload, Uploads};
use crate::data::model::{CompanyColumn, Dataset};
use crate::data::pipeline::DashboardView;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which upload slot a picked file goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSlot {
    Companies,
    Rounds,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    loader: Loader,

    /// Loaded dataset (None when the last load failed).
    pub dataset: Option<Arc<Dataset>>,

    /// Allowed values per filter field.
    pub selection: FilterSelection,

    /// Outputs for the current selection (cached until the next change).
    pub view: Option<DashboardView>,

    /// Files picked by the user for this session.
    pub uploads: Uploads,

    /// Colour per industry, for the bubble chart and treemap.
    pub industry_colors: ColorMap,

    /// Colour per round type, for the timeline.
    pub round_type_colors: ColorMap,

    /// Column and direction (`true` = ascending) chosen by clicking a table
    /// header. `None` keeps the default funding-descending order.
    pub table_sort: Option<(CompanyColumn, bool)>,

    /// Blocking load error; when set nothing else is rendered.
    pub load_error: Option<String>,

    /// Non-blocking status / info message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let loader = Loader::new(config.loader.clone());
        Self {
            config,
            loader,
            dataset: None,
            selection: FilterSelection::default(),
            view: None,
            uploads: Uploads::default(),
            industry_colors: ColorMap::default(),
            round_type_colors: ColorMap::default(),
            table_sort: None,
            load_error: None,
            status_message: None,
        }
    }

    /// Run the loader against the current uploads / disk files.
    pub fn reload(&mut self) {
        match self.loader.load(&self.uploads) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load data: {e}");
                self.dataset = None;
                self.view = None;
                self.load_error = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a loaded dataset. A dataset other than the current one resets
    /// filters and colours; the same (cached) one keeps them.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        let unchanged = self
            .dataset
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &dataset));

        if !unchanged {
            self.selection = FilterSelection::all(&dataset.companies.options);
            self.industry_colors = ColorMap::new(&dataset.companies.options.industries);
            self.round_type_colors = ColorMap::new(&dataset.rounds.round_types());
            self.table_sort = None;
        }

        self.dataset = Some(dataset);
        self.load_error = None;
        self.refilter();
    }

    /// Recompute the view after a filter change.
    pub fn refilter(&mut self) {
        self.view = self.dataset.as_ref().map(|ds| {
            let mut view = DashboardView::compute(ds, &self.selection);
            if let Some((column, ascending)) = self.table_sort {
                view.table.sort_by(column, ascending);
            }
            view
        });
    }

    /// Toggle a single value in one field's filter.
    pub fn toggle_filter_value(&mut self, category: Category, value: &str) {
        self.selection.toggle(category, value);
        self.refilter();
    }

    /// Include or exclude companies with no value for a field.
    pub fn toggle_missing_filter(&mut self, category: Category) {
        self.selection.toggle_missing(category);
        self.refilter();
    }

    /// Select all values of a field.
    pub fn select_all(&mut self, category: Category) {
        if let Some(ds) = &self.dataset {
            self.selection.select_all(category, &ds.companies.options);
            self.refilter();
        }
    }

    /// Deselect all values of a field.
    pub fn select_none(&mut self, category: Category) {
        self.selection.select_none(category);
        self.refilter();
    }

    /// Click on a table header: first ascending, then flip.
    pub fn sort_table(&mut self, column: CompanyColumn) {
        let ascending = match self.table_sort {
            Some((current, asc)) if current == column => !asc,
            _ => true,
        };
        self.table_sort = Some((column, ascending));
        if let Some(view) = &mut self.view {
            view.table.sort_by(column, ascending);
        }
    }

    /// Store a picked file. The data only switches once both slots are
    /// filled.
    pub fn set_upload(&mut self, slot: UploadSlot, upload: Upload) {
        log::info!("Picked '{}' for {slot:?}", upload.name);
        match slot {
            UploadSlot::Companies => self.uploads.companies = Some(upload),
            UploadSlot::Rounds => self.uploads.rounds = Some(upload),
        }
        if self.uploads.pair().is_some() {
            self.status_message = None;
            self.reload();
        } else {
            self.status_message = Some("Upload the second file to replace the data".to_string());
        }
    }

    /// Forget uploads and re-read the files on disk.
    pub fn reload_from_disk(&mut self) {
        self.uploads = Uploads::default();
        self.loader.invalidate();
        self.status_message = None;
        self.reload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;

    fn state_in(dir: &std::path::Path) -> AppState {
        let config = DashboardConfig {
            loader: LoaderConfig::with_data_dir(dir),
            ..DashboardConfig::default()
        };
        let mut state = AppState::new(config);
        state.reload();
        state
    }

    #[test]
    fn first_load_selects_everything() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.kpis.startups, 5);
        assert_eq!(state.selection.countries.len(), 5);
    }

    #[test]
    fn industry_legend_follows_the_loaded_industries() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        let labels: Vec<String> = state
            .industry_colors
            .legend_entries()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(labels, vec!["Agtech", "Edtech", "Fintech", "Healthtech", "Logistics"]);
        assert!(state
            .selection
            .is_identity(&state.dataset.as_ref().unwrap().companies.options));
    }

    #[test]
    fn select_none_empties_the_view_but_keeps_it_defined() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.select_none(Category::Industry);
        let view = state.view.as_ref().unwrap();
        assert!(view.is_empty());
        assert!(view.table.is_empty());
        state.select_all(Category::Industry);
        assert_eq!(state.view.as_ref().unwrap().kpis.startups, 5);
    }

    #[test]
    fn reload_of_cached_data_keeps_the_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.toggle_filter_value(Category::Country, "Mexico");
        state.reload();
        assert!(!state.selection.countries.contains("Mexico"));
        assert_eq!(state.view.as_ref().unwrap().kpis.startups, 4);
    }

    #[test]
    fn bad_upload_pair_blocks_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.set_upload(UploadSlot::Companies, Upload::new("c.csv", b"name\nSolo\n".to_vec()));
        assert!(state.status_message.is_some());
        assert!(state.view.is_some());

        state.set_upload(
            UploadSlot::Rounds,
            Upload::new("r.csv", b"name,round_date\nSolo,yesterday\n".to_vec()),
        );
        assert!(state.load_error.is_some());
        assert!(state.view.is_none());

        state.reload_from_disk();
        assert!(state.load_error.is_none());
        assert_eq!(state.view.as_ref().unwrap().kpis.startups, 5);
    }

    #[test]
    fn header_clicks_flip_direction() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.sort_table(CompanyColumn::Name);
        assert_eq!(state.table_sort, Some((CompanyColumn::Name, true)));
        let first = state.view.as_ref().unwrap().table.rows[0][0].to_string();
        assert_eq!(first, "AgroNube");
        state.sort_table(CompanyColumn::Name);
        let first = state.view.as_ref().unwrap().table.rows[0][0].to_string();
        assert_eq!(first, "SaludYa");
    }
}

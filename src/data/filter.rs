use std::collections::BTreeSet;

use super::model::{Company, CompanyCollection};

// ---------------------------------------------------------------------------
// Filterable fields
// ---------------------------------------------------------------------------

/// The three categorical fields the sidebar filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Country,
    Stage,
    Industry,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Country, Category::Stage, Category::Industry];

    pub fn label(self) -> &'static str {
        match self {
            Category::Country => "Country",
            Category::Stage => "Stage",
            Category::Industry => "Industry",
        }
    }

    /// The company's value for this field, if present.
    pub fn value_of(self, company: &Company) -> Option<&str> {
        match self {
            Category::Country => company.country.as_deref(),
            Category::Stage => company.stage.as_deref(),
            Category::Industry => company.industry.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterOptions: the selectable value space
// ---------------------------------------------------------------------------

/// Sorted distinct non-missing values per field, taken from the full
/// collection so that filtering never shrinks the option lists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub countries: BTreeSet<String>,
    pub stages: BTreeSet<String>,
    pub industries: BTreeSet<String>,
    /// Fields where at least one company has no value.
    pub with_missing: BTreeSet<Category>,
}

impl FilterOptions {
    pub fn from_companies(companies: &[Company]) -> Self {
        let mut options = FilterOptions::default();
        for company in companies {
            for category in Category::ALL {
                match category.value_of(company) {
                    Some(value) => {
                        options.values_mut(category).insert(value.to_string());
                    }
                    None => {
                        options.with_missing.insert(category);
                    }
                }
            }
        }
        options
    }

    pub fn has_missing(&self, category: Category) -> bool {
        self.with_missing.contains(&category)
    }

    pub fn values(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Country => &self.countries,
            Category::Stage => &self.stages,
            Category::Industry => &self.industries,
        }
    }

    fn values_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::Country => &mut self.countries,
            Category::Stage => &mut self.stages,
            Category::Industry => &mut self.industries,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSelection: which values the user allows
// ---------------------------------------------------------------------------

/// Allowed values per field. An empty set admits no company.
///
/// `missing` lists the fields on which a company without a value still
/// passes. It starts full so that the initial selection keeps every row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub countries: BTreeSet<String>,
    pub stages: BTreeSet<String>,
    pub industries: BTreeSet<String>,
    pub missing: BTreeSet<Category>,
}

impl FilterSelection {
    /// Everything selected (the default state after a load).
    pub fn all(options: &FilterOptions) -> Self {
        FilterSelection {
            countries: options.countries.clone(),
            stages: options.stages.clone(),
            industries: options.industries.clone(),
            missing: Category::ALL.into_iter().collect(),
        }
    }

    pub fn selected(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Country => &self.countries,
            Category::Stage => &self.stages,
            Category::Industry => &self.industries,
        }
    }

    pub fn selected_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::Country => &mut self.countries,
            Category::Stage => &mut self.stages,
            Category::Industry => &mut self.industries,
        }
    }

    pub fn admits_missing(&self, category: Category) -> bool {
        self.missing.contains(&category)
    }

    /// Replace one field's selection with exactly these values. Companies
    /// without a value for the field no longer pass.
    pub fn with(mut self, category: Category, values: &[&str]) -> Self {
        *self.selected_mut(category) = values.iter().map(|v| v.to_string()).collect();
        self.missing.remove(&category);
        self
    }

    /// Add the value if absent, remove it if present.
    pub fn toggle(&mut self, category: Category, value: &str) {
        let selected = self.selected_mut(category);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    pub fn toggle_missing(&mut self, category: Category) {
        if !self.missing.remove(&category) {
            self.missing.insert(category);
        }
    }

    pub fn select_all(&mut self, category: Category, options: &FilterOptions) {
        *self.selected_mut(category) = options.values(category).clone();
        self.missing.insert(category);
    }

    pub fn select_none(&mut self, category: Category) {
        self.selected_mut(category).clear();
        self.missing.remove(&category);
    }

    /// Whether every option of every field is selected, missing included.
    pub fn is_identity(&self, options: &FilterOptions) -> bool {
        Category::ALL.into_iter().all(|c| {
            options.values(c).is_subset(self.selected(c))
                && (!options.has_missing(c) || self.admits_missing(c))
        })
    }

    /// A company passes when each of its three fields is selected, or is
    /// missing on a field that admits missing values.
    pub fn admits(&self, company: &Company) -> bool {
        Category::ALL
            .into_iter()
            .all(|category| match category.value_of(company) {
                Some(value) => self.selected(category).contains(value),
                None => self.admits_missing(category),
            })
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return the companies that pass the selection, in source order.
pub fn filter_companies<'a>(
    collection: &'a CompanyCollection,
    selection: &FilterSelection,
) -> Vec<&'a Company> {
    collection
        .companies
        .iter()
        .filter(|company| selection.admits(company))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn company(name: &str, country: Option<&str>, stage: &str, industry: &str) -> Company {
        Company {
            name: name.to_string(),
            country: country.map(str::to_string),
            stage: Some(stage.to_string()),
            industry: Some(industry.to_string()),
            ..Company::default()
        }
    }

    fn collection() -> CompanyCollection {
        CompanyCollection::new(
            vec![
                company("Alfa", Some("Chile"), "Seed", "Fintech"),
                company("Beta", Some("Mexico"), "Series A", "Fintech"),
                company("Gamma", None, "Seed", "Edtech"),
                company("Delta", Some("Chile"), "Series A", "Edtech"),
            ],
            BTreeSet::new(),
        )
    }

    fn names(coll: &CompanyCollection, selection: &FilterSelection) -> Vec<String> {
        filter_companies(coll, selection)
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    #[test]
    fn options_skip_missing_values_and_are_sorted() {
        let coll = collection();
        let countries: Vec<_> = coll.options.countries.iter().cloned().collect();
        assert_eq!(countries, vec!["Chile", "Mexico"]);
        assert_eq!(coll.options.industries.len(), 2);
        assert!(coll.options.has_missing(Category::Country));
        assert!(!coll.options.has_missing(Category::Stage));
    }

    #[test]
    fn identity_selection_keeps_every_company() {
        let coll = collection();
        let selection = FilterSelection::all(&coll.options);
        assert!(selection.is_identity(&coll.options));
        assert_eq!(names(&coll, &selection), vec!["Alfa", "Beta", "Gamma", "Delta"]);
    }

    #[test]
    fn missing_values_can_be_excluded_per_field() {
        let coll = collection();
        let mut selection = FilterSelection::all(&coll.options);
        selection.toggle_missing(Category::Country);
        assert!(!selection.is_identity(&coll.options));
        assert_eq!(names(&coll, &selection), vec!["Alfa", "Beta", "Delta"]);

        // Stage has no missing values, so its flag does not affect identity.
        let mut selection = FilterSelection::all(&coll.options);
        selection.toggle_missing(Category::Stage);
        assert!(selection.is_identity(&coll.options));
    }

    #[test]
    fn explicit_values_drop_companies_without_one() {
        let coll = collection();
        let selection =
            FilterSelection::all(&coll.options).with(Category::Country, &["Chile", "Mexico"]);
        assert_eq!(names(&coll, &selection), vec!["Alfa", "Beta", "Delta"]);
    }

    #[test]
    fn empty_set_admits_nothing() {
        let coll = collection();
        let mut selection = FilterSelection::all(&coll.options);
        selection.select_none(Category::Country);
        assert!(filter_companies(&coll, &selection).is_empty());
        selection.select_all(Category::Country, &coll.options);
        assert_eq!(filter_companies(&coll, &selection).len(), 4);
    }

    #[test]
    fn conjunction_preserves_source_order() {
        let coll = collection();
        let selection = FilterSelection::all(&coll.options)
            .with(Category::Country, &["Chile"])
            .with(Category::Industry, &["Edtech", "Fintech"]);
        assert_eq!(names(&coll, &selection), vec!["Alfa", "Delta"]);
    }

    #[test]
    fn toggle_flips_membership() {
        let coll = collection();
        let mut selection = FilterSelection::all(&coll.options);
        selection.toggle(Category::Country, "Mexico");
        assert!(!selection.countries.contains("Mexico"));
        assert!(!selection.is_identity(&coll.options));
        selection.toggle(Category::Country, "Mexico");
        assert!(selection.is_identity(&coll.options));
    }
}

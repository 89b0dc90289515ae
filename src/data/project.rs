use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use super::model::{CellValue, Company, CompanyCollection, CompanyColumn, Round, RoundCollection};

// ---------------------------------------------------------------------------
// Round semi-join
// ---------------------------------------------------------------------------

/// Rounds belonging to one of `companies`, oldest first.
///
/// Rounds whose company is not in the slice (including orphans that match no
/// company at all) are dropped. Rounds on the same date keep source order.
pub fn join_rounds<'a>(companies: &[&Company], rounds: &'a RoundCollection) -> Vec<&'a Round> {
    let names: HashSet<&str> = companies.iter().map(|c| c.name.as_str()).collect();
    let mut joined: Vec<&Round> = rounds
        .rounds
        .iter()
        .filter(|r| names.contains(r.name.as_str()))
        .collect();
    joined.sort_by_key(|r| r.round_date);
    joined
}

// ---------------------------------------------------------------------------
// Comparison table
// ---------------------------------------------------------------------------

/// Columns of the comparison table, in display order.
pub const DISPLAY_COLUMNS: [&str; 12] = [
    "name",
    "country",
    "industry",
    "stage",
    "funding_total_usd",
    "arr_usd",
    "employees",
    "ltv_cac",
    "payback_months",
    "gross_margin_pct",
    "nps",
    "revenue_model",
];

/// A rectangular, display-ready projection of companies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableView {
    pub columns: Vec<CompanyColumn>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, column: CompanyColumn) -> Option<usize> {
        self.columns.iter().position(|&c| c == column)
    }

    /// Stable re-sort on one column. Missing cells go last either way.
    pub fn sort_by(&mut self, column: CompanyColumn, ascending: bool) {
        let Some(idx) = self.column_position(column) else {
            return;
        };
        self.rows.sort_by(|a, b| {
            let (x, y) = (&a[idx], &b[idx]);
            match (x.is_missing(), y.is_missing()) {
                (true, true) => std::cmp::Ordering::Equal,
                (true, false) => std::cmp::Ordering::Greater,
                (false, true) => std::cmp::Ordering::Less,
                (false, false) if ascending => x.cmp(y),
                (false, false) => y.cmp(x),
            }
        });
    }
}

/// Project companies onto `requested` columns, ordered by funding descending.
///
/// Requested names that are unknown, or known but absent from the source
/// schema, are skipped without error. `companies` itself is left untouched.
pub fn project_table(
    companies: &[&Company],
    collection: &CompanyCollection,
    requested: &[&str],
) -> TableView {
    let columns: Vec<CompanyColumn> = requested
        .iter()
        .filter_map(|name| CompanyColumn::from_name(name))
        .filter(|&col| collection.has_column(col))
        .collect();

    let mut ordered: Vec<&Company> = companies.to_vec();
    ordered.sort_by(|a, b| match (a.funding_total_usd, b.funding_total_usd) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let rows = ordered
        .iter()
        .map(|company| columns.iter().map(|&col| company.cell(col)).collect())
        .collect();

    TableView { columns, rows }
}

// ---------------------------------------------------------------------------
// Chart projections
// ---------------------------------------------------------------------------

/// One company on the LTV/CAC vs funding bubble chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BubblePoint {
    pub name: String,
    /// LTV/CAC ratio.
    pub x: f64,
    /// Funding total, USD millions.
    pub y: f64,
    /// ARR, USD millions; 0 when missing.
    pub size: f64,
    /// Industry.
    pub color: String,
    pub country: Option<String>,
    pub stage: Option<String>,
    pub employees: Option<f64>,
    pub gross_margin_pct: Option<f64>,
    pub arr_usd_m: Option<f64>,
}

/// Companies that have both a ratio and a funding figure.
pub fn bubble_points(companies: &[&Company]) -> Vec<BubblePoint> {
    companies
        .iter()
        .filter_map(|c| {
            Some(BubblePoint {
                name: c.name.clone(),
                x: c.ltv_cac?,
                y: c.funding_total_usd_m?,
                size: c.arr_usd_m.unwrap_or(0.0),
                color: c.industry.clone().unwrap_or_else(|| MISSING_LABEL.to_string()),
                country: c.country.clone(),
                stage: c.stage.clone(),
                employees: c.employees,
                gross_margin_pct: c.gross_margin_pct,
                arr_usd_m: c.arr_usd_m,
            })
        })
        .collect()
}

/// One round on the funding timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    /// Company name (the y category).
    pub company: String,
    /// Round amount in USD; 0 when missing.
    pub size: f64,
    /// Round type.
    pub color: String,
}

/// Timeline points from already joined (and date-sorted) rounds.
pub fn timeline_points(rounds: &[&Round]) -> Vec<TimelinePoint> {
    rounds
        .iter()
        .map(|r| TimelinePoint {
            date: r.round_date,
            company: r.name.clone(),
            size: r.round_amount_usd.unwrap_or(0.0),
            color: r
                .round_type
                .clone()
                .unwrap_or_else(|| MISSING_LABEL.to_string()),
        })
        .collect()
}

/// Label used for a missing categorical value in charts.
pub const MISSING_LABEL: &str = "(none)";

/// A node of the industry → revenue model → company hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapNode {
    pub label: String,
    /// ARR in USD; for inner nodes, the sum over children.
    pub value: f64,
    pub children: Vec<TreemapNode>,
}

impl TreemapNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Build the hierarchy rooted at a synthetic "All" node. Children are
/// sorted by label at every level.
pub fn treemap(companies: &[&Company]) -> TreemapNode {
    let mut tree: BTreeMap<&str, BTreeMap<&str, Vec<(&str, f64)>>> = BTreeMap::new();
    for c in companies {
        tree.entry(c.industry.as_deref().unwrap_or(MISSING_LABEL))
            .or_default()
            .entry(c.revenue_model.as_deref().unwrap_or(MISSING_LABEL))
            .or_default()
            .push((c.name.as_str(), c.arr_usd.unwrap_or(0.0)));
    }

    let children: Vec<TreemapNode> = tree
        .into_iter()
        .map(|(industry, models)| {
            branch(
                industry,
                models
                    .into_iter()
                    .map(|(model, mut leaves)| {
                        leaves.sort_by(|a, b| a.0.cmp(b.0));
                        branch(
                            model,
                            leaves
                                .into_iter()
                                .map(|(name, value)| TreemapNode {
                                    label: name.to_string(),
                                    value,
                                    children: Vec::new(),
                                })
                                .collect(),
                        )
                    })
                    .collect(),
            )
        })
        .collect();

    branch("All", children)
}

fn branch(label: &str, children: Vec<TreemapNode>) -> TreemapNode {
    TreemapNode {
        label: label.to_string(),
        value: children.iter().map(|c| c.value).sum(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn company(name: &str, funding: Option<f64>, industry: &str, model: &str) -> Company {
        Company {
            name: name.into(),
            industry: Some(industry.into()),
            revenue_model: Some(model.into()),
            funding_total_usd: funding,
            funding_total_usd_m: funding.map(|f| f / 1e6),
            arr_usd: Some(1e6),
            arr_usd_m: Some(1.0),
            ltv_cac: Some(3.0),
            ..Company::default()
        }
    }

    fn round(name: &str, date: &str) -> Round {
        Round {
            name: name.into(),
            round_date: date.parse().unwrap(),
            round_type: Some("Seed".into()),
            round_amount_usd: Some(1e6),
        }
    }

    fn collection(companies: Vec<Company>, columns: &[CompanyColumn]) -> CompanyCollection {
        CompanyCollection::new(companies, columns.iter().copied().collect::<BTreeSet<_>>())
    }

    #[test]
    fn join_is_a_sorted_semi_join_without_orphans() {
        let a = company("Alfa", Some(1e6), "Fintech", "SaaS");
        let rounds = RoundCollection {
            rounds: vec![
                round("Alfa", "2022-01-01"),
                round("Ghost", "2019-01-01"),
                round("Beta", "2018-01-01"),
                round("Alfa", "2020-06-30"),
            ],
        };
        let joined = join_rounds(&[&a], &rounds);
        let dates: Vec<String> = joined.iter().map(|r| r.round_date.to_string()).collect();
        assert_eq!(dates, vec!["2020-06-30", "2022-01-01"]);
        assert!(joined.iter().all(|r| r.name == "Alfa"));
        assert!(joined.iter().all(|r| rounds.rounds.contains(r)));
    }

    #[test]
    fn table_skips_unknown_and_absent_columns() {
        let coll = collection(
            vec![company("Alfa", Some(1e6), "Fintech", "SaaS")],
            &[CompanyColumn::Name, CompanyColumn::FundingTotalUsd, CompanyColumn::Industry],
        );
        let refs: Vec<&Company> = coll.companies.iter().collect();
        let view = project_table(&refs, &coll, &["name", "valuation_usd", "nps", "funding_total_usd"]);
        assert_eq!(
            view.columns,
            vec![CompanyColumn::Name, CompanyColumn::FundingTotalUsd]
        );
        assert_eq!(view.rows[0][0], CellValue::Text("Alfa".into()));
    }

    #[test]
    fn table_sorts_by_funding_descending_without_touching_input() {
        let coll = collection(
            vec![
                company("Small", Some(1e6), "Fintech", "SaaS"),
                company("Unknown", None, "Fintech", "SaaS"),
                company("Large", Some(9e6), "Fintech", "SaaS"),
            ],
            &[CompanyColumn::Name, CompanyColumn::FundingTotalUsd],
        );
        let refs: Vec<&Company> = coll.companies.iter().collect();
        let mut view = project_table(&refs, &coll, &DISPLAY_COLUMNS);
        let names: Vec<String> = view.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(names, vec!["Large", "Small", "Unknown"]);
        assert_eq!(refs[0].name, "Small");

        view.sort_by(CompanyColumn::Name, true);
        let names: Vec<String> = view.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(names, vec!["Large", "Small", "Unknown"]);
        view.sort_by(CompanyColumn::FundingTotalUsd, true);
        let names: Vec<String> = view.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(names, vec!["Small", "Large", "Unknown"]);
    }

    #[test]
    fn bubbles_need_both_axes() {
        let mut no_ratio = company("NoRatio", Some(2e6), "Fintech", "SaaS");
        no_ratio.ltv_cac = None;
        let full = company("Full", Some(2e6), "Fintech", "SaaS");
        let points = bubble_points(&[&no_ratio, &full]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "Full");
        assert_eq!(points[0].y, 2.0);
        assert_eq!(points[0].color, "Fintech");
    }

    #[test]
    fn treemap_sums_values_up_the_path() {
        let a = company("Alfa", None, "Fintech", "SaaS");
        let b = company("Beta", None, "Fintech", "Marketplace");
        let mut c = company("Gamma", None, "Edtech", "SaaS");
        c.revenue_model = None;
        let root = treemap(&[&a, &b, &c]);
        assert_eq!(root.value, 3e6);
        let labels: Vec<&str> = root.children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Edtech", "Fintech"]);
        assert_eq!(root.children[0].children[0].label, MISSING_LABEL);
        assert_eq!(root.children[1].value, 2e6);
        assert!(root.children[1].children[0].children[0].is_leaf());
    }
}

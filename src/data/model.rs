use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use super::filter::FilterOptions;

// ---------------------------------------------------------------------------
// CompanyColumn – the company file schema
// ---------------------------------------------------------------------------

/// Every column a company file may carry, plus the two derived columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompanyColumn {
    Name,
    Country,
    Industry,
    FoundedYear,
    Stage,
    FundingTotalUsd,
    Employees,
    ArrUsd,
    CacUsd,
    LtvUsd,
    GrossMarginPct,
    LtvCac,
    PaybackMonths,
    Nps,
    RevenueModel,
    FundingTotalUsdM,
    ArrUsdM,
}

impl CompanyColumn {
    /// Columns read from the source file, in canonical order.
    pub const SOURCE: [CompanyColumn; 15] = [
        CompanyColumn::Name,
        CompanyColumn::Country,
        CompanyColumn::Industry,
        CompanyColumn::FoundedYear,
        CompanyColumn::Stage,
        CompanyColumn::FundingTotalUsd,
        CompanyColumn::Employees,
        CompanyColumn::ArrUsd,
        CompanyColumn::CacUsd,
        CompanyColumn::LtvUsd,
        CompanyColumn::GrossMarginPct,
        CompanyColumn::LtvCac,
        CompanyColumn::PaybackMonths,
        CompanyColumn::Nps,
        CompanyColumn::RevenueModel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CompanyColumn::Name => "name",
            CompanyColumn::Country => "country",
            CompanyColumn::Industry => "industry",
            CompanyColumn::FoundedYear => "founded_year",
            CompanyColumn::Stage => "stage",
            CompanyColumn::FundingTotalUsd => "funding_total_usd",
            CompanyColumn::Employees => "employees",
            CompanyColumn::ArrUsd => "arr_usd",
            CompanyColumn::CacUsd => "cac_usd",
            CompanyColumn::LtvUsd => "ltv_usd",
            CompanyColumn::GrossMarginPct => "gross_margin_pct",
            CompanyColumn::LtvCac => "ltv_cac",
            CompanyColumn::PaybackMonths => "payback_months",
            CompanyColumn::Nps => "nps",
            CompanyColumn::RevenueModel => "revenue_model",
            CompanyColumn::FundingTotalUsdM => "funding_total_usd_m",
            CompanyColumn::ArrUsdM => "arr_usd_m",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::SOURCE
            .into_iter()
            .chain([CompanyColumn::FundingTotalUsdM, CompanyColumn::ArrUsdM])
            .find(|c| c.name() == name)
    }

    /// Whether the column holds text (as opposed to a number).
    pub fn is_categorical(self) -> bool {
        matches!(
            self,
            CompanyColumn::Name
                | CompanyColumn::Country
                | CompanyColumn::Industry
                | CompanyColumn::Stage
                | CompanyColumn::RevenueModel
        )
    }

    /// Count-like columns render without decimals.
    fn is_whole(self) -> bool {
        matches!(
            self,
            CompanyColumn::FoundedYear | CompanyColumn::Employees | CompanyColumn::Nps
        )
    }
}

impl fmt::Display for CompanyColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single displayed table cell
// ---------------------------------------------------------------------------

/// A typed table cell. Missing sorts before everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Missing,
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        use CellValue::*;
        match (self, other) {
            (Missing, Missing) => Ordering::Equal,
            (Missing, _) => Ordering::Less,
            (_, Missing) => Ordering::Greater,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl CellValue {
    fn rank(&self) -> u8 {
        match self {
            CellValue::Missing => 0,
            CellValue::Integer(_) | CellValue::Float(_) => 1,
            CellValue::Date(_) => 2,
            CellValue::Text(_) => 3,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Missing => write!(f, "—"),
        }
    }
}

// ---------------------------------------------------------------------------
// Company / Round – one row each
// ---------------------------------------------------------------------------

/// One company profile. Numbers that failed to parse are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Company {
    pub name: String,
    pub country: Option<String>,
    pub industry: Option<String>,
    pub founded_year: Option<f64>,
    pub stage: Option<String>,
    pub funding_total_usd: Option<f64>,
    pub employees: Option<f64>,
    pub arr_usd: Option<f64>,
    pub cac_usd: Option<f64>,
    pub ltv_usd: Option<f64>,
    pub gross_margin_pct: Option<f64>,
    pub ltv_cac: Option<f64>,
    pub payback_months: Option<f64>,
    pub nps: Option<f64>,
    pub revenue_model: Option<String>,
    /// `funding_total_usd` in millions, filled in by [`super::derive`].
    pub funding_total_usd_m: Option<f64>,
    /// `arr_usd` in millions, filled in by [`super::derive`].
    pub arr_usd_m: Option<f64>,
}

impl Company {
    /// Text value of a categorical column; `None` for numeric columns too.
    pub fn text(&self, column: CompanyColumn) -> Option<&str> {
        match column {
            CompanyColumn::Name => Some(self.name.as_str()),
            CompanyColumn::Country => self.country.as_deref(),
            CompanyColumn::Industry => self.industry.as_deref(),
            CompanyColumn::Stage => self.stage.as_deref(),
            CompanyColumn::RevenueModel => self.revenue_model.as_deref(),
            _ => None,
        }
    }

    /// Numeric value of a numeric column; `None` when missing or categorical.
    pub fn number(&self, column: CompanyColumn) -> Option<f64> {
        match column {
            CompanyColumn::FoundedYear => self.founded_year,
            CompanyColumn::FundingTotalUsd => self.funding_total_usd,
            CompanyColumn::Employees => self.employees,
            CompanyColumn::ArrUsd => self.arr_usd,
            CompanyColumn::CacUsd => self.cac_usd,
            CompanyColumn::LtvUsd => self.ltv_usd,
            CompanyColumn::GrossMarginPct => self.gross_margin_pct,
            CompanyColumn::LtvCac => self.ltv_cac,
            CompanyColumn::PaybackMonths => self.payback_months,
            CompanyColumn::Nps => self.nps,
            CompanyColumn::FundingTotalUsdM => self.funding_total_usd_m,
            CompanyColumn::ArrUsdM => self.arr_usd_m,
            _ => None,
        }
    }

    /// Mutable slot for a numeric column, used while parsing.
    pub(crate) fn number_mut(&mut self, column: CompanyColumn) -> Option<&mut Option<f64>> {
        match column {
            CompanyColumn::FoundedYear => Some(&mut self.founded_year),
            CompanyColumn::FundingTotalUsd => Some(&mut self.funding_total_usd),
            CompanyColumn::Employees => Some(&mut self.employees),
            CompanyColumn::ArrUsd => Some(&mut self.arr_usd),
            CompanyColumn::CacUsd => Some(&mut self.cac_usd),
            CompanyColumn::LtvUsd => Some(&mut self.ltv_usd),
            CompanyColumn::GrossMarginPct => Some(&mut self.gross_margin_pct),
            CompanyColumn::LtvCac => Some(&mut self.ltv_cac),
            CompanyColumn::PaybackMonths => Some(&mut self.payback_months),
            CompanyColumn::Nps => Some(&mut self.nps),
            CompanyColumn::FundingTotalUsdM => Some(&mut self.funding_total_usd_m),
            CompanyColumn::ArrUsdM => Some(&mut self.arr_usd_m),
            _ => None,
        }
    }

    /// The value of any column as a display cell.
    pub fn cell(&self, column: CompanyColumn) -> CellValue {
        if column.is_categorical() {
            return match self.text(column) {
                Some(s) => CellValue::Text(s.to_string()),
                None => CellValue::Missing,
            };
        }
        match self.number(column) {
            Some(v) if column.is_whole() && v.fract() == 0.0 => CellValue::Integer(v as i64),
            Some(v) => CellValue::Float(v),
            None => CellValue::Missing,
        }
    }
}

/// One funding round. `name` refers to [`Company::name`] but is not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub name: String,
    pub round_date: NaiveDate,
    pub round_type: Option<String>,
    pub round_amount_usd: Option<f64>,
}

// ---------------------------------------------------------------------------
// Collections – the loaded dataset
// ---------------------------------------------------------------------------

/// All companies from one source, with the schema they came with.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyCollection {
    /// Rows in source order.
    pub companies: Vec<Company>,
    /// Columns present in the source file, plus derived columns whose inputs
    /// were present.
    pub columns: BTreeSet<CompanyColumn>,
    /// Distinct filter values of the full collection.
    pub options: FilterOptions,
}

impl CompanyCollection {
    /// Build the collection and its filter options.
    pub fn new(companies: Vec<Company>, columns: BTreeSet<CompanyColumn>) -> Self {
        let options = FilterOptions::from_companies(&companies);
        CompanyCollection {
            companies,
            columns,
            options,
        }
    }

    pub fn has_column(&self, column: CompanyColumn) -> bool {
        self.columns.contains(&column)
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

/// All funding rounds from one source, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoundCollection {
    pub rounds: Vec<Round>,
}

impl RoundCollection {
    /// Distinct non-missing round types, sorted.
    pub fn round_types(&self) -> BTreeSet<String> {
        self.rounds
            .iter()
            .filter_map(|r| r.round_type.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

/// The raw pair of collections. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub companies: CompanyCollection,
    pub rounds: RoundCollection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_round_trip() {
        for col in CompanyColumn::SOURCE {
            assert_eq!(CompanyColumn::from_name(col.name()), Some(col));
        }
        assert_eq!(
            CompanyColumn::from_name("arr_usd_m"),
            Some(CompanyColumn::ArrUsdM)
        );
        assert_eq!(CompanyColumn::from_name("valuation_usd"), None);
    }

    #[test]
    fn missing_cells_sort_first() {
        let mut cells = vec![
            CellValue::Float(2.5),
            CellValue::Missing,
            CellValue::Integer(1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![CellValue::Missing, CellValue::Integer(1), CellValue::Float(2.5)]
        );
    }

    #[test]
    fn whole_number_columns_render_as_integers() {
        let company = Company {
            name: "PayFlex".into(),
            employees: Some(120.0),
            ltv_cac: Some(6.0),
            ..Company::default()
        };
        assert_eq!(company.cell(CompanyColumn::Employees), CellValue::Integer(120));
        assert_eq!(company.cell(CompanyColumn::LtvCac), CellValue::Float(6.0));
        assert_eq!(company.cell(CompanyColumn::Country), CellValue::Missing);
    }
}

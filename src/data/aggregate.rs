use super::model::Company;

// ---------------------------------------------------------------------------
// KPI scalars
// ---------------------------------------------------------------------------

/// Headline numbers over the filtered companies.
///
/// Every field is `0.0` when there is nothing to aggregate, never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kpis {
    /// Number of companies.
    pub startups: usize,
    /// Sum of `funding_total_usd`, in millions.
    pub funding_total_usd_m: f64,
    /// Mean of `arr_usd`, in millions.
    pub mean_arr_usd_m: f64,
    /// Mean of `ltv_cac`.
    pub mean_ltv_cac: f64,
}

impl Kpis {
    pub fn compute(companies: &[&Company]) -> Self {
        Kpis {
            startups: companies.len(),
            funding_total_usd_m: sum(companies.iter().map(|c| c.funding_total_usd)) / 1e6,
            mean_arr_usd_m: mean(companies.iter().map(|c| c.arr_usd)) / 1e6,
            mean_ltv_cac: mean(companies.iter().map(|c| c.ltv_cac)),
        }
    }

    pub fn funding_label(&self) -> String {
        format_thousands(self.funding_total_usd_m, 1)
    }

    pub fn arr_label(&self) -> String {
        format_thousands(self.mean_arr_usd_m, 2)
    }

    pub fn ltv_cac_label(&self) -> String {
        format!("{:.2}x", self.mean_ltv_cac)
    }
}

/// Sum of the present values; `0.0` if none.
pub fn sum(values: impl Iterator<Item = Option<f64>>) -> f64 {
    values.flatten().sum()
}

/// Mean of the present values; `0.0` if none.
pub fn mean(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let (total, n) = values
        .flatten()
        .fold((0.0, 0usize), |(total, n), v| (total + v, n + 1));
    if n == 0 {
        0.0
    } else {
        total / n as f64
    }
}

/// Fixed-point formatting with `,` between thousands, e.g. `1,234.5`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    // "-0.0" reads badly on a KPI card
    if value < 0.0 && grouped.chars().any(|c| c.is_ascii_digit() && c != '0') {
        grouped.insert(0, '-');
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(funding: Option<f64>, arr: Option<f64>, ltv_cac: Option<f64>) -> Company {
        Company {
            name: "x".into(),
            funding_total_usd: funding,
            arr_usd: arr,
            ltv_cac,
            ..Company::default()
        }
    }

    #[test]
    fn empty_input_yields_zero_not_nan() {
        let kpis = Kpis::compute(&[]);
        assert_eq!(kpis, Kpis::default());
        assert_eq!(kpis.funding_label(), "0.0");
        assert_eq!(kpis.arr_label(), "0.00");
        assert_eq!(kpis.ltv_cac_label(), "0.00x");
    }

    #[test]
    fn missing_values_are_skipped_per_field() {
        let rows = [
            company(Some(10e6), Some(2e6), None),
            company(None, Some(4e6), Some(3.0)),
            company(Some(5e6), None, Some(5.0)),
        ];
        let refs: Vec<&Company> = rows.iter().collect();
        let kpis = Kpis::compute(&refs);
        assert_eq!(kpis.startups, 3);
        assert_eq!(kpis.funding_total_usd_m, 15.0);
        assert_eq!(kpis.mean_arr_usd_m, 3.0);
        assert_eq!(kpis.mean_ltv_cac, 4.0);
    }

    #[test]
    fn all_missing_field_is_zero() {
        let rows = [company(None, None, None)];
        let refs: Vec<&Company> = rows.iter().collect();
        let kpis = Kpis::compute(&refs);
        assert_eq!(kpis.startups, 1);
        assert_eq!(kpis.mean_ltv_cac, 0.0);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(1234567.891, 1), "1,234,567.9");
        assert_eq!(format_thousands(999.0, 2), "999.00");
        assert_eq!(format_thousands(-1500.0, 0), "-1,500");
        assert_eq!(format_thousands(-0.001, 1), "0.0");
    }
}

//! Derived columns computed once after load.

use super::model::Company;

const MILLION: f64 = 1_000_000.0;

/// Rescale a currency amount to millions. Missing stays missing.
pub fn to_millions(value: Option<f64>) -> Option<f64> {
    value.map(|v| v / MILLION)
}

/// Return the company with `funding_total_usd_m` and `arr_usd_m` filled in.
pub fn derive_company(company: &Company) -> Company {
    Company {
        funding_total_usd_m: to_millions(company.funding_total_usd),
        arr_usd_m: to_millions(company.arr_usd),
        ..company.clone()
    }
}

/// Derive the millions columns for every company. Applying it twice gives the
/// same result as applying it once.
pub fn derive_fields(companies: &[Company]) -> Vec<Company> {
    companies.iter().map(derive_company).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescales_and_propagates_missing() {
        let companies = vec![
            Company {
                name: "PayFlex".into(),
                funding_total_usd: Some(35_000_000.0),
                arr_usd: Some(6_000_000.0),
                ..Company::default()
            },
            Company {
                name: "Blank".into(),
                ..Company::default()
            },
        ];
        let derived = derive_fields(&companies);
        assert_eq!(derived[0].funding_total_usd_m, Some(35.0));
        assert_eq!(derived[0].arr_usd_m, Some(6.0));
        assert_eq!(derived[1].funding_total_usd_m, None);
        assert_eq!(derived[1].arr_usd_m, None);
    }

    #[test]
    fn is_idempotent() {
        let companies = vec![Company {
            name: "AgroNube".into(),
            funding_total_usd: Some(60_000_000.0),
            arr_usd: Some(9_500_000.0),
            ..Company::default()
        }];
        let once = derive_fields(&companies);
        let twice = derive_fields(&once);
        assert_eq!(once, twice);
    }
}

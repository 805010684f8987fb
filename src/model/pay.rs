use serde::{Deserialize, Serialize};

/// Pay amounts derived from worked-day counts and an employee's rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayAmounts {
    pub weekend_amount: f64,
    pub holiday_amount: f64,
    pub total_amount: f64,
}

impl PayAmounts {
    pub fn compute(
        weekend_rate: f64,
        holiday_rate: f64,
        weekends_worked: i64,
        holidays_worked: i64,
    ) -> Self {
        let weekend_amount = weekend_rate * weekends_worked as f64;
        let holiday_amount = holiday_rate * holidays_worked as f64;
        Self {
            weekend_amount,
            holiday_amount,
            total_amount: weekend_amount + holiday_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_rate_times_count() {
        let amounts = PayAmounts::compute(100.0, 150.0, 2, 1);
        assert_eq!(amounts.weekend_amount, 200.0);
        assert_eq!(amounts.holiday_amount, 150.0);
        assert_eq!(amounts.total_amount, 350.0);
    }

    #[test]
    fn zero_counts_give_zero_amounts() {
        let amounts = PayAmounts::compute(120.5, 80.25, 0, 0);
        assert_eq!(amounts.total_amount, 0.0);
    }

    #[test]
    fn fractional_rates_keep_natural_precision() {
        let amounts = PayAmounts::compute(0.1, 0.2, 3, 3);
        assert_eq!(amounts.weekend_amount, 0.1 * 3.0);
        assert_eq!(amounts.holiday_amount, 0.2 * 3.0);
        assert_eq!(amounts.total_amount, 0.1 * 3.0 + 0.2 * 3.0);
    }
}

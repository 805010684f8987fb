//! Brazilian Portuguese renderings used in tool output.

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Month name for `1..=12`, the number itself otherwise.
pub fn month_name(month: u32) -> String {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .map(|name| name.to_string())
        .unwrap_or_else(|| month.to_string())
}

/// Formats an amount as Brazilian reais: `R$ 1.234,56`, `-R$ 5,00`.
pub fn format_brl(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_are_portuguese() {
        assert_eq!(month_name(1), "Janeiro");
        assert_eq!(month_name(3), "Março");
        assert_eq!(month_name(12), "Dezembro");
        assert_eq!(month_name(0), "0");
        assert_eq!(month_name(13), "13");
    }

    #[test]
    fn currency_uses_dot_thousands_and_comma_decimals() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(350.0), "R$ 350,00");
        assert_eq!(format_brl(1234.56), "R$ 1.234,56");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_brl(-5.0), "-R$ 5,00");
    }
}

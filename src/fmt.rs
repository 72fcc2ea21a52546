/// Round to two decimal places, exact halves to the even cent.
pub fn round2(val: f64) -> f64 {
    (val * 100.0).round_ties_even() / 100.0
}

/// Format an amount with thousands separators and a currency label: `1,234.56 PKR`
pub fn money(val: f64, currency: &str) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();
    let sign = if negative { "-" } else { "" };

    if currency.is_empty() {
        format!("{sign}{with_commas}.{dec_part}")
    } else {
        format!("{sign}{with_commas}.{dec_part} {currency}")
    }
}

pub fn pct(val: Option<f64>) -> String {
    match val {
        Some(v) => format!("{v:+.1}%"),
        None => "n/a".to_string(),
    }
}

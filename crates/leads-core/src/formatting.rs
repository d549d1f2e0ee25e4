use crate::models::Metric;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use leads_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals as usize);

    let (int_str, frac_str) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut result = group_thousands(int_str);
    if let Some(frac) = frac_str {
        result.push('.');
        result.push_str(frac);
    }

    // "-0.00" reads as noise in a table.
    if negative && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a monetary amount with two decimal places and thousands separators.
///
/// # Examples
///
/// ```
/// use leads_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56),  "$1,234.56");
/// assert_eq!(format_currency(0.0),      "$0.00");
/// assert_eq!(format_currency(-9.99),    "$-9.99");
/// ```
pub fn format_currency(amount: f64) -> String {
    format!("${}", format_number(amount, 2))
}

/// Format a metric value the way table cells show it: counts without
/// decimals, conversions and cost with two.
pub fn format_metric(metric: Metric, value: f64) -> String {
    if metric.is_count() {
        format_number(value, 0)
    } else {
        format_number(value, 2)
    }
}

/// Insert `,` every three digits from the right of a string of digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

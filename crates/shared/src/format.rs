//! # Định dạng hiển thị
//!
//! Hàm thuần định dạng giá tiền (VND) và thời lượng bài học cho các DTO
//! phản hồi. Không chứa logic nghiệp vụ.

/// Định dạng giá tiền VND với dấu chấm phân tách hàng nghìn
///
/// ```
/// use khoahoc_shared::format::format_price_vnd;
///
/// assert_eq!(format_price_vnd(1_500_000), "1.500.000₫");
/// assert_eq!(format_price_vnd(0), "0₫");
/// ```
pub fn format_price_vnd(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}₫")
    } else {
        format!("{grouped}₫")
    }
}

/// Định dạng thời lượng (giây) thành `H:MM:SS`, hoặc `MM:SS` khi dưới một giờ
///
/// Giá trị âm được kẹp về 0.
pub fn format_duration(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, "0₫")]
    #[case(999, "999₫")]
    #[case(1_000, "1.000₫")]
    #[case(1_500_000, "1.500.000₫")]
    #[case(123_456_789, "123.456.789₫")]
    fn test_định_dạng_giá_vnd(#[case] amount: i64, #[case] expected: &str) {
        assert_eq!(format_price_vnd(amount), expected);
    }

    #[test]
    fn test_giá_âm_giữ_dấu_trừ() {
        assert_eq!(format_price_vnd(-1_000), "-1.000₫");
    }

    #[rstest]
    #[case(0, "00:00")]
    #[case(59, "00:59")]
    #[case(65, "01:05")]
    #[case(3_600, "1:00:00")]
    #[case(3_909, "1:05:09")]
    #[case(-5, "00:00")]
    fn test_định_dạng_thời_lượng(#[case] seconds: i64, #[case] expected: &str) {
        assert_eq!(format_duration(seconds), expected);
    }
}

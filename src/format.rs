use chrono::{DateTime, Utc};

/// 가격 표시 (예: 5000 -> "$5,000")
pub fn format_price(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// 경매 종료까지 남은 시간
pub fn format_time_left(end_time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let left = end_time - now;
    if left.num_seconds() <= 0 {
        return "Auction ended".to_string();
    }

    let days = left.num_days();
    let hours = left.num_hours() % 24;
    let minutes = left.num_minutes() % 60;

    if days > 0 {
        format!("{}d {}h left", days, hours)
    } else if hours > 0 {
        format!("{}h {}m left", hours, minutes)
    } else if minutes > 0 {
        format!("{}m left", minutes)
    } else {
        "Less than a minute left".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0), "$0");
        assert_eq!(format_price(100), "$100");
        assert_eq!(format_price(5000), "$5,000");
        assert_eq!(format_price(1_250_000), "$1,250,000");
        assert_eq!(format_price(-4500), "-$4,500");
    }

    #[test]
    fn test_format_time_left() {
        let now = Utc::now();
        assert_eq!(
            format_time_left(now + Duration::days(3) + Duration::hours(4), now),
            "3d 4h left"
        );
        assert_eq!(
            format_time_left(now + Duration::hours(5) + Duration::minutes(30), now),
            "5h 30m left"
        );
        assert_eq!(format_time_left(now + Duration::minutes(12), now), "12m left");
        assert_eq!(
            format_time_left(now + Duration::seconds(20), now),
            "Less than a minute left"
        );
        assert_eq!(format_time_left(now - Duration::days(1), now), "Auction ended");
    }
}

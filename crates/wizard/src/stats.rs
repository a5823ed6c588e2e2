use chrono::{DateTime, Datelike, TimeZone};
use shared::dates::parse_work_date;
use shared::protocol::StoredRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TechnicianStats {
    pub today_count: u32,
    pub today_points: f64,
    pub month_count: u32,
    pub month_points: f64,
}

/// Counts the jobs `technician` closed today and this month, relative to
/// `now`'s calendar date in its own time zone. Records with a missing or
/// unreadable close date are skipped.
pub fn compute_stats<Tz: TimeZone>(
    records: &[StoredRecord],
    technician: &str,
    now: &DateTime<Tz>,
) -> TechnicianStats {
    let mut stats = TechnicianStats::default();
    let target = technician.trim();
    if target.is_empty() {
        return stats;
    }
    let today = now.date_naive();

    for record in records {
        if record.text("teknisi_1") != target && record.text("teknisi_2") != target {
            continue;
        }
        let Some(closed) = parse_work_date(&record.text("tanggal_close")) else {
            continue;
        };
        let weight = record.weight();
        if closed.date() == today {
            stats.today_count += 1;
            stats.today_points += weight;
        }
        if closed.year() == today.year() && closed.month() == today.month() {
            stats.month_count += 1;
            stats.month_points += weight;
        }
    }
    stats
}

pub fn format_stats<Tz>(technician: &str, stats: &TechnicianStats, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Stats untuk {technician}\n\
         Hari ini ({}): {} pekerjaan, {:.2} poin\n\
         Bulan ini ({}): {} pekerjaan, {:.2} poin",
        now.format("%Y-%m-%d"),
        stats.today_count,
        stats.today_points,
        now.format("%Y-%m"),
        stats.month_count,
        stats.month_points,
    )
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate};
    use serde_json::json;

    use super::*;

    fn jakarta(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(7 * 3600).expect("offset");
        let naive = NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .expect("datetime");
        offset.from_local_datetime(&naive).single().expect("local")
    }

    fn record(t1: &str, t2: &str, close: &str, bobot: serde_json::Value) -> StoredRecord {
        serde_json::from_value(json!({
            "teknisi_1": t1,
            "teknisi_2": t2,
            "tanggal_close": close,
            "bobot": bobot,
        }))
        .expect("record")
    }

    fn sample() -> Vec<StoredRecord> {
        vec![
            record("Budi", "", "01-01-2024 10:00:00", json!(5)),
            record("Siti", "", "02-01-2024 09:00:00", json!(3)),
            record("Andi", " Budi ", "2024-01-15 12:00:00", json!("2,5")),
            record("Budi", "", "01-12-2023 10:00:00", json!(4)),
            record("Budi", "", "bukan tanggal", json!(100)),
            record("Budi", "", "", json!(100)),
            record("Budi", "Siti", "01-01-2024 23:59:59", json!("rusak")),
        ]
    }

    #[test]
    fn counts_today_and_month_for_either_slot() {
        let stats = compute_stats(&sample(), "Budi", &jakarta(2024, 1, 1, 18));
        assert_eq!(stats.today_count, 2);
        assert_eq!(stats.today_points, 5.0);
        assert_eq!(stats.month_count, 3);
        assert_eq!(stats.month_points, 7.5);
    }

    #[test]
    fn other_technicians_do_not_leak_in() {
        let records = vec![
            record("Budi", "", "01-01-2024 10:00:00", json!(5)),
            record("Siti", "", "05-02-2024 10:00:00", json!(8)),
        ];
        let stats = compute_stats(&records, "Budi", &jakarta(2024, 1, 1, 12));
        assert_eq!(
            stats,
            TechnicianStats {
                today_count: 1,
                today_points: 5.0,
                month_count: 1,
                month_points: 5.0,
            }
        );
    }

    #[test]
    fn unknown_or_blank_name_yields_zeros() {
        let now = jakarta(2024, 1, 1, 12);
        assert_eq!(
            compute_stats(&sample(), "Nobody", &now),
            TechnicianStats::default()
        );
        // blank teknisi_2 cells must not match a blank name
        assert_eq!(compute_stats(&sample(), "  ", &now), TechnicianStats::default());
    }

    #[test]
    fn unparseable_close_date_is_skipped_not_fatal() {
        let records = vec![
            record("Budi", "", "31/01/2024", json!(9)),
            record("Budi", "", "01-01-2024 10:00:00", json!(1)),
        ];
        let stats = compute_stats(&records, "Budi", &jakarta(2024, 1, 1, 12));
        assert_eq!(stats.today_count, 1);
        assert_eq!(stats.month_points, 1.0);
    }

    #[test]
    fn order_of_records_does_not_matter() {
        let now = jakarta(2024, 1, 1, 18);
        let forward = sample();
        let mut reversed = sample();
        reversed.reverse();
        let mut rotated = sample();
        rotated.rotate_left(3);
        let expected = compute_stats(&forward, "Budi", &now);
        assert_eq!(compute_stats(&reversed, "Budi", &now), expected);
        assert_eq!(compute_stats(&rotated, "Budi", &now), expected);
    }

    #[test]
    fn calendar_day_follows_the_zone_of_now() {
        let records = vec![record("Budi", "", "02-01-2024 01:00:00", json!(1))];
        // 2024-01-01 20:00 UTC is already 2 January in Jakarta
        let utc_evening = DateTime::parse_from_rfc3339("2024-01-01T20:00:00+00:00").expect("utc");
        assert_eq!(compute_stats(&records, "Budi", &utc_evening).today_count, 0);
        let local = utc_evening.with_timezone(&FixedOffset::east_opt(7 * 3600).expect("offset"));
        assert_eq!(compute_stats(&records, "Budi", &local).today_count, 1);
    }

    #[test]
    fn formats_two_decimal_points() {
        let stats = TechnicianStats {
            today_count: 1,
            today_points: 5.0,
            month_count: 3,
            month_points: 7.5,
        };
        assert_eq!(
            format_stats("Budi", &stats, &jakarta(2024, 1, 1, 12)),
            "Stats untuk Budi\n\
             Hari ini (2024-01-01): 1 pekerjaan, 5.00 poin\n\
             Bulan ini (2024-01): 3 pekerjaan, 7.50 poin"
        );
    }
}

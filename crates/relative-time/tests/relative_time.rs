//! End-to-end formatting scenarios against a fixed reference time.

use relative_time::{
    Disambiguation, FormatOptions, Instant, LocalFields, OffsetTable, RelativeTime,
    RelativeTimeConfig, RelativeTimeError, Unit, UnitOption, ZonePolicy, ZoneRef,
    ZonedTimestamp,
};

fn zone(name: &str) -> ZoneRef {
    ZoneRef::parse(name).unwrap()
}

fn at(zone_name: &str, y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> ZonedTimestamp {
    let fields = LocalFields::new(y, mo, d, h, mi, s);
    ZonedTimestamp::from_local(&fields, zone(zone_name), Disambiguation::Later).unwrap()
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> ZonedTimestamp {
    at("UTC", y, mo, d, h, mi, s)
}

/// 2016-04-10T12:00:00Z
fn base_now() -> ZonedTimestamp {
    utc(2016, 4, 10, 12, 0, 0)
}

fn best_fit(now: &ZonedTimestamp, target: ZonedTimestamp) -> String {
    let options = FormatOptions::default().now(now.clone());
    RelativeTime::new().format(target, &options).unwrap()
}

fn in_unit(unit: Unit, target: ZonedTimestamp) -> String {
    let options = FormatOptions::default().now(base_now()).unit(unit);
    RelativeTime::new().format(target, &options).unwrap()
}

// ── best fit ────────────────────────────────────────────────────────────────

#[test]
fn test_best_fit_seconds_and_minutes() {
    let now = base_now();
    let cases = [
        (utc(2016, 4, 10, 11, 59, 1), "59 seconds ago"),
        (utc(2016, 4, 10, 12, 0, 0), "now"),
        (utc(2016, 4, 10, 12, 0, 59), "in 59 seconds"),
        (utc(2016, 4, 10, 11, 1, 0), "59 minutes ago"),
        (utc(2016, 4, 10, 11, 59, 0), "1 minute ago"),
        (utc(2016, 4, 10, 12, 1, 0), "in 1 minute"),
        (utc(2016, 4, 10, 12, 1, 59), "in 1 minute"),
        (utc(2016, 4, 10, 12, 59, 59), "in 59 minutes"),
    ];
    for (target, expected) in cases {
        let label = target.local_fields().unwrap();
        assert_eq!(best_fit(&now, target), expected, "target {label}");
    }
}

#[test]
fn test_best_fit_hours() {
    let now = base_now();
    let cases = [
        (utc(2016, 4, 10, 13, 0, 0), "in 1 hour"),
        (utc(2016, 4, 10, 13, 59, 59), "in 1 hour"),
        (utc(2016, 4, 10, 23, 59, 59), "in 11 hours"),
        (utc(2016, 4, 10, 0, 0, 0), "12 hours ago"),
    ];
    for (target, expected) in cases {
        let label = target.local_fields().unwrap();
        assert_eq!(best_fit(&now, target), expected, "target {label}");
    }
}

#[test]
fn test_best_fit_days_need_a_calendar_change() {
    let now = base_now();
    assert_eq!(best_fit(&now, utc(2016, 4, 9, 18, 0, 0)), "yesterday");

    let evening = utc(2016, 4, 10, 1, 0, 0);
    assert_eq!(best_fit(&evening, utc(2016, 4, 9, 19, 0, 0)), "6 hours ago");
    assert_eq!(best_fit(&evening, utc(2016, 4, 9, 18, 0, 0)), "yesterday");

    let late = utc(2016, 4, 10, 23, 0, 0);
    assert_eq!(best_fit(&late, utc(2016, 4, 11, 5, 0, 0)), "in 6 hours");
    assert_eq!(best_fit(&late, utc(2016, 4, 11, 6, 0, 0)), "tomorrow");

    let jan_end = utc(2016, 1, 31, 23, 0, 0);
    assert_eq!(best_fit(&jan_end, utc(2016, 2, 1, 5, 0, 0)), "in 6 hours");
    assert_eq!(best_fit(&jan_end, utc(2016, 2, 1, 7, 0, 0)), "tomorrow");

    let year_end = utc(2016, 12, 31, 23, 0, 0);
    assert_eq!(best_fit(&year_end, utc(2017, 1, 1, 5, 0, 0)), "in 6 hours");
    assert_eq!(best_fit(&year_end, utc(2017, 1, 1, 7, 0, 0)), "tomorrow");
}

#[test]
fn test_best_fit_days() {
    let now = base_now();
    assert_eq!(best_fit(&now, utc(2016, 4, 1, 0, 0, 0)), "9 days ago");
    assert_eq!(best_fit(&now, utc(2016, 4, 11, 9, 0, 0)), "tomorrow");
    assert_eq!(best_fit(&now, utc(2016, 4, 30, 23, 59, 0)), "in 20 days");
    assert_eq!(best_fit(&now, utc(2016, 3, 31, 23, 59, 0)), "last month");
    assert_eq!(best_fit(&now, utc(2016, 5, 1, 0, 0, 0)), "next month");

    // Six days either side of a month boundary stay in days.
    let april_sixth = utc(2016, 4, 6, 12, 0, 0);
    assert_eq!(best_fit(&april_sixth, utc(2016, 3, 31, 23, 59, 0)), "6 days ago");

    let april_twenty_fifth = utc(2016, 4, 25, 23, 0, 0);
    assert_eq!(best_fit(&april_twenty_fifth, utc(2016, 5, 1, 0, 0, 0)), "in 6 days");

}

#[test]
fn test_best_fit_months() {
    let now = base_now();
    assert_eq!(best_fit(&now, utc(2016, 3, 1, 0, 0, 0)), "last month");
    assert_eq!(best_fit(&now, utc(2016, 5, 1, 0, 0, 0)), "next month");
    assert_eq!(best_fit(&now, utc(2016, 1, 1, 0, 0, 0)), "3 months ago");
    assert_eq!(best_fit(&now, utc(2016, 12, 1, 23, 59, 0)), "in 8 months");

    // Month counts run across the year boundary before years take over.
    let jan_twelve = utc(2017, 1, 12, 18, 30, 0);
    assert_eq!(best_fit(&jan_twelve, utc(2016, 12, 29, 18, 30, 0)), "last month");

    let dec_twenty_nine = utc(2016, 12, 29, 18, 30, 0);
    assert_eq!(best_fit(&dec_twenty_nine, utc(2017, 1, 12, 18, 30, 0)), "next month");

    let feb_twenty_eight = utc(2016, 2, 28, 12, 0, 0);
    assert_eq!(best_fit(&feb_twenty_eight, utc(2015, 12, 31, 23, 59, 0)), "2 months ago");
}

#[test]
fn test_best_fit_years() {
    let now = base_now();
    assert_eq!(best_fit(&now, utc(2010, 6, 1, 12, 0, 0)), "6 years ago");
    assert_eq!(best_fit(&now, utc(2015, 12, 31, 23, 59, 0)), "last year");
    assert_eq!(best_fit(&now, utc(2017, 1, 1, 0, 0, 0)), "next year");

    let oct_second = utc(2016, 10, 2, 12, 0, 0);
    assert_eq!(best_fit(&oct_second, utc(2017, 1, 1, 0, 0, 0)), "next year");
}

// ── explicit units ──────────────────────────────────────────────────────────

#[test]
fn test_explicit_hours() {
    assert_eq!(in_unit(Unit::Hour, utc(2016, 4, 10, 12, 45, 0)), "this hour");
    assert_eq!(in_unit(Unit::Hour, utc(2016, 4, 10, 11, 1, 0)), "1 hour ago");
    assert_eq!(in_unit(Unit::Hour, utc(2016, 4, 10, 0, 0, 0)), "12 hours ago");
    assert_eq!(in_unit(Unit::Hour, utc(2016, 4, 1, 0, 0, 0)), "228 hours ago");
    assert_eq!(in_unit(Unit::Hour, utc(2016, 1, 1, 0, 0, 0)), "2,412 hours ago");
}

#[test]
fn test_explicit_days_months_minutes_seconds() {
    assert_eq!(in_unit(Unit::Day, utc(2016, 4, 10, 11, 30, 0)), "today");
    assert_eq!(in_unit(Unit::Day, utc(2016, 1, 1, 0, 0, 0)), "100 days ago");
    assert_eq!(in_unit(Unit::Month, utc(2016, 4, 10, 23, 59, 59)), "this month");
    assert_eq!(in_unit(Unit::Month, utc(2016, 4, 30, 23, 59, 59)), "this month");
    assert_eq!(in_unit(Unit::Month, utc(2017, 1, 1, 0, 0, 0)), "in 9 months");
    assert_eq!(in_unit(Unit::Minute, utc(2016, 4, 10, 12, 0, 30)), "this minute");
    assert_eq!(in_unit(Unit::Second, utc(2016, 4, 10, 11, 58, 0)), "120 seconds ago");
}

#[test]
fn test_unit_option_from_string() {
    let unit: UnitOption = "hours".parse().unwrap();
    let options = FormatOptions::default().now(base_now()).unit(unit);
    let text = RelativeTime::new()
        .format(utc(2016, 4, 9, 12, 0, 0), &options)
        .unwrap();
    assert_eq!(text, "24 hours ago");
}

// ── time zones ──────────────────────────────────────────────────────────────

#[test]
fn test_target_zone_is_the_working_zone() {
    let now = base_now();
    let cases = [
        // 05:00 on the 10th in Los Angeles.
        (at("America/Los_Angeles", 2016, 4, 9, 17, 0, 0), "yesterday"),
        (at("America/Los_Angeles", 2016, 3, 15, 12, 0, 0), "last month"),
        (at("America/Los_Angeles", 2015, 12, 31, 16, 0, 0), "last year"),
        // 14:00 on the 10th in Berlin.
        (at("Europe/Berlin", 2016, 4, 10, 2, 0, 0), "12 hours ago"),
        (at("Europe/Berlin", 2016, 4, 1, 0, 0, 0), "9 days ago"),
        (at("Europe/Berlin", 2016, 1, 1, 1, 0, 0), "3 months ago"),
    ];
    for (target, expected) in cases {
        let label = format!("{} {}", target.zone(), target.local_fields().unwrap());
        assert_eq!(best_fit(&now, target), expected, "target {label}");
    }
}

#[test]
fn test_same_instant_reads_differently_per_zone() {
    let now = base_now();
    let instant = utc(2016, 4, 10, 0, 0, 0).instant();
    let la = ZonedTimestamp::new(instant, zone("America/Los_Angeles"));
    let berlin = ZonedTimestamp::new(instant, zone("Europe/Berlin"));
    assert_eq!(best_fit(&now, la), "yesterday");
    assert_eq!(best_fit(&now, berlin), "12 hours ago");
}

#[test]
fn test_hour_across_spring_forward() {
    // 03:00 PDT on 2017-03-12; the target is 01:00 PST the same morning.
    let now = utc(2017, 3, 12, 10, 0, 0);
    let target = at("America/Los_Angeles", 2017, 3, 12, 1, 0, 0);
    assert_eq!(best_fit(&now, target), "1 hour ago");
}

#[test]
fn test_offset_table_zone_matches_named_zone() {
    // Los Angeles offsets for 2016.
    let table = OffsetTable::from_parts(&[1_457_863_200_000, 1_478_422_800_000], &[480, 420, 480])
        .unwrap();
    let instant = utc(2016, 4, 10, 0, 0, 0).instant();

    let from_table = ZonedTimestamp::new(instant, ZoneRef::table(table));
    let from_name = ZonedTimestamp::new(instant, zone("America/Los_Angeles"));
    assert_eq!(
        from_table.local_fields().unwrap(),
        from_name.local_fields().unwrap()
    );
    assert_eq!(best_fit(&base_now(), from_table), "yesterday");
}

#[test]
fn test_fixed_offset_zone() {
    // 05:00 on the 10th at UTC-07:00.
    let target = at("GMT-07:00", 2016, 4, 9, 17, 0, 0);
    assert_eq!(best_fit(&base_now(), target), "yesterday");
}

#[test]
fn test_instant_target_with_zoned_now() {
    let options = FormatOptions::default().now(base_now());
    let target = Instant::from_millis(base_now().epoch_millis() - 59_000);
    let text = RelativeTime::new().format(target, &options).unwrap();
    assert_eq!(text, "59 seconds ago");
}

#[test]
fn test_instant_target_with_time_zone_option() {
    let options = FormatOptions::default()
        .now(base_now().instant())
        .time_zone(zone("America/Los_Angeles"));
    let text = RelativeTime::new()
        .format(utc(2016, 4, 10, 0, 0, 0).instant(), &options)
        .unwrap();
    assert_eq!(text, "yesterday");
}

#[test]
fn test_chrono_inputs() {
    use chrono::TimeZone;

    let now = chrono::Utc.with_ymd_and_hms(2016, 4, 10, 12, 0, 0).unwrap();
    let target = chrono_tz::America::Los_Angeles
        .with_ymd_and_hms(2016, 4, 9, 17, 0, 0)
        .unwrap();
    let options = FormatOptions::default().now(now);
    // The target's zone is the working zone; `now` is viewed in it.
    let text = RelativeTime::new().format(target, &options).unwrap();
    assert_eq!(text, "yesterday");

    let plain_now = now.naive_utc();
    let options = FormatOptions::default().now(plain_now);
    let plain_target = target.naive_local();
    let text = RelativeTime::new().format(plain_target, &options).unwrap();
    // Wall clocks only: 17:00 on the 9th vs 12:00 on the 10th.
    assert_eq!(text, "yesterday");
}

// ── configuration and errors ────────────────────────────────────────────────

#[test]
fn test_strict_zone_policy_rejects_mixed_zones() {
    let rt = RelativeTime::with_config(RelativeTimeConfig {
        zone_policy: ZonePolicy::Strict,
        ..Default::default()
    });
    let options = FormatOptions::default().now(base_now());

    let err = rt
        .format(at("Europe/Berlin", 2016, 4, 10, 2, 0, 0), &options)
        .unwrap_err();
    assert_eq!(
        err,
        RelativeTimeError::ZoneMismatch {
            target: "Europe/Berlin".to_string(),
            now: "UTC".to_string(),
        }
    );

    // Same zone on both sides is fine.
    assert_eq!(rt.format(utc(2016, 4, 10, 11, 0, 0), &options).unwrap(), "1 hour ago");
}

#[test]
fn test_strict_zone_policy_treats_utc_spellings_alike() {
    use chrono::TimeZone;

    let rt = RelativeTime::with_config(RelativeTimeConfig {
        zone_policy: ZonePolicy::Strict,
        ..Default::default()
    });
    let options = FormatOptions::default().now(base_now());

    let target = chrono_tz::UTC.with_ymd_and_hms(2016, 4, 10, 11, 0, 0).unwrap();
    assert_eq!(rt.format(target, &options).unwrap(), "1 hour ago");

    let target = at("Etc/UTC", 2016, 4, 10, 11, 0, 0);
    assert_eq!(target.zone(), &ZoneRef::UTC);
    assert_eq!(rt.format(target, &options).unwrap(), "1 hour ago");
}

#[test]
fn test_plain_inputs_resolve_repeated_hour_in_default_zone() {
    let config = |disambiguation| RelativeTimeConfig {
        default_zone: zone("America/Los_Angeles"),
        disambiguation,
        ..Default::default()
    };
    // 03:00 PST is 11:00Z; 01:30 happens at 08:30Z (PDT) and 09:30Z (PST).
    let options = FormatOptions::default()
        .now(LocalFields::new(2016, 11, 6, 3, 0, 0))
        .unit(Unit::Minute);
    let target = LocalFields::new(2016, 11, 6, 1, 30, 0);

    let later = RelativeTime::with_config(config(Disambiguation::Later));
    assert_eq!(later.format(target, &options).unwrap(), "90 minutes ago");

    let earlier = RelativeTime::with_config(config(Disambiguation::Earlier));
    assert_eq!(earlier.format(target, &options).unwrap(), "150 minutes ago");

    let reject = RelativeTime::with_config(config(Disambiguation::Reject));
    let err = reject.format(target, &options).unwrap_err();
    assert!(matches!(err, RelativeTimeError::AmbiguousLocalTime(_)), "got: {err}");
}

#[test]
fn test_epoch_millis_default_zone() {
    let rt = RelativeTime::with_config(RelativeTimeConfig {
        default_zone: zone("America/Los_Angeles"),
        ..Default::default()
    });
    let options = FormatOptions::default().now(base_now().epoch_millis());
    let target = utc(2016, 4, 10, 0, 0, 0).epoch_millis();
    assert_eq!(rt.format(target, &options).unwrap(), "yesterday");

    // An explicit zone beats the default.
    let options = options.time_zone(ZoneRef::UTC);
    assert_eq!(rt.format(target, &options).unwrap(), "12 hours ago");
}

#[test]
fn test_missing_zone_context() {
    let options = FormatOptions::default().now(base_now().epoch_millis());
    let err = RelativeTime::new()
        .format(utc(2016, 4, 10, 11, 0, 0).instant(), &options)
        .unwrap_err();
    assert!(matches!(err, RelativeTimeError::MissingZoneContext(_)), "got: {err}");
}

#[test]
fn test_plain_and_anchored_do_not_mix() {
    let rt = RelativeTime::new();
    let options = FormatOptions::default().now(LocalFields::new(2016, 4, 10, 12, 0, 0));
    let err = rt.format(base_now(), &options).unwrap_err();
    assert!(
        matches!(err, RelativeTimeError::UnsupportedInput { role: "now", .. }),
        "got: {err}"
    );

    let options = FormatOptions::default().now(base_now());
    let err = rt
        .format(LocalFields::new(2016, 4, 9, 12, 0, 0), &options)
        .unwrap_err();
    assert!(err.to_string().starts_with("Unsupported now input"), "got: {err}");
}

#[test]
fn test_custom_formatter_closure() {
    let rt = RelativeTime::with_formatter(
        |unit: Unit, value: i64| match value {
            0 => format!("this {unit}"),
            v if v < 0 => format!("{}{} back", -v, &unit.as_str()[..1]),
            v => format!("{v}{} ahead", &unit.as_str()[..1]),
        },
        RelativeTimeConfig::default(),
    );
    let options = FormatOptions::default().now(base_now());
    assert_eq!(rt.format(utc(2016, 4, 4, 12, 0, 0), &options).unwrap(), "6d back");
    assert_eq!(rt.format(utc(2016, 4, 10, 15, 0, 0), &options).unwrap(), "3h ahead");
    assert_eq!(rt.format(base_now(), &options).unwrap(), "this second");
}

#[test]
fn test_describe_serializes() {
    let options = FormatOptions::default().now(base_now());
    let result = RelativeTime::new()
        .describe(utc(2016, 1, 1, 0, 0, 0), &options)
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "unit": "month", "value": -3, "text": "3 months ago" })
    );
}

#[test]
fn test_difference_snapshot_through_facade() {
    let options = FormatOptions::default().now(base_now());
    let diff = RelativeTime::new()
        .difference(utc(2016, 1, 1, 0, 0, 0).into(), &options)
        .unwrap();
    let snapshot = diff.snapshot().unwrap();
    assert_eq!(snapshot.years, 0);
    assert_eq!(snapshot.months, -3);
    assert_eq!(snapshot.days, -100);
    assert_eq!(snapshot.hours, -2412);
}

//! Per-target, per-night visibility computation.
//!
//! A target is observable at a fine-grid sample when it is at or above the
//! minimum altitude while the Sun is at or below the twilight limit. The
//! reported duration is the span from the first to the last observable
//! sample; gaps inside that span are not subtracted.

use crate::ephemeris::{EphemerisError, EphemerisResult};
use crate::models::{
    HorizontalCoordinates, JulianDate, LunarSeparation, VisibilityResult, VisibilityThresholds,
};

/// Sampled series for one target on one night.
#[derive(Debug, Clone, Copy)]
pub struct EngineInput<'a> {
    pub target: &'a str,
    pub fine_times: &'a [JulianDate],
    pub target_fine_altitudes: &'a [qtty::Degrees],
    pub sun_fine_altitudes: &'a [qtty::Degrees],
    pub coarse_times: &'a [JulianDate],
    pub target_coarse: &'a [HorizontalCoordinates],
    pub moon_coarse: &'a [HorizontalCoordinates],
}

/// Sample-by-sample visibility: target high enough and Sun low enough.
pub fn visibility_mask(
    target_altitudes: &[qtty::Degrees],
    sun_altitudes: &[qtty::Degrees],
    thresholds: &VisibilityThresholds,
) -> EphemerisResult<Vec<bool>> {
    ensure_same_len("target altitude", target_altitudes.len(), "Sun altitude", sun_altitudes.len())?;
    Ok(target_altitudes
        .iter()
        .zip(sun_altitudes)
        .map(|(&target, &sun)| thresholds.admits(target, sun))
        .collect())
}

/// First and last timestamps where the mask is set.
pub fn visible_span(mask: &[bool], times: &[JulianDate]) -> Option<(JulianDate, JulianDate)> {
    let first = mask.iter().position(|&m| m)?;
    let last = mask.iter().rposition(|&m| m)?;
    Some((*times.get(first)?, *times.get(last)?))
}

/// Highest altitude in the series.
pub fn peak_altitude(positions: &[HorizontalCoordinates]) -> Option<qtty::Degrees> {
    positions
        .iter()
        .map(|p| p.altitude.value())
        .filter(|a| !a.is_nan())
        .fold(None, |best: Option<f64>, a| Some(best.map_or(a, |b| b.max(a))))
        .map(qtty::Degrees::new)
}

/// Smallest target-Moon separation and when it happens (first occurrence on ties).
pub fn minimum_lunar_separation(
    target: &[HorizontalCoordinates],
    moon: &[HorizontalCoordinates],
    times: &[JulianDate],
) -> EphemerisResult<Option<LunarSeparation>> {
    ensure_same_len("target position", target.len(), "Moon position", moon.len())?;
    ensure_same_len("target position", target.len(), "coarse time", times.len())?;

    let mut best: Option<LunarSeparation> = None;
    for ((t, m), &at) in target.iter().zip(moon).zip(times) {
        let separation = t.separation(m);
        if separation.value().is_nan() {
            continue;
        }
        if best.map_or(true, |b| separation.value() < b.minimum.value()) {
            best = Some(LunarSeparation {
                minimum: separation,
                at,
            });
        }
    }
    Ok(best)
}

/// Evaluate one target for one night.
pub fn evaluate(
    input: &EngineInput<'_>,
    thresholds: &VisibilityThresholds,
) -> EphemerisResult<VisibilityResult> {
    ensure_same_len(
        "fine time",
        input.fine_times.len(),
        "target altitude",
        input.target_fine_altitudes.len(),
    )?;
    let mask = visibility_mask(input.target_fine_altitudes, input.sun_fine_altitudes, thresholds)?;

    let Some((from, until)) = visible_span(&mask, input.fine_times) else {
        return Ok(VisibilityResult::not_visible(input.target));
    };

    let masked_samples = mask.iter().filter(|&&m| m).count();
    let step_hours = match input.fine_times {
        [a, b, ..] => b.hours_since(*a).value(),
        _ => 0.0,
    };

    Ok(VisibilityResult {
        target: input.target.to_string(),
        visible: true,
        hours: until.hours_since(from),
        masked_hours: qtty::Hours::new(masked_samples as f64 * step_hours),
        visible_from: Some(from),
        visible_until: Some(until),
        peak_altitude: peak_altitude(input.target_coarse),
        lunar_separation: minimum_lunar_separation(
            input.target_coarse,
            input.moon_coarse,
            input.coarse_times,
        )?,
    })
}

fn ensure_same_len(a_name: &str, a: usize, b_name: &str, b: usize) -> EphemerisResult<()> {
    if a == b {
        Ok(())
    } else {
        Err(EphemerisError::InvalidInput(format!(
            "{a_name} series has {a} samples but {b_name} series has {b}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degrees(values: &[f64]) -> Vec<qtty::Degrees> {
        values.iter().map(|&v| qtty::Degrees::new(v)).collect()
    }

    /// Minute grid starting at `start`.
    fn minute_grid(start: &str, count: usize) -> Vec<JulianDate> {
        let t0 = JulianDate::parse_iso(start).unwrap();
        (0..count).map(|i| t0.add_days(i as f64 / 1440.0)).collect()
    }

    fn flat(altitude: f64, n: usize) -> Vec<HorizontalCoordinates> {
        vec![HorizontalCoordinates::new(altitude, 180.0); n]
    }

    #[test]
    fn test_mask_requires_both_limits() {
        let t = VisibilityThresholds::default();
        let mask = visibility_mask(
            &degrees(&[10.0, 25.0, 25.0, 20.0]),
            &degrees(&[-30.0, -10.0, -20.0, -18.0]),
            &t,
        )
        .unwrap();
        assert_eq!(mask, vec![false, false, true, true]);
    }

    #[test]
    fn test_mask_length_mismatch_is_an_error() {
        let err = visibility_mask(&degrees(&[30.0]), &degrees(&[]), &VisibilityThresholds::default())
            .unwrap_err();
        assert!(matches!(err, EphemerisError::InvalidInput(_)));
    }

    #[test]
    fn test_visible_span_first_to_last() {
        let times = minute_grid("2025-03-01 22:00", 5);
        let span = visible_span(&[false, true, false, true, false], &times).unwrap();
        assert_eq!(span, (times[1], times[3]));
        assert!(visible_span(&[false; 5], &times).is_none());
    }

    #[test]
    fn test_peak_altitude_skips_nan() {
        let positions = vec![
            HorizontalCoordinates::new(12.0, 0.0),
            HorizontalCoordinates::new(f64::NAN, 0.0),
            HorizontalCoordinates::new(48.5, 0.0),
        ];
        assert_eq!(peak_altitude(&positions).map(|p| p.value()), Some(48.5));
        assert!(peak_altitude(&[]).is_none());
    }

    #[test]
    fn test_minimum_separation_picks_first_minimum() {
        let times = minute_grid("2025-03-01 22:00", 3);
        let target = flat(40.0, 3);
        let moon = vec![
            HorizontalCoordinates::new(10.0, 180.0),
            HorizontalCoordinates::new(30.0, 180.0),
            HorizontalCoordinates::new(50.0, 180.0),
        ];
        let sep = minimum_lunar_separation(&target, &moon, &times).unwrap().unwrap();
        assert!((sep.minimum.value() - 10.0).abs() < 1e-9);
        assert_eq!(sep.at, times[1]);
    }

    #[test]
    fn test_evaluate_all_false_mask() {
        let fine = minute_grid("2025-03-01 22:00", 60);
        let coarse = vec![fine[0], fine[20], fine[40]];
        let input = EngineInput {
            target: "Low",
            fine_times: &fine,
            target_fine_altitudes: &degrees(&[5.0; 60]),
            sun_fine_altitudes: &degrees(&[-30.0; 60]),
            coarse_times: &coarse,
            target_coarse: &flat(5.0, 3),
            moon_coarse: &flat(-20.0, 3),
        };
        let result = evaluate(&input, &VisibilityThresholds::default()).unwrap();
        assert!(!result.visible);
        assert_eq!(result.hours.value(), 0.0);
        assert!(result.peak_altitude.is_none());
        assert!(result.lunar_separation.is_none());
    }

    #[test]
    fn test_evaluate_single_sample_is_visible_for_zero_hours() {
        let fine = minute_grid("2025-03-01 22:00", 5);
        let coarse = vec![fine[0]];
        let input = EngineInput {
            target: "Peak",
            fine_times: &fine,
            target_fine_altitudes: &degrees(&[19.0, 19.5, 20.5, 19.5, 19.0]),
            sun_fine_altitudes: &degrees(&[-30.0; 5]),
            coarse_times: &coarse,
            target_coarse: &flat(19.0, 1),
            moon_coarse: &flat(-20.0, 1),
        };
        let result = evaluate(&input, &VisibilityThresholds::default()).unwrap();
        assert!(result.visible);
        assert_eq!(result.hours.value(), 0.0);
        assert_eq!(result.visible_from, Some(fine[2]));
        assert_eq!(result.visible_until, Some(fine[2]));
    }

    #[test]
    fn test_twilight_bounds_the_window() {
        // Target up 22:00-02:00, astronomical darkness 23:00-01:00
        let fine = minute_grid("2025-03-01 21:00", 360);
        let minutes_after_21 = |i: usize| i as f64;
        let target: Vec<qtty::Degrees> = (0..360)
            .map(|i| {
                let m = minutes_after_21(i);
                qtty::Degrees::new(if (60.0..=300.0).contains(&m) { 45.0 } else { 10.0 })
            })
            .collect();
        let sun: Vec<qtty::Degrees> = (0..360)
            .map(|i| {
                let m = minutes_after_21(i);
                qtty::Degrees::new(if (120.0..=240.0).contains(&m) { -25.0 } else { -12.0 })
            })
            .collect();
        let coarse: Vec<JulianDate> = fine.iter().step_by(20).copied().collect();
        let input = EngineInput {
            target: "Twilight",
            fine_times: &fine,
            target_fine_altitudes: &target,
            sun_fine_altitudes: &sun,
            coarse_times: &coarse,
            target_coarse: &flat(45.0, coarse.len()),
            moon_coarse: &flat(0.0, coarse.len()),
        };
        let result = evaluate(&input, &VisibilityThresholds::default()).unwrap();
        assert!(result.visible);
        assert!((result.hours.value() - 2.0).abs() < 1e-6);
        assert_eq!(result.visible_from.unwrap().to_string(), "2025-03-01 23:00:00");
        assert_eq!(result.visible_until.unwrap().to_string(), "2025-03-02 01:00:00");
    }

    #[test]
    fn test_gap_inside_span_is_not_subtracted() {
        let fine = minute_grid("2025-03-01 22:00", 121);
        let target: Vec<qtty::Degrees> = (0..121)
            .map(|i| qtty::Degrees::new(if (30..90).contains(&i) { 15.0 } else { 30.0 }))
            .collect();
        let sun = degrees(&[-30.0; 121]);
        let coarse = vec![fine[0]];
        let input = EngineInput {
            target: "Dip",
            fine_times: &fine,
            target_fine_altitudes: &target,
            sun_fine_altitudes: &sun,
            coarse_times: &coarse,
            target_coarse: &flat(30.0, 1),
            moon_coarse: &flat(0.0, 1),
        };
        let result = evaluate(&input, &VisibilityThresholds::default()).unwrap();
        assert!((result.hours.value() - 2.0).abs() < 1e-6);
        // 61 of 121 samples are visible
        assert!((result.masked_hours.value() - 61.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_lunar_separation_uses_whole_window() {
        // Closest approach happens while the target is not observable
        let fine = minute_grid("2025-03-01 22:00", 41);
        let coarse = vec![fine[0], fine[20], fine[40]];
        let target_fine: Vec<qtty::Degrees> = (0..41)
            .map(|i| qtty::Degrees::new(if i >= 20 { 30.0 } else { 10.0 }))
            .collect();
        let target_coarse = vec![
            HorizontalCoordinates::new(10.0, 90.0),
            HorizontalCoordinates::new(30.0, 90.0),
            HorizontalCoordinates::new(35.0, 90.0),
        ];
        let moon_coarse = vec![
            HorizontalCoordinates::new(12.0, 90.0),
            HorizontalCoordinates::new(60.0, 90.0),
            HorizontalCoordinates::new(70.0, 90.0),
        ];
        let input = EngineInput {
            target: "NearMoon",
            fine_times: &fine,
            target_fine_altitudes: &target_fine,
            sun_fine_altitudes: &degrees(&[-30.0; 41]),
            coarse_times: &coarse,
            target_coarse: &target_coarse,
            moon_coarse: &moon_coarse,
        };
        let result = evaluate(&input, &VisibilityThresholds::default()).unwrap();
        let sep = result.lunar_separation.unwrap();
        assert!((sep.minimum.value() - 2.0).abs() < 1e-9);
        assert_eq!(sep.at, coarse[0]);
        assert_eq!(result.peak_altitude.map(|p| p.value()), Some(35.0));
    }
}

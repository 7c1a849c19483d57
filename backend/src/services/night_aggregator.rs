//! Per-night aggregation across all targets.
//!
//! Brackets the night with the nearest sunset and sunrise, samples the Sun,
//! the Moon and every target over a fixed 15 h window, and runs the
//! visibility engine for each target in input order.

use log::{debug, info, warn};

use crate::ephemeris::{EphemerisError, EphemerisProvider, EphemerisResult};
use crate::models::{
    HorizontalCoordinates, Night, NightReport, NightTracks, NightWindow, ResolvedTarget,
    SkippedComputation, TargetTrack, TimeGrid, VisibilityResult, VisibilityThresholds,
};
use crate::services::visibility_engine::{evaluate, EngineInput};

/// Sunset nearest the reference, sunrise nearest the reference plus one day.
pub fn night_window<E: EphemerisProvider + ?Sized>(
    night: &Night,
    ephemeris: &E,
) -> EphemerisResult<NightWindow> {
    let sunset = ephemeris.sunset(night.reference)?;
    let sunrise = ephemeris.sunrise(night.reference.add_days(1.0))?;
    if sunrise <= sunset {
        return Err(EphemerisError::Computation(format!(
            "sunrise {} does not follow sunset {}",
            sunrise, sunset
        )));
    }
    Ok(NightWindow::from_sun_events(sunset, sunrise))
}

/// Compute visibility of every target for one night.
///
/// Night-level failures (no Sun crossing, Sun or Moon series unavailable) are
/// returned to the caller. A failure for a single target is recorded in
/// [`NightReport::skipped`] and that target reports zero hours.
pub fn compute_night<E: EphemerisProvider + ?Sized>(
    night: &Night,
    targets: &[ResolvedTarget],
    ephemeris: &E,
    thresholds: &VisibilityThresholds,
) -> EphemerisResult<NightReport> {
    let window = night_window(night, ephemeris)?;
    let coarse = TimeGrid::coarse(&window);
    let fine = TimeGrid::fine(&window);

    debug!(
        "Night {}: sunset {}, sunrise {}, window {} .. {} ({} coarse / {} fine samples)",
        night.label,
        window.sunset,
        window.sunrise,
        window.start,
        window.end,
        coarse.len(),
        fine.len()
    );

    let sun_fine = ephemeris.sun_altitudes(fine.times())?;
    let moon_coarse = ephemeris.moon_positions(coarse.times())?;

    let mut results = Vec::with_capacity(targets.len());
    let mut tracks = Vec::with_capacity(targets.len());
    let mut skipped = Vec::new();

    for target in targets {
        match evaluate_target(target, &coarse, &fine, &sun_fine, &moon_coarse, ephemeris, thresholds) {
            Ok((result, track)) => {
                debug!(
                    "{} on {}: visible={} hours={:.2}",
                    target.name,
                    night.label,
                    result.visible,
                    result.hours.value()
                );
                results.push(result);
                tracks.push(track);
            }
            Err(e) => {
                warn!("Skipping {} on {}: {}", target.name, night.label, e);
                skipped.push(SkippedComputation::target_night(&target.name, night.date, e));
                results.push(VisibilityResult::not_visible(&target.name));
            }
        }
    }

    let report = NightReport {
        night: night.clone(),
        window,
        results,
        tracks: NightTracks {
            coarse_times: coarse.times().to_vec(),
            fine_times: fine.times().to_vec(),
            sun_altitudes: sun_fine,
            moon_altitudes: moon_coarse.iter().map(|p| p.altitude).collect(),
            targets: tracks,
        },
        skipped,
    };

    info!(
        "Night {}: {} of {} targets visible",
        night.label,
        report.visible().count(),
        targets.len()
    );

    Ok(report)
}

fn evaluate_target<E: EphemerisProvider + ?Sized>(
    target: &ResolvedTarget,
    coarse: &TimeGrid,
    fine: &TimeGrid,
    sun_fine: &[qtty::Degrees],
    moon_coarse: &[HorizontalCoordinates],
    ephemeris: &E,
    thresholds: &VisibilityThresholds,
) -> EphemerisResult<(VisibilityResult, TargetTrack)> {
    let target_coarse = ephemeris.target_positions(&target.coordinates, coarse.times())?;
    let target_fine: Vec<qtty::Degrees> = ephemeris
        .target_positions(&target.coordinates, fine.times())?
        .into_iter()
        .map(|p| p.altitude)
        .collect();

    let result = evaluate(
        &EngineInput {
            target: &target.name,
            fine_times: fine.times(),
            target_fine_altitudes: &target_fine,
            sun_fine_altitudes: sun_fine,
            coarse_times: coarse.times(),
            target_coarse: &target_coarse,
            moon_coarse,
        },
        thresholds,
    )?;

    let track = TargetTrack {
        target: target.name.clone(),
        altitudes: target_coarse.iter().map(|p| p.altitude).collect(),
    };

    Ok((result, track))
}

//! Concentration ⇄ AQI conversion.
//!
//! Forward direction follows the US EPA piecewise-linear formula; the worst
//! pollutant determines the composite index. The inverse direction is only
//! used to fill display values when a station reports AQI without raw
//! particulate readings.

use anyhow::{Context, Result, bail};

use crate::aqi::breakpoints::{Breakpoint, Pollutant};

/// Upper bound of the AQI scale.
pub const MAX_AQI: u16 = 500;

/// PM10 is approximated as a fixed multiple of PM2.5 when only AQI is known.
/// This is a display heuristic, not a measured relationship.
pub const PM10_TO_PM25_RATIO: f64 = 1.6;

/// Rounds `value` and clamps it to `[0, MAX_AQI]`.
///
/// Returns `None` for NaN.
pub fn clamp_aqi(value: f64) -> Option<u16> {
    if value.is_nan() {
        return None;
    }
    Some(value.round().clamp(0.0, f64::from(MAX_AQI)) as u16)
}

impl Pollutant {
    /// Sub-index for `concentration` in this pollutant's native unit.
    ///
    /// Concentrations past the last bracket extrapolate along it, values in
    /// the gap between two brackets take the next bracket's lower edge, and
    /// negative values count as zero. The result is always within
    /// `[0, MAX_AQI]`.
    pub fn sub_index(self, concentration: f64) -> u16 {
        let c = concentration.max(0.0);
        let Some(bracket) = bracket_for(self.breakpoints(), c) else {
            return 0;
        };

        let c = c.max(bracket.c_low);
        let slope =
            f64::from(bracket.i_high - bracket.i_low) / (bracket.c_high - bracket.c_low);
        let raw = slope * (c - bracket.c_low) + f64::from(bracket.i_low);

        clamp_aqi(raw).unwrap_or(0)
    }
}

fn bracket_for(table: &[Breakpoint], c: f64) -> Option<&Breakpoint> {
    table.iter().find(|b| c <= b.c_high).or_else(|| table.last())
}

/// AQI for a named pollutant, or `None` when the pollutant is unknown.
pub fn concentration_to_aqi(pollutant: &str, concentration: f64) -> Option<u16> {
    let pollutant: Pollutant = pollutant.parse().ok()?;
    Some(pollutant.sub_index(concentration))
}

/// PM2.5 sub-index, the conversion used for station readings.
pub fn pm25_to_aqi(pm25: f64) -> u16 {
    Pollutant::Pm25.sub_index(pm25)
}

/// Composite AQI: the maximum sub-index over every present, positive
/// concentration. Unknown pollutants are skipped. Returns 0 when nothing
/// contributes.
pub fn composite_aqi<'a, I>(readings: I) -> u16
where
    I: IntoIterator<Item = (&'a str, Option<f64>)>,
{
    sub_indices(readings)
        .map(|(_, aqi)| aqi)
        .max()
        .unwrap_or(0)
}

/// Pollutant responsible for the composite AQI.
///
/// Ties resolve to the first pollutant seen.
pub fn dominant_pollutant<'a, I>(readings: I) -> Option<Pollutant>
where
    I: IntoIterator<Item = (&'a str, Option<f64>)>,
{
    let mut best: Option<(Pollutant, u16)> = None;
    for (pollutant, aqi) in sub_indices(readings) {
        match best {
            Some((_, current)) if aqi <= current => {}
            _ => best = Some((pollutant, aqi)),
        }
    }
    best.map(|(pollutant, _)| pollutant)
}

fn sub_indices<'a, I>(readings: I) -> impl Iterator<Item = (Pollutant, u16)>
where
    I: IntoIterator<Item = (&'a str, Option<f64>)>,
{
    readings.into_iter().filter_map(|(name, concentration)| {
        let c = concentration.filter(|c| *c > 0.0)?;
        let pollutant: Pollutant = name.parse().ok()?;
        Some((pollutant, pollutant.sub_index(c)))
    })
}

/// Parses a `pm25=80` style reading.
///
/// # Errors
///
/// Returns an error for a missing `=`, an unknown pollutant or a
/// non-numeric concentration.
pub fn parse_reading(arg: &str) -> Result<(Pollutant, f64)> {
    let Some((name, value)) = arg.split_once('=') else {
        bail!("expected POLLUTANT=CONCENTRATION, got '{arg}'");
    };
    let pollutant: Pollutant = name.parse()?;
    let concentration: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("concentration for {pollutant} is not a number: '{value}'"))?;
    Ok((pollutant, concentration))
}

/// Approximate PM2.5 concentration (µg/m³) for an AQI value, walking the
/// PM2.5 table backwards.
pub fn estimate_pm25(aqi: u16) -> f64 {
    let aqi = aqi.min(MAX_AQI);
    let table = Pollutant::Pm25.breakpoints();
    let Some(bracket) = table
        .iter()
        .find(|b| aqi <= b.i_high)
        .or_else(|| table.last())
    else {
        return 0.0;
    };

    let aqi = aqi.max(bracket.i_low);
    let span = f64::from(bracket.i_high - bracket.i_low);
    bracket.c_low + f64::from(aqi - bracket.i_low) * (bracket.c_high - bracket.c_low) / span
}

/// Approximate PM10 concentration (µg/m³): [`PM10_TO_PM25_RATIO`] × PM2.5.
pub fn estimate_pm10(aqi: u16) -> f64 {
    estimate_pm25(aqi) * PM10_TO_PM25_RATIO
}

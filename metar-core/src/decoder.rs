//! Parser turning raw METAR text into a [`DecodedReport`].
//!
//! Only the station and time groups are mandatory. Every later group is
//! recognised by its shape, so stations that order groups differently (or
//! omit them) still decode; a malformed optional group leaves its field unset.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use tracing::debug;

use crate::{
    MetarError,
    model::{
        ConvectiveCloud, DecodedReport, Descriptor, Intensity, PhenomenonCode, Pressure,
        SkyCoverage, SkyLayer, Visibility, VisibilityQualifier, WeatherPhenomenon, Wind,
        WindDirection,
    },
    station::is_station_token,
    units,
};

/// Decode `raw`, resolving the observation month/year against the current time.
pub fn parse(raw: &str) -> Result<DecodedReport, MetarError> {
    parse_at(raw, Utc::now())
}

/// Decode `raw`, resolving the observation month/year against `reference`.
///
/// The result depends only on the two arguments.
pub fn parse_at(raw: &str, reference: DateTime<Utc>) -> Result<DecodedReport, MetarError> {
    let mut tokens = raw.split_whitespace();

    let mut station = tokens
        .next()
        .ok_or_else(|| MetarError::malformed("empty report"))?;
    if matches!(station, "METAR" | "SPECI") {
        station = tokens
            .next()
            .ok_or_else(|| MetarError::malformed("missing station group"))?;
    }
    if !is_station_token(station) {
        return Err(MetarError::malformed(format!(
            "station group '{station}' is not 4 letters or digits"
        )));
    }

    let time = tokens
        .next()
        .ok_or_else(|| MetarError::malformed("missing time group"))?;
    let observed_at = parse_time(time, reference)?;

    let body: Vec<&str> = tokens.take_while(|t| *t != "RMK").collect();
    let mut groups = Groups::default();

    let mut i = 0;
    while i < body.len() {
        // "1 1/2SM" spans two tokens.
        if groups.visibility.is_none() {
            let split = body.get(i + 1).and_then(|next| parse_split_visibility(body[i], next));
            if let Some(vis) = split {
                groups.visibility = Some(vis);
                i += 2;
                continue;
            }
        }

        groups.accept(body[i]);
        i += 1;
    }

    let (temperature_c, dew_point_c) = match groups.temperature {
        Some((t, d)) => (Some(t), d),
        None => (None, None),
    };

    Ok(DecodedReport {
        station: station.to_string(),
        observed_at,
        wind: groups.wind,
        visibility: groups.visibility,
        sky_layers: groups.sky_layers,
        temperature_c,
        dew_point_c,
        pressure: groups.pressure,
        phenomena: groups.phenomena,
    })
}

/// Optional groups collected so far; the first group of each kind wins.
#[derive(Default)]
struct Groups {
    wind: Option<Wind>,
    visibility: Option<Visibility>,
    sky_layers: Vec<SkyLayer>,
    temperature: Option<(i32, Option<i32>)>,
    pressure: Option<Pressure>,
    phenomena: Vec<WeatherPhenomenon>,
}

impl Groups {
    fn accept(&mut self, token: &str) {
        if matches!(token, "AUTO" | "COR") || is_variable_wind_range(token) {
            return;
        }

        if token == "CAVOK" {
            self.visibility.get_or_insert(Visibility {
                miles: 10.0,
                qualifier: VisibilityQualifier::AtLeast,
            });
            if self.sky_layers.is_empty() {
                self.sky_layers.push(SkyLayer {
                    coverage: SkyCoverage::Clear,
                    altitude_feet: None,
                    convective: None,
                });
            }
            return;
        }

        if token.ends_with("KT") || token.ends_with("MPS") {
            match parse_wind(token) {
                Some(wind) if self.wind.is_none() => self.wind = Some(wind),
                Some(_) => debug!(token, "ignoring repeated wind group"),
                None => debug!(token, "ignoring malformed wind group"),
            }
            return;
        }

        if let Some(vis) = parse_visibility(token) {
            if self.visibility.is_none() {
                self.visibility = Some(vis);
            }
            return;
        }

        match parse_sky(token) {
            SkyGroup::Layer(layer) => {
                self.sky_layers.push(layer);
                return;
            }
            SkyGroup::Unrecognized => {
                debug!(token, "skipping sky group with unknown coverage");
                return;
            }
            SkyGroup::NotSky => {}
        }

        if token.contains('/') {
            match parse_temperature(token) {
                Some(pair) if self.temperature.is_none() => self.temperature = Some(pair),
                Some(_) => {}
                None => debug!(token, "ignoring malformed temperature group"),
            }
            return;
        }

        if let Some(pressure) = parse_pressure(token) {
            // Stations reporting both A and Q groups: keep whichever came first.
            if self.pressure.is_none() {
                self.pressure = Some(pressure);
            }
            return;
        }

        if let Some(wx) = parse_weather(token) {
            if !self.phenomena.contains(&wx) {
                self.phenomena.push(wx);
            }
            return;
        }

        debug!(token, "ignoring unrecognized METAR group");
    }
}

fn parse_time(token: &str, reference: DateTime<Utc>) -> Result<DateTime<Utc>, MetarError> {
    let digits = token
        .strip_suffix('Z')
        .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| MetarError::malformed(format!("time group '{token}' is not DDHHMMZ")))?;

    let day = two_digits(&digits[0..2]);
    let hour = two_digits(&digits[2..4]);
    let minute = two_digits(&digits[4..6]);

    if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
        return Err(MetarError::malformed(format!(
            "time group '{token}' is out of range"
        )));
    }

    let date = resolve_day(day, reference.date_naive()).ok_or_else(|| {
        MetarError::malformed(format!("time group '{token}' has no matching date"))
    })?;
    let naive = date
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| MetarError::malformed(format!("time group '{token}' is out of range")))?;

    Ok(Utc.from_utc_datetime(&naive))
}

/// Place `day` in the reference month, falling back to earlier months when the
/// day is in the future or does not exist in that month.
fn resolve_day(day: u32, reference: NaiveDate) -> Option<NaiveDate> {
    let mut month_start = reference.with_day(1)?;

    for _ in 0..12 {
        let candidate = NaiveDate::from_ymd_opt(month_start.year(), month_start.month(), day);
        if let Some(date) = candidate.filter(|d| *d <= reference) {
            return Some(date);
        }
        month_start = month_start.checked_sub_months(Months::new(1))?;
    }

    None
}

fn two_digits(s: &str) -> u32 {
    s.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Digits-only string whose length lies in `min..=max`.
fn digits(s: &str, min: usize, max: usize) -> Option<u32> {
    if s.len() < min || s.len() > max || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_wind(token: &str) -> Option<Wind> {
    let (body, in_mps) = match token.strip_suffix("KT") {
        Some(body) => (body, false),
        None => (token.strip_suffix("MPS")?, true),
    };
    if body.len() < 5 || !body.is_ascii() {
        return None;
    }

    let (dir, rest) = body.split_at(3);
    let (speed, gust) = match rest.split_once('G') {
        Some((speed, gust)) => (digits(speed, 2, 3)?, Some(digits(gust, 2, 3)?)),
        None => (digits(rest, 2, 3)?, None),
    };

    if gust.is_some_and(|g| g < speed) {
        return None;
    }

    let to_knots = |v: u32| {
        let v = f64::from(v);
        if in_mps { units::mps_to_knots(v) } else { v }
    };
    let speed_knots = to_knots(speed);
    let gust_knots = gust.map(to_knots);

    let direction = if dir == "VRB" {
        WindDirection::Variable
    } else {
        let degrees = digits(dir, 3, 3)?;
        if degrees > 360 {
            return None;
        }
        if degrees == 0 && speed == 0 && gust.is_none() {
            WindDirection::Calm
        } else {
            WindDirection::Degrees(degrees as u16)
        }
    };

    Some(Wind { direction, speed_knots, gust_knots })
}

/// `280V350`
fn is_variable_wind_range(token: &str) -> bool {
    token.len() == 7
        && token.is_ascii()
        && token.as_bytes()[3] == b'V'
        && digits(&token[..3], 3, 3).is_some()
        && digits(&token[4..], 3, 3).is_some()
}

fn parse_visibility(token: &str) -> Option<Visibility> {
    if let Some(body) = token.strip_suffix("SM") {
        let (qualifier, body) = if let Some(b) = body.strip_prefix('P') {
            (VisibilityQualifier::AtLeast, b)
        } else if let Some(b) = body.strip_prefix('M') {
            (VisibilityQualifier::LessThan, b)
        } else {
            (VisibilityQualifier::Exact, body)
        };
        return Some(Visibility { miles: parse_miles(body)?, qualifier });
    }

    let meters = digits(token.strip_suffix("NDV").unwrap_or(token), 4, 4)?;
    if meters == 9999 {
        return Some(Visibility { miles: 10.0, qualifier: VisibilityQualifier::AtLeast });
    }

    Some(Visibility {
        miles: units::meters_to_miles(f64::from(meters)),
        qualifier: VisibilityQualifier::Exact,
    })
}

/// Whole miles followed by a fractional `SM` group, e.g. `1` `1/2SM`.
fn parse_split_visibility(whole: &str, fraction: &str) -> Option<Visibility> {
    let whole = digits(whole, 1, 2)?;
    let body = fraction.strip_suffix("SM")?;
    if !body.contains('/') {
        return None;
    }

    Some(Visibility {
        miles: f64::from(whole) + parse_miles(body)?,
        qualifier: VisibilityQualifier::Exact,
    })
}

fn parse_miles(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num = digits(num, 1, 2)?;
            let den = digits(den, 1, 2)?;
            (den != 0).then(|| f64::from(num) / f64::from(den))
        }
        None => digits(s, 1, 2).map(f64::from),
    }
}

enum SkyGroup {
    Layer(SkyLayer),
    /// Sky-shaped (`XXX###`) but with an unknown coverage code.
    Unrecognized,
    NotSky,
}

fn parse_sky(token: &str) -> SkyGroup {
    if matches!(token, "SKC" | "CLR" | "NSC" | "NCD") {
        return SkyGroup::Layer(SkyLayer {
            coverage: SkyCoverage::Clear,
            altitude_feet: None,
            convective: None,
        });
    }

    if let Some(height) = token.strip_prefix("VV").and_then(parse_cloud_height) {
        return SkyGroup::Layer(SkyLayer {
            coverage: SkyCoverage::VerticalVisibility,
            altitude_feet: height,
            convective: None,
        });
    }

    if token.len() < 6 || !token.is_ascii() {
        return SkyGroup::NotSky;
    }
    let (code, rest) = token.split_at(3);
    let (height, suffix) = rest.split_at(3);

    let Some(altitude_feet) = parse_cloud_height(height) else {
        return SkyGroup::NotSky;
    };
    if !code.bytes().all(|b| b.is_ascii_uppercase()) {
        return SkyGroup::NotSky;
    }
    let convective = match suffix {
        "" => None,
        "CB" => Some(ConvectiveCloud::Cumulonimbus),
        "TCU" => Some(ConvectiveCloud::ToweringCumulus),
        // Automated stations that cannot detect cloud type.
        "///" => None,
        _ => return SkyGroup::NotSky,
    };

    match SkyCoverage::from_code(code) {
        Some(coverage) if coverage != SkyCoverage::VerticalVisibility => {
            SkyGroup::Layer(SkyLayer { coverage, altitude_feet, convective })
        }
        _ => SkyGroup::Unrecognized,
    }
}

/// Hundreds of feet; `///` is a layer whose height was not measured.
fn parse_cloud_height(s: &str) -> Option<Option<u32>> {
    if s == "///" {
        return Some(None);
    }
    digits(s, 3, 3).map(|h| Some(h * 100))
}

/// `M04/M17`, or `15/` when the dew point is missing.
fn parse_temperature(token: &str) -> Option<(i32, Option<i32>)> {
    let (temp, dew) = token.split_once('/')?;
    let temp = parse_celsius(temp)?;
    let dew = if dew.is_empty() { None } else { Some(parse_celsius(dew)?) };

    Some((temp, dew))
}

fn parse_celsius(s: &str) -> Option<i32> {
    match s.strip_prefix('M') {
        Some(abs) => digits(abs, 2, 2).map(|v| -(v as i32)),
        None => digits(s, 2, 2).map(|v| v as i32),
    }
}

fn parse_pressure(token: &str) -> Option<Pressure> {
    if let Some(hundredths) = token.strip_prefix('A').and_then(|v| digits(v, 4, 4)) {
        return Some(Pressure::InchesOfMercury(f64::from(hundredths) / 100.0));
    }

    token
        .strip_prefix('Q')
        .and_then(|v| digits(v, 4, 4))
        .map(|mb| Pressure::Millibar(f64::from(mb)))
}

fn parse_weather(token: &str) -> Option<WeatherPhenomenon> {
    let (intensity, rest) = if let Some(r) = token.strip_prefix('-') {
        (Intensity::Light, r)
    } else if let Some(r) = token.strip_prefix('+') {
        (Intensity::Heavy, r)
    } else {
        (Intensity::Moderate, token)
    };
    let (vicinity, rest) = match rest.strip_prefix("VC") {
        Some(r) => (true, r),
        None => (false, rest),
    };

    if rest.is_empty() || rest.len() % 2 != 0 || rest.len() > 8 || !rest.is_ascii() {
        return None;
    }

    let mut pairs = (0..rest.len()).step_by(2).map(|i| &rest[i..i + 2]).peekable();

    let descriptor = pairs.peek().and_then(|code| Descriptor::from_code(code));
    if descriptor.is_some() {
        pairs.next();
    }

    let codes = pairs
        .map(PhenomenonCode::from_code)
        .collect::<Option<Vec<_>>>()?;

    let standalone = matches!(descriptor, Some(Descriptor::Thunderstorm | Descriptor::Showers));
    if codes.is_empty() && !standalone {
        return None;
    }

    Some(WeatherPhenomenon { intensity, vicinity, descriptor, codes })
}

use chrono::{DateTime, Utc};

use crate::{StationCode, units};

/// Unparsed METAR text as returned by an upstream source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport {
    /// Station the report was requested for.
    pub station: StationCode,
    pub raw_text: String,
}

impl RawReport {
    pub fn new(station: StationCode, raw_text: impl Into<String>) -> Self {
        Self { station, raw_text: raw_text.into() }
    }
}

/// Structured result of decoding one METAR report.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedReport {
    pub station: String,
    pub observed_at: DateTime<Utc>,
    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    /// Layers in source order (lowest first).
    pub sky_layers: Vec<SkyLayer>,
    pub temperature_c: Option<i32>,
    pub dew_point_c: Option<i32>,
    pub pressure: Option<Pressure>,
    pub phenomena: Vec<WeatherPhenomenon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindDirection {
    /// True-north degrees the wind blows from, 0..=360.
    Degrees(u16),
    Variable,
    Calm,
}

/// Speeds are kept unrounded; `MPS` groups convert to fractional knots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    pub direction: WindDirection,
    pub speed_knots: f64,
    /// Always >= `speed_knots` when present.
    pub gust_knots: Option<f64>,
}

impl Wind {
    pub fn is_calm(&self) -> bool {
        matches!(self.direction, WindDirection::Calm) || self.speed_knots <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityQualifier {
    Exact,
    /// Open-ended maximum, e.g. `P6SM` or `9999`.
    AtLeast,
    LessThan,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    pub miles: f64,
    pub qualifier: VisibilityQualifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyCoverage {
    Clear,
    Few,
    Scattered,
    Broken,
    Overcast,
    /// Sky obscured; altitude is the vertical visibility.
    VerticalVisibility,
}

impl SkyCoverage {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SKC" | "CLR" | "NSC" | "NCD" => Some(SkyCoverage::Clear),
            "FEW" => Some(SkyCoverage::Few),
            "SCT" => Some(SkyCoverage::Scattered),
            "BKN" => Some(SkyCoverage::Broken),
            "OVC" => Some(SkyCoverage::Overcast),
            "VV" => Some(SkyCoverage::VerticalVisibility),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvectiveCloud {
    Cumulonimbus,
    ToweringCumulus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyLayer {
    pub coverage: SkyCoverage,
    /// Absent for clear-sky layers.
    pub altitude_feet: Option<u32>,
    pub convective: Option<ConvectiveCloud>,
}

/// Station pressure in whichever unit the station reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pressure {
    InchesOfMercury(f64),
    Millibar(f64),
}

impl Pressure {
    pub fn inhg(&self) -> f64 {
        match *self {
            Pressure::InchesOfMercury(v) => v,
            Pressure::Millibar(mb) => units::millibar_to_inhg(mb),
        }
    }

    pub fn millibar(&self) -> f64 {
        match *self {
            Pressure::InchesOfMercury(v) => units::inhg_to_millibar(v),
            Pressure::Millibar(mb) => mb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Light,
    Moderate,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    Shallow,
    Patches,
    Partial,
    LowDrifting,
    Blowing,
    Showers,
    Thunderstorm,
    Freezing,
}

impl Descriptor {
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "MI" => Descriptor::Shallow,
            "BC" => Descriptor::Patches,
            "PR" => Descriptor::Partial,
            "DR" => Descriptor::LowDrifting,
            "BL" => Descriptor::Blowing,
            "SH" => Descriptor::Showers,
            "TS" => Descriptor::Thunderstorm,
            "FZ" => Descriptor::Freezing,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhenomenonCode {
    Drizzle,
    Rain,
    Snow,
    SnowGrains,
    IceCrystals,
    IcePellets,
    Hail,
    SmallHail,
    UnknownPrecipitation,
    Mist,
    Fog,
    Smoke,
    VolcanicAsh,
    Dust,
    Sand,
    Haze,
    Spray,
    DustWhirls,
    Squalls,
    FunnelCloud,
    Sandstorm,
    Duststorm,
}

impl PhenomenonCode {
    pub fn from_code(code: &str) -> Option<Self> {
        use PhenomenonCode::*;

        Some(match code {
            "DZ" => Drizzle,
            "RA" => Rain,
            "SN" => Snow,
            "SG" => SnowGrains,
            "IC" => IceCrystals,
            "PL" => IcePellets,
            "GR" => Hail,
            "GS" => SmallHail,
            "UP" => UnknownPrecipitation,
            "BR" => Mist,
            "FG" => Fog,
            "FU" => Smoke,
            "VA" => VolcanicAsh,
            "DU" => Dust,
            "SA" => Sand,
            "HZ" => Haze,
            "PY" => Spray,
            "PO" => DustWhirls,
            "SQ" => Squalls,
            "FC" => FunnelCloud,
            "SS" => Sandstorm,
            "DS" => Duststorm,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        use PhenomenonCode::*;

        match self {
            Drizzle => "drizzle",
            Rain => "rain",
            Snow => "snow",
            SnowGrains => "snow grains",
            IceCrystals => "ice crystals",
            IcePellets => "ice pellets",
            Hail => "hail",
            SmallHail => "small hail",
            UnknownPrecipitation => "unknown precipitation",
            Mist => "mist",
            Fog => "fog",
            Smoke => "smoke",
            VolcanicAsh => "volcanic ash",
            Dust => "dust",
            Sand => "sand",
            Haze => "haze",
            Spray => "spray",
            DustWhirls => "dust whirls",
            Squalls => "squalls",
            FunnelCloud => "funnel cloud",
            Sandstorm => "sandstorm",
            Duststorm => "duststorm",
        }
    }
}

/// One present-weather group, e.g. `-RA` or `+TSRA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherPhenomenon {
    pub intensity: Intensity,
    /// Observed near, not at, the station (`VC` prefix).
    pub vicinity: bool,
    pub descriptor: Option<Descriptor>,
    pub codes: Vec<PhenomenonCode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_converts_both_ways() {
        let a = Pressure::InchesOfMercury(30.34);
        assert_eq!(a.inhg(), 30.34);
        assert_eq!(units::display_round(a.millibar()), 1027);

        let q = Pressure::Millibar(1015.0);
        assert_eq!(q.millibar(), 1015.0);
        assert!((q.inhg() - 29.97).abs() < 0.01);
    }

    #[test]
    fn zero_speed_counts_as_calm() {
        let wind = Wind { direction: WindDirection::Variable, speed_knots: 0.0, gust_knots: None };
        assert!(wind.is_calm());
    }

    #[test]
    fn clear_sky_codes_share_one_coverage() {
        for code in ["SKC", "CLR", "NSC"] {
            assert_eq!(SkyCoverage::from_code(code), Some(SkyCoverage::Clear));
        }
        assert_eq!(SkyCoverage::from_code("XYZ"), None);
    }
}

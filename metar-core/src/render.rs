//! Plain-English rendering of a [`DecodedReport`].

use crate::{
    model::{
        ConvectiveCloud, DecodedReport, Descriptor, Intensity, Pressure, SkyCoverage, SkyLayer,
        Visibility, VisibilityQualifier, WeatherPhenomenon, Wind, WindDirection,
    },
    units::{celsius_to_fahrenheit, display_round, knots_to_mph},
};

/// One-sentence summary plus itemised detail lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSummary {
    pub summary: String,
    pub details: Vec<String>,
}

pub fn render(report: &DecodedReport) -> RenderedSummary {
    RenderedSummary { summary: summary(report), details: details(report) }
}

/// e.g. "Few clouds, 25°F, winds 9 mph from the northwest."
pub fn summary(report: &DecodedReport) -> String {
    let mut parts = vec![sky_phrase(&report.sky_layers).to_string()];

    if let Some(celsius) = report.temperature_c {
        parts.push(format!("{}°F", fahrenheit(celsius)));
    }

    if let Some(wind) = &report.wind {
        parts.push(wind_phrase(wind));
    }

    if !report.phenomena.is_empty() {
        parts.push(weather_list(&report.phenomena));
    }

    format!("{}.", parts.join(", "))
}

/// Detail lines in fixed order: sky, temperature, dew point, wind,
/// visibility, pressure, weather. Absent fields produce no line.
pub fn details(report: &DecodedReport) -> Vec<String> {
    let mut lines: Vec<String> = report.sky_layers.iter().map(sky_line).collect();

    if let Some(celsius) = report.temperature_c {
        lines.push(format!("Temperature: {}°F ({celsius}°C)", fahrenheit(celsius)));
    }

    if let Some(celsius) = report.dew_point_c {
        lines.push(format!("Dew point: {}°F ({celsius}°C)", fahrenheit(celsius)));
    }

    if let Some(wind) = &report.wind {
        lines.push(wind_line(wind));
    }

    if let Some(visibility) = &report.visibility {
        lines.push(visibility_line(visibility));
    }

    if let Some(pressure) = &report.pressure {
        lines.push(pressure_line(pressure));
    }

    if !report.phenomena.is_empty() {
        lines.push(format!("Weather: {}", weather_list(&report.phenomena)));
    }

    lines
}

/// 8-point compass name for a wind direction in degrees.
pub fn compass_octant(degrees: u16) -> &'static str {
    const OCTANTS: [&str; 8] = [
        "north",
        "northeast",
        "east",
        "southeast",
        "south",
        "southwest",
        "west",
        "northwest",
    ];

    // 45° buckets centred on each point: (deg + 22.5) / 45, in integers.
    let index = (u32::from(degrees) * 2 + 45) / 90 % 8;
    OCTANTS[index as usize]
}

fn fahrenheit(celsius: i32) -> i64 {
    display_round(celsius_to_fahrenheit(f64::from(celsius)))
}

fn mph(knots: f64) -> i64 {
    display_round(knots_to_mph(knots))
}

fn sky_phrase(layers: &[SkyLayer]) -> &'static str {
    let lowest = layers
        .iter()
        .filter(|l| l.coverage != SkyCoverage::Clear)
        .min_by_key(|l| l.altitude_feet.unwrap_or(u32::MAX));

    match lowest.map(|l| l.coverage) {
        None | Some(SkyCoverage::Clear) => "Clear skies",
        Some(SkyCoverage::Few) => "Few clouds",
        Some(SkyCoverage::Scattered) => "Partly cloudy",
        Some(SkyCoverage::Broken) => "Mostly cloudy",
        Some(SkyCoverage::Overcast) => "Overcast",
        Some(SkyCoverage::VerticalVisibility) => "Obscured sky",
    }
}

fn sky_line(layer: &SkyLayer) -> String {
    let name = match layer.coverage {
        SkyCoverage::Clear => return "Sky: Clear".to_string(),
        SkyCoverage::Few => "Few clouds",
        SkyCoverage::Scattered => "Scattered clouds",
        SkyCoverage::Broken => "Broken clouds",
        SkyCoverage::Overcast => "Overcast",
        SkyCoverage::VerticalVisibility => "Obscured, vertical visibility",
    };

    let mut line = match layer.altitude_feet {
        Some(feet) => format!("Sky: {name} at {feet} feet"),
        None => format!("Sky: {name}"),
    };
    match layer.convective {
        Some(ConvectiveCloud::Cumulonimbus) => line.push_str(" (cumulonimbus)"),
        Some(ConvectiveCloud::ToweringCumulus) => line.push_str(" (towering cumulus)"),
        None => {}
    }
    line
}

fn wind_phrase(wind: &Wind) -> String {
    if wind.is_calm() {
        return "calm winds".to_string();
    }

    let mut phrase = format!("winds {} mph {}", mph(wind.speed_knots), from_direction(wind));
    if let Some(gust) = wind.gust_knots {
        phrase.push_str(&format!(", gusting to {} mph", mph(gust)));
    }
    phrase
}

fn wind_line(wind: &Wind) -> String {
    if wind.is_calm() {
        return "Wind: Calm".to_string();
    }

    let mut line = format!(
        "Wind: {} mph ({} knots) {}",
        mph(wind.speed_knots),
        display_round(wind.speed_knots),
        from_direction(wind)
    );
    if let Some(gust) = wind.gust_knots {
        let knots = display_round(gust);
        line.push_str(&format!(", gusting to {} mph ({knots} knots)", mph(gust)));
    }
    line
}

fn from_direction(wind: &Wind) -> String {
    match wind.direction {
        WindDirection::Degrees(deg) => format!("from the {}", compass_octant(deg)),
        WindDirection::Variable | WindDirection::Calm => "from variable directions".to_string(),
    }
}

fn visibility_line(vis: &Visibility) -> String {
    match vis.qualifier {
        _ if vis.miles >= 10.0 && vis.qualifier != VisibilityQualifier::LessThan => {
            format!("Visibility: {:.0}+ miles (excellent)", vis.miles)
        }
        VisibilityQualifier::AtLeast => format!("Visibility: {}+ miles", miles(vis.miles)),
        VisibilityQualifier::LessThan => {
            format!("Visibility: less than {} miles", miles(vis.miles))
        }
        VisibilityQualifier::Exact => format!("Visibility: {} miles", miles(vis.miles)),
    }
}

/// One decimal, or two for quarter-mile fractions.
fn miles(value: f64) -> String {
    if (value * 10.0).fract().abs() < 1e-9 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

fn pressure_line(pressure: &Pressure) -> String {
    match pressure {
        Pressure::InchesOfMercury(inhg) => format!(
            "Pressure: {inhg:.2} inHg ({} mb)",
            display_round(pressure.millibar())
        ),
        Pressure::Millibar(mb) => {
            format!("Pressure: {} mb ({:.2} inHg)", display_round(*mb), pressure.inhg())
        }
    }
}

fn weather_list(phenomena: &[WeatherPhenomenon]) -> String {
    phenomena
        .iter()
        .map(describe_weather)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_weather(wx: &WeatherPhenomenon) -> String {
    let codes = wx
        .codes
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(" and ");

    let base = match wx.descriptor {
        None => codes,
        Some(Descriptor::Thunderstorm) if codes.is_empty() => "thunderstorm".to_string(),
        Some(Descriptor::Thunderstorm) => format!("thunderstorm with {codes}"),
        Some(Descriptor::Showers) if codes.is_empty() => "showers".to_string(),
        Some(Descriptor::Showers) => format!("{codes} showers"),
        Some(Descriptor::Patches) => format!("patches of {codes}"),
        Some(Descriptor::Shallow) => format!("shallow {codes}"),
        Some(Descriptor::Partial) => format!("partial {codes}"),
        Some(Descriptor::LowDrifting) => format!("low drifting {codes}"),
        Some(Descriptor::Blowing) => format!("blowing {codes}"),
        Some(Descriptor::Freezing) => format!("freezing {codes}"),
    };

    let described = match wx.intensity {
        Intensity::Light => format!("light {base}"),
        Intensity::Moderate => base,
        Intensity::Heavy => format!("heavy {base}"),
    };

    if wx.vicinity {
        format!("{described} in the vicinity")
    } else {
        described
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::parse_at;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn rendered(raw: &str) -> RenderedSummary {
        let reference = Utc.with_ymd_and_hms(2026, 2, 4, 19, 0, 0).unwrap();
        render(&parse_at(raw, reference).expect("report should decode"))
    }

    #[rstest]
    #[case(0, "north")]
    #[case(22, "north")]
    #[case(23, "northeast")]
    #[case(90, "east")]
    #[case(240, "southwest")]
    #[case(310, "northwest")]
    #[case(337, "northwest")]
    #[case(338, "north")]
    #[case(360, "north")]
    fn octants(#[case] degrees: u16, #[case] expected: &str) {
        assert_eq!(compass_octant(degrees), expected);
    }

    #[test]
    fn us_report_summary_and_details() {
        let out = rendered("KJFK 041851Z 31008KT 10SM FEW250 M04/M17 A3034");

        assert_eq!(out.summary, "Few clouds, 25°F, winds 9 mph from the northwest.");
        assert_eq!(
            out.details,
            vec![
                "Sky: Few clouds at 25000 feet",
                "Temperature: 25°F (-4°C)",
                "Dew point: 1°F (-17°C)",
                "Wind: 9 mph (8 knots) from the northwest",
                "Visibility: 10+ miles (excellent)",
                "Pressure: 30.34 inHg (1027 mb)",
            ]
        );
    }

    #[test]
    fn international_report_uses_lowest_layer_and_millibar() {
        let out = rendered("EGLL 041850Z 24015KT 9999 -RA SCT012 BKN025 09/07 Q1015");

        assert_eq!(
            out.summary,
            "Partly cloudy, 48°F, winds 17 mph from the southwest, light rain."
        );
        assert!(out.details.contains(&"Pressure: 1015 mb (29.97 inHg)".to_string()));
        assert_eq!(out.details.last().map(String::as_str), Some("Weather: light rain"));
        assert_eq!(out.details[0], "Sky: Scattered clouds at 1200 feet");
        assert_eq!(out.details[1], "Sky: Broken clouds at 2500 feet");
    }

    #[test]
    fn gusts_show_in_both_units() {
        let out = rendered("VOMM 041830Z 31025G35KT 8000 FEW020 SCT100 32/24 Q1010");

        assert!(out.summary.contains("winds 29 mph from the northwest, gusting to 40 mph"));
        assert!(out.details.contains(
            &"Wind: 29 mph (25 knots) from the northwest, gusting to 40 mph (35 knots)".to_string()
        ));
        assert!(out.details.contains(&"Visibility: 5.0 miles".to_string()));
    }

    #[test]
    fn calm_winds() {
        let out = rendered("KJFK 041851Z 00000KT 10SM CLR 20/10 A3000");
        assert_eq!(out.summary, "Clear skies, 68°F, calm winds.");
        assert!(out.details.contains(&"Wind: Calm".to_string()));
        assert_eq!(out.details[0], "Sky: Clear");
    }

    #[test]
    fn absent_fields_leave_no_placeholders() {
        let out = rendered("KJFK 041851Z");
        assert_eq!(out.summary, "Clear skies.");
        assert!(out.details.is_empty());

        let out = rendered("KJFK 041851Z 27010KT");
        assert_eq!(out.summary, "Clear skies, winds 12 mph from the west.");
    }

    #[test]
    fn clear_layer_does_not_hide_clouds_above() {
        let out = rendered("KJFK 041851Z CLR OVC080");
        assert!(out.summary.starts_with("Overcast"));
    }

    #[test]
    fn automated_layer_without_cloud_type_sets_sky_phrase() {
        let out = rendered("EHAM 041825Z AUTO 23012KT 9999 BKN025/// OVC040 07/03 Q1012");
        assert_eq!(out.summary, "Mostly cloudy, 45°F, winds 14 mph from the southwest.");
        assert!(out.details.contains(&"Sky: Broken clouds at 2500 feet".to_string()));
        assert!(out.details.contains(&"Sky: Overcast at 4000 feet".to_string()));

        let out = rendered("EHAM 041825Z BKN/// SCT030");
        assert!(out.summary.starts_with("Partly cloudy"));
        assert!(out.details.contains(&"Sky: Broken clouds".to_string()));
    }

    #[test]
    fn meters_per_second_wind_rounds_only_for_display() {
        let out = rendered("UUEE 041830Z 18005G08MPS");
        assert_eq!(
            out.details,
            vec!["Wind: 11 mph (10 knots) from the south, gusting to 18 mph (16 knots)"]
        );
    }

    #[test]
    fn variable_wind_and_weather_descriptions() {
        let out = rendered("KJFK 041851Z VRB05KT 1 1/2SM +TSRA BR VCSH FZFG OVC004CB M01/M02");
        assert_eq!(
            out.summary,
            "Overcast, 30°F, winds 6 mph from variable directions, heavy thunderstorm with rain, \
             mist, showers in the vicinity, freezing fog."
        );
        assert!(out.details.contains(&"Visibility: 1.5 miles".to_string()));
        assert!(out.details.contains(&"Sky: Overcast at 400 feet (cumulonimbus)".to_string()));
    }

    #[test]
    fn qualified_visibility() {
        let out = rendered("KJFK 041851Z P6SM");
        assert_eq!(out.details, vec!["Visibility: 6.0+ miles"]);

        let out = rendered("KJFK 041851Z M1/4SM");
        assert_eq!(out.details, vec!["Visibility: less than 0.25 miles"]);
    }
}

//! Server-rendered HTML for the weather page.

use metar_core::WeatherReport;

const EXAMPLE_CODES: [(&str, &str); 4] = [
    ("KJFK", "New York JFK"),
    ("KLAX", "Los Angeles"),
    ("VOMM", "Chennai"),
    ("EGLL", "London Heathrow"),
];

pub fn index() -> String {
    let examples: String = EXAMPLE_CODES
        .iter()
        .map(|(code, name)| format!("<li><code>{code}</code> {name}</li>"))
        .collect();

    layout(
        "METAR Reader",
        &format!(
            r#"<h1>METAR Reader</h1>
<p>Get the current airport weather in plain English.</p>
<form action="/get-weather" method="post">
  <label for="airport_code">Airport Code</label>
  <input id="airport_code" name="airport_code" maxlength="4" placeholder="KJFK" required>
  <button type="submit">Get Weather Report</button>
</form>
<h2>Examples</h2>
<ul>{examples}</ul>"#
        ),
    )
}

pub fn report(report: &WeatherReport) -> String {
    let details: String = report
        .decoded
        .details
        .iter()
        .map(|d| format!("<li>{}</li>", escape(d)))
        .collect();

    layout(
        &format!("Weather Report for {}", report.airport_code),
        &format!(
            r#"<h1>Weather Report: {station}</h1>
<p class="time">Observed {time}</p>
<p class="summary">{summary}</p>
<h2>Details</h2>
<ul>{details}</ul>
<h2>Raw METAR</h2>
<pre>{raw}</pre>
<p><a href="/">Check another airport</a></p>"#,
            station = escape(report.airport_code.as_str()),
            time = escape(&report.decoded.time),
            summary = escape(&report.decoded.summary),
            raw = escape(&report.raw_metar),
        ),
    )
}

pub fn error(message: &str) -> String {
    layout(
        "METAR Reader: Error",
        &format!(
            r#"<h1>Weather Report</h1>
<p class="error">{}</p>
<p><a href="/">Try again</a></p>"#,
            escape(message)
        ),
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
</head>
<body>
{body}
</body>
</html>
"#,
        escape(title)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

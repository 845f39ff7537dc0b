//! Plotly figure construction
//!
//! Figures are plain Plotly JSON (`data`, `layout`, `frames`) built with
//! serde_json and rendered into a standalone HTML page that loads plotly.js
//! from the CDN.

use crate::clean::EmissionRecord;
use crate::views::CountryTotal;
use anyhow::Result;
use serde_json::{json, Value};
use std::collections::BTreeMap;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const ANNUAL_LABEL: &str = "Annual CO2 Emissions (in million tonnes)";
const CUMULATIVE_LABEL: &str = "Cumulative CO2 Emissions (in million tonnes)";

/// Plasma sequential colour scale (matplotlib), evenly spaced stops
const PLASMA: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];

/// A complete Plotly figure
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub data: Vec<Value>,
    pub layout: Value,
    pub frames: Vec<Value>,
}

impl Figure {
    /// Figure as the object `Plotly.newPlot` accepts
    pub fn to_json(&self) -> Value {
        let mut fig = json!({
            "data": self.data,
            "layout": self.layout,
            "config": { "responsive": true },
        });
        if !self.frames.is_empty() {
            fig["frames"] = Value::Array(self.frames.clone());
        }
        fig
    }

    /// Standalone HTML page
    pub fn to_html(&self) -> Result<String> {
        let figure_json = serde_json::to_string(&self.to_json())?;
        // "</script>" inside a string literal would end the script element
        let figure_json = figure_json.replace("</", "<\\/");

        Ok(format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{cdn}" charset="utf-8"></script>
    <style>
        html, body {{ margin: 0; height: 100%; font-family: sans-serif; }}
        #chart {{ width: 100%; height: 100vh; }}
    </style>
</head>
<body>
    <div id="chart"></div>
    <script>
        const figure = {figure};
        Plotly.newPlot('chart', figure);
    </script>
</body>
</html>
"##,
            title = html_escape(&self.title),
            cdn = PLOTLY_CDN,
            figure = figure_json,
        ))
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Order of first appearance, the way Plotly Express assigns colours
fn group_by_country<'a>(rows: &[&'a EmissionRecord]) -> Vec<(&'a str, Vec<&'a EmissionRecord>)> {
    let mut groups: Vec<(&str, Vec<&EmissionRecord>)> = Vec::new();
    for &row in rows {
        match groups.iter().position(|(c, _)| *c == row.country) {
            Some(i) => groups[i].1.push(row),
            None => groups.push((row.country.as_str(), vec![row])),
        }
    }
    groups
}

/// Annual emissions over time, one line per country
pub fn line_chart(rows: &[&EmissionRecord]) -> Figure {
    let title = "Annual CO2 Emissions by Country".to_string();

    let data = group_by_country(rows)
        .into_iter()
        .map(|(country, members)| {
            let x: Vec<i32> = members.iter().map(|r| r.year).collect();
            let y: Vec<f64> = members.iter().map(|r| r.co2).collect();
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": country,
                "legendgroup": country,
                "x": x,
                "y": y,
                "hovertemplate": format!(
                    "country={}<br>Year=%{{x}}<br>{}=%{{y}}<extra></extra>",
                    country, ANNUAL_LABEL
                ),
            })
        })
        .collect();

    let layout = json!({
        "title": { "text": title },
        "xaxis": { "title": { "text": "Year" } },
        "yaxis": { "title": { "text": ANNUAL_LABEL } },
        "legend": { "title": { "text": "country" } },
    });

    Figure { title, data, layout, frames: Vec::new() }
}

/// Cumulative emissions of the top emitters
pub fn bar_chart(totals: &[CountryTotal], top_n: usize) -> Figure {
    let title = format!("Top {} Countries by Cumulative CO2 Emissions", top_n);

    let x: Vec<&str> = totals.iter().map(|t| t.country.as_str()).collect();
    let y: Vec<f64> = totals.iter().map(|t| t.co2).collect();

    let data = vec![json!({
        "type": "bar",
        "x": x,
        "y": y,
        "hovertemplate": format!("Country=%{{x}}<br>{}=%{{y}}<extra></extra>", CUMULATIVE_LABEL),
    })];

    let layout = json!({
        "title": { "text": title },
        "xaxis": { "title": { "text": "Country" }, "categoryorder": "trace" },
        "yaxis": { "title": { "text": CUMULATIVE_LABEL } },
    });

    Figure { title, data, layout, frames: Vec::new() }
}

fn choropleth_trace(rows: &[&EmissionRecord]) -> Value {
    let locations: Vec<&str> = rows.iter().map(|r| r.iso_code.as_str()).collect();
    let z: Vec<f64> = rows.iter().map(|r| r.co2).collect();
    let names: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
    json!({
        "type": "choropleth",
        "locationmode": "ISO-3",
        "locations": locations,
        "z": z,
        "hovertext": names,
        "coloraxis": "coloraxis",
        "hovertemplate": format!(
            "<b>%{{hovertext}}</b><br>iso_code=%{{location}}<br>{}=%{{z}}<extra></extra>",
            ANNUAL_LABEL
        ),
    })
}

fn animation_step(args: Value) -> Value {
    json!([args, {
        "frame": { "duration": 0, "redraw": true },
        "mode": "immediate",
        "fromcurrent": true,
        "transition": { "duration": 0, "easing": "linear" },
    }])
}

/// Animated world map, one frame per year
pub fn choropleth_map(rows: &[&EmissionRecord]) -> Figure {
    let title = "Global CO2 Emissions by Country Over Time".to_string();

    let mut by_year: BTreeMap<i32, Vec<&EmissionRecord>> = BTreeMap::new();
    for &row in rows {
        by_year.entry(row.year).or_default().push(row);
    }

    let frames: Vec<Value> = by_year
        .iter()
        .map(|(year, members)| {
            json!({
                "name": year.to_string(),
                "data": [choropleth_trace(members)],
            })
        })
        .collect();

    let data = match by_year.values().next() {
        Some(first) => vec![choropleth_trace(first)],
        None => vec![choropleth_trace(&[])],
    };

    // Fixed colour range across frames so colours are comparable year to year
    let (cmin, cmax) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(r.co2), hi.max(r.co2))
    });

    let colorscale: Vec<Value> = PLASMA
        .iter()
        .enumerate()
        .map(|(i, color)| json!([i as f64 / (PLASMA.len() - 1) as f64, color]))
        .collect();

    let mut coloraxis = json!({
        "colorscale": colorscale,
        "colorbar": { "title": { "text": ANNUAL_LABEL } },
    });
    if cmin.is_finite() && cmax.is_finite() {
        coloraxis["cmin"] = json!(cmin);
        coloraxis["cmax"] = json!(cmax);
    }

    let mut layout = json!({
        "title": { "text": title },
        "coloraxis": coloraxis,
        "geo": { "showframe": false, "projection": { "type": "natural earth" } },
        "margin": { "t": 60 },
    });

    if !frames.is_empty() {
        let steps: Vec<Value> = by_year
            .keys()
            .map(|year| {
                json!({
                    "label": year.to_string(),
                    "method": "animate",
                    "args": animation_step(json!([year.to_string()])),
                })
            })
            .collect();

        layout["sliders"] = json!([{
            "active": 0,
            "currentvalue": { "prefix": "year=" },
            "len": 0.9,
            "x": 0.1,
            "pad": { "b": 10, "t": 60 },
            "steps": steps,
        }]);

        layout["updatemenus"] = json!([{
            "type": "buttons",
            "direction": "left",
            "showactive": false,
            "x": 0.1,
            "xanchor": "right",
            "y": 0,
            "yanchor": "top",
            "pad": { "r": 10, "t": 70 },
            "buttons": [
                {
                    "label": "&#9654;",
                    "method": "animate",
                    "args": [null, {
                        "frame": { "duration": 500, "redraw": true },
                        "mode": "immediate",
                        "fromcurrent": true,
                        "transition": { "duration": 500, "easing": "linear" },
                    }],
                },
                {
                    "label": "&#9724;",
                    "method": "animate",
                    "args": animation_step(json!([null])),
                },
            ],
        }]);
    }

    Figure { title, data, layout, frames }
}

//! Renders parameter trend charts from the daily averages.

use anyhow::Result;
use aquarium_core::dashboard::DailyAverage;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

type Series = (&'static str, RGBColor, fn(&DailyAverage) -> f64);

/// Draws a three-panel chart: nitrogen compounds, temperature and pH per day.
pub fn plot_parameter_trends(path: &Path, tank_name: &str, days: &[DailyAverage]) -> Result<()> {
    if days.is_empty() {
        println!("[Plotting] Warning: No readings to plot for '{}'.", tank_name);
        return Ok(());
    }

    let root = BitMapBackend::new(path, (1024, 1100)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&format!("{} - Water Parameters", tank_name), ("sans-serif", 40))?;
    let panels = root.split_evenly((3, 1));

    let nitrogen: [Series; 3] = [
        ("Ammonia", RED, |d| d.ammonia),
        ("Nitrite", MAGENTA, |d| d.nitrite),
        ("Nitrate", BLUE, |d| d.nitrate),
    ];
    let temperature: [Series; 1] = [("Temperature (°C)", RED, |d| d.temp_c)];
    let ph: [Series; 1] = [("pH", GREEN, |d| d.ph)];

    draw_panel(&panels[0], "Nitrogen Compounds", "ppm", days, &nitrogen, true)?;
    draw_panel(&panels[1], "Temperature", "°C", days, &temperature, false)?;
    draw_panel(&panels[2], "pH", "pH", days, &ph, false)?;

    root.present()?;
    println!("[Plotting] Parameter chart saved to {:?}.", path);
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    caption: &str,
    y_desc: &str,
    days: &[DailyAverage],
    series: &[Series],
    from_zero: bool,
) -> Result<()> {
    let values = days
        .iter()
        .flat_map(|d| series.iter().map(move |(_, _, value)| value(d)));
    let (min, max) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((max - min) * 0.1).max(0.5);
    let y_min = if from_zero { 0.0 } else { min - pad };
    let y_max = max + pad;
    let x_max = days.len() as u64;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 28).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0u64..x_max, y_min..y_max)?;

    let date_label = |x: &u64| {
        days.get(*x as usize)
            .map(|d| d.date.format("%m-%d").to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_desc("Day")
        .y_desc(y_desc)
        .x_label_formatter(&date_label)
        .draw()?;

    for (name, color, value) in series {
        let color = *color;
        chart
            .draw_series(LineSeries::new(
                days.iter().enumerate().map(|(i, d)| (i as u64, value(d))),
                color.stroke_width(2),
            ))?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

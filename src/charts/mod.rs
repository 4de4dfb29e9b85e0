//! PNG charts of episode results, rendered with plotters.

use std::error::Error;
use std::path::Path;

use hashbrown::HashMap;
use plotters::prelude::{
    AreaSeries, BitMapBackend, Circle, EmptyElement, IntoDrawingArea, PointSeries,
};
use plotters::style::{Color, BLUE, GREEN, RED, WHITE, YELLOW};

const DIMENSIONS: (u32, u32) = (1024, 768);

/// Total net worth with the positioned share of it shaded separately.
pub fn assets_chart(
    path: &Path,
    total: &[f64],
    positioned: &[f64],
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, DIMENSIONS).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = total
        .iter()
        .chain(positioned.iter())
        .cloned()
        .fold(f64::MIN, f64::max)
        * 1.1;

    let mut chart = plotters::chart::ChartBuilder::on(&root)
        .caption("Assets: Total; Positioned; Cash", ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0..total.len() as u32, 0.0..y_max)?;

    chart.configure_mesh().light_line_style(WHITE).draw()?;

    chart.draw_series(
        AreaSeries::new(
            total.iter().enumerate().map(|(index, value)| (index as u32, *value)),
            0.0,
            BLUE.mix(0.2),
        )
        .border_style(BLUE),
    )?;

    chart.draw_series(
        AreaSeries::new(
            positioned.iter().enumerate().map(|(index, value)| (index as u32, *value)),
            0.0,
            RED.mix(0.2),
        )
        .border_style(RED),
    )?;

    let cash = total.iter().zip(positioned).map(|(a, b)| a - b);
    chart.draw_series(
        AreaSeries::new(
            cash.enumerate().map(|(index, value)| (index as u32, value)),
            0.0,
            GREEN.mix(0.2),
        )
        .border_style(GREEN),
    )?;

    root.present()?;
    Ok(())
}

/// Price series with buy/sell markers at their trigger steps.
pub fn buy_sell_chart(
    path: &Path,
    prices: &[f64],
    buys: &HashMap<usize, (f64, u32)>,
    sells: &HashMap<usize, (f64, u32)>,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, DIMENSIONS).into_drawing_area();
    root.fill(&WHITE)?;

    let y_min = prices.iter().cloned().fold(f64::MAX, f64::min) * 0.9;
    let y_max = prices.iter().cloned().fold(f64::MIN, f64::max) * 1.1;

    let mut chart = plotters::chart::ChartBuilder::on(&root)
        .caption("Buy Sell Chart", ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_cartesian_2d(0..prices.len() as u32, y_min..y_max)?;

    chart.configure_mesh().light_line_style(WHITE).draw()?;

    chart.draw_series(
        AreaSeries::new(
            prices.iter().enumerate().map(|(index, value)| (index as u32, *value)),
            0.0,
            BLUE.mix(0.2),
        )
        .border_style(BLUE),
    )?;

    chart.draw_series(PointSeries::of_element(
        sells.iter().map(|(index, (price, _))| (*index as u32, *price)),
        5,
        YELLOW.filled(),
        &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
    ))?;

    chart.draw_series(PointSeries::of_element(
        buys.iter().map(|(index, (price, _))| (*index as u32, *price)),
        5,
        GREEN.filled(),
        &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
    ))?;

    root.present()?;
    Ok(())
}

/// Per-step reward curve for a finished episode.
pub fn reward_chart(path: &Path, rewards: &[f64]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, DIMENSIONS).into_drawing_area();
    root.fill(&WHITE)?;

    let y_min = rewards.iter().cloned().fold(f64::MAX, f64::min).min(0.0);
    let y_max = rewards.iter().cloned().fold(f64::MIN, f64::max).max(0.0);

    let mut chart = plotters::chart::ChartBuilder::on(&root)
        .caption("Reward", ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0..rewards.len() as u32, y_min..y_max)?;

    chart.configure_mesh().light_line_style(WHITE).draw()?;

    chart.draw_series(
        AreaSeries::new(
            rewards.iter().enumerate().map(|(index, value)| (index as u32, *value)),
            0.0,
            BLUE.mix(0.2),
        )
        .border_style(BLUE),
    )?;

    root.present()?;
    Ok(())
}

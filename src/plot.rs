use std::error::Error;
use std::path::Path;

use itertools::{Itertools, MinMaxResult};
use plotters::prelude::*;

use crate::sweep::SweepResult;

const FIGURE_SIZE: (u32, u32) = (1000, 700);
const NUM_BINS: usize = 20;

fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = match values.minmax() {
        MinMaxResult::NoElements => (0.0, 1.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(min, max) => (min, max),
    };

    if min == max {
        (min - 0.5, max + 0.5)
    } else {
        let pad = 0.05 * (max - min);
        (min - pad, max + pad)
    }
}

fn column_means(rows: &[Vec<f64>]) -> Vec<f64> {
    let num_cols = rows.first().map_or(0, Vec::len);
    let mut means = vec![0.0; num_cols];

    for row in rows {
        for (mean, value) in means.iter_mut().zip(row) {
            *mean += value;
        }
    }

    for mean in means.iter_mut() {
        *mean /= rows.len() as f64;
    }

    means
}

fn draw_trace_panel(
    area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    caption: &str,
    y_desc: &str,
    t_ms: &[f64],
    average: &[f64],
    reference: &[f64],
    reference_label: &str,
) -> Result<(), Box<dyn Error>> {
    let (y_min, y_max) = axis_range(average.iter().chain(reference).copied());
    let t_max = t_ms.last().copied().unwrap_or(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..t_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (ms)")
        .y_desc(y_desc)
        .draw()?;

    if !average.is_empty() {
        chart
            .draw_series(LineSeries::new(
                t_ms.iter().copied().zip(average.iter().copied()),
                BLUE.stroke_width(2),
            ))?
            .label("average over samples")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    }

    chart
        .draw_series(LineSeries::new(
            t_ms.iter().copied().zip(reference.iter().copied()),
            RED.stroke_width(1),
        ))?
        .label(reference_label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(1)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Average EPSP and EPSC traces across all sampled weights, overlaid with the
/// trial at the mean nonzero weight.
pub fn plot_avg_eps(path: &Path, result: &SweepResult) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 1));

    let reference_label = format!("mean weight ({:.4} nS)", result.mean_weight_ns);

    draw_trace_panel(
        &areas[0],
        "Average EPSP",
        "EPSP (mV)",
        &result.t_ms,
        &column_means(&result.epsps_mv),
        &result.reference.vm_mv,
        &reference_label,
    )?;

    draw_trace_panel(
        &areas[1],
        "Average EPSC",
        "EPSC (pA)",
        &result.t_ms,
        &column_means(&result.epscs_pa),
        &result.reference.epsc_pa,
        &reference_label,
    )?;

    root.present()?;
    Ok(())
}

fn draw_histogram_panel(
    area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    caption: &str,
    x_desc: &str,
    values: &[f64],
    color: &RGBColor,
) -> Result<(), Box<dyn Error>> {
    let (min, max) = axis_range(values.iter().copied());
    let bin_width = (max - min) / NUM_BINS as f64;

    let mut counts = vec![0u32; NUM_BINS];
    for value in values {
        let bin = (((value - min) / bin_width) as usize).min(NUM_BINS - 1);
        counts[bin] += 1;
    }

    let max_count = counts.iter().copied().max().unwrap_or(1).max(1);

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(min..max, 0u32..max_count + 1)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Count")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(bin, count)| {
        let x0 = min + bin as f64 * bin_width;
        let x1 = x0 + bin_width;
        Rectangle::new([(x0, 0), (x1, *count)], color.mix(0.6).filled())
    }))?;

    Ok(())
}

/// Distributions of the per-trial peak EPSP and peak EPSC values.
pub fn plot_eps_dist(
    path: &Path,
    peak_epsps_mv: &[f64],
    peak_epscs_pa: &[f64],
) -> Result<(), Box<dyn Error>> {
    if peak_epsps_mv.is_empty() || peak_epscs_pa.is_empty() {
        return Err("no peak values to plot".into());
    }

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((1, 2));

    draw_histogram_panel(
        &areas[0],
        "Peak EPSP distribution",
        "Peak EPSP (mV)",
        peak_epsps_mv,
        &BLUE,
    )?;

    draw_histogram_panel(
        &areas[1],
        "Peak EPSC distribution",
        "Peak EPSC (pA)",
        peak_epscs_pa,
        &RED,
    )?;

    root.present()?;
    Ok(())
}

//! Drawing the read count / time plot
//!
//! [`ChartRenderer`](trait.ChartRenderer.html) is what the batch driver draws with;
//! [`PngChart`](struct.PngChart.html) is the implementation used by the command line
//! tool. Text is drawn with a system sans-serif font through the `ttf` feature,
//! which is enabled by default. Without it, the plot contains lines and tick
//! marks only.

use std::path::Path;

use plotters::prelude::*;

use crate::series::TimeSeries;
use crate::{Error, Result};

/// Writes a plot of a series to an image file, replacing an existing file
pub trait ChartRenderer {
    /// File extension of the written images (without `.`)
    fn extension(&self) -> &str;

    fn render(&mut self, series: &TimeSeries, path: &Path) -> Result<()>;
}

/// PNG line plot of read count against hours
#[derive(Debug, Clone)]
pub struct PngChart {
    pub width: u32,
    pub height: u32,
    pub x_desc: String,
    pub y_desc: String,
}

impl Default for PngChart {
    fn default() -> PngChart {
        PngChart {
            width: 1200,
            height: 800,
            x_desc: "hours".to_string(),
            y_desc: "num of reads".to_string(),
        }
    }
}

impl ChartRenderer for PngChart {
    fn extension(&self) -> &str {
        "png"
    }

    fn render(&mut self, series: &TimeSeries, path: &Path) -> Result<()> {
        let err = |e: &dyn std::fmt::Display| Error::Chart {
            path: path.to_owned(),
            message: e.to_string(),
        };

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| err(&e))?;

        let (x_max, y_max) = axis_limits(series);
        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)
            .map_err(|e| err(&e))?;

        chart
            .configure_mesh()
            .x_desc(self.x_desc.as_str())
            .y_desc(self.y_desc.as_str())
            .draw()
            .map_err(|e| err(&e))?;

        chart
            .draw_series(LineSeries::new(
                series.points().map(|(hours, reads)| (hours, reads as f64)),
                &BLUE,
            ))
            .map_err(|e| err(&e))?;

        root.present().map_err(|e| err(&e))?;
        Ok(())
    }
}

// Upper axis limits; ranges must not be empty even without reads or elapsed time
fn axis_limits(series: &TimeSeries) -> (f64, f64) {
    let hours = series.total_hours();
    let reads = series.total_reads() as f64;
    (
        if hours > 0. { hours } else { 1. },
        if reads > 0. { reads } else { 1. },
    )
}

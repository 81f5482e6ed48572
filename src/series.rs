//! Cumulative read count over elapsed run time

use chrono::NaiveDateTime;

use crate::timestamp::SortedReads;

const SECONDS_PER_HOUR: f64 = 3600.;

/// Index-aligned x/y values of the throughput plot.
///
/// `elapsed_hours[i]` is the time between the first read and read `i`,
/// `read_count[i]` is `i + 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub elapsed_hours: Vec<f64>,
    pub read_count: Vec<u64>,
}

impl TimeSeries {
    pub fn from_sorted(reads: &SortedReads) -> TimeSeries {
        TimeSeries::from_timestamps(reads.timestamps())
    }

    /// Builds the series from timestamps in ascending order.
    ///
    /// The elapsed time is summed up from the differences between consecutive
    /// timestamps, so equal timestamps add nothing.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use plotrt::TimeSeries;
    ///
    /// let day = NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();
    /// let times = [(9, 0), (9, 30), (10, 0)].map(|(h, m)| day.and_hms_opt(h, m, 0).unwrap());
    ///
    /// let series = TimeSeries::from_timestamps(times);
    /// assert_eq!(series.elapsed_hours, [0., 0.5, 1.]);
    /// assert_eq!(series.read_count, [1, 2, 3]);
    /// ```
    pub fn from_timestamps<I>(timestamps: I) -> TimeSeries
    where
        I: IntoIterator<Item = NaiveDateTime>,
    {
        let mut series = TimeSeries::default();
        let mut prev: Option<NaiveDateTime> = None;
        let mut hours = 0.;
        for (i, t) in timestamps.into_iter().enumerate() {
            if let Some(p) = prev {
                hours += (t - p).num_seconds() as f64 / SECONDS_PER_HOUR;
            }
            series.elapsed_hours.push(hours);
            series.read_count.push(i as u64 + 1);
            prev = Some(t);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.read_count.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_count.is_empty()
    }

    /// (hours, reads) pairs
    pub fn points(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.elapsed_hours
            .iter()
            .copied()
            .zip(self.read_count.iter().copied())
    }

    /// Hours between the first and the last read, 0 if there are none
    pub fn total_hours(&self) -> f64 {
        self.elapsed_hours.last().copied().unwrap_or(0.)
    }

    pub fn total_reads(&self) -> u64 {
        self.read_count.last().copied().unwrap_or(0)
    }
}

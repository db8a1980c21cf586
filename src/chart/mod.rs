use std::path::PathBuf;

use log::{info, warn};
use serde::Deserialize;

use crate::FacemarkError;

/// Dataset label shown in the chart legend.
pub const DATASET_LABEL: &str = "Present Days";
/// X axis title.
pub const X_AXIS_LABEL: &str = "Date";
/// Chart window title.
pub const CHART_TITLE: &str = "Your Attendance Trend Over Time";

// raw wire shape of the attendance data file: two parallel arrays paired
// by index, validated before an AttendanceSeries is handed out
#[derive(Deserialize)]
struct RawSeries {
    dates: Vec<String>,
    present: Vec<u8>,
}

/// A validated attendance series: chronologically ordered date labels
/// paired by index with 0/1 presence flags.
///
/// Constructs only through validation, so holding one implies the
/// sequences are non-empty and of equal length.
#[derive(Clone, Debug)]
pub struct AttendanceSeries {
    dates: Vec<String>,
    present: Vec<u8>,
}

impl AttendanceSeries {
    pub fn new(dates: Vec<String>, present: Vec<u8>) -> Result<Self, FacemarkError> {
        if dates.is_empty() {
            return Err(FacemarkError::ChartDataShapeError {
                reason: "no attendance dates".to_string(),
            });
        }
        if dates.len() != present.len() {
            return Err(FacemarkError::ChartDataShapeError {
                reason: format!(
                    "{} dates but {} presence flags",
                    dates.len(),
                    present.len()
                ),
            });
        }
        Ok(Self { dates, present })
    }

    /// Parse the two JSON-encoded parallel arrays the host supplies.
    pub fn from_json(dates_json: &str, present_json: &str) -> Result<Self, FacemarkError> {
        let dates: Vec<String> = serde_json::from_str(dates_json)
            .map_err(|e| FacemarkError::ChartDataParseError { source: e })?;
        let present: Vec<u8> = serde_json::from_str(present_json)
            .map_err(|e| FacemarkError::ChartDataParseError { source: e })?;
        Self::new(dates, present)
    }

    /// Load a series from a JSON file of the form
    /// `{"dates": [...], "present": [...]}`.
    pub fn from_file(path: &PathBuf) -> Result<Self, FacemarkError> {
        let file =
            std::fs::File::open(path).map_err(|e| FacemarkError::AttendanceLoaderError {
                source: e,
            })?;
        let raw: RawSeries = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| FacemarkError::ChartDataParseError { source: e })?;
        let series = Self::new(raw.dates, raw.present)?;
        info!("Loaded {:?}, {} attendance days", path, series.len());
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }
}

/// The line-chart configuration for an attendance series: plot points,
/// axis labels and tick text. Pure transformation, rendered by the UI.
pub struct AttendanceChart {
    series: AttendanceSeries,
}

impl AttendanceChart {
    pub fn new(series: AttendanceSeries) -> Self {
        Self { series }
    }

    /// Build a chart from a data file, degrading silently (log only) on
    /// missing or invalid data: the caller simply has no chart to draw.
    pub fn from_file(path: &PathBuf) -> Option<Self> {
        match AttendanceSeries::from_file(path) {
            Ok(series) => Some(Self::new(series)),
            Err(e) => {
                warn!("No valid attendance data available for chart: {}", e);
                None
            }
        }
    }

    /// One `[index, presence]` point per attendance day.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.series
            .present
            .iter()
            .enumerate()
            .map(|(i, present)| [i as f64, *present as f64])
            .collect()
    }

    pub fn point_count(&self) -> usize {
        self.series.len()
    }

    /// Owned copy of the date labels, for axis formatter closures that
    /// must outlive the chart borrow.
    pub fn dates_for_axis(&self) -> Vec<String> {
        self.series.dates.clone()
    }

    /// Date label for the x position, when it lands on a data point.
    pub fn date_label(&self, x: f64) -> Option<&str> {
        if x < 0. || x.fract() != 0. {
            return None;
        }
        self.series.dates.get(x as usize).map(String::as_str)
    }

    /// Y axis tick text: only 0 and 1 carry labels.
    pub fn y_tick_label(value: f64) -> Option<&'static str> {
        if value == 0. {
            Some("Absent")
        } else if value == 1. {
            Some("Present")
        } else {
            None
        }
    }

    /// Tooltip text for the presence value at a point.
    pub fn presence_label(value: f64) -> &'static str {
        if value >= 0.5 { "Present" } else { "Absent" }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use proptest::prelude::*;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn two_day_series_renders_two_points() {
        let series = AttendanceSeries::new(
            vec!["2024-01-01".to_string(), "2024-01-02".to_string()],
            vec![1, 0],
        )
        .unwrap();
        let chart = AttendanceChart::new(series);

        assert_eq!(chart.point_count(), 2);
        assert_eq!(chart.points(), vec![[0., 1.], [1., 0.]]);
        assert_eq!(AttendanceChart::y_tick_label(1.), Some("Present"));
        assert_eq!(AttendanceChart::y_tick_label(0.), Some("Absent"));
        assert_eq!(AttendanceChart::y_tick_label(0.5), None);
        assert_eq!(chart.date_label(0.), Some("2024-01-01"));
        assert_eq!(chart.date_label(1.), Some("2024-01-02"));
        assert_eq!(chart.date_label(2.), None);
        assert_eq!(chart.date_label(0.25), None);
    }

    #[test]
    fn empty_series_does_not_construct() {
        let result = AttendanceSeries::new(Vec::new(), Vec::new());
        assert!(matches!(
            result,
            Err(FacemarkError::ChartDataShapeError { .. })
        ));
    }

    #[test]
    fn mismatched_lengths_do_not_construct() {
        let result = AttendanceSeries::new(
            vec!["2024-01-01".to_string(), "2024-01-02".to_string()],
            vec![1],
        );
        assert!(matches!(
            result,
            Err(FacemarkError::ChartDataShapeError { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = AttendanceSeries::from_json("not json", "[1]");
        assert!(matches!(
            result,
            Err(FacemarkError::ChartDataParseError { .. })
        ));
    }

    #[test]
    fn parallel_arrays_parse_and_pair_by_index() {
        let series =
            AttendanceSeries::from_json(r#"["2024-01-01","2024-01-02"]"#, "[1,0]").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.dates()[1], "2024-01-02");
    }

    #[test]
    fn file_loading_round_trips() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"dates": ["2024-01-01", "2024-01-02", "2024-01-03"], "present": [1, 0, 1]}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let series = AttendanceSeries::from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn invalid_file_degrades_to_no_chart() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"dates": [], "present": []}}"#).unwrap();
        file.flush().unwrap();

        assert!(AttendanceChart::from_file(&file.path().to_path_buf()).is_none());
        assert!(AttendanceChart::from_file(&PathBuf::from("/nonexistent.json")).is_none());
    }

    proptest! {
        #[test]
        fn label_count_always_equals_point_count(
            days in proptest::collection::vec((".{1,10}", 0u8..=1u8), 1..50)
        ) {
            let (dates, present): (Vec<String>, Vec<u8>) = days.into_iter().unzip();
            let series = AttendanceSeries::new(dates, present).unwrap();
            let chart = AttendanceChart::new(series);
            prop_assert_eq!(chart.points().len(), chart.point_count());
            for (i, point) in chart.points().iter().enumerate() {
                prop_assert!(chart.date_label(point[0]).is_some());
                prop_assert_eq!(point[0], i as f64);
                prop_assert!(point[1] == 0. || point[1] == 1.);
            }
        }
    }
}

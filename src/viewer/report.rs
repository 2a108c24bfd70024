//! Location-change reports emitted by the rendering library.
//!
//! The library hands over a voxel vector plus a formatted label such as
//! `"-2×80×51×0 = 572"`, where the last `×`-separated field reads
//! `time = intensity`. [`LocationReport::parse`] pulls the typed values out,
//! dropping whichever fields are malformed.

use serde::Deserialize;

use crate::volume::VoxelCoordinate;

/// Separator between the fields of a location label.
pub const LABEL_DELIMITER: char = '×';

/// Number of `×`-separated fields a well-formed label carries.
const LABEL_FIELDS: usize = 4;

/// Raw location-change payload, as delivered by the library callback.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LocationReport {
    /// Voxel indices; the first three are x, y, z.
    #[serde(default)]
    pub vox: Vec<f64>,
    /// Formatted `"a×b×c×t = v"` label.
    #[serde(rename = "string", default)]
    pub label: String,
}

/// Typed view of a [`LocationReport`]. Each field is `None` when the
/// corresponding part of the report was malformed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationChange {
    /// Reported crosshair voxel.
    pub voxel: Option<VoxelCoordinate>,
    /// Frame index from the label.
    pub time_index: Option<i64>,
    /// Intensity value from the label.
    pub intensity: Option<f64>,
}

impl LocationChange {
    /// Whether any field had to be dropped.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.voxel.is_none()
            || self.time_index.is_none()
            || self.intensity.is_none()
    }
}

impl LocationReport {
    /// Build a report from integer voxel indices and a label.
    #[must_use]
    pub fn new(voxel: VoxelCoordinate, label: impl Into<String>) -> Self {
        Self {
            vox: vec![
                f64::from(voxel.x),
                f64::from(voxel.y),
                f64::from(voxel.z),
            ],
            label: label.into(),
        }
    }

    /// Decode the JSON form the JS bridge forwards.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Extract voxel, time index and intensity.
    #[must_use]
    pub fn parse(&self) -> LocationChange {
        let (time_index, intensity) = parse_label(&self.label);
        LocationChange {
            voxel: parse_voxel(&self.vox),
            time_index,
            intensity,
        }
    }
}

/// Split a location label into `(time index, intensity)`.
#[must_use]
pub fn parse_label(label: &str) -> (Option<i64>, Option<f64>) {
    let fields: Vec<&str> =
        label.split(LABEL_DELIMITER).map(str::trim).collect();
    if fields.len() != LABEL_FIELDS {
        return (None, None);
    }
    let Some((time, value)) = fields[LABEL_FIELDS - 1].split_once('=') else {
        return (None, None);
    };
    let time_index = time.trim().parse::<i64>().ok();
    let intensity = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite());
    (time_index, intensity)
}

/// First three entries of `vox`, rounded to voxel indices.
fn parse_voxel(vox: &[f64]) -> Option<VoxelCoordinate> {
    let mut axes = vox.iter().map(|v| to_index(*v));
    let x = axes.next()??;
    let y = axes.next()??;
    let z = axes.next()??;
    Some(VoxelCoordinate::new(x, y, z))
}

fn to_index(value: f64) -> Option<i32> {
    let rounded = value.round();
    let in_range =
        rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX);
    (value.is_finite() && in_range).then_some(rounded as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_report() {
        let report = LocationReport::new(
            VoxelCoordinate::new(10, 20, 30),
            "-2×80×51×0 = 572",
        );
        let change = report.parse();
        assert_eq!(change.voxel, Some(VoxelCoordinate::new(10, 20, 30)));
        assert_eq!(change.time_index, Some(0));
        assert_eq!(change.intensity, Some(572.0));
        assert!(!change.is_partial());
    }

    #[test]
    fn tolerates_padding_and_fractional_intensity() {
        let (t, v) = parse_label("  1 × 2 × 3 × 4 =  0.25   ");
        assert_eq!(t, Some(4));
        assert_eq!(v, Some(0.25));
    }

    #[test]
    fn wrong_field_count_drops_label_values() {
        assert_eq!(parse_label("1×2×0 = 5"), (None, None));
        assert_eq!(parse_label("1×2×3×4×0 = 5"), (None, None));
        assert_eq!(parse_label(""), (None, None));
    }

    #[test]
    fn malformed_fields_are_dropped_independently() {
        assert_eq!(parse_label("1×2×3×x = 5"), (None, Some(5.0)));
        assert_eq!(parse_label("1×2×3×0 = n/a"), (Some(0), None));
        assert_eq!(parse_label("1×2×3×0 572"), (None, None));
    }

    #[test]
    fn short_or_non_finite_voxel_is_dropped() {
        let short = LocationReport {
            vox: vec![1.0, 2.0],
            label: "1×2×3×0 = 5".to_owned(),
        };
        let change = short.parse();
        assert_eq!(change.voxel, None);
        assert_eq!(change.intensity, Some(5.0));
        assert!(change.is_partial());

        let nan = LocationReport {
            vox: vec![1.0, f64::NAN, 3.0],
            label: String::new(),
        };
        assert_eq!(nan.parse().voxel, None);
    }

    #[test]
    fn decodes_bridge_json() {
        let report = LocationReport::from_json(
            r#"{"vox":[10,20.4,30],"string":"-2×80×51×0 = 572","mm":[1,2,3]}"#,
        )
        .unwrap();
        assert_eq!(report.parse().voxel, Some(VoxelCoordinate::new(10, 20, 30)));
    }
}

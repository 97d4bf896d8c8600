/// How a scan-indexed variable is shifted after slicing so that it counts from zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rebase {
    #[default]
    Identity,
    /// Subtract the first point index of the slice.
    ByStartPoint,
    /// Subtract the first scan index of the slice.
    ByStartScan,
}

/// Names of the dimensions and variables the splitter relies on, and the
/// re-basing applied to each scan-indexed variable.
///
/// The defaults follow the ANDI/AIA mass spectrometry conventions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceSchema {
    pub scan_dimension: String,
    pub point_dimension: String,
    pub intensity_variable: String,
    pub time_variable: String,
    /// Per-scan start index on the point axis.
    pub offset_variable: String,
    /// Variables not listed here are copied without re-basing.
    pub rebase: Vec<(String, Rebase)>,
}

impl Default for SliceSchema {
    fn default() -> Self {
        Self {
            scan_dimension: "scan_number".to_owned(),
            point_dimension: "point_number".to_owned(),
            intensity_variable: "total_intensity".to_owned(),
            time_variable: "scan_acquisition_time".to_owned(),
            offset_variable: "scan_index".to_owned(),
            rebase: vec![
                ("scan_index".to_owned(), Rebase::ByStartPoint),
                ("actual_scan_number".to_owned(), Rebase::ByStartScan),
            ],
        }
    }
}

impl SliceSchema {
    pub fn rebase_of(&self, variable: &str) -> Rebase {
        self.rebase
            .iter()
            .find(|(name, _)| name == variable)
            .map(|&(_, rebase)| rebase)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rebase_table() {
        let schema = SliceSchema::default();
        assert_eq!(schema.rebase_of("scan_index"), Rebase::ByStartPoint);
        assert_eq!(schema.rebase_of("actual_scan_number"), Rebase::ByStartScan);
        assert_eq!(schema.rebase_of("total_intensity"), Rebase::Identity);
    }
}

//! Electrode net: a named table of scalp electrode positions, loaded from
//! the CSV layouts recognized by the spec (§6).

use std::collections::HashMap;

use crate::error::{Result, TiError};
use crate::geometry::Point3;

/// A table of named electrode positions on one subject's scalp, for one
/// EEG net (e.g. `EEG10-20_Okamoto_2004`, `GSN-HydroCel-256`).
///
/// Row order is preserved from the source file and is significant: the
/// leadfield cache's row order must match net electrode order exactly
/// (spec §4.3 invariant).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElectrodeNet {
    pub name: String,
    /// `(label, position)` pairs, in file order.
    pub electrodes: Vec<(String, Point3)>,
}

impl ElectrodeNet {
    /// Index of the electrode with the given label, case-sensitive (labels
    /// in practice are upper-case 10-20 names like `Fz`, `C3`).
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.electrodes.iter().position(|(l, _)| l == label)
    }

    pub fn position_of(&self, label: &str) -> Option<Point3> {
        self.electrodes.iter().find(|(l, _)| l == label).map(|(_, p)| *p)
    }

    pub fn labels(&self) -> Vec<String> {
        self.electrodes.iter().map(|(l, _)| l.clone()).collect()
    }

    /// Parses the two recognized CSV column layouts (§6.4):
    /// `Type,X,Y,Z,Name,Extra` (SimNIBS-style; `Name` is the label) or
    /// `Label,X,Y,Z`. Header matching is case-insensitive.
    pub fn from_csv(name: &str, contents: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(contents.as_bytes());
        let headers = reader
            .headers()
            .map_err(|e| TiError::MalformedFile { format: "csv".into(), reason: e.to_string() })?
            .clone();
        let lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let index_of = |col: &str| lower.iter().position(|h| h == col);

        let (label_col, x_col, y_col, z_col) = if let Some(label_col) = index_of("name") {
            let x = index_of("x").ok_or_else(|| missing_column("x"))?;
            let y = index_of("y").ok_or_else(|| missing_column("y"))?;
            let z = index_of("z").ok_or_else(|| missing_column("z"))?;
            (label_col, x, y, z)
        } else if let Some(label_col) = index_of("label") {
            let x = index_of("x").ok_or_else(|| missing_column("x"))?;
            let y = index_of("y").ok_or_else(|| missing_column("y"))?;
            let z = index_of("z").ok_or_else(|| missing_column("z"))?;
            (label_col, x, y, z)
        } else {
            return Err(TiError::MalformedFile {
                format: "csv".into(),
                reason: "expected a 'Name' or 'Label' column".into(),
            });
        };

        let mut electrodes = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| TiError::MalformedFile { format: "csv".into(), reason: e.to_string() })?;
            let label = record
                .get(label_col)
                .ok_or_else(|| missing_column("label/name"))?
                .trim()
                .to_string();
            let parse_coord = |idx: usize| -> Result<f64> {
                record
                    .get(idx)
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .ok_or_else(|| TiError::MalformedFile {
                        format: "csv".into(),
                        reason: format!("could not parse coordinate in column {idx}"),
                    })
            };
            let x = parse_coord(x_col)?;
            let y = parse_coord(y_col)?;
            let z = parse_coord(z_col)?;
            electrodes.push((label, Point3::new(x, y, z)));
        }

        Ok(ElectrodeNet { name: name.to_string(), electrodes })
    }
}

fn missing_column(col: &str) -> TiError {
    TiError::MalformedFile { format: "csv".into(), reason: format!("missing column '{col}'") }
}

/// Label -> net map, keyed by net name, typically one entry per file under
/// a subject's `eeg_positions/` directory.
pub type NetTable = HashMap<String, ElectrodeNet>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_style_csv() {
        let csv = "Type,X,Y,Z,Name,Extra\nElectrode,1.0,2.0,3.0,Fz,\nElectrode,4.0,5.0,6.0,Pz,\n";
        let net = ElectrodeNet::from_csv("okamoto", csv).unwrap();
        assert_eq!(net.electrodes.len(), 2);
        assert_eq!(net.position_of("Fz"), Some(Point3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn parses_label_style_csv() {
        let csv = "Label,X,Y,Z\nC3,1.0,2.0,3.0\nC4,4.0,5.0,6.0\n";
        let net = ElectrodeNet::from_csv("neuroelectrics", csv).unwrap();
        assert_eq!(net.index_of("C4"), Some(1));
    }

    #[test]
    fn header_matching_is_case_insensitive() {
        let csv = "label,x,y,z\nFp1,0.0,0.0,0.0\n";
        let net = ElectrodeNet::from_csv("n", csv).unwrap();
        assert_eq!(net.electrodes.len(), 1);
    }

    #[test]
    fn missing_required_column_is_malformed_file() {
        let csv = "Label,X,Y\nFp1,0.0,0.0\n";
        let err = ElectrodeNet::from_csv("n", csv).unwrap_err();
        assert!(matches!(err, TiError::MalformedFile { .. }));
    }

    #[test]
    fn row_order_is_preserved() {
        let csv = "Label,X,Y,Z\nZ9,0,0,0\nA1,1,1,1\n";
        let net = ElectrodeNet::from_csv("n", csv).unwrap();
        assert_eq!(net.labels(), vec!["Z9".to_string(), "A1".to_string()]);
    }
}

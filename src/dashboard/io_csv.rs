// Primitives for reading CSV files.

use crate::dashboard::io_common::{build_incident, ColumnIndex, RawCell};
use crate::dashboard::*;

pub fn read_csv_incidents(path: &str) -> DashResult<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvLineParseSnafu {})?
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    ensure!(!header.is_empty(), EmptyInputSnafu {});
    let index = ColumnIndex::from_header(&header)?;

    let mut incidents: Vec<Incident> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {})?;
        if line.iter().all(|s| s.trim().is_empty()) {
            debug!("read_csv_incidents: lineno {}: skipping blank line", lineno);
            continue;
        }
        let row: Vec<RawCell> = line
            .iter()
            .map(|s| {
                if s.trim().is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(s.to_string())
                }
            })
            .collect();
        incidents.push(build_incident(&index, &row, lineno)?);
    }
    Ok(Dataset::new(incidents, index.schema()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_tmp(dir: &Path, lines: &[&str]) -> String {
        let p = dir.join("data.csv");
        fs::write(&p, lines.join("\n")).unwrap();
        p.display().to_string()
    }

    #[test]
    fn read_with_civilian_fatalities() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(
            dir.path(),
            &[
                "event_id_cnty,event_date,country,disorder_type,event_type,location,fatalities,civilian_fatalities",
                "PSE10,12 October 2023,Palestine,Political violence,Explosions/Remote violence,Gaza City,12,9",
                ",,,,,,,",
                "ISR11,2023-10-13,Israel,Political violence,Battles,Sderot,3,",
            ],
        );
        let ds = read_csv_incidents(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.schema,
            Schema {
                fatalities: true,
                civilian_fatalities: true
            }
        );
        assert_eq!(ds.incidents[0].year, 2023);
        assert_eq!(ds.incidents[0].civilian_fatalities, Some(9));
        assert_eq!(ds.incidents[1].civilian_fatalities, Some(0));
        assert_eq!(ds.incidents[1].location, "Sderot");
    }

    #[test]
    fn missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(
            dir.path(),
            &["event_id_cnty,event_date,country,event_type", "PSE1,2020-01-01,Palestine,Riots"],
        );
        match read_csv_incidents(&path) {
            Err(DashboardError::MissingColumn { column }) => assert_eq!(column, "disorder_type"),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn line_numbers_in_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(
            dir.path(),
            &[
                "event_id_cnty,event_date,country,disorder_type,event_type,fatalities",
                "PSE1,2020-01-01,Palestine,Demonstrations,Riots,1",
                "PSE2,2020-01-02,Palestine,Demonstrations,Riots,many",
            ],
        );
        assert!(matches!(
            read_csv_incidents(&path),
            Err(DashboardError::InvalidCell { lineno: 3, .. })
        ));
    }
}

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::dashboard::io_common::{build_incident, ColumnIndex, RawCell};
use crate::dashboard::*;

pub fn read_excel_incidents(path: &str, worksheet_name: Option<&str>) -> DashResult<Dataset> {
    let wrange = get_range(path, worksheet_name)?;

    let mut rows = wrange.rows();
    let header_row = rows.next().context(EmptyInputSnafu {})?;
    let header: Vec<Option<String>> = header_row
        .iter()
        .map(|c| match c {
            DataType::String(s) => Some(s.clone()),
            DataType::Empty => None,
            x => Some(x.to_string()),
        })
        .collect();
    debug!("read_excel_incidents: header: {:?}", header);
    let index = ColumnIndex::from_header(&header)?;

    let mut incidents: Vec<Incident> = Vec::new();
    for (idx, row) in rows.enumerate() {
        // Lines start at 1 to respect the conventions in the excel world; the header is line 1.
        let lineno = idx + 2;
        let cells: Vec<RawCell> = row.iter().map(to_raw_cell).collect();
        if cells.iter().all(|c| *c == RawCell::Empty) {
            debug!("read_excel_incidents: lineno {}: skipping empty row", lineno);
            continue;
        }
        incidents.push(build_incident(&index, &cells, lineno)?);
    }
    Ok(Dataset::new(incidents, index.schema()))
}

fn to_raw_cell(cell: &DataType) -> RawCell {
    match cell {
        DataType::Empty => RawCell::Empty,
        DataType::String(s) if s.trim().is_empty() => RawCell::Empty,
        DataType::String(s) => RawCell::Text(s.clone()),
        DataType::Int(i) => RawCell::Int(*i),
        DataType::Float(f) => RawCell::Float(*f),
        DataType::DateTime(f) => RawCell::ExcelDate(*f),
        x => RawCell::Text(x.to_string()),
    }
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> DashResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: calamine::XlsxError| {
        DashboardError::OpeningExcel {
            message: e.to_string(),
            path: path.to_string(),
        }
    })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                worksheet: worksheet_name,
            })?
            .map_err(|e| DashboardError::OpeningExcel {
                message: e.to_string(),
                path: path.to_string(),
            })?;
        return Ok(wrange);
    }

    let all_worksheets = workbook.worksheets();
    match all_worksheets.as_slice() {
        [] => whatever!("The workbook {} does not contain any worksheet", path),
        [(worksheet_name, wrange)] => {
            debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
            Ok(wrange.clone())
        }
        [(worksheet_name, wrange), ..] => {
            warn!(
                "The workbook {} has {} worksheets, using the first one ({:?}). Use --excel-worksheet-name to choose another one.",
                path,
                all_worksheets.len(),
                worksheet_name
            );
            Ok(wrange.clone())
        }
    }
}

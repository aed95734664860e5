use super::{record_values, ExportError, ExportRecord};
use ::csv::Writer;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Cell text of an exported value; absent values are blank
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Write the given fields of export records as CSV, one column per field
pub fn write_records<W: Write>(
    records: &[ExportRecord],
    fields: &[&str],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(fields)?;

    for record in records {
        let values = record_values(record, fields)?;
        csv_writer.write_record(values.iter().map(cell_text))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export records to a CSV file (suitable for spreadsheet plotting)
pub fn export_records<P: AsRef<Path>>(
    records: &[ExportRecord],
    fields: &[&str],
    output_path: P,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(output_path)?;
    write_records(records, fields, file)
}

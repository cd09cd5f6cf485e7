use crate::table::LocationTable;
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook, Data, Ods, Reader, Xls, Xlsx};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Supported input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    Xlsx,
    Xls,
    Ods,
}

impl InputFormat {
    /// Detects the format from magic bytes using infer, falling back to the extension
    pub fn detect(path: &Path) -> Result<Self> {
        // Read the first 8192 bytes for file type detection
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;
        let mut buffer = vec![0u8; 8192];
        let bytes_read = file.read(&mut buffer)?;
        buffer.truncate(bytes_read);

        let format = match infer::get(&buffer).map(|kind| kind.mime_type()) {
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet") => {
                InputFormat::Xlsx
            }
            Some("application/vnd.ms-excel") => InputFormat::Xls,
            Some("application/vnd.oasis.opendocument.spreadsheet") => InputFormat::Ods,
            // Plain text has no magic bytes; zip/ole containers infer can't
            // classify also land here
            _ => Self::from_extension(path),
        };

        Ok(format)
    }

    /// Fallback detection based on extension; anything unknown is read as CSV
    fn from_extension(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "tsv" | "tab" => InputFormat::Tsv,
            "xlsx" | "xlsm" => InputFormat::Xlsx,
            "xls" => InputFormat::Xls,
            "ods" => InputFormat::Ods,
            _ => InputFormat::Csv,
        }
    }
}

/// Load a CSV/TSV or spreadsheet file into a table
pub fn load_table(path: &Path) -> Result<LocationTable> {
    let format = InputFormat::detect(path)?;
    log::debug!("Reading {} as {:?}", path.display(), format);

    let table = match format {
        InputFormat::Csv => read_delimited_file(path, b',')?,
        InputFormat::Tsv => read_delimited_file(path, b'\t')?,
        InputFormat::Xlsx => read_workbook::<Xlsx<BufReader<File>>>(path)?,
        InputFormat::Xls => read_workbook::<Xls<BufReader<File>>>(path)?,
        InputFormat::Ods => read_workbook::<Ods<BufReader<File>>>(path)?,
    };

    log::info!(
        "Loaded {} rows with columns [{}] from {}",
        table.row_count(),
        table.headers().join(", "),
        path.display()
    );

    Ok(table)
}

fn read_delimited_file(path: &Path, delimiter: u8) -> Result<LocationTable> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;
    read_delimited(BufReader::new(file), delimiter)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read delimited text with a header row. Empty fields become absent cells.
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<LocationTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(String::from)
        .collect();

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read data row {}", i + 1))?;
        rows.push(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }

    Ok(LocationTable::new(headers, rows))
}

/// Read the first worksheet; its first row is the header
fn read_workbook<R>(path: &Path) -> Result<LocationTable>
where
    R: Reader<BufReader<File>>,
{
    let mut workbook: R = open_workbook(path)
        .map_err(|e| anyhow!("Failed to open spreadsheet {}: {:?}", path.display(), e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Spreadsheet {} has no worksheets", path.display()))?
        .map_err(|e| anyhow!("Failed to read first worksheet of {}: {:?}", path.display(), e))?;

    let mut sheet_rows = range.rows();
    let headers = sheet_rows
        .next()
        .map(|row| row.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
        .unwrap_or_default();
    let rows = sheet_rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(LocationTable::new(headers, rows))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        other => Some(other.to_string()),
    }
}

/// Write the table as UTF-8 CSV: header row, no index column, absent cells empty
pub fn write_csv<W: Write>(table: &LocationTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(table.headers())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    wtr.flush()?;

    Ok(())
}

/// Write the table to a CSV file, replacing any existing file
pub fn save_csv(table: &LocationTable, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    write_csv(table, BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Wrote {} rows to {}", table.row_count(), path.display());
    Ok(())
}

//! # Interchange Files
//!
//! Spreadsheet-compatible CSV export and import of sale records.
//!
//! ## File Layout
//! ```text
//! ID,Product,Quantity,Value,Date            ← "ID" column is optional
//! 7,Guppy,3,R$ 4.50,2024-06-15 09:00:00
//! 8,"Ração, 50g",1,R$ 29.90,2024-06-15 16:30:00
//!                                           ← close report only
//! TOTAL,,R$ 43.40,2024-06-15                ← close report only
//! ```
//!
//! Amounts are written in the plain format. Unit prices keep every stored
//! decimal place (`R$ 1234.50`, `R$ 0.125`) so an import gives back the same
//! price; the TOTAL row is rounded to centavos. The reader also
//! accepts the Brazilian rendering, bare numbers, the Portuguese header
//! (`Produto,Quantidade,Valor,Data`) and a leading UTF-8 BOM.

use chrono::{NaiveDate, NaiveDateTime};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use caixa_core::{validation, CurrencyFormat, Money, NewSale, SaleRecord, DAY_FORMAT};

/// Column titles, in file order.
pub const HEADER: [&str; 4] = ["Product", "Quantity", "Value", "Date"];

/// Header written by older versions of the shop software.
const LEGACY_HEADER: [&str; 4] = ["Produto", "Quantidade", "Valor", "Data"];

/// Optional leading column carrying the stored id.
pub const ID_COLUMN: &str = "ID";

/// First field of the summary row of a close report.
pub const TOTAL_LABEL: &str = "TOTAL";

// =============================================================================
// Export
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Prefix every row with the record id.
    pub include_id: bool,
}

/// What an export did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// There were no rows; no file was touched.
    NothingToExport,
    Written { rows: usize, path: PathBuf },
}

fn writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(inner)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> csv::Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Renders rows with the header line.
pub fn encode(rows: &[SaleRecord], options: ExportOptions) -> csv::Result<Vec<u8>> {
    let mut out = writer(Vec::new());

    if options.include_id {
        out.write_record(std::iter::once(ID_COLUMN).chain(HEADER))?;
    } else {
        out.write_record(HEADER)?;
    }

    for record in rows {
        let fields = [
            record.name.clone(),
            record.quantity.to_string(),
            CurrencyFormat::Plain.format_exact(record.unit_price),
            record.timestamp_text(),
        ];

        if options.include_id {
            out.write_record(std::iter::once(record.id.to_string()).chain(fields))?;
        } else {
            out.write_record(&fields)?;
        }
    }

    into_bytes(out)
}

/// Renders a close report: the day's rows, a blank line and the TOTAL row.
pub fn encode_close_report(
    records: &[SaleRecord],
    total: Money,
    day: NaiveDate,
) -> csv::Result<Vec<u8>> {
    let mut bytes = encode(records, ExportOptions::default())?;
    bytes.push(b'\n');

    let mut out = writer(bytes);
    out.write_record([
        TOTAL_LABEL.to_string(),
        String::new(),
        CurrencyFormat::Plain.format(total),
        day.format(DAY_FORMAT).to_string(),
    ])?;

    into_bytes(out)
}

/// Writes encoded bytes, replacing any existing file.
pub fn write_file(path: &Path, bytes: &[u8]) -> LedgerResult<()> {
    std::fs::write(path, bytes).map_err(|e| LedgerError::io(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote interchange file");
    Ok(())
}

/// Writes `rows` to `path`.
///
/// Zero rows is not an error: nothing is written and
/// [`ExportOutcome::NothingToExport`] is returned.
pub fn export(rows: &[SaleRecord], path: &Path, options: ExportOptions) -> LedgerResult<ExportOutcome> {
    if rows.is_empty() {
        return Ok(ExportOutcome::NothingToExport);
    }

    let bytes = encode(rows, options).map_err(|e| LedgerError::csv(path, e))?;
    write_file(path, &bytes)?;

    info!(path = %path.display(), rows = rows.len(), "Exported sales");

    Ok(ExportOutcome::Written {
        rows: rows.len(),
        path: path.to_path_buf(),
    })
}

// =============================================================================
// Import
// =============================================================================

/// A parsed import row. Its exported id, if any, is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSale {
    pub sale: NewSale,
    pub timestamp: NaiveDateTime,
}

/// Where the data columns start.
#[derive(Debug, Clone, Copy)]
struct Columns {
    offset: usize,
}

impl Columns {
    fn from_header(record: &csv::StringRecord) -> Option<Columns> {
        let offset = match record.get(0) {
            Some(first) if first.eq_ignore_ascii_case(ID_COLUMN) => 1,
            _ => 0,
        };

        let titles: Vec<&str> = record.iter().skip(offset).take(HEADER.len()).collect();
        let matches = |expected: &[&str; 4]| {
            titles.len() == expected.len()
                && titles
                    .iter()
                    .zip(expected)
                    .all(|(title, want)| title.eq_ignore_ascii_case(want))
        };

        (matches(&HEADER) || matches(&LEGACY_HEADER)).then_some(Columns { offset })
    }

    fn field<'r>(&self, record: &'r csv::StringRecord, index: usize) -> &'r str {
        record.get(self.offset + index).unwrap_or("")
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<ImportedSale, caixa_core::ValidationError> {
        let sale = NewSale::parse(
            self.field(record, 0),
            self.field(record, 1),
            self.field(record, 2),
        )?;
        let timestamp = validation::parse_timestamp("date", self.field(record, 3))?;

        Ok(ImportedSale { sale, timestamp })
    }
}

/// `TOTAL,,...` (also the older `TOTAL DO DIA,,...`).
fn is_summary_row(record: &csv::StringRecord) -> bool {
    let label = record.get(0).unwrap_or("");
    let next = record.get(1).unwrap_or("");

    label.len() >= TOTAL_LABEL.len()
        && label.is_char_boundary(TOTAL_LABEL.len())
        && label[..TOTAL_LABEL.len()].eq_ignore_ascii_case(TOTAL_LABEL)
        && next.is_empty()
}

/// Parses file contents. `source` only names the file in errors.
///
/// Every row is parsed before anything is returned; the first bad row fails
/// the whole file with its line number.
pub fn decode(text: &str, source: &Path) -> LedgerResult<Vec<ImportedSale>> {
    let text = text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut columns: Option<Columns> = None;
    let mut sales = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| LedgerError::csv(source, e))?;
        let line = record.position().map_or(0, |p| p.line());

        if record.iter().all(str::is_empty) {
            continue;
        }

        let layout = match columns {
            Some(layout) => layout,
            None => {
                let layout = Columns::from_header(&record).ok_or_else(|| {
                    LedgerError::malformed(
                        source,
                        line,
                        format!("expected header {}", HEADER.join(",")),
                    )
                })?;
                columns = Some(layout);
                continue;
            }
        };

        if is_summary_row(&record) {
            debug!(line, "Skipping summary row");
            continue;
        }

        let sale = layout
            .parse(&record)
            .map_err(|e| LedgerError::malformed(source, line, e.to_string()))?;
        sales.push(sale);
    }

    Ok(sales)
}

/// Reads and parses an interchange file.
pub fn read_file(path: &Path) -> LedgerResult<Vec<ImportedSale>> {
    let text = std::fs::read_to_string(path).map_err(|e| LedgerError::io(path, e))?;
    decode(&text, path)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caixa_core::SaleId;

    fn record(id: i64, name: &str, quantity: i64, cents: i64, time: &str) -> SaleRecord {
        let timestamp =
            NaiveDateTime::parse_from_str(&format!("2024-06-15 {time}"), "%Y-%m-%d %H:%M:%S")
                .unwrap();
        SaleRecord {
            id: SaleId(id),
            name: name.to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
            timestamp,
            day: timestamp.date(),
        }
    }

    fn rows() -> Vec<SaleRecord> {
        vec![
            record(7, "Guppy", 3, 450, "09:00:00"),
            record(8, "Ração, 50g", 1, 2990, "16:30:00"),
        ]
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_encode() {
        let out = text(encode(&rows(), ExportOptions::default()).unwrap());
        assert_eq!(
            out,
            "Product,Quantity,Value,Date\n\
             Guppy,3,R$ 4.50,2024-06-15 09:00:00\n\
             \"Ração, 50g\",1,R$ 29.90,2024-06-15 16:30:00\n"
        );
    }

    #[test]
    fn test_encode_with_id() {
        let out = text(encode(&rows(), ExportOptions { include_id: true }).unwrap());
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("ID,Product,Quantity,Value,Date"));
        assert_eq!(lines.next(), Some("7,Guppy,3,R$ 4.50,2024-06-15 09:00:00"));
    }

    #[test]
    fn test_close_report_has_blank_line_and_total() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let total = SaleRecord::total(&rows()).unwrap();

        let out = text(encode_close_report(&rows(), total, day).unwrap());
        assert!(out.ends_with("16:30:00\n\nTOTAL,,R$ 43.40,2024-06-15\n"));
    }

    #[test]
    fn test_close_report_round_trip_skips_total() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let bytes = encode_close_report(&rows(), Money::from_cents(4340), day).unwrap();

        let imported = decode(&text(bytes), Path::new("fechamento.csv")).unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[1].sale.name, "Ração, 50g");
        assert_eq!(imported[1].sale.unit_price.cents(), 2990);
        assert_eq!(imported[1].timestamp, rows()[1].timestamp);
    }

    #[test]
    fn test_sub_centavo_price_is_written_exactly() {
        let mut feed = record(9, "Artemia 1g", 8, 0, "09:00:00");
        feed.unit_price = Money::from_micros(125_000);

        let out = text(encode(&[feed.clone()], ExportOptions::default()).unwrap());
        assert!(out.ends_with("Artemia 1g,8,R$ 0.125,2024-06-15 09:00:00\n"));

        let imported = decode(&out, Path::new("a.csv")).unwrap();
        assert_eq!(imported[0].sale.unit_price, feed.unit_price);
    }

    #[test]
    fn test_decode_with_id_column_drops_ids() {
        let bytes = encode(&rows(), ExportOptions { include_id: true }).unwrap();
        let imported = decode(&text(bytes), Path::new("a.csv")).unwrap();

        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].sale.name, "Guppy");
        assert_eq!(imported[0].sale.quantity, 3);
    }

    #[test]
    fn test_decode_legacy_file() {
        let input = "\u{FEFF}Produto,Quantidade,Valor,Data\n\
                     Kinguio,2,\"R$ 1.234,50\",2024-06-15\n\
                     \n\
                     TOTAL DO DIA,,\"R$ 2.469,00\",2024-06-15\n";

        let imported = decode(input, Path::new("legado.csv")).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].sale.unit_price.cents(), 123450);
        assert_eq!(
            imported[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_product_named_total_is_still_a_row() {
        let input = "Product,Quantity,Value,Date\nTotal Reef,1,R$ 80.00,2024-06-15 10:00:00\n";
        let imported = decode(input, Path::new("a.csv")).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].sale.name, "Total Reef");
    }

    #[test]
    fn test_malformed_row_names_line() {
        let input = "Product,Quantity,Value,Date\n\
                     Guppy,3,R$ 4.50,2024-06-15 09:00:00\n\
                     Betta,many,R$ 15.00,2024-06-15 10:00:00\n";

        let err = decode(input, Path::new("ruim.csv")).unwrap_err();
        match err {
            LedgerError::MalformedImport { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_header() {
        let input = "Guppy,3,R$ 4.50,2024-06-15 09:00:00\n";
        let err = decode(input, Path::new("sem-cabecalho.csv")).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_export_nothing_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vazio.csv");

        let outcome = export(&[], &path, ExportOptions::default()).unwrap();
        assert_eq!(outcome, ExportOutcome::NothingToExport);
        assert!(!path.exists());
    }

    #[test]
    fn test_export_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saidas.csv");

        let outcome = export(&rows(), &path, ExportOptions::default()).unwrap();
        assert_eq!(
            outcome,
            ExportOutcome::Written {
                rows: 2,
                path: path.clone()
            }
        );

        let imported = read_file(&path).unwrap();
        let originals = rows();
        assert_eq!(imported.len(), originals.len());
        for (imported, original) in imported.iter().zip(&originals) {
            assert_eq!(imported.sale.name, original.name);
            assert_eq!(imported.sale.quantity, original.quantity);
            assert_eq!(imported.sale.unit_price, original.unit_price);
            assert_eq!(imported.timestamp, original.timestamp);
        }
    }

    #[test]
    fn test_export_to_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nao-existe").join("saidas.csv");

        let err = export(&rows(), &path, ExportOptions::default()).unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }));
    }
}

use anyhow::Result;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

use crate::app::formatter::{long_date, FlatRecord};
use crate::domain::report::{ReportFormat, ReportType};

const HEADER_FILL: Color = Color::RGB(0x2F5496);
const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 60;

/// Rows 1-5 of every export: title, type label, generation timestamp,
/// record count, blank. Data starts at row 7 behind the header row.
const METADATA_ROWS: u32 = 5;

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub file_path: String,
}

/// Renders flat records into a tabular file under the configured
/// reports directory. The directory is an explicit constructor
/// argument; the exporter never derives paths from its own location.
#[derive(Clone)]
pub struct WorkbookExporter {
    reports_dir: PathBuf,
}

impl WorkbookExporter {
    pub fn new(reports_dir: PathBuf) -> Self {
        Self { reports_dir }
    }

    /// Write one export file and return its name and stored path.
    /// Write errors propagate; the caller decides what to do about a
    /// partial file.
    pub fn export(
        &self,
        records: &[FlatRecord],
        report_name: &str,
        report_type: ReportType,
        format: ReportFormat,
    ) -> Result<ExportedFile> {
        fs::create_dir_all(&self.reports_dir)?;

        let generated_at = OffsetDateTime::now_utc();
        let unix_ms = (generated_at.unix_timestamp_nanos() / 1_000_000) as i64;
        let file_name = export_file_name(report_type, format, unix_ms);
        let path = self.reports_dir.join(&file_name);

        match format {
            ReportFormat::Csv => {
                let content = render_csv(records, report_name, report_type, generated_at);
                fs::write(&path, content)?;
            }
            ReportFormat::Excel => {
                write_workbook(&path, records, report_name, report_type, generated_at)?;
            }
        }

        Ok(ExportedFile {
            file_name,
            file_path: path.to_string_lossy().into_owned(),
        })
    }
}

pub fn export_file_name(report_type: ReportType, format: ReportFormat, unix_ms: i64) -> String {
    format!("{}_{}.{}", report_type.as_db(), unix_ms, format.extension())
}

/// CSV rendition of the workbook layout. Same rows as the xlsx arm,
/// minus styling, which CSV cannot express.
fn render_csv(
    records: &[FlatRecord],
    report_name: &str,
    report_type: ReportType,
    generated_at: OffsetDateTime,
) -> String {
    let mut out = String::new();
    out.push_str(&csv_field(report_name));
    out.push('\n');
    out.push_str(&format!("Report Type,{}\n", report_type.label()));
    out.push_str(&format!(
        "Generated At,{}\n",
        csv_field(&long_date(generated_at))
    ));
    out.push_str(&format!("Total Records,{}\n", records.len()));
    out.push('\n');

    if let Some(first) = records.first() {
        let header: Vec<String> = first.iter().map(|(label, _)| csv_field(label)).collect();
        out.push_str(&header.join(","));
        out.push('\n');

        for record in records {
            let values: Vec<String> = record.iter().map(|(_, value)| csv_field(value)).collect();
            out.push_str(&values.join(","));
            out.push('\n');
        }
    }

    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_workbook(
    path: &Path,
    records: &[FlatRecord],
    report_name: &str,
    report_type: ReportType,
    generated_at: OffsetDateTime,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let title_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_font_size(14);
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_FILL)
        .set_border(FormatBorder::Thin);
    let data_format = Format::new().set_border(FormatBorder::Thin);

    let column_count = records.first().map(|r| r.len()).unwrap_or(0);

    if column_count > 1 {
        worksheet.merge_range(0, 0, 0, (column_count - 1) as u16, report_name, &title_format)?;
    } else {
        worksheet.write_string_with_format(0, 0, report_name, &title_format)?;
    }
    worksheet.write_string(1, 0, "Report Type")?;
    worksheet.write_string(1, 1, report_type.label())?;
    worksheet.write_string(2, 0, "Generated At")?;
    worksheet.write_string(2, 1, long_date(generated_at))?;
    worksheet.write_string(3, 0, "Total Records")?;
    worksheet.write_number(3, 1, records.len() as f64)?;
    // row 5 (index 4) stays blank

    if let Some(first) = records.first() {
        for (col, (label, _)) in first.iter().enumerate() {
            worksheet.write_string_with_format(METADATA_ROWS, col as u16, *label, &header_format)?;
        }

        for (row_index, record) in records.iter().enumerate() {
            for (col, (_, value)) in record.iter().enumerate() {
                worksheet.write_string_with_format(
                    METADATA_ROWS + 1 + row_index as u32,
                    col as u16,
                    value.as_str(),
                    &data_format,
                )?;
            }
        }

        for col in 0..column_count {
            let mut width = first[col].0.chars().count();
            for record in records {
                width = width.max(record[col].1.chars().count());
            }
            let width = width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
            worksheet.set_column_width(col as u16, width as f64)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

use chrono::DateTime;
use chrono_tz::Tz;
use csv::WriterBuilder;
use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::{ReportError, ReportResult};
use crate::models::attendance::AttendanceRow;

pub const HEADERS: [&str; 3] = ["Meeting Date", "Meeting Time", "Participant Name"];
pub const SHEET_NAME: &str = "Attendance Report";

const MAX_COLUMN_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
        }
    }

    /// MIME type used for the email attachment
    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ReportFormat::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Deterministic file name from the meeting label and generation time,
/// e.g. `zoom_attendance_469737038_20250612_100000.xlsx`.
pub fn report_file_name(meeting_label: &str, generated_at: &DateTime<Tz>, format: ReportFormat) -> String {
    let label: String = meeting_label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!(
        "zoom_attendance_{}_{}.{}",
        label,
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Write the attendance table to `dir/file_name`.
///
/// The header row is always written, so an empty table yields a
/// header-only file. The directory is created when missing.
pub fn write_report(
    rows: &[AttendanceRow],
    dir: &Path,
    file_name: &str,
    format: ReportFormat,
) -> ReportResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| {
        error!("Failed to create output directory {}: {}", dir.display(), e);
        ReportError::Render(format!("cannot create {}: {}", dir.display(), e))
    })?;

    let path = dir.join(file_name);
    match format {
        ReportFormat::Xlsx => write_xlsx(rows, &path)?,
        ReportFormat::Csv => write_csv(rows, &path)?,
    }

    info!(rows = rows.len(), "Report saved: {}", path.display());
    Ok(path)
}

fn row_values(row: &AttendanceRow) -> [String; 3] {
    [row.date_label(), row.time_label(), row.participant_name.clone()]
}

fn write_xlsx(rows: &[AttendanceRow], path: &Path) -> ReportResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(render_error)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new().set_border(FormatBorder::Thin);

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(render_error)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(render_error)?;

    for (index, row) in rows.iter().enumerate() {
        let excel_row = (index + 1) as u32;
        for (col, value) in row_values(row).iter().enumerate() {
            worksheet
                .write_with_format(excel_row, col as u16, value.as_str(), &cell_format)
                .map_err(render_error)?;
            widths[col] = widths[col].max(value.chars().count());
        }
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (width + 2).min(MAX_COLUMN_WIDTH);
        worksheet
            .set_column_width(col as u16, width as f64)
            .map_err(render_error)?;
    }

    workbook.save(path).map_err(render_error)
}

fn write_csv(rows: &[AttendanceRow], path: &Path) -> ReportResult<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(render_error)?;

    writer.write_record(HEADERS).map_err(render_error)?;
    for row in rows {
        writer.write_record(row_values(row)).map_err(render_error)?;
    }

    writer.flush().map_err(render_error)
}

fn render_error<E: fmt::Display>(e: E) -> ReportError {
    error!("Failed to write report: {}", e);
    ReportError::Render(e.to_string())
}

//! Spreadsheet report export.
//!
//! Results are written into a fixed template workbook: one row per result
//! starting at row 2 (row 1 is the template's header row), fifteen fixed
//! columns, and conditional styling on the verdict cell. The column order
//! and count are a compatibility contract with the template and must not
//! change independently of it.

use crate::error::{EvalError, Result};
use crate::types::{EvaluationResult, Verdict};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use umya_spreadsheet::{reader, writer, Border, Worksheet};

/// Well-known template location, relative to the working directory.
pub const REPORT_TEMPLATE_PATH: &str = "templates/report_template.xlsx";
/// Worksheet written to; the first sheet is used when this one is absent.
pub const REPORT_SHEET_NAME: &str = "Results";
/// Default output file name.
pub const REPORT_OUTPUT_PATH: &str = "evaluation_report.xlsx";

/// First row holding results; row 1 is reserved for headers.
const FIRST_DATA_ROW: u32 = 2;
/// Column index (1-based) of the final verdict cell.
const VERDICT_COLUMN: u32 = 14;
/// Total column count of the fixed layout.
pub const COLUMN_COUNT: u32 = 15;

// Excel's classic "Good"/"Bad" cell styles.
const PASS_FILL: &str = "FFC6EFCE";
const PASS_FONT: &str = "FF006100";
const FAIL_FILL: &str = "FFFFC7CE";
const FAIL_FONT: &str = "FF9C0006";

/// Header labels of the fixed column layout, in order.
pub const COLUMN_HEADERS: [&str; COLUMN_COUNT as usize] = [
    "Question",
    "Expected Answer",
    "Obtained Answer",
    "Correctness Score",
    "Correctness Comment",
    "Coverage Score",
    "Coverage Comment",
    "Relevance Score",
    "Relevance Comment",
    "Faithfulness Score",
    "Faithfulness Comment",
    "Clarity Score",
    "Clarity Comment",
    "Final Verdict",
    "Final Comment",
];

/// Write a fresh template workbook with the header row to `path`.
pub fn create_default_template(path: impl AsRef<Path>) -> Result<()> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| EvalError::Report("new workbook has no worksheet".to_string()))?;
    sheet.set_name(REPORT_SHEET_NAME);
    for (index, header) in COLUMN_HEADERS.iter().enumerate() {
        let cell = sheet.get_cell_mut((index as u32 + 1, 1));
        cell.set_value(*header);
        cell.get_style_mut().get_font_mut().set_bold(true);
    }
    writer::xlsx::write(&book, path.as_ref())
        .map_err(|e| EvalError::Report(format!("cannot write template: {e}")))
}

/// Builds spreadsheet reports from a template file.
pub struct ReportBuilder {
    template_path: PathBuf,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(REPORT_TEMPLATE_PATH)
    }
}

impl ReportBuilder {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    /// Render the results into the template and return the workbook bytes.
    ///
    /// Template missing or unreadable is an error; no partial document is
    /// ever produced.
    pub fn build(&self, results: &[EvaluationResult]) -> Result<Vec<u8>> {
        let mut book = reader::xlsx::read(&self.template_path).map_err(|e| {
            EvalError::Report(format!(
                "cannot read template {}: {e}",
                self.template_path.display()
            ))
        })?;

        let has_named_sheet = book.get_sheet_by_name(REPORT_SHEET_NAME).is_some();
        let sheet = if has_named_sheet {
            book.get_sheet_by_name_mut(REPORT_SHEET_NAME)
                .expect("sheet presence checked above")
        } else {
            book.get_sheet_mut(&0)
                .ok_or_else(|| EvalError::Report("template has no worksheets".to_string()))?
        };

        for (offset, result) in results.iter().enumerate() {
            write_result_row(sheet, FIRST_DATA_ROW + offset as u32, result);
        }

        let mut buffer = Cursor::new(Vec::new());
        writer::xlsx::write_writer(&book, &mut buffer)
            .map_err(|e| EvalError::Report(format!("cannot serialize workbook: {e}")))?;
        Ok(buffer.into_inner())
    }

    /// Render and write the workbook to `out_path`.
    pub fn export_to_file(
        &self,
        results: &[EvaluationResult],
        out_path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.build(results)?;
        std::fs::write(out_path.as_ref(), bytes)
            .map_err(|e| EvalError::Report(format!("cannot write report: {e}")))?;
        Ok(())
    }
}

fn write_result_row(sheet: &mut Worksheet, row: u32, result: &EvaluationResult) {
    sheet
        .get_cell_mut((1, row))
        .set_value(result.question.clone());
    sheet
        .get_cell_mut((2, row))
        .set_value(result.expected_answer.clone());
    sheet
        .get_cell_mut((3, row))
        .set_value(result.obtained_answer.clone());

    // (score, comment) pairs in the fixed criterion order.
    let mut col = 4;
    for score in result.verdict.scores() {
        sheet.get_cell_mut((col, row)).set_value_number(score.score);
        sheet
            .get_cell_mut((col + 1, row))
            .set_value(score.comment.clone());
        col += 2;
    }

    let verdict = result.verdict.final_verdict;
    sheet
        .get_cell_mut((VERDICT_COLUMN, row))
        .set_value(verdict.to_string());
    sheet
        .get_cell_mut((COLUMN_COUNT, row))
        .set_value(result.verdict.final_comment.clone());

    style_verdict_cell(sheet, row, verdict);
}

fn style_verdict_cell(sheet: &mut Worksheet, row: u32, verdict: Verdict) {
    let (fill, font) = match verdict {
        Verdict::Pass => (PASS_FILL, PASS_FONT),
        Verdict::Fail => (FAIL_FILL, FAIL_FONT),
    };

    let style = sheet.get_style_mut((VERDICT_COLUMN, row));
    style.set_background_color(fill);
    let f = style.get_font_mut();
    f.set_bold(true);
    f.get_color_mut().set_argb(font);

    let borders = style.get_borders_mut();
    borders
        .get_left_border_mut()
        .set_border_style(Border::BORDER_THIN);
    borders
        .get_right_border_mut()
        .set_border_style(Border::BORDER_THIN);
    borders
        .get_top_border_mut()
        .set_border_style(Border::BORDER_THIN);
    borders
        .get_bottom_border_mut()
        .set_border_style(Border::BORDER_THIN);
}

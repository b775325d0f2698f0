//! End-to-end journal generation.
//!
//! [`run_journal`] takes one request from an uploaded workbook to a journal
//! file on disk. Checks run in a fixed order so that a caller always sees the
//! first problem with its input: file type, workbook and sheet, posting
//! date, department column, aggregation columns, department codes.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::{NamedTempFile, TempDir};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::journal::{JournalContext, PostingPeriod, build_journal};
use crate::models::{JournalBatch, SalaryComponent};
use crate::workbook::{
    FormatConverter, InjectionReport, XlsxPackage, convert_legacy_workbook, inject_journal,
    read_payroll_sheet, write_plain_journal,
};

/// The file name of a plain journal workbook.
pub const PLAIN_OUTPUT_FILE: &str = "processed_output.xlsx";

/// Message reported for files that are not workbooks.
pub const UNSUPPORTED_FILE_TYPE: &str = "Only .xls and .xlsx files are supported.";

/// The kind of workbook a request produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// A new workbook holding only the journal.
    #[default]
    Plain,
    /// The uploaded workbook with the journal added as a sheet.
    PreserveWorkbook,
}

/// The workbook format, from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// Office Open XML, `.xlsx`.
    Xlsx,
    /// Legacy binary, `.xls`.
    Xls,
}

impl WorkbookFormat {
    /// Detects the format from a file name, case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_jv::pipeline::WorkbookFormat;
    ///
    /// assert_eq!(WorkbookFormat::from_file_name("Payroll.XLSX").unwrap(), WorkbookFormat::Xlsx);
    /// assert!(WorkbookFormat::from_file_name("payroll.csv").is_err());
    /// ```
    pub fn from_file_name(file_name: &str) -> EngineResult<Self> {
        let extension = Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        match extension.as_deref() {
            Some("xlsx") => Ok(WorkbookFormat::Xlsx),
            Some("xls") => Ok(WorkbookFormat::Xls),
            _ => Err(EngineError::UnsupportedFileType {
                message: UNSUPPORTED_FILE_TYPE.to_string(),
            }),
        }
    }
}

/// One journal request.
#[derive(Debug, Clone)]
pub struct JournalRequest {
    /// Where the uploaded workbook is stored.
    pub input_path: PathBuf,
    /// The name the workbook was uploaded under. Defaults to the file name
    /// of `input_path`; it decides the format and the output name.
    pub file_name: Option<String>,
    /// The payroll sheet to read.
    pub sheet_name: String,
    /// The posting date, `dd/mm/yy`.
    pub posting_date: String,
    /// The journal code.
    pub journal_code: String,
    /// What to write.
    pub mode: OutputMode,
}

impl JournalRequest {
    /// The upload name of the workbook.
    pub fn upload_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| {
            self.input_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }
}

/// The result of a successful request.
#[derive(Debug, Clone)]
pub struct JournalOutput {
    /// The written workbook.
    pub path: PathBuf,
    /// Its file name.
    pub file_name: String,
    /// The journal sheet added to the uploaded workbook, in preserve mode.
    pub sheet_name: Option<String>,
    /// What injection did, in preserve mode.
    pub injection: Option<InjectionReport>,
    /// The journal lines and how they were built.
    pub batch: JournalBatch,
}

/// Runs one journal request and writes its output into `output_dir`.
///
/// Outputs are staged in `output_dir` and only renamed into place once
/// fully written, so a failed request never leaves a partial file behind.
/// Preserve mode needs `converter` for `.xls` workbooks.
pub fn run_journal(
    request: &JournalRequest,
    output_dir: &Path,
    converter: Option<&dyn FormatConverter>,
) -> EngineResult<JournalOutput> {
    let start = Instant::now();
    let upload_name = request.upload_name();
    let format = WorkbookFormat::from_file_name(&upload_name)?;

    let table = read_payroll_sheet(&request.input_path, &request.sheet_name)?;
    let period = PostingPeriod::parse(&request.posting_date)?;
    let context = JournalContext {
        period: period.clone(),
        journal_code: request.journal_code.clone(),
    };
    let batch = build_journal(&table, &SalaryComponent::ALL, &context)?;

    std::fs::create_dir_all(output_dir).map_err(|e| EngineError::io(output_dir, e))?;

    let output = match request.mode {
        OutputMode::Plain => {
            let target = output_dir.join(PLAIN_OUTPUT_FILE);
            let staged = stage(output_dir)?;
            write_plain_journal(staged.path(), &batch.lines)?;
            promote(staged, &target)?;
            JournalOutput {
                path: target,
                file_name: PLAIN_OUTPUT_FILE.to_string(),
                sheet_name: None,
                injection: None,
                batch,
            }
        }
        OutputMode::PreserveWorkbook => {
            let stem = Path::new(&upload_name)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file_name = period.output_file_name(&stem);
            let target = output_dir.join(&file_name);
            let sheet_name = period.sheet_name();

            // Keeps a converted copy alive until the package is loaded.
            let scratch = TempDir::new().map_err(|e| EngineError::io(output_dir, e))?;
            let source = match format {
                WorkbookFormat::Xlsx => request.input_path.clone(),
                WorkbookFormat::Xls => {
                    let converter = converter.ok_or_else(|| EngineError::ConversionFailed {
                        message: "no converter is configured for .xls workbooks".to_string(),
                    })?;
                    let converted = scratch.path().join("converted.xlsx");
                    convert_legacy_workbook(converter, &request.input_path, &converted)?;
                    converted
                }
            };

            let mut package = XlsxPackage::open(&source)?;
            let injection = inject_journal(&mut package, &sheet_name, &batch.lines)?;
            let staged = stage(output_dir)?;
            package.save(staged.path())?;
            promote(staged, &target)?;
            JournalOutput {
                path: target,
                file_name,
                sheet_name: Some(sheet_name),
                injection: Some(injection),
                batch,
            }
        }
    };

    info!(
        file = %upload_name,
        rows = output.batch.summary.rows_read,
        departments = output.batch.summary.departments,
        lines = output.batch.lines.len(),
        warnings = output.batch.warnings.len(),
        output = %output.path.display(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Journal written"
    );

    Ok(output)
}

fn stage(output_dir: &Path) -> EngineResult<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(".jv-")
        .suffix(".xlsx")
        .tempfile_in(output_dir)
        .map_err(|e| EngineError::io(output_dir, e))
}

fn promote(staged: NamedTempFile, target: &Path) -> EngineResult<()> {
    staged
        .persist(target)
        .map(|_| ())
        .map_err(|e| EngineError::io(target, e))
}

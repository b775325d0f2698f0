//! Legacy `.xls` conversion.
//!
//! `.xls` workbooks can be read but not edited in place, so a workbook that
//! must keep its content is first converted to `.xlsx` by an external tool.
//! The tool sits behind [`FormatConverter`]; whatever it reports, its output
//! is checked with [`verify_converted_artifact`] before anything reads it.

use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use zip::ZipArchive;

use crate::config::ConverterConfig;
use crate::error::{EngineError, EngineResult};

/// Placeholder replaced by the input path in converter arguments.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Placeholder replaced by the output path in converter arguments.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

const ZIP_SIGNATURE: &[u8; 4] = b"PK\x03\x04";
const REQUIRED_PARTS: [&str; 2] = ["[Content_Types].xml", "xl/workbook.xml"];
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const DIAGNOSTIC_LIMIT: usize = 2000;

/// Converts a legacy workbook to `.xlsx`.
pub trait FormatConverter: Send + Sync {
    /// Writes an `.xlsx` rendition of `input` to `output`.
    fn convert(&self, input: &Path, output: &Path) -> EngineResult<()>;
}

/// A converter that runs an external program.
///
/// # Example
///
/// ```
/// use payroll_jv::config::ConverterConfig;
/// use payroll_jv::workbook::ExternalConverter;
///
/// let converter = ExternalConverter::new(&ConverterConfig {
///     program: "java".to_string(),
///     args: vec![
///         "-jar".to_string(),
///         "xls-xlsx-converter.jar".to_string(),
///         "{input}".to_string(),
///         "{output}".to_string(),
///     ],
///     timeout_secs: Some(120),
/// });
/// assert_eq!(converter.program(), "java");
/// ```
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ExternalConverter {
    /// Creates a converter from its configuration.
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: config
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    /// The program that is run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments for one conversion, placeholders substituted.
    pub fn arguments(&self, input: &Path, output: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                INPUT_PLACEHOLDER => input.as_os_str().to_owned(),
                OUTPUT_PLACEHOLDER => output.as_os_str().to_owned(),
                other => OsString::from(
                    other
                        .replace(INPUT_PLACEHOLDER, &input.to_string_lossy())
                        .replace(OUTPUT_PLACEHOLDER, &output.to_string_lossy()),
                ),
            })
            .collect()
    }

    fn wait(&self, mut child: Child) -> EngineResult<ExitStatus> {
        let Some(limit) = self.timeout else {
            return child.wait().map_err(|e| self.failure(format!("wait failed: {}", e)));
        };

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if start.elapsed() >= limit => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self.failure(format!(
                        "timed out after {}s",
                        limit.as_secs()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self.failure(format!("status check failed: {}", e)));
                }
            }
        }
    }

    fn failure(&self, detail: String) -> EngineError {
        EngineError::ConversionFailed {
            message: format!("{}: {}", self.program, detail),
        }
    }
}

impl FormatConverter for ExternalConverter {
    fn convert(&self, input: &Path, output: &Path) -> EngineResult<()> {
        // stdout and stderr go to unnamed temp files, never pipes.
        let mut stdout = tempfile::tempfile().map_err(|e| EngineError::io(input, e))?;
        let mut stderr = tempfile::tempfile().map_err(|e| EngineError::io(input, e))?;

        let args = self.arguments(input, output);
        debug!(program = %self.program, ?args, "Starting converter");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(clone_handle(&stdout, input)?)
            .stderr(clone_handle(&stderr, input)?)
            .spawn()
            .map_err(|e| self.failure(format!("could not start: {}", e)))?;

        let status = self.wait(child)?;
        if status.success() {
            return Ok(());
        }

        let code = status
            .code()
            .map_or_else(|| "none".to_string(), |c| c.to_string());
        let stderr = read_diagnostics(&mut stderr);
        let stdout = read_diagnostics(&mut stdout);
        let detail = if stderr.is_empty() { stdout } else { stderr };
        if detail.is_empty() {
            Err(self.failure(format!("exited with code {}", code)))
        } else {
            Err(self.failure(format!("exited with code {}: {}", code, detail)))
        }
    }
}

fn clone_handle(file: &File, context: &Path) -> EngineResult<Stdio> {
    file.try_clone()
        .map(Stdio::from)
        .map_err(|e| EngineError::io(context, e))
}

fn read_diagnostics(file: &mut File) -> String {
    let mut content = String::new();
    if file.seek(SeekFrom::Start(0)).is_ok() {
        let _ = file
            .take(DIAGNOSTIC_LIMIT as u64)
            .read_to_string(&mut content);
    }
    content.trim().to_string()
}

/// Checks that a converter produced a usable `.xlsx`.
///
/// Rejects a missing or empty file, a file without the zip signature, and a
/// zip that lacks `[Content_Types].xml` or `xl/workbook.xml`.
pub fn verify_converted_artifact(path: &Path) -> EngineResult<()> {
    let reject = |reason: &str| EngineError::ConversionFailed {
        message: format!("{} ({})", reason, path.display()),
    };

    let mut file = File::open(path).map_err(|_| reject("no output was produced"))?;
    let size = file
        .metadata()
        .map_err(|e| EngineError::io(path, e))?
        .len();
    if size == 0 {
        return Err(reject("output is empty"));
    }

    let mut signature = [0u8; 4];
    if file.read_exact(&mut signature).is_err() || &signature != ZIP_SIGNATURE {
        return Err(reject("output is not an xlsx package"));
    }
    file.seek(SeekFrom::Start(0))
        .map_err(|e| EngineError::io(path, e))?;

    let archive = ZipArchive::new(file).map_err(|_| reject("output is not a readable zip"))?;
    for part in REQUIRED_PARTS {
        if archive.index_for_name(part).is_none() {
            return Err(reject(&format!("output has no {}", part)));
        }
    }
    Ok(())
}

/// Converts `input` to `output` and verifies the result.
pub fn convert_legacy_workbook(
    converter: &dyn FormatConverter,
    input: &Path,
    output: &Path,
) -> EngineResult<()> {
    let start = Instant::now();
    converter.convert(input, output)?;
    verify_converted_artifact(output)?;
    info!(
        input = %input.display(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Converted legacy workbook"
    );
    Ok(())
}

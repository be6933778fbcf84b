//! File layout and text formats of the logger output.
//!
//! ```text
//! <folder>/
//!   <suite>_<ind>.info                 summary, shared by all problems
//!   <suite>/<prefix>_<ind>.dat         indicator value at target hits
//!   archive/<prefix>_nondom_all.dat    non-dominated solutions
//! ```
//!
//! All files are opened for appending so that several runs (or several
//! processes) can accumulate into the same folder. Numbers use the
//! `%.*e` notation of C `printf`, which the post-processing expects.

use core::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::archive::ArchiveNode;
use crate::error::{Error, Result};
use crate::indicator::IndicatorKind;
use crate::observer::LogNondominated;
use crate::problem::ProblemInfo;

/// A float printed like C's `%.*e`: `1.500000e-01`, `-2.5e+10`, `inf`.
#[derive(Clone, Copy, Debug)]
pub struct Scientific {
    value: f64,
    precision: usize,
}

impl Scientific {
    /// Formats `value` with `precision` digits after the decimal point.
    #[must_use]
    pub fn new(value: f64, precision: usize) -> Self {
        Self { value, precision }
    }
}

impl fmt::Display for Scientific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_nan() {
            return f.write_str("nan");
        }
        if self.value.is_infinite() {
            return f.write_str(if self.value > 0.0 { "inf" } else { "-inf" });
        }
        let rust = format!("{:.*e}", self.precision, self.value);
        let (mantissa, exponent) = rust.split_once('e').ok_or(fmt::Error)?;
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

/// File-name prefix of a problem: the id without its instance segment.
///
/// Everything from the first `_i` up to the following `_d` is removed, so
/// all instances of a function and dimension share one file.
///
/// ```
/// use biobj_logger::output::file_prefix;
///
/// assert_eq!(file_prefix("bbob-biobj_f01_i04_d10"), "bbob-biobj_f01_d10");
/// assert_eq!(file_prefix("toy"), "toy");
/// ```
#[must_use]
pub fn file_prefix(id: &str) -> String {
    let Some(start) = id.find("_i") else {
        return id.to_string();
    };
    match id[start..].find("_d") {
        Some(len) => format!("{}{}", &id[..start], &id[start + len..]),
        None => id.to_string(),
    }
}

pub(crate) fn solutions_path(folder: &Path, prefix: &str, mode: LogNondominated) -> PathBuf {
    let suffix = match mode {
        LogNondominated::Final => "final",
        LogNondominated::All | LogNondominated::None => "all",
    };
    folder
        .join("archive")
        .join(format!("{prefix}_nondom_{suffix}.dat"))
}

pub(crate) fn indicator_log_name(prefix: &str, kind: IndicatorKind) -> String {
    format!("{prefix}_{kind}.dat")
}

pub(crate) fn indicator_log_path(
    folder: &Path,
    suite: &str,
    prefix: &str,
    kind: IndicatorKind,
) -> PathBuf {
    folder.join(suite).join(indicator_log_name(prefix, kind))
}

pub(crate) fn info_path(folder: &Path, suite: &str, kind: IndicatorKind) -> PathBuf {
    folder.join(format!("{suite}_{kind}.info"))
}

/// Opens `path` for appending, creating missing parent directories.
fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(Error::io(parent))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(Error::io(path))
}

/// Writer of the non-dominated solutions file.
pub(crate) struct SolutionWriter {
    out: BufWriter<File>,
    path: PathBuf,
    log_variables: bool,
    precision_x: usize,
    precision_f: usize,
}

impl SolutionWriter {
    /// Opens the file and writes the per-problem header.
    pub(crate) fn create(
        path: PathBuf,
        info: &ProblemInfo,
        log_variables: bool,
        precision_x: usize,
        precision_f: usize,
    ) -> Result<Self> {
        let out = BufWriter::new(open_append(&path)?);
        let mut writer = Self {
            out,
            path,
            log_variables,
            precision_x,
            precision_f,
        };
        writer.write_header(info)?;
        Ok(writer)
    }

    fn write_header(&mut self, info: &ProblemInfo) -> Result<()> {
        let objectives = info.number_of_objectives;
        let result = if self.log_variables {
            writeln!(
                self.out,
                "% instance = {}, name = {}\n% function evaluation | {objectives} objectives | {} variables",
                info.instance, info.name, info.dimension
            )
        } else {
            writeln!(
                self.out,
                "% instance = {}, name = {}\n% function evaluation | {objectives} objectives ",
                info.instance, info.name
            )
        };
        result.map_err(Error::io(&self.path))
    }

    /// Writes one row per node, in iteration order. Returns the row count.
    pub(crate) fn write_nodes<'a>(
        &mut self,
        nodes: impl IntoIterator<Item = &'a ArchiveNode>,
    ) -> Result<usize> {
        let mut rows = 0;
        for node in nodes {
            self.write_node(node).map_err(Error::io(&self.path))?;
            rows += 1;
        }
        Ok(rows)
    }

    fn write_node(&mut self, node: &ArchiveNode) -> std::io::Result<()> {
        write!(self.out, "{}\t", node.time_stamp())?;
        for v in node.y() {
            write!(self.out, "{}\t", Scientific::new(v, self.precision_f))?;
        }
        if self.log_variables {
            for &v in node.x() {
                write!(self.out, "{}\t", Scientific::new(v, self.precision_x))?;
            }
        }
        writeln!(self.out)
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(Error::io(&self.path))
    }
}

/// Writer of one indicator's `.dat` log.
pub(crate) struct IndicatorLog {
    out: BufWriter<File>,
    path: PathBuf,
    precision_f: usize,
}

impl IndicatorLog {
    pub(crate) fn create(
        path: PathBuf,
        info: &ProblemInfo,
        reference_value: f64,
        precision_f: usize,
    ) -> Result<Self> {
        let mut out = BufWriter::new(open_append(&path)?);
        writeln!(
            out,
            "%\n% index = {}, name = {}\n% instance = {}, reference value = {}\n\
             % function evaluation | indicator value | target hit",
            info.index,
            info.name,
            info.instance,
            Scientific::new(reference_value, precision_f)
        )
        .map_err(Error::io(&path))?;
        Ok(Self {
            out,
            path,
            precision_f,
        })
    }

    /// Writes `evaluation  value  target`.
    pub(crate) fn write_row(&mut self, evaluation: u64, value: f64, target: f64) -> Result<()> {
        writeln!(
            self.out,
            "{evaluation}\t{}\t{}",
            Scientific::new(value, self.precision_f),
            Scientific::new(target, self.precision_f)
        )
        .map_err(Error::io(&self.path))
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(Error::io(&self.path))
    }
}

/// The `.info` summary file, shared between processes.
///
/// Every write holds an exclusive advisory lock for its duration.
pub(crate) struct InfoFile {
    file: File,
    path: PathBuf,
}

impl InfoFile {
    /// Opens the summary, writing the algorithm header if the file is empty.
    pub(crate) fn open(
        path: PathBuf,
        algorithm_name: &str,
        algorithm_info: &str,
        kind: IndicatorKind,
        suite: &str,
    ) -> Result<Self> {
        let file = open_append(&path)?;
        let mut info = Self { file, path };
        info.locked(|file| {
            if file.metadata()?.len() == 0 {
                write!(
                    file,
                    "algorithm = '{algorithm_name}', indicator = '{kind}', folder = '{suite}'\n% {algorithm_info}"
                )?;
            }
            Ok(())
        })?;
        Ok(info)
    }

    /// Starts a `function, dim` group line.
    pub(crate) fn write_group(&mut self, function: usize, dimension: usize, log_name: &str) -> Result<()> {
        self.locked(|file| write!(file, "\nfunction = {function:2}, dim = {dimension:2}, {log_name}"))
    }

    /// Appends the `instance:evaluations|value` summary of one run.
    pub(crate) fn write_summary(&mut self, instance: usize, evaluations: u64, value: f64) -> Result<()> {
        self.locked(|file| write!(file, ", {instance}:{evaluations}|{}", Scientific::new(value, 1)))
    }

    fn locked(&mut self, f: impl FnOnce(&mut File) -> std::io::Result<()>) -> Result<()> {
        self.file.lock_exclusive().map_err(Error::io(&self.path))?;
        let written = f(&mut self.file).and_then(|()| self.file.flush());
        let unlocked = self.file.unlock();
        written.map_err(Error::io(&self.path))?;
        unlocked.map_err(Error::io(&self.path))
    }
}

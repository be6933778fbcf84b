//! The logging wrapper around a problem.
//!
//! [`BiobjLogger`] is itself a [`Problem`]: every call to
//! [`evaluate`](Problem::evaluate) is forwarded to the wrapped problem and the
//! result is fed into the non-dominated archive. Depending on the
//! [`ObserverOptions`](crate::observer::ObserverOptions) new archive members
//! are written out immediately, indicator values are logged whenever a target
//! is hit or the evaluation is scheduled, and the final state is written when
//! the logger is [finished](BiobjLogger::finish) or dropped.

use crate::archive::{Archive, ArchiveNode};
use crate::error::{Error, Result};
use crate::indicator::Indicator;
use crate::observer::{LogNondominated, Observer};
use crate::output::{self, IndicatorLog, InfoFile, SolutionWriter};
use crate::pareto::RegionOfInterest;
use crate::problem::{Problem, ProblemInfo};
use crate::targets::EvaluationSchedule;

/// Output files of one tracked indicator.
struct IndicatorOutput {
    log: IndicatorLog,
    summary: InfoFile,
    /// Whether a row was written for the latest evaluation.
    logged: bool,
}

/// Everything the logger owns apart from the wrapped problem.
struct LoggerState {
    info: ProblemInfo,
    roi: RegionOfInterest,
    archive: Archive,
    indicators: Vec<Indicator>,
    outputs: Vec<IndicatorOutput>,
    solutions: Option<SolutionWriter>,
    mode: LogNondominated,
    schedule: EvaluationSchedule,
    evaluations: u64,
    finished: bool,
}

/// A problem wrapper that archives and logs every evaluation.
///
/// Created by [`Observer::observe`]. Call [`finish`](Self::finish) to write
/// the closing output and get the wrapped problem back; dropping the logger
/// performs the same teardown but can only report failures through
/// `tracing`.
pub struct BiobjLogger<P: Problem> {
    inner: Option<P>,
    state: LoggerState,
}

impl<P: Problem> BiobjLogger<P> {
    pub(crate) fn open(
        problem: P,
        observer: &Observer,
        roi: RegionOfInterest,
        indicators: Vec<Indicator>,
        new_group: bool,
    ) -> Result<Self> {
        let info = problem.info().clone();
        let options = observer.options();
        let folder = observer.output_folder();
        let prefix = output::file_prefix(&info.id);

        let solutions = match options.log_nondominated {
            LogNondominated::None => None,
            mode => Some(SolutionWriter::create(
                output::solutions_path(folder, &prefix, mode),
                &info,
                options.log_variables.applies_to(info.dimension),
                options.precision_x,
                options.precision_f,
            )?),
        };

        let mut outputs = Vec::with_capacity(indicators.len());
        for indicator in &indicators {
            let kind = indicator.kind();
            let mut summary = InfoFile::open(
                output::info_path(folder, &info.suite, kind),
                observer.algorithm_name(),
                observer.algorithm_info(),
                kind,
                &info.suite,
            )?;
            if new_group {
                summary.write_group(
                    info.function,
                    info.dimension,
                    &output::indicator_log_name(&prefix, kind),
                )?;
            }
            let log = IndicatorLog::create(
                output::indicator_log_path(folder, &info.suite, &prefix, kind),
                &info,
                indicator.best_value(),
                options.precision_f,
            )?;
            outputs.push(IndicatorOutput {
                log,
                summary,
                logged: false,
            });
        }

        trace_info!(
            problem = %info.id,
            folder = %folder.display(),
            indicators = indicators.len(),
            "observing problem"
        );

        let state = LoggerState {
            roi,
            archive: Archive::new(indicators.len()),
            schedule: EvaluationSchedule::new(info.dimension, &options.schedule),
            indicators,
            outputs,
            solutions,
            mode: options.log_nondominated,
            evaluations: 0,
            finished: false,
            info,
        };
        Ok(Self {
            inner: Some(problem),
            state,
        })
    }

    /// Number of evaluations so far.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.state.evaluations
    }

    /// The current non-dominated archive.
    #[must_use]
    pub fn archive(&self) -> &Archive {
        &self.state.archive
    }

    /// The tracked indicators, in configuration order.
    #[must_use]
    pub fn indicators(&self) -> &[Indicator] {
        &self.state.indicators
    }

    /// The region of interest of the wrapped problem.
    #[must_use]
    pub fn region_of_interest(&self) -> &RegionOfInterest {
        &self.state.roi
    }

    /// The wrapped problem.
    #[must_use]
    pub fn inner(&self) -> &P {
        match &self.inner {
            Some(problem) => problem,
            None => unreachable!("the problem is only taken by finish"),
        }
    }

    /// Writes the closing output, closes the files and returns the wrapped
    /// problem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the final rows cannot be written.
    pub fn finish(mut self) -> Result<P> {
        let result = self.state.teardown();
        let problem = self
            .inner
            .take()
            .ok_or(Error::Internal("logger finished twice"))?;
        result.map(|()| problem)
    }
}

impl<P: Problem> Problem for BiobjLogger<P> {
    fn info(&self) -> &ProblemInfo {
        &self.state.info
    }

    fn evaluate(&mut self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.state.info.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.state.info.dimension,
                got: x.len(),
            });
        }
        let problem = self
            .inner
            .as_mut()
            .ok_or(Error::Internal("logger already finished"))?;
        let y = problem.evaluate(x)?;
        self.state.record(x, &y)?;
        Ok(y)
    }
}

impl<P: Problem> Drop for BiobjLogger<P> {
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn drop(&mut self) {
        if let Err(error) = self.state.teardown() {
            trace_warn!(problem = %self.state.info.id, %error, "logger teardown failed");
        }
    }
}

impl LoggerState {
    /// Checks `y` and returns it as a fixed-size vector.
    fn objectives(&self, y: &[f64], evaluation: u64) -> Result<[f64; 2]> {
        let y: [f64; 2] = y
            .try_into()
            .map_err(|_| Error::ObjectiveDimensionMismatch {
                expected: 2,
                got: y.len(),
            })?;
        let bounds = self.roi.ideal();
        for (objective, (&value, &ideal)) in y.iter().zip(&bounds).enumerate() {
            if !value.is_finite() {
                return Err(Error::NonFiniteObjective {
                    objective,
                    value,
                    evaluation,
                });
            }
            if value < ideal {
                return Err(Error::BeyondIdeal {
                    objective,
                    value,
                    ideal,
                    evaluation,
                });
            }
        }
        Ok(y)
    }

    fn record(&mut self, x: &[f64], y: &[f64]) -> Result<()> {
        let evaluation = self.evaluations + 1;
        let y = self.objectives(y, evaluation)?;
        self.evaluations = evaluation;

        let node = ArchiveNode::new(x, y, evaluation, self.indicators.len());
        let changed = self
            .archive
            .update(node, &mut self.indicators, &self.roi)
            .changed();

        if changed {
            if let (LogNondominated::All, Some(writer)) = (self.mode, &mut self.solutions) {
                writer.write_nodes(self.archive.pending())?;
                writer.flush()?;
            }
            self.archive.purge_pending();
        }

        let due = self.schedule.is_due(evaluation);
        for (indicator, output) in self.indicators.iter_mut().zip(&mut self.outputs) {
            indicator.begin_evaluation();
            let hit = changed && indicator.refresh(&self.archive, &self.roi);
            if hit {
                trace_debug!(
                    evaluation,
                    indicator = %indicator.kind(),
                    value = indicator.overall_value(),
                    target = indicator.ladder().last_hit(),
                    "target hit"
                );
            }
            output.logged = hit || due;
            if output.logged {
                output.log.write_row(
                    evaluation,
                    indicator.overall_value(),
                    indicator.ladder().last_hit(),
                )?;
            }
        }
        Ok(())
    }

    /// Writes the closing output once. Every file is attempted; the first
    /// failure is returned.
    fn teardown(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let mut first_error = None;
        if let Some(writer) = &mut self.solutions {
            if self.mode == LogNondominated::Final {
                keep_first(&mut first_error, writer.write_nodes(self.archive.by_time_stamp()).map(drop));
            }
            keep_first(&mut first_error, writer.flush());
        }

        for (indicator, output) in self.indicators.iter().zip(&mut self.outputs) {
            if !output.logged {
                keep_first(
                    &mut first_error,
                    output.log.write_row(
                        self.evaluations,
                        indicator.overall_value(),
                        indicator.ladder().last_hit(),
                    ),
                );
            }
            keep_first(&mut first_error, output.log.flush());
            keep_first(
                &mut first_error,
                output.summary.write_summary(
                    self.info.instance,
                    self.evaluations,
                    indicator.overall_value(),
                ),
            );
        }

        trace_info!(
            problem = %self.info.id,
            evaluations = self.evaluations,
            archived = self.archive.len(),
            "logger finished"
        );

        first_error.map_or(Ok(()), Err)
    }
}

fn keep_first(slot: &mut Option<Error>, result: Result<()>) {
    if let Err(error) = result {
        slot.get_or_insert(error);
    }
}

//! External solver backend
//!
//! Shells out to a glpsol-style binary: the model is written to a
//! temporary LP file, the solver is invoked with a plain-text solution
//! output path, and the variable activities are read back. The binary
//! path is validated once at construction; per-call failures (spawn,
//! timeout, non-zero exit, infeasibility, unparseable output) surface as
//! typed solver errors that abort only the current problem.

use super::{Assignment, SolverPort};
use crate::errors::{Result, SolverFailureKind, SummError};
use crate::model::CoverageModel;
use rustc_hash::FxHashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Poll interval while waiting for the solver process
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Solver backend invoking an external glpsol-compatible binary
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessSolver {
    /// Create a solver backend, validating the binary path once here
    /// rather than at every call site.
    pub fn new(binary: impl Into<PathBuf>) -> Result<Self> {
        let binary = binary.into();
        if !Path::new(&binary).exists() {
            return Err(SummError::configuration(format!(
                "solver binary not found: {}",
                binary.display()
            )));
        }
        Ok(Self {
            binary,
            timeout: None,
        })
    }

    /// Set a wall-clock timeout for each solve call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn wait_with_timeout(&self, child: &mut std::process::Child) -> Result<std::process::ExitStatus> {
        let Some(timeout) = self.timeout else {
            return child
                .wait()
                .map_err(|e| SummError::solver(SolverFailureKind::Io, format!("wait failed: {e}")));
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(SummError::solver(
                            SolverFailureKind::Timeout,
                            format!("solver exceeded {}s", timeout.as_secs_f64()),
                        ));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(SummError::solver(
                        SolverFailureKind::Io,
                        format!("wait failed: {e}"),
                    ))
                }
            }
        }
    }
}

impl SolverPort for ProcessSolver {
    fn name(&self) -> &'static str {
        "process"
    }

    fn solve(&self, model: &CoverageModel) -> Result<Assignment> {
        let dir = tempfile::tempdir()
            .map_err(|e| SummError::solver(SolverFailureKind::Io, format!("tempdir: {e}")))?;
        let lp_path = dir.path().join("model.lp");
        let sol_path = dir.path().join("solution.txt");

        let mut lp_file = std::fs::File::create(&lp_path)
            .map_err(|e| SummError::solver(SolverFailureKind::Io, format!("write model: {e}")))?;
        lp_file
            .write_all(model.to_lp_format().as_bytes())
            .map_err(|e| SummError::solver(SolverFailureKind::Io, format!("write model: {e}")))?;

        let mut child = Command::new(&self.binary)
            .arg("--cpxlp")
            .arg(&lp_path)
            .arg("-o")
            .arg(&sol_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SummError::solver(SolverFailureKind::Io, format!("failed to spawn: {e}"))
            })?;

        // Drain stderr while the solver runs; a child blocked on a full
        // stderr pipe would otherwise never exit.
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SummError::solver(SolverFailureKind::Io, "no stderr handle"))?;
        let stderr = std::thread::spawn(move || {
            let mut stderr = stderr;
            let mut buf = String::new();
            let _ = std::io::Read::read_to_string(&mut stderr, &mut buf);
            buf
        });

        let status = self.wait_with_timeout(&mut child)?;
        let stderr = stderr.join().unwrap_or_default();
        if !status.success() {
            return Err(SummError::solver(
                SolverFailureKind::NonZeroExit,
                format!("solver exited with {status}: {stderr}"),
            ));
        }

        let output = std::fs::read_to_string(&sol_path).map_err(|e| {
            SummError::solver(SolverFailureKind::Io, format!("read solution: {e}"))
        })?;
        parse_solution(&output, model)
    }
}

/// Parse a glpsol plain-text solution file into a variable assignment.
///
/// Variable rows carry the variable name in their second column and the
/// activity as the first numeric field after it (a status marker column
/// may sit in between).
fn parse_solution(output: &str, model: &CoverageModel) -> Result<Assignment> {
    for line in output.lines() {
        if let Some(status) = line.trim().strip_prefix("Status:") {
            let status = status.trim();
            if status.contains("INFEASIBLE") || status.contains("UNDEFINED") {
                return Err(SummError::solver(
                    SolverFailureKind::Infeasible,
                    format!("solver reported: {status}"),
                ));
            }
        }
    }

    let known: FxHashSet<&str> = model.binary.iter().map(String::as_str).collect();
    let mut assignment = Assignment::default();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 || !known.contains(fields[1]) {
            continue;
        }
        let activity = fields[2..]
            .iter()
            .find_map(|f| f.parse::<f64>().ok())
            .ok_or_else(|| {
                SummError::solver(
                    SolverFailureKind::MalformedOutput,
                    format!("no activity value in row: {line}"),
                )
            })?;
        assignment.insert(fields[1].to_string(), u8::from(activity > 0.5));
    }

    if assignment.len() != model.binary.len() {
        return Err(SummError::solver(
            SolverFailureKind::MalformedOutput,
            format!(
                "solution covers {} of {} variables",
                assignment.len(),
                model.binary.len()
            ),
        ));
    }
    Ok(assignment)
}

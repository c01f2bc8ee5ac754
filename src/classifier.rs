//! Classifier port for the learned weighting strategy
//!
//! The external boosting classifier scores one concept occurrence per
//! feature record, returning scores in submission order. The process
//! backend writes the records to a feature file and hands it to the
//! binary as stdin; alternate backends (in-process model, remote
//! service) implement [`ClassifierPort`] without touching the weighting
//! logic.

use crate::errors::{ClassifierFailureKind, Result, SummError};
use crate::weighting::FeatureRecord;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// Poll interval while waiting for the classifier process
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Scores concept occurrences given their feature records
pub trait ClassifierPort: Send + Sync {
    /// Return one real-valued score per record, in the same order submitted
    fn score(&self, records: &[FeatureRecord]) -> Result<Vec<f64>>;
}

/// Classifier backend that shells out to a boosting-classifier binary.
///
/// The records are written one line each to a feature file, the binary
/// reads the file on stdin and prints one result line per record, whose
/// last whitespace-separated field is the score. Output is drained while
/// the child runs, so arbitrarily large batches cannot fill the pipe.
#[derive(Debug, Clone)]
pub struct ProcessClassifier {
    binary: PathBuf,
    model_stem: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessClassifier {
    /// Create a classifier backend, validating the binary path once here
    /// rather than at every call site.
    pub fn new(binary: impl Into<PathBuf>, model_stem: impl Into<PathBuf>) -> Result<Self> {
        let binary = binary.into();
        if !Path::new(&binary).exists() {
            return Err(SummError::configuration(format!(
                "classifier binary not found: {}",
                binary.display()
            )));
        }
        Ok(Self {
            binary,
            model_stem: model_stem.into(),
            timeout: None,
        })
    }

    /// Set a wall-clock timeout for each scoring call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn wait_with_timeout(&self, child: &mut Child) -> Result<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(|e| {
                SummError::classifier(ClassifierFailureKind::Io, format!("wait failed: {e}"))
            });
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(SummError::classifier(
                            ClassifierFailureKind::Timeout,
                            format!("classifier exceeded {}s", timeout.as_secs_f64()),
                        ));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(SummError::classifier(
                        ClassifierFailureKind::Io,
                        format!("wait failed: {e}"),
                    ))
                }
            }
        }
    }
}

/// Drain a child output stream on its own thread so the child never
/// blocks writing while the parent waits
fn drain<R: Read + Send + 'static>(mut stream: R) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = stream.read_to_string(&mut buf);
        buf
    })
}

impl ClassifierPort for ProcessClassifier {
    fn score(&self, records: &[FeatureRecord]) -> Result<Vec<f64>> {
        let io_err = |e: std::io::Error, what: &str| {
            SummError::classifier(ClassifierFailureKind::Io, format!("{what}: {e}"))
        };

        // The feature file is the artifact the external tool consumes;
        // stdin is redirected from it rather than piped, so the child
        // reads at its own pace.
        let dir = tempfile::tempdir().map_err(|e| io_err(e, "tempdir"))?;
        let data_path = dir.path().join("features.data");
        {
            let mut data =
                std::fs::File::create(&data_path).map_err(|e| io_err(e, "write feature file"))?;
            for record in records {
                writeln!(data, "{}", record.to_line())
                    .map_err(|e| io_err(e, "write feature file"))?;
            }
        }
        let data = std::fs::File::open(&data_path).map_err(|e| io_err(e, "open feature file"))?;

        let mut child = Command::new(&self.binary)
            .arg("-S")
            .arg(&self.model_stem)
            .arg("-C")
            .stdin(Stdio::from(data))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| io_err(e, "failed to spawn"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SummError::classifier(ClassifierFailureKind::Io, "no stdout handle"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SummError::classifier(ClassifierFailureKind::Io, "no stderr handle"))?;
        let stdout = drain(stdout);
        let stderr = drain(stderr);

        let status = self.wait_with_timeout(&mut child)?;
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            return Err(SummError::classifier(
                ClassifierFailureKind::NonZeroExit,
                format!("classifier exited with {status}: {stderr}"),
            ));
        }

        let mut scores = Vec::with_capacity(records.len());
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            let last = line.split_whitespace().last().ok_or_else(|| {
                SummError::classifier(ClassifierFailureKind::MalformedOutput, "empty result line")
            })?;
            let score: f64 = last.parse().map_err(|e| {
                SummError::classifier(
                    ClassifierFailureKind::MalformedOutput,
                    format!("bad score '{last}': {e}"),
                )
            })?;
            scores.push(score);
        }

        if scores.len() != records.len() {
            return Err(SummError::classifier(
                ClassifierFailureKind::MalformedOutput,
                format!("expected {} scores, got {}", records.len(), scores.len()),
            ));
        }

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ngram: &str) -> FeatureRecord {
        FeatureRecord {
            ngram: ngram.to_string(),
            doc_freq_ratio: 1.0,
            sent_freq_ratio: 0.5,
            stopword_ratio: 0.0,
            sentence_sim: 1.0,
            sentence_order: 0,
            sentence_source: "doc0".to_string(),
            sentence_length: 5,
            title_sim: 0.0,
            narrative_sim: 0.0,
            label: 0,
        }
    }

    #[cfg(unix)]
    fn fake_classifier(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("classifier.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_missing_binary_is_configuration_error() {
        let err = ProcessClassifier::new("/nonexistent/boost", "/tmp/model").unwrap_err();
        assert!(matches!(err, SummError::Configuration { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_streaming_classifier_scores_large_batch() {
        // Emits one score line per input line as it reads, with enough
        // lines to overflow a pipe buffer were output not drained.
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_classifier(dir.path(), "awk '{printf \"%d 0.75\\n\", NR}'");
        let classifier = ProcessClassifier::new(binary, "/tmp/model")
            .unwrap()
            .with_timeout(Duration::from_secs(30));

        let records: Vec<FeatureRecord> = (0..20_000).map(|i| record(&format!("w{i}"))).collect();
        let scores = classifier.score(&records).unwrap();

        assert_eq!(scores.len(), 20_000);
        assert!(scores.iter().all(|&s| (s - 0.75).abs() < 1e-12));
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_classifier_hits_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_classifier(dir.path(), "sleep 30");
        let classifier = ProcessClassifier::new(binary, "/tmp/model")
            .unwrap()
            .with_timeout(Duration::from_millis(100));

        let err = classifier.score(&[record("cat sat")]).unwrap_err();
        assert!(err.is_classifier_timeout());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_classifier_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_classifier(dir.path(), "cat > /dev/null; exit 2");
        let classifier = ProcessClassifier::new(binary, "/tmp/model").unwrap();

        let err = classifier.score(&[record("cat sat")]).unwrap_err();
        assert!(matches!(
            err,
            SummError::Classifier {
                kind: ClassifierFailureKind::NonZeroExit,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_score_count_mismatch_is_malformed_output() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_classifier(dir.path(), "cat > /dev/null; echo '1 0.5'");
        let classifier = ProcessClassifier::new(binary, "/tmp/model").unwrap();

        let err = classifier
            .score(&[record("cat sat"), record("dog ran")])
            .unwrap_err();
        assert!(matches!(
            err,
            SummError::Classifier {
                kind: ClassifierFailureKind::MalformedOutput,
                ..
            }
        ));
    }
}

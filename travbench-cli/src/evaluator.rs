//! External Metric Evaluator
//!
//! Runs the configured program once per score. The request goes to its
//! stdin as one JSON document; the program prints a single number.
//!
//! ```text
//! {"mode":"all","input":{...}}
//! {"mode":"firstK","input":{...},"k":2,"options":{"strategy":"full",...}}
//! ```

use serde::Serialize;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;
use travbench_topology::{EvaluatorError, FirstKOptions, MetricEvaluator, MetricInput};

#[derive(Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
enum Request<'a> {
    All {
        input: &'a MetricInput,
    },
    FirstK {
        input: &'a MetricInput,
        k: usize,
        options: &'a FirstKOptions,
    },
}

/// Evaluator backed by an external program
#[derive(Debug, Clone)]
pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
}

impl CommandEvaluator {
    /// Evaluator running `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn call(&self, request: &Request<'_>) -> Result<f64, EvaluatorError> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| EvaluatorError::Failed(format!("cannot encode request: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin while the output pipes drain; either side may block on a full pipe
        let stdin = child.stdin.take();
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(&payload),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (written, output)
        });
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EvaluatorError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        // An evaluator may answer without reading all of its input
        if let Err(e) = written {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(e.into());
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        debug!(program = %self.program, output = text, "evaluator replied");
        text.parse::<f64>()
            .map_err(|_| EvaluatorError::InvalidScore(text.to_string()))
    }
}

impl MetricEvaluator for CommandEvaluator {
    fn evaluate_all(&self, input: &MetricInput) -> Result<f64, EvaluatorError> {
        self.call(&Request::All { input })
    }

    fn evaluate_first_k(
        &self,
        input: &MetricInput,
        k: usize,
        options: &FirstKOptions,
    ) -> Result<f64, EvaluatorError> {
        self.call(&Request::FirstK { input, k, options })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let input = MetricInput::default();
        let options = FirstKOptions::default();
        let json = serde_json::to_value(Request::FirstK {
            input: &input,
            k: 2,
            options: &options,
        })
        .unwrap();
        assert_eq!(json["mode"], "firstK");
        assert_eq!(json["k"], 2);
        assert_eq!(json["options"]["strategy"], "full");
        assert_eq!(json["input"]["nodeCount"], 0);
    }

    #[test]
    fn test_missing_program() {
        let evaluator = CommandEvaluator::new("travbench-no-such-evaluator", Vec::new());
        assert!(matches!(
            evaluator.evaluate_all(&MetricInput::default()),
            Err(EvaluatorError::Io(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_score_from_stdout() {
        let evaluator = CommandEvaluator::new(
            "sh",
            vec!["-c".to_string(), "cat > /dev/null; echo ' 0.25 '".to_string()],
        );
        assert_eq!(evaluator.evaluate_all(&MetricInput::default()).unwrap(), 0.25);
    }

    #[cfg(unix)]
    #[test]
    fn test_chatty_evaluator_with_large_input() {
        // Fills the stderr pipe before touching stdin
        let evaluator = CommandEvaluator::new(
            "sh",
            vec![
                "-c".to_string(),
                "head -c 262144 /dev/zero >&2; cat > /dev/null; echo 2".to_string(),
            ],
        );
        let input = MetricInput {
            contributing_nodes: vec![vec![1, 2, 3]; 50_000],
            ..MetricInput::default()
        };
        assert_eq!(evaluator.evaluate_all(&input).unwrap(), 2.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_and_garbage() {
        let failing = CommandEvaluator::new(
            "sh",
            vec!["-c".to_string(), "cat > /dev/null; echo nope >&2; exit 3".to_string()],
        );
        assert!(matches!(
            failing.evaluate_all(&MetricInput::default()),
            Err(EvaluatorError::Failed(m)) if m.contains("nope")
        ));

        let garbage = CommandEvaluator::new(
            "sh",
            vec!["-c".to_string(), "cat > /dev/null; echo score".to_string()],
        );
        assert!(matches!(
            garbage.evaluate_first_k(&MetricInput::default(), 1, &FirstKOptions::default()),
            Err(EvaluatorError::InvalidScore(s)) if s == "score"
        ));
    }
}

//! Proof certificates: an append-only log of operator applications.
//!
//! The file form is JSON lines: one `header` record, one `step` record per
//! application and a closing `footer`. Nothing time- or host-dependent is
//! written, so two runs of the same program produce identical bytes.

mod replay;

pub use replay::{replay, ReplayError, ReplayReport};

use crate::digest::Digest;
use crate::kernel::{Operator, CATALOG_VERSION};
use crate::omega::{Omega, MAX_DEPTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

const TARGET: &str = "madlad::certificate";

/// Deepest JSON nesting a record line may have. A witness of the deepest
/// allowed value nests two levels per value level, plus the record itself.
const MAX_RECORD_NESTING: usize = 2 * MAX_DEPTH + 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStep {
    pub step_index: u64,
    pub operator_id: u8,
    pub operator_name: String,
    pub input_digest: Digest,
    pub output_digest: Digest,
    pub args_summary: String,
    /// Replay witness: the subject configuration
    pub input: Omega,
    /// Replay witness: the extra arguments
    pub args: Vec<Omega>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    /// The program ran to its end
    Complete,
    /// The program stopped on an error
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub catalog_version: u32,
    pub initial_digest: Digest,
    pub steps: Vec<CertificateStep>,
    pub status: CertificateStatus,
    pub final_digest: Digest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    catalog_version: u32,
    initial_digest: Digest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Footer {
    status: CertificateStatus,
    final_digest: Digest,
    step_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record {
    Header(Header),
    Step(CertificateStep),
    Footer(Footer),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    #[error("line {line}: {message}")]
    Json { line: usize, message: String },
    #[error("line {line}: expected a {expected} record")]
    UnexpectedRecord { line: usize, expected: &'static str },
    #[error("line {line}: nested deeper than {limit} levels")]
    TooDeep { line: usize, limit: usize },
    #[error("line {line}: record after the footer")]
    TrailingRecord { line: usize },
    #[error("certificate has no header")]
    MissingHeader,
    #[error("certificate has no footer")]
    MissingFooter,
    #[error("footer declares {declared} step(s) but {found} were recorded")]
    StepCount { declared: u64, found: u64 },
}

impl Certificate {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.status == CertificateStatus::Complete
    }

    /// Names of the applied operators, in order
    pub fn operator_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.operator_name.as_str()).collect()
    }

    /// Serialize as JSON lines, each line terminated by `\n`
    pub fn encode(&self) -> Result<String, CertificateError> {
        let header = Record::Header(Header {
            catalog_version: self.catalog_version,
            initial_digest: self.initial_digest,
        });
        let footer = Record::Footer(Footer {
            status: self.status,
            final_digest: self.final_digest,
            step_count: self.steps.len() as u64,
        });

        let mut out = String::new();
        let records = std::iter::once(header)
            .chain(self.steps.iter().cloned().map(Record::Step))
            .chain(std::iter::once(footer));
        for (i, record) in records.enumerate() {
            let line = serde_json::to_string(&record).map_err(|e| CertificateError::Json {
                line: i + 1,
                message: e.to_string(),
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn decode(text: &str) -> Result<Self, CertificateError> {
        let mut header = None;
        let mut footer = None;
        let mut steps = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            if raw.trim().is_empty() {
                continue;
            }
            match parse_record(raw, line)? {
                Record::Header(h) if header.is_none() && steps.is_empty() => header = Some(h),
                Record::Header(_) => {
                    return Err(CertificateError::UnexpectedRecord {
                        line,
                        expected: "step or footer",
                    })
                }
                _ if header.is_none() => return Err(CertificateError::MissingHeader),
                _ if footer.is_some() => return Err(CertificateError::TrailingRecord { line }),
                Record::Step(step) => steps.push(step),
                Record::Footer(f) => footer = Some(f),
            }
        }

        let header = header.ok_or(CertificateError::MissingHeader)?;
        let footer = footer.ok_or(CertificateError::MissingFooter)?;
        if footer.step_count != steps.len() as u64 {
            return Err(CertificateError::StepCount {
                declared: footer.step_count,
                found: steps.len() as u64,
            });
        }
        Ok(Certificate {
            catalog_version: header.catalog_version,
            initial_digest: header.initial_digest,
            steps,
            status: footer.status,
            final_digest: footer.final_digest,
        })
    }
}

/// serde_json stops at 128 levels by default, which a legal witness can
/// exceed. The limit is lifted only after a scan bounds the nesting.
fn parse_record(raw: &str, line: usize) -> Result<Record, CertificateError> {
    if json_nesting(raw) > MAX_RECORD_NESTING {
        return Err(CertificateError::TooDeep {
            line,
            limit: MAX_RECORD_NESTING,
        });
    }
    let json = |e: serde_json::Error| CertificateError::Json {
        line,
        message: e.to_string(),
    };
    let mut de = serde_json::Deserializer::from_str(raw);
    de.disable_recursion_limit();
    let record = Record::deserialize(&mut de).map_err(json)?;
    de.end().map_err(json)?;
    Ok(record)
}

/// Deepest bracket nesting in `raw`, ignoring brackets inside strings
fn json_nesting(raw: &str) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let mut in_string = false;
    let mut escaped = false;
    for byte in raw.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Collects steps during a run
#[derive(Debug, Clone)]
pub struct CertificateBuilder {
    initial_digest: Digest,
    steps: Vec<CertificateStep>,
}

impl CertificateBuilder {
    pub fn new(initial: &Omega) -> Self {
        Self {
            initial_digest: Digest::of(initial),
            steps: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn record(&mut self, operator: Operator, input: &Omega, args: &[Omega], output: &Omega) {
        let step = CertificateStep {
            step_index: self.steps.len() as u64,
            operator_id: operator.id(),
            operator_name: operator.name().to_string(),
            input_digest: Digest::of(input),
            output_digest: Digest::of(output),
            args_summary: summarize_args(args),
            input: input.clone(),
            args: args.to_vec(),
        };
        trace!(
            target: TARGET,
            step = step.step_index,
            operator = %operator,
            output = %step.output_digest,
            "recorded"
        );
        self.steps.push(step);
    }

    pub fn finish(self, final_state: &Omega, status: CertificateStatus) -> Certificate {
        Certificate {
            catalog_version: CATALOG_VERSION,
            initial_digest: self.initial_digest,
            steps: self.steps,
            status,
            final_digest: Digest::of(final_state),
        }
    }
}

pub fn summarize_args(args: &[Omega]) -> String {
    let parts: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Certificate {
        let initial = Omega::Empty;
        let mut builder = CertificateBuilder::new(&initial);
        builder.record(Operator::Wrap, &initial, &[], &Omega::Empty.wrap());
        builder.record(
            Operator::Pair,
            &Omega::Empty.wrap(),
            &[Omega::int(2)],
            &Omega::seq([Omega::Empty.wrap(), Omega::int(2)]),
        );
        builder.finish(
            &Omega::seq([Omega::Empty.wrap(), Omega::int(2)]),
            CertificateStatus::Complete,
        )
    }

    #[test]
    fn test_builder_numbers_steps() {
        let cert = sample();
        assert_eq!(cert.len(), 2);
        assert_eq!(cert.steps[1].step_index, 1);
        assert_eq!(cert.steps[1].args_summary, "(2)");
        assert_eq!(cert.steps[0].args_summary, "()");
        assert_eq!(cert.operator_names(), vec!["wrap", "pair"]);
    }

    #[test]
    fn test_encode_is_line_delimited() {
        let text = sample().encode().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(r#"{"record":"header","catalogVersion":1"#));
        assert!(lines[1].contains(r#""stepIndex":0"#));
        assert!(lines[1].contains(r#""operatorId":2"#));
        assert!(lines[3].contains(r#""status":"complete""#));
        assert!(lines[3].contains(r#""stepCount":2"#));
    }

    #[test]
    fn test_decode_reads_back_encoding() {
        let cert = sample();
        assert_eq!(Certificate::decode(&cert.encode().unwrap()), Ok(cert));
    }

    #[test]
    fn test_decode_rejects_truncated_files() {
        let text = sample().encode().unwrap();
        let without_footer: String = text.lines().take(3).map(|l| format!("{l}\n")).collect();
        assert_eq!(
            Certificate::decode(&without_footer),
            Err(CertificateError::MissingFooter)
        );
        let without_header: String = text.lines().skip(1).map(|l| format!("{l}\n")).collect();
        assert_eq!(
            Certificate::decode(&without_header),
            Err(CertificateError::MissingHeader)
        );
        assert!(matches!(
            Certificate::decode("not json\n"),
            Err(CertificateError::Json { line: 1, .. })
        ));
    }

    #[test]
    fn test_nesting_scan_skips_strings() {
        assert_eq!(json_nesting(r#"{"a":[1,{"b":2}]}"#), 3);
        assert_eq!(json_nesting(r#"{"a":"[[[\"]]"}"#), 1);
    }

    #[test]
    fn test_decode_rejects_excessive_nesting() {
        let line = format!("{}{}\n", "[".repeat(400), "]".repeat(400));
        assert_eq!(
            Certificate::decode(&line),
            Err(CertificateError::TooDeep {
                line: 1,
                limit: MAX_RECORD_NESTING
            })
        );
    }
}

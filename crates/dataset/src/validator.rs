use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::config::ValidatorConfig;
use crate::error::{ValidationError, ValidationIssue};
use crate::lines::Lines;
use crate::quality::{QualityReport, QualityTracker};
use crate::schema::{Role, RolesSeen, MIN_MESSAGES};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    pub total_lines: u64,
    pub valid_lines: u64,
    pub total_messages: u64,
    pub total_tokens_estimate: u64,
    pub roles_count: BTreeMap<Role, u64>,
}

impl Default for ValidationStats {
    fn default() -> Self {
        Self {
            total_lines: 0,
            valid_lines: 0,
            total_messages: 0,
            total_tokens_estimate: 0,
            roles_count: Role::ALL.iter().map(|r| (*r, 0)).collect(),
        }
    }
}

impl ValidationStats {
    pub fn role_count(&self, role: Role) -> u64 {
        self.roles_count.get(&role).copied().unwrap_or(0)
    }
}

/// Outcome of validating one file.
#[derive(Clone, Debug, Serialize)]
pub struct FileValidation {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub stats: ValidationStats,
    /// None when the file could not be read at all.
    pub quality: Option<QualityReport>,
}

impl FileValidation {
    fn file_failure(issue: ValidationIssue) -> Self {
        Self {
            is_valid: false,
            errors: vec![ValidationError::file(issue)],
            stats: ValidationStats::default(),
            quality: None,
        }
    }
}

/// Validate a JSONL file of chat conversations.
///
/// Never fails: a missing or unreadable file yields an invalid result with a
/// single file-level error and zeroed stats, so callers can move on to the
/// next file.
pub fn validate_file(path: &Path, config: &ValidatorConfig) -> FileValidation {
    // Also covers paths that run through a regular file (ENOTDIR).
    if !path.exists() {
        warn!(path = %path.display(), "dataset file not found");
        return FileValidation::file_failure(ValidationIssue::FileNotFound(
            path.display().to_string(),
        ));
    }

    let f = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %path.display(), "dataset file unreadable: {e}");
            return FileValidation::file_failure(ValidationIssue::Unreadable(e.to_string()));
        }
    };

    let result = validate_reader(BufReader::new(f), config);
    info!(
        path = %path.display(),
        lines = result.stats.total_lines,
        errors = result.errors.len(),
        valid = result.is_valid,
        "dataset validated"
    );
    result
}

/// Same as [`validate_file`] over any buffered source. Lines end at `\n`,
/// `\r\n` or a bare `\r`.
pub fn validate_reader<R: BufRead>(reader: R, config: &ValidatorConfig) -> FileValidation {
    let mut pass = Pass::new(config);

    for (i, line) in Lines::new(reader).enumerate() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                // invalid UTF-8 or a failed read spoils the whole file
                warn!(line = i + 1, "read error: {e}");
                return FileValidation::file_failure(ValidationIssue::Unreadable(e.to_string()));
            }
        };
        pass.check_line(i + 1, &line);
    }

    pass.finish()
}

struct Pass<'a> {
    config: &'a ValidatorConfig,
    stats: ValidationStats,
    errors: Vec<ValidationError>,
    quality: QualityTracker,
}

impl<'a> Pass<'a> {
    fn new(config: &'a ValidatorConfig) -> Self {
        Self {
            config,
            stats: ValidationStats::default(),
            errors: Vec::new(),
            quality: QualityTracker::new(),
        }
    }

    fn check_line(&mut self, line_no: usize, line: &str) {
        self.stats.total_lines += 1;
        self.quality.observe_line(line);

        if line.trim().is_empty() {
            self.errors.push(ValidationError::line(line_no, ValidationIssue::EmptyLine));
            return;
        }

        let doc: JsonValue = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                debug!(line = line_no, "invalid JSON: {e}");
                self.errors
                    .push(ValidationError::line(line_no, ValidationIssue::InvalidJson(e.to_string())));
                return;
            }
        };

        let JsonValue::Object(record) = doc else {
            self.errors.push(ValidationError::line(line_no, ValidationIssue::RecordNotObject));
            return;
        };
        let Some(messages_value) = record.get("messages") else {
            self.errors
                .push(ValidationError::line(line_no, ValidationIssue::MissingField("messages")));
            return;
        };
        let JsonValue::Array(messages) = messages_value else {
            self.errors.push(ValidationError::line(line_no, ValidationIssue::MessagesNotList));
            return;
        };
        if messages.len() < MIN_MESSAGES {
            self.errors.push(ValidationError::line(
                line_no,
                ValidationIssue::TooFewMessages { found: messages.len() },
            ));
            return;
        }

        let mut seen = RolesSeen::default();
        for (idx, msg) in messages.iter().enumerate() {
            match check_message(msg) {
                Ok((role, content)) => {
                    *self.stats.roles_count.entry(role).or_insert(0) += 1;
                    seen.mark(role);
                    self.stats.total_tokens_estimate += self.config.estimate_tokens(content);
                }
                Err(issue) => self.errors.push(ValidationError::message(line_no, idx, issue)),
            }
        }

        if !seen.user {
            self.errors
                .push(ValidationError::line(line_no, ValidationIssue::MissingRole(Role::User)));
        }
        if !seen.assistant {
            self.errors
                .push(ValidationError::line(line_no, ValidationIssue::MissingRole(Role::Assistant)));
        }

        // Counted as processed even when the checks above reported errors.
        self.stats.valid_lines += 1;
        self.stats.total_messages += messages.len() as u64;
        self.quality.observe_record(messages_value, seen.system);
    }

    fn finish(self) -> FileValidation {
        FileValidation {
            is_valid: self.errors.is_empty(),
            quality: Some(self.quality.finish(self.config)),
            errors: self.errors,
            stats: self.stats,
        }
    }
}

/// Field checks for one message, in order; the first failure wins.
fn check_message(msg: &JsonValue) -> Result<(Role, &str), ValidationIssue> {
    let JsonValue::Object(fields) = msg else {
        return Err(ValidationIssue::MessageNotObject);
    };
    let role = fields.get("role").ok_or(ValidationIssue::MissingField("role"))?;
    let content = fields.get("content").ok_or(ValidationIssue::MissingField("content"))?;

    let role = match role {
        JsonValue::String(s) => Role::parse(s).ok_or_else(|| ValidationIssue::InvalidRole(s.clone()))?,
        other => return Err(ValidationIssue::InvalidRole(other.to_string())),
    };
    let content = match content {
        JsonValue::String(s) => s.as_str(),
        JsonValue::Null
        | JsonValue::Bool(_)
        | JsonValue::Number(_)
        | JsonValue::Array(_)
        | JsonValue::Object(_) => return Err(ValidationIssue::ContentNotString),
    };
    if content.trim().is_empty() {
        return Err(ValidationIssue::EmptyContent);
    }

    Ok((role, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> FileValidation {
        validate_reader(Cursor::new(input.as_bytes()), &ValidatorConfig::default())
    }

    fn issues(res: &FileValidation) -> Vec<(usize, Option<usize>, ValidationIssue)> {
        res.errors
            .iter()
            .map(|e| (e.line, e.message_index, e.issue.clone()))
            .collect()
    }

    const GOOD: &str = r#"{"messages": [{"role": "system", "content": "You are helpful."}, {"role": "user", "content": "What is a ledger?"}, {"role": "assistant", "content": "A record of accounts."}]}"#;

    #[test]
    fn test_well_formed_records_pass() {
        let input = format!("{GOOD}\n{GOOD}\n");
        let res = run(&input);
        assert!(res.is_valid);
        assert!(res.errors.is_empty());
        assert_eq!(res.stats.total_lines, 2);
        assert_eq!(res.stats.valid_lines, 2);
        assert_eq!(res.stats.total_messages, 6);
        assert_eq!(res.stats.role_count(Role::System), 2);
        assert_eq!(res.stats.role_count(Role::User), 2);
        assert_eq!(res.stats.role_count(Role::Assistant), 2);
    }

    #[test]
    fn test_empty_input_is_vacuously_valid() {
        let res = run("");
        assert!(res.is_valid);
        assert_eq!(res.stats.total_lines, 0);
        assert_eq!(res.stats.valid_lines, 0);
        assert_eq!(res.stats.role_count(Role::User), 0);
    }

    #[test]
    fn test_single_message_record() {
        let res = run(r#"{"messages": [{"role":"user","content":"hi"}]}"#);
        assert!(!res.is_valid);
        assert_eq!(issues(&res), vec![(1, None, ValidationIssue::TooFewMessages { found: 1 })]);
        assert!(res.errors[0].to_string().contains("at least 2 messages"));
        assert_eq!(res.stats.valid_lines, 0);
        assert_eq!(res.stats.total_messages, 0);
    }

    #[test]
    fn test_invalid_role_is_reported_per_message() {
        let res = run(
            r#"{"messages": [{"role":"user","content":"hi"},{"role":"assistant","content":"hello"},{"role":"tool","content":"x"}]}"#,
        );
        assert_eq!(
            issues(&res),
            vec![(1, Some(2), ValidationIssue::InvalidRole("tool".into()))]
        );
        assert_eq!(res.stats.role_count(Role::User), 1);
        assert_eq!(res.stats.role_count(Role::Assistant), 1);
        assert_eq!(res.stats.roles_count.len(), 3);
    }

    #[test]
    fn test_token_estimate_for_forty_chars() {
        let content = "a".repeat(40);
        let line = format!(
            r#"{{"messages": [{{"role":"user","content":"{content}"}},{{"role":"assistant","content":"abc"}}]}}"#
        );
        let res = run(&line);
        assert!(res.is_valid);
        assert_eq!(res.stats.total_tokens_estimate, 10);
    }

    #[test]
    fn test_bad_json_does_not_stop_the_pass() {
        let input = format!("{GOOD}\n{{not json\n{GOOD}\n");
        let res = run(&input);
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.errors[0].line, 2);
        assert!(matches!(res.errors[0].issue, ValidationIssue::InvalidJson(_)));
        assert!(res.errors[0].to_string().starts_with("Line 2: Invalid JSON - "));
        assert_eq!(res.stats.total_lines, 3);
        assert_eq!(res.stats.valid_lines, 2);
    }

    #[test]
    fn test_blank_line_counts_but_errors() {
        let input = format!("{GOOD}\n   \n{GOOD}\n");
        let res = run(&input);
        assert_eq!(issues(&res), vec![(2, None, ValidationIssue::EmptyLine)]);
        assert_eq!(res.stats.total_lines, 3);
        assert_eq!(res.stats.valid_lines, 2);
    }

    #[test]
    fn test_record_shape_errors() {
        let input = "[1, 2]\n{\"prompt\": \"x\"}\n{\"messages\": \"nope\"}\n";
        let res = run(input);
        assert_eq!(
            issues(&res),
            vec![
                (1, None, ValidationIssue::RecordNotObject),
                (2, None, ValidationIssue::MissingField("messages")),
                (3, None, ValidationIssue::MessagesNotList),
            ]
        );
        assert_eq!(res.stats.total_lines, 3);
        assert_eq!(res.stats.valid_lines, 0);
    }

    #[test]
    fn test_message_field_checks_in_order() {
        let line = r#"{"messages": ["hi", {"content":"x"}, {"role":"user"}, {"role":5,"content":"x"}, {"role":"user","content":7}, {"role":"assistant","content":"  "}]}"#;
        let res = run(line);
        assert_eq!(
            issues(&res),
            vec![
                (1, Some(0), ValidationIssue::MessageNotObject),
                (1, Some(1), ValidationIssue::MissingField("role")),
                (1, Some(2), ValidationIssue::MissingField("content")),
                (1, Some(3), ValidationIssue::InvalidRole("5".into())),
                (1, Some(4), ValidationIssue::ContentNotString),
                (1, Some(5), ValidationIssue::EmptyContent),
                (1, None, ValidationIssue::MissingRole(Role::User)),
                (1, None, ValidationIssue::MissingRole(Role::Assistant)),
            ]
        );
        assert_eq!(res.stats.total_tokens_estimate, 0);
    }

    #[test]
    fn test_record_with_errors_still_counted() {
        let res = run(r#"{"messages": [{"role":"system","content":"s"},{"role":"user","content":"q"}]}"#);
        assert!(!res.is_valid);
        assert_eq!(
            issues(&res),
            vec![(1, None, ValidationIssue::MissingRole(Role::Assistant))]
        );
        assert_eq!(res.stats.valid_lines, 1);
        assert_eq!(res.stats.total_messages, 2);
    }

    #[test]
    fn test_invalid_utf8_spoils_file() {
        let mut bytes = GOOD.as_bytes().to_vec();
        bytes.extend_from_slice(b"\n\xff\xfe\n");
        let res = validate_reader(Cursor::new(bytes), &ValidatorConfig::default());
        assert!(!res.is_valid);
        assert_eq!(res.errors.len(), 1);
        assert!(matches!(res.errors[0].issue, ValidationIssue::Unreadable(_)));
        assert_eq!(res.stats, ValidationStats::default());
        assert!(res.quality.is_none());
    }

    #[test]
    fn test_bare_carriage_return_separates_records() {
        let input = format!("{GOOD}\r{GOOD}\r");
        let res = run(&input);
        assert!(res.is_valid, "errors: {:?}", res.errors);
        assert_eq!(res.stats.total_lines, 2);
        assert_eq!(res.stats.valid_lines, 2);
    }

    #[test]
    fn test_quality_attached_to_readable_input() {
        let input = format!("{GOOD}\n{GOOD}\n");
        let q = run(&input).quality.unwrap();
        assert_eq!(q.records, 2);
        assert_eq!(q.duplicate_records, 1);
        assert_eq!(q.records_without_system, 0);
    }
}

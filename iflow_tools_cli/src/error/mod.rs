use colored::*;
use iflow_tools_core::Error as CoreError;
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// CLI-specific error type with semantic exit codes
#[derive(Debug)]
pub struct CliError {
    /// The main error message
    message: String,

    /// Error category for exit code determination
    category: ErrorCategory,

    /// Additional context information
    context: Vec<(String, String)>,

    /// Suggestions for recovery
    pub suggestions: Vec<String>,

    /// Source error if any
    source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Error categories that map to exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCategory {
    General,
    Misuse,
    ToolFailure,
    Filesystem,
}

/// Semantic exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    Misuse = 2,
    ToolFailure = 3,
    FilesystemError = 4,
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Extension trait for adding context to errors
pub trait ErrorContext {
    fn with_context(self, key: &str, value: &str) -> Self;
    fn with_suggestion(self, suggestion: &str) -> Self;
    fn with_source(self, source: Box<dyn StdError + Send + Sync>) -> Self;
}

impl CliError {
    fn new(message: &str, category: ErrorCategory) -> Self {
        Self {
            message: message.to_string(),
            category,
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Create a general error
    pub fn general(message: &str) -> Self {
        Self::new(message, ErrorCategory::General)
    }

    /// Create a command misuse error
    pub fn misuse(message: &str) -> Self {
        let mut error = Self::new(message, ErrorCategory::Misuse);
        error
            .suggestions
            .push("Run with --help for usage information".to_string());
        error
    }

    /// Create an error for wrapped tools that exited unsuccessfully
    pub fn tool_failure(message: &str) -> Self {
        Self::new(message, ErrorCategory::ToolFailure)
    }

    /// Create a filesystem error
    pub fn filesystem(message: &str) -> Self {
        let mut error = Self::new(message, ErrorCategory::Filesystem);

        // Add specific suggestions based on the message
        if message.contains("not found") {
            error
                .suggestions
                .push("Check if the file or directory exists".to_string());
            error
                .suggestions
                .push("Verify you have the correct path".to_string());
        } else if message.contains("permission") || message.contains("denied") {
            error.suggestions.push("Check file permissions".to_string());
        }

        error
    }

    /// Create an error from an IO error
    pub fn from_io_error(error: io::Error, path: &str) -> Self {
        let message = format!("IO error on '{path}': {error}");
        let mut cli_error = match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                Self::filesystem(&message)
            }
            _ => Self::general(&message),
        };

        cli_error.source = Some(Box::new(error));
        cli_error
            .context
            .push(("path".to_string(), path.to_string()));
        cli_error
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self.category {
            ErrorCategory::General => ExitCode::GeneralError,
            ErrorCategory::Misuse => ExitCode::Misuse,
            ErrorCategory::ToolFailure => ExitCode::ToolFailure,
            ErrorCategory::Filesystem => ExitCode::FilesystemError,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn prefix(&self) -> &'static str {
        match self.category {
            ErrorCategory::General => "Error",
            ErrorCategory::Misuse => "Usage Error",
            ErrorCategory::ToolFailure => "Tool Error",
            ErrorCategory::Filesystem => "File Error",
        }
    }

    /// Format the error for user display
    pub fn format_for_user(&self, debug: bool) -> String {
        let mut output = String::new();

        let prefix = match self.category {
            ErrorCategory::Misuse => self.prefix().yellow(),
            _ => self.prefix().red(),
        };
        output.push_str(&format!("{}: {}\n", prefix, self.message));

        if !self.context.is_empty() {
            output.push_str("\nContext:\n");
            for (key, value) in &self.context {
                output.push_str(&format!("  {}: {}\n", key.bold(), value));
            }
        }

        // Error chain in debug mode
        if debug && let Some(source) = &self.source {
            output.push_str("\nCaused by:\n");
            let mut current: Option<&dyn StdError> = Some(source.as_ref());
            let mut level = 1;

            while let Some(err) = current {
                output.push_str(&format!("  {level}: {err}\n"));
                current = err.source();
                level += 1;
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.prefix(), self.message)?;

        for (key, value) in &self.context {
            write!(f, " ({key}: {value})")?;
        }

        Ok(())
    }
}

impl StdError for CliError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl ErrorContext for CliError {
    fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.push((key.to_string(), value.to_string()));
        self
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestions.push(suggestion.to_string());
        self
    }

    fn with_source(mut self, source: Box<dyn StdError + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }
}

/// Map core errors onto exit code categories
impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        let message = error.to_string();
        let mut cli_error = if error.is_usage_error() {
            Self::misuse(&message)
        } else if error.is_filesystem_error() {
            Self::filesystem(&message)
        } else {
            Self::general(&message)
        };

        match &error {
            CoreError::UnknownPackage { id, known } => {
                if let Some(candidate) = closest_match(id, known) {
                    cli_error
                        .suggestions
                        .insert(0, format!("Did you mean '{candidate}'?"));
                }
            }
            CoreError::MissingKey { key } => {
                cli_error
                    .suggestions
                    .insert(0, format!("Set '{key}' in the configuration file"));
            }
            CoreError::NotAGitRepository { .. } => {
                cli_error
                    .suggestions
                    .push("Point repo_dir at a git work tree".to_string());
            }
            _ => {}
        }

        cli_error.source = Some(Box::new(error));
        cli_error
    }
}

/// Convert anyhow errors to CLI errors, keeping core error categories
impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        let message = format!("{error:#}");
        match error.downcast::<CoreError>() {
            Ok(core) => Self::from(core),
            Err(_) => Self::general(&message),
        }
    }
}

/// Known id within edit distance 2 of `input`, closest first
pub fn closest_match<'a>(input: &str, known: &'a [String]) -> Option<&'a str> {
    known
        .iter()
        .map(|candidate| (levenshtein_distance(input, candidate), candidate))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.as_str())
}

/// Print the error and terminate with its exit code
pub fn exit_with(result: CliResult<()>, debug: bool) -> ! {
    match result {
        Ok(()) => std::process::exit(ExitCode::Success as i32),
        Err(error) => {
            eprint!("{}", error.format_for_user(debug));
            std::process::exit(error.exit_code() as i32)
        }
    }
}

/// Simple Levenshtein distance for package suggestions
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();
    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate().take(len1 + 1) {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate().take(len2 + 1) {
        *cell = j;
    }

    for (i, c1) in s1_chars.iter().enumerate() {
        let i1 = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let j1 = j + 1;
            let cost = if c1 == c2 { 0 } else { 1 };
            matrix[i1][j1] = std::cmp::min(
                std::cmp::min(matrix[i][j1] + 1, matrix[i1][j] + 1),
                matrix[i][j] + cost,
            );
        }
    }

    matrix[len1][len2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::general("x").exit_code(), ExitCode::GeneralError);
        assert_eq!(CliError::misuse("x").exit_code(), ExitCode::Misuse);
        assert_eq!(CliError::tool_failure("x").exit_code(), ExitCode::ToolFailure);
        assert_eq!(
            CliError::filesystem("x").exit_code(),
            ExitCode::FilesystemError
        );
    }

    #[test]
    fn test_unknown_package_suggests_close_id() {
        let error = CliError::from(CoreError::UnknownPackage {
            id: "Ordres".to_string(),
            known: vec!["Billing".to_string(), "Orders".to_string()],
        });

        assert_eq!(error.exit_code(), ExitCode::Misuse);
        assert_eq!(error.suggestions[0], "Did you mean 'Orders'?");
    }

    #[test]
    fn test_missing_key_suggestion() {
        let error = CliError::from(CoreError::missing_key("lint.rules"));
        assert_eq!(error.exit_code(), ExitCode::Misuse);
        assert!(error.suggestions[0].contains("lint.rules"));
    }

    #[test]
    fn test_anyhow_keeps_core_category() {
        let error = anyhow::Error::from(CoreError::PackagesDirNotFound {
            path: "/nope".into(),
        });
        let cli_error = CliError::from(error);
        assert_eq!(cli_error.exit_code(), ExitCode::FilesystemError);
    }

    #[test]
    fn test_closest_match() {
        let known = vec!["Orders".to_string(), "Billing".to_string()];
        assert_eq!(closest_match("Billign", &known), Some("Billing"));
        assert_eq!(closest_match("Shipping", &known), None);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("sync", "sync"), 0);
        assert_eq!(levenshtein_distance("snyc", "sync"), 2);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_format_includes_context_and_suggestions() {
        colored::control::set_override(false);
        let error = CliError::filesystem("Config file not found")
            .with_context("path", "/tmp/x.yaml")
            .with_suggestion("Pass -c <file>");
        let text = error.format_for_user(false);

        assert!(text.starts_with("File Error: Config file not found"));
        assert!(text.contains("path: /tmp/x.yaml"));
        assert!(text.contains("Pass -c <file>"));
    }
}

use std::path::{Path, PathBuf};

/// Outcome of checking one document. Valid when `errors` is empty; warnings
/// never affect the verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub path: PathBuf,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_errors(path: impl AsRef<Path>, errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Self::new(path)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// File name for display, falling back to the full path.
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Errors and warnings produced by a checker that can emit both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn absorb(&mut self, findings: Findings) {
        self.errors.extend(findings.errors);
        self.warnings.extend(findings.warnings);
    }
}

/// Pass/fail tally over a batch of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl ValidationSummary {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let passed = results.iter().filter(|r| r.is_valid()).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Process exit code for automation: 0 when everything passed.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() { 0 } else { 1 }
    }
}

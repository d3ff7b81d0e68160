//! Audit findings: errors block deployment, warnings do not.

use serde::{Deserialize, Serialize};

/// A single finding against one page (or the site as a whole).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub page: String,
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.page, self.message)
    }
}

/// Accumulated outcome of the check battery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub passed: usize,
}

impl AuditReport {
    pub fn fail(&mut self, page: impl Into<String>, message: impl Into<String>) {
        self.errors.push(Finding {
            page: page.into(),
            message: message.into(),
        });
    }

    pub fn warn(&mut self, page: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Finding {
            page: page.into(),
            message: message.into(),
        });
    }

    pub fn ok(&mut self) {
        self.passed += 1;
    }

    /// Any error blocks the deployment.
    pub fn blocked(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&"=".repeat(60));
        out.push_str("\nTurboConvert site audit\n");
        out.push_str(&"=".repeat(60));
        out.push('\n');
        if !self.warnings.is_empty() {
            out.push_str(&format!("\nWARNINGS ({}):\n", self.warnings.len()));
            for warning in &self.warnings {
                out.push_str(&format!("  WARN {warning}\n"));
            }
        }
        if !self.errors.is_empty() {
            out.push_str(&format!("\nERRORS ({}):\n", self.errors.len()));
            for error in &self.errors {
                out.push_str(&format!("  FAIL {error}\n"));
            }
        }
        out.push_str(&"=".repeat(60));
        out.push('\n');
        if self.blocked() {
            out.push_str(&format!(
                "{} error(s) — deployment BLOCKED.\n",
                self.errors.len()
            ));
        } else {
            out.push_str(&format!(
                "All {} checks passed — safe to deploy.\n",
                self.passed
            ));
        }
        out
    }
}

//! Preflight results, grouped by the site input they concern.

/// Which input a check looked at. Reports are printed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Data,
    Translations,
    Templates,
    Sources,
    Injection,
    OgArt,
    Output,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Data,
        Category::Translations,
        Category::Templates,
        Category::Sources,
        Category::Injection,
        Category::OgArt,
        Category::Output,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::Data => "Data file",
            Category::Translations => "Translations",
            Category::Templates => "Templates",
            Category::Sources => "Copied and archived sources",
            Category::Injection => "Injection contract",
            Category::OgArt => "Open Graph art",
            Category::Output => "Output directory",
        }
    }

    pub fn pass(self, name: impl Into<String>) -> CheckResult {
        CheckResult {
            category: self,
            name: name.into(),
            status: CheckStatus::Pass,
            details: None,
        }
    }

    pub fn fail(self, name: impl Into<String>, details: impl Into<String>) -> CheckResult {
        self.pass(name).with_status(CheckStatus::Fail, details)
    }

    /// Missing input that only some commands need.
    pub fn warn(self, name: impl Into<String>, details: impl Into<String>) -> CheckResult {
        self.pass(name).with_status(CheckStatus::Warn, details)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    /// The build will fail.
    Fail,
    Warn,
}

impl CheckStatus {
    fn marker(self) -> &'static str {
        match self {
            CheckStatus::Pass => "  ok",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warn => "WARN",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub category: Category,
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

impl CheckResult {
    fn with_status(mut self, status: CheckStatus, details: impl Into<String>) -> Self {
        self.status = status;
        self.details = Some(details.into());
        self
    }

    /// Attach a note to a passing check.
    pub fn noting(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    pub fn fail_count(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    pub fn warn_count(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(move |c| c.category == category)
    }

    /// Print results under one heading per input category.
    pub fn print(&self) {
        for category in Category::ALL {
            let mut checks = self.in_category(category).peekable();
            if checks.peek().is_none() {
                continue;
            }
            println!("{}:", category.title());
            for check in checks {
                match &check.details {
                    Some(details) => println!("  [{}] {}: {}", check.status.marker(), check.name, details),
                    None => println!("  [{}] {}", check.status.marker(), check.name),
                }
            }
            println!();
        }

        println!(
            "{} checks: {} passed, {} failed, {} warnings",
            self.checks.len(),
            self.count(CheckStatus::Pass),
            self.fail_count(),
            self.warn_count()
        );
    }
}

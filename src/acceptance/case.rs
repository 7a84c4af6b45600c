use super::check::BoxedCheck;
use super::env::PreCheck;

pub enum TestStep {
    /// Apply `config`, expect an empty follow-up plan, then run `check`.
    Config {
        config: String,
        check: Option<BoxedCheck>,
        expect_non_empty_plan: bool,
    },
    /// Import `resource_name` by its current id into a fresh working directory.
    Import {
        resource_name: String,
        verify: bool,
        verify_ignore: Vec<String>,
    },
}

impl TestStep {
    pub fn apply(config: impl Into<String>, check: BoxedCheck) -> Self {
        TestStep::Config {
            config: config.into(),
            check: Some(check),
            expect_non_empty_plan: false,
        }
    }

    pub fn import(resource_name: &str) -> Self {
        TestStep::Import {
            resource_name: resource_name.to_string(),
            verify: false,
            verify_ignore: Vec::new(),
        }
    }

    /// Import and compare every attribute except keys starting with one of `ignore`.
    pub fn import_verify(resource_name: &str, ignore: &[&str]) -> Self {
        TestStep::Import {
            resource_name: resource_name.to_string(),
            verify: true,
            verify_ignore: ignore.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TestStep::Config { .. } => "config",
            TestStep::Import { .. } => "import",
        }
    }
}

impl std::fmt::Debug for TestStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStep::Config {
                check,
                expect_non_empty_plan,
                ..
            } => f
                .debug_struct("Config")
                .field("has_check", &check.is_some())
                .field("expect_non_empty_plan", expect_non_empty_plan)
                .finish(),
            TestStep::Import {
                resource_name,
                verify,
                verify_ignore,
            } => f
                .debug_struct("Import")
                .field("resource_name", resource_name)
                .field("verify", verify)
                .field("verify_ignore", verify_ignore)
                .finish(),
        }
    }
}

pub struct TestCase {
    pub name: String,
    pub pre_checks: Vec<PreCheck>,
    pub steps: Vec<TestStep>,
    pub check_destroy: Option<BoxedCheck>,
    pub parallel: bool,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pre_checks: Vec::new(),
            steps: Vec::new(),
            check_destroy: None,
            parallel: false,
        }
    }

    pub fn pre_check(mut self, check: PreCheck) -> Self {
        self.pre_checks.push(check);
        self
    }

    pub fn step(mut self, step: TestStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn check_destroy(mut self, check: BoxedCheck) -> Self {
        self.check_destroy = Some(check);
        self
    }

    /// Allow this case to run alongside other parallel cases.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("pre_checks", &self.pre_checks.len())
            .field("steps", &self.steps)
            .field("has_check_destroy", &self.check_destroy.is_some())
            .field("parallel", &self.parallel)
            .finish()
    }
}

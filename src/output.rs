use tabled::settings::Style;
use tabled::{Table, Tabled};

use flexibleengine_acc::acceptance::{Outcome, TestReport};

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "CASE")]
    name: String,
    #[tabled(rename = "RESULT")]
    result: &'static str,
    #[tabled(rename = "STEPS")]
    steps: String,
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

impl From<&TestReport> for ReportRow {
    fn from(report: &TestReport) -> Self {
        let passed = report
            .steps
            .iter()
            .filter(|s| s.outcome == Outcome::Passed)
            .count();
        let detail = match &report.outcome {
            Outcome::Passed => String::new(),
            Outcome::Skipped(reason) | Outcome::Failed(reason) => reason.clone(),
        };

        Self {
            name: report.name.clone(),
            result: report.outcome.label(),
            steps: format!("{}/{}", passed, report.steps.len()),
            time: format!("{:.1}s", report.duration.as_secs_f64()),
            detail,
        }
    }
}

pub fn render_reports(reports: &[TestReport]) -> String {
    let rows: Vec<ReportRow> = reports.iter().map(ReportRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexibleengine_acc::acceptance::StepReport;
    use std::time::Duration;

    fn report(name: &str, outcome: Outcome, steps: Vec<StepReport>) -> TestReport {
        TestReport {
            name: name.to_string(),
            outcome,
            steps,
            duration: Duration::from_millis(1500),
        }
    }

    fn step(index: usize, outcome: Outcome) -> StepReport {
        StepReport {
            index,
            kind: "config",
            outcome,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_render_reports_columns() {
        let table = render_reports(&[report(
            "TestAccEvsVolume_basic",
            Outcome::Passed,
            vec![step(1, Outcome::Passed), step(2, Outcome::Passed)],
        )]);
        assert!(table.contains("CASE"));
        assert!(table.contains("TestAccEvsVolume_basic"));
        assert!(table.contains("PASS"));
        assert!(table.contains("2/2"));
        assert!(table.contains("1.5s"));
    }

    #[test]
    fn test_render_reports_failure_detail() {
        let table = render_reports(&[report(
            "TestAccEvsVolume_withEpsId",
            Outcome::Failed("step 1/2 error: boom".to_string()),
            vec![step(1, Outcome::Failed("boom".to_string()))],
        )]);
        assert!(table.contains("FAIL"));
        assert!(table.contains("0/1"));
        assert!(table.contains("step 1/2 error: boom"));
    }
}

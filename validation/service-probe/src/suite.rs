//! YAML test suites and the sequential runner that executes them.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use ogc_client::{HttpOgcClient, OgcClient};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::config::ProbeConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::keywords::Keyword;
use crate::probe::ServiceProbe;
use crate::report::{CaseReport, FailedStep, SuiteReport};

/// A suite file: shared settings plus test cases run in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: ProbeConfig,
    pub tests: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One keyword invocation. Arguments and `expect` accept any YAML scalar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub keyword: String,
    #[serde(default, deserialize_with = "scalar_list")]
    pub args: Vec<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub expect: Option<String>,
}

impl Step {
    pub fn new(keyword: &str, args: &[&str]) -> Self {
        Self {
            keyword: keyword.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            expect: None,
        }
    }

    pub fn expecting(mut self, expect: &str) -> Self {
        self.expect = Some(expect.to_string());
        self
    }
}

fn scalar(value: serde_yaml::Value) -> Result<String, String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(true) => Ok("True".to_string()),
        serde_yaml::Value::Bool(false) => Ok("False".to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        other => Err(format!("expected a scalar, got {:?}", other)),
    }
}

fn scalar_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Vec::<serde_yaml::Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(scalar)
        .collect::<Result<_, _>>()
        .map_err(serde::de::Error::custom)
}

fn optional_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    value
        .map(scalar)
        .transpose()
        .map_err(serde::de::Error::custom)
}

impl Suite {
    /// Load a suite from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid suite file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let suite: Suite = serde_yaml::from_str(content)?;
        suite.validate()?;
        Ok(suite)
    }

    /// Reject unknown keywords and wrong argument counts before anything runs.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tests.is_empty() {
            anyhow::bail!("suite '{}' has no tests", self.name);
        }
        self.settings.validate()?;
        for case in &self.tests {
            for (index, step) in case.steps.iter().enumerate() {
                let keyword: Keyword = step.keyword.parse().with_context(|| {
                    format!("test '{}' step {}", case.name, index + 1)
                })?;
                keyword.check_arity(step.args.len()).with_context(|| {
                    format!("test '{}' step {}", case.name, index + 1)
                })?;
            }
        }
        Ok(())
    }

    /// The smoke test behind `ogc-probe quick`.
    pub fn quick(url: &str, protocol_version: &str) -> Self {
        Suite {
            name: "quick".to_string(),
            description: "Connectivity, WFS layer count and WMS layer rendering".to_string(),
            settings: ProbeConfig {
                service_url: url.to_string(),
                protocol_version: protocol_version.to_string(),
                ..Default::default()
            },
            tests: vec![
                TestCase {
                    name: "Service reachable".to_string(),
                    steps: vec![Step::new("Connect To Url", &[url])],
                },
                TestCase {
                    name: "WFS layers".to_string(),
                    steps: vec![Step::new("Get Number Of Wfs Layers", &[])],
                },
                TestCase {
                    name: "WMS layers render".to_string(),
                    steps: vec![Step::new("Check Advertised Wms Layers", &[])],
                },
            ],
        }
    }
}

/// Runs suites against one probe whose state carries across test cases.
pub struct SuiteRunner<C: OgcClient = HttpOgcClient> {
    probe: ServiceProbe<C>,
}

impl SuiteRunner<HttpOgcClient> {
    /// Runner over HTTP, configured from the suite's settings.
    pub fn for_suite(suite: &Suite) -> ProbeResult<Self> {
        Ok(Self::new(ServiceProbe::new(suite.settings.clone())?))
    }
}

impl<C: OgcClient> SuiteRunner<C> {
    pub fn new(probe: ServiceProbe<C>) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &ServiceProbe<C> {
        &self.probe
    }

    /// Run every test case in order. A failing step ends its test case;
    /// the suite always continues with the next one.
    pub async fn run(&mut self, suite: &Suite) -> SuiteReport {
        info!(suite = %suite.name, tests = suite.tests.len(), "Running suite");
        let started_at = Utc::now();
        let start = Instant::now();

        let mut cases = Vec::with_capacity(suite.tests.len());
        for case in &suite.tests {
            cases.push(self.run_case(case).await);
        }

        let report = SuiteReport {
            suite: suite.name.clone(),
            started_at,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
            cases,
        };
        info!(
            suite = %suite.name,
            passed = report.passed(),
            failed = report.failed(),
            "Suite finished"
        );
        report
    }

    async fn run_case(&mut self, case: &TestCase) -> CaseReport {
        let start = Instant::now();
        let mut steps_run = 0;
        let mut failure = None;

        for (index, step) in case.steps.iter().enumerate() {
            steps_run += 1;
            if let Err(err) = self.run_step(step).await {
                warn!(test = %case.name, step = index + 1, keyword = %step.keyword, error = %err, "Step failed");
                failure = Some(FailedStep {
                    index: index + 1,
                    keyword: step.keyword.clone(),
                    kind: err.kind(),
                    message: err.to_string(),
                });
                break;
            }
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(test = %case.name, steps = steps_run, passed = failure.is_none(), "Test case finished");
        CaseReport {
            name: case.name.clone(),
            passed: failure.is_none(),
            steps_run,
            steps_total: case.steps.len(),
            failure,
            elapsed_ms,
        }
    }

    async fn run_step(&mut self, step: &Step) -> ProbeResult<()> {
        let value = self.probe.run_keyword(&step.keyword, &step.args).await?;
        if let Some(expected) = &step.expect {
            let actual = value.to_string();
            if &actual != expected {
                return Err(ProbeError::Mismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }
}

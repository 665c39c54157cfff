use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::AnalysisError;

// Business context submitted by the form
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisParams {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub company_size: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub current_system: String,
    #[serde(default)]
    pub pain_points: String,
}

impl AnalysisParams {
    // The four select fields are mandatory, the free-text ones are not
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let required = [
            ("region", &self.region),
            ("industry", &self.industry),
            ("companySize", &self.company_size),
            ("department", &self.department),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AnalysisError::InvalidParams(format!(
                "missing {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Problem {
    pub problem: String,
    pub annual_cost: String,
    pub impact: String,
    pub root_causes: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolAssessment {
    pub problem: String,
    pub tools: String,
    pub limitations: String,
    pub inefficiencies: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Solution {
    pub problem: String,
    pub solutions: String,
    pub complexity: String,
    pub timeline: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Benefit {
    pub problem: String,
    pub benefits: String,
    pub cost_savings: String,
    pub value_generated: String,
    pub roi_timeline: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub cost_impact: String,
    pub quick_wins: Vec<String>,
    pub strategic_recommendations: Vec<String>,
    pub success_factors: Vec<String>,
}

// Four tables plus the narrative summary
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    pub problems: Vec<Problem>,
    pub tools: Vec<ToolAssessment>,
    pub solutions: Vec<Solution>,
    pub benefits: Vec<Benefit>,
    pub summary: Summary,
}

// Queued job - params + channel the handler waits on
pub struct AnalysisJob {
    pub params: AnalysisParams,
    pub response_tx: oneshot::Sender<Result<AnalysisResult, AnalysisError>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_use_camel_case_and_default_free_text() {
        let params: AnalysisParams = serde_json::from_str(
            r#"{"region":"EU","industry":"Retail","companySize":"51-200","department":"IT"}"#,
        )
        .unwrap();
        assert_eq!(params.company_size, "51-200");
        assert_eq!(params.pain_points, "");
        assert!(params.validate().is_ok());
    }

    #[test]
    fn blank_required_fields_are_listed() {
        let params = AnalysisParams {
            region: "EU".into(),
            industry: "  ".into(),
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid analysis parameters: missing industry, companySize, department"
        );
    }

    #[test]
    fn partial_result_fills_defaults() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"problems":[{"problem":"Manual invoicing","annualCost":"5%"}],
                "summary":{"quickWins":["Automate AP"]}}"#,
        )
        .unwrap();
        assert_eq!(result.problems[0].annual_cost, "5%");
        assert_eq!(result.problems[0].root_causes, "");
        assert!(result.tools.is_empty());
        assert_eq!(result.summary.quick_wins, vec!["Automate AP"]);
    }
}

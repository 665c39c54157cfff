use crate::models::AnalysisParams;

const RESPONSE_LAYOUT: &str = r#"{
  "problems": [{"problem": "", "annualCost": "", "impact": "", "rootCauses": ""}],
  "tools": [{"problem": "", "tools": "", "limitations": "", "inefficiencies": ""}],
  "solutions": [{"problem": "", "solutions": "", "complexity": "", "timeline": ""}],
  "benefits": [{"problem": "", "benefits": "", "costSavings": "", "valueGenerated": "", "roiTimeline": ""}],
  "summary": {
    "costImpact": "",
    "quickWins": [""],
    "strategicRecommendations": [""],
    "successFactors": [""]
  }
}"#;

// Completion prompt for one analysis
pub fn build(params: &AnalysisParams) -> String {
    let AnalysisParams {
        region,
        industry,
        company_size,
        department,
        current_system,
        pain_points,
    } = params;

    format!(
        "Act as a business analyst and provide a detailed analysis in table format for a company with the following characteristics:
Region: {region}
Industry: {industry}
Company Size: {company_size}
Department: {department}
Current Systems: {current_system}
Pain Points: {pain_points}

Create 4 tables:
1. Common Problems (problem, estimated annual cost, impact, root causes). Start with the reported pain points, then add problems typical for the region, industry, department, company size and current systems.
2. Current Tools & Limitations (problem, commonly used tools, tool limitations, inefficiencies).
3. Recommended Solutions (problem, solutions, implementation complexity Low/Medium/High, expected timeline).
4. Benefits & ROI (problem, expected benefits, cost savings, additional value, ROI timeline).

Then give the total potential cost impact, the top 3 quick wins, long-term strategic recommendations and critical success factors.
Prefer percentages over absolute numbers unless the numbers are reliable.

Format the response as a JSON object with the following structure:
{RESPONSE_LAYOUT}"
    )
}

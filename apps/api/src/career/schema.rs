//! Career-path shape returned by the model, and the strip → parse →
//! validate pipeline applied to raw model output.
//!
//! On any parse or validation failure the whole response is discarded and
//! reported as `InvalidAiResponse`; there is no partial extraction.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::strip_json_fences;
use crate::models::career::{CareerLevel, GrowthOutlook};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: i32,
    pub max: i32,
}

/// One AI-generated career recommendation, field-for-field the shape the
/// generation prompt demands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPath {
    pub title: String,
    pub description: String,
    pub confidence_score: i32,
    pub relevance_reasons: Vec<String>,
    pub level: CareerLevel,
    pub domain: String,
    pub estimated_time_to_entry: String,
    #[serde(rename = "salaryRangeUSD")]
    pub salary_range_usd: SalaryRange,
    pub growth_outlook: GrowthOutlook,
    pub job_titles: Vec<String>,
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub optional_skills: Option<Vec<String>>,
    #[serde(default)]
    pub certifications: Option<Vec<String>>,
    pub related_paths: Vec<String>,
}

impl CareerPath {
    /// Constraint checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description must not be empty".to_string());
        }
        if !(1..=10).contains(&self.confidence_score) {
            return Err(format!(
                "confidenceScore must be between 1 and 10, got {}",
                self.confidence_score
            ));
        }
        if self.domain.trim().is_empty() {
            return Err("domain must not be empty".to_string());
        }
        if self.estimated_time_to_entry.trim().is_empty() {
            return Err("estimatedTimeToEntry must not be empty".to_string());
        }
        if self.relevance_reasons.is_empty() {
            return Err("relevanceReasons must not be empty".to_string());
        }
        if self.job_titles.is_empty() {
            return Err("jobTitles must not be empty".to_string());
        }
        if self.required_skills.is_empty() {
            return Err("requiredSkills must not be empty".to_string());
        }
        if self.related_paths.is_empty() {
            return Err("relatedPaths must not be empty".to_string());
        }
        Ok(())
    }
}

/// Runs raw model output through the full pipeline: strip an optional code
/// fence, parse as a JSON array, validate every element.
pub fn parse_career_paths(raw: &str) -> Result<Vec<CareerPath>, AppError> {
    let stripped = strip_json_fences(raw);

    let paths: Vec<CareerPath> = serde_json::from_str(stripped)
        .map_err(|e| AppError::InvalidAiResponse(format!("JSON parse failed: {e}")))?;

    if paths.is_empty() {
        return Err(AppError::InvalidAiResponse(
            "expected at least one career path".to_string(),
        ));
    }
    for path in &paths {
        path.validate().map_err(AppError::InvalidAiResponse)?;
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(confidence: i32, level: &str) -> String {
        format!(
            r#"[{{
                "title": "Data Scientist",
                "description": "Builds models from data.",
                "confidenceScore": {confidence},
                "relevanceReasons": ["background in statistics"],
                "level": "{level}",
                "domain": "Artificial Intelligence & Data",
                "estimatedTimeToEntry": "6-12 months",
                "salaryRangeUSD": {{"min": 80000, "max": 140000}},
                "growthOutlook": "high",
                "jobTitles": ["Data Scientist", "ML Engineer"],
                "requiredSkills": ["Python", "SQL", "statistics"],
                "optionalSkills": ["Spark"],
                "certifications": [],
                "relatedPaths": ["Data Engineer", "Analyst"]
            }}]"#
        )
    }

    #[test]
    fn test_fenced_round_trip_equals_unwrapped() {
        let plain = sample_json(8, "intermediate");
        let fenced = format!("```json\n{plain}\n```");

        let from_plain = parse_career_paths(&plain).unwrap();
        let from_fenced = parse_career_paths(&fenced).unwrap();
        assert_eq!(from_plain, from_fenced);
        assert_eq!(from_plain.len(), 1);
        assert_eq!(from_plain[0].title, "Data Scientist");
    }

    #[test]
    fn test_non_json_reports_parse_failure() {
        let err = parse_career_paths("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, AppError::InvalidAiResponse(_)));
    }

    #[test]
    fn test_empty_array_rejected() {
        assert!(parse_career_paths("[]").is_err());
    }

    #[test]
    fn test_capitalized_level_normalized() {
        let paths = parse_career_paths(&sample_json(8, "Intermediate")).unwrap();
        assert_eq!(paths[0].level, CareerLevel::Intermediate);
        let out = serde_json::to_value(&paths[0]).unwrap();
        assert_eq!(out["level"], "intermediate");
    }

    #[test]
    fn test_unknown_level_rejected() {
        assert!(parse_career_paths(&sample_json(8, "expert")).is_err());
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        assert!(parse_career_paths(&sample_json(0, "beginner")).is_err());
        assert!(parse_career_paths(&sample_json(11, "beginner")).is_err());
        assert!(parse_career_paths(&sample_json(1, "beginner")).is_ok());
        assert!(parse_career_paths(&sample_json(10, "beginner")).is_ok());
    }

    #[test]
    fn test_empty_required_array_rejected() {
        let json = sample_json(8, "beginner").replace(
            r#""requiredSkills": ["Python", "SQL", "statistics"]"#,
            r#""requiredSkills": []"#,
        );
        let err = parse_career_paths(&json).unwrap_err();
        assert!(matches!(err, AppError::InvalidAiResponse(_)));
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = sample_json(8, "beginner").replace(r#""domain": "Artificial Intelligence & Data","#, "");
        assert!(parse_career_paths(&json).is_err());
    }
}

//! External submission schema.
//!
//! The shape is fixed by the receiving endpoint: camelCase keys, nested groups
//! for current education and job preferences, literal nulls for everything the
//! flow does not collect.

use crate::value::AnswerRecord;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Field names the payload projection reads from the answer record.
pub mod fields {
    pub const EMAIL: &str = "email";
    pub const EMAIL_PROVIDER: &str = "emailProvider";
    pub const FULL_NAME: &str = "fullName";
    pub const PHONE: &str = "phone";
    pub const LINKEDIN_URL: &str = "linkedinUrl";
    pub const CURRENT_SCHOOL: &str = "currentSchool";
    pub const CURRENT_PROGRAM: &str = "currentProgram";
    pub const CURRENT_YEAR: &str = "currentYear";
    pub const CURRENT_MAJOR: &str = "currentMajor";
    pub const EXPECTED_GRADUATION: &str = "expectedGraduation";
    pub const CONTRACT_TYPE: &str = "contractType";
    pub const DOMAINS: &str = "domains";
    pub const LOCATION: &str = "location";
    pub const SPECIFIC_POSITION: &str = "specificPosition";
    /// Reserved: the uploaded file handle
    pub const CV_FILE: &str = "cvFile";
    /// Reserved: durable URL for the uploaded file, written by the attachment resolver
    pub const CV_URL: &str = "cvUrl";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentEducation {
    pub school: Option<String>,
    pub program: Option<String>,
    pub current_year: Option<String>,
    pub program_duration: Option<String>,
    pub major: Option<String>,
    pub expected_graduation: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPreferences {
    pub contract_type: Option<String>,
    pub domains: Vec<String>,
    pub location: Option<String>,
    pub specific_position: Option<String>,
    pub salary_min: Option<u32>,
    pub seniority: Option<String>,
    pub flexibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub email: Option<String>,
    pub email_provider: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub current_education: CurrentEducation,
    pub completed_education: Vec<serde_json::Value>,
    pub experiences: Vec<serde_json::Value>,
    pub skills: Vec<serde_json::Value>,
    pub languages: Vec<serde_json::Value>,
    pub cv_url: Option<String>,
    pub job_preferences: JobPreferences,
}

impl SubmissionPayload {
    /// Project an answer record onto the external schema.
    pub fn from_record(record: &AnswerRecord) -> Result<Self> {
        let text = |name: &str| -> Option<String> {
            record
                .text(name)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let expected_graduation = match record.text(fields::EXPECTED_GRADUATION) {
            Some(raw) if !raw.trim().is_empty() => {
                Some(raw.trim().parse::<i32>().map_err(|_| Error::InvalidNumber {
                    field: fields::EXPECTED_GRADUATION.to_string(),
                    value: raw.to_string(),
                })?)
            }
            _ => None,
        };

        let domains = record
            .get(fields::DOMAINS)
            .and_then(|v| v.as_set())
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        Ok(Self {
            email: text(fields::EMAIL),
            email_provider: text(fields::EMAIL_PROVIDER),
            full_name: text(fields::FULL_NAME),
            phone: text(fields::PHONE),
            linkedin_url: text(fields::LINKEDIN_URL),
            portfolio_url: None,
            current_education: CurrentEducation {
                school: text(fields::CURRENT_SCHOOL),
                program: text(fields::CURRENT_PROGRAM),
                current_year: text(fields::CURRENT_YEAR),
                program_duration: None,
                major: text(fields::CURRENT_MAJOR),
                expected_graduation,
            },
            completed_education: Vec::new(),
            experiences: Vec::new(),
            skills: Vec::new(),
            languages: Vec::new(),
            cv_url: text(fields::CV_URL),
            job_preferences: JobPreferences {
                contract_type: text(fields::CONTRACT_TYPE),
                domains,
                location: text(fields::LOCATION),
                specific_position: text(fields::SPECIFIC_POSITION),
                salary_min: None,
                seniority: None,
                flexibility: None,
            },
        })
    }
}

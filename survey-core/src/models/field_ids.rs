//! Identifiers of the fields the controller reacts to by name.
//!
//! Every other field is handled generically through its [`FieldSpec`](super::FieldSpec).

pub const ESTIMATED_REPAIR_COST: &str = "estimatedRepairCost";
pub const REPLACEMENT_COST: &str = "replacementCost";
pub const DEPRECIATION: &str = "depreciation";
pub const NET_CLAIM_AMOUNT: &str = "netClaimAmount";

pub const DATE_OF_INCIDENT: &str = "dateOfIncident";
pub const DATE_OF_SURVEY: &str = "dateOfSurvey";
pub const SURVEY_DATE: &str = "surveyDate";
pub const DATE_OF_REPORT: &str = "dateOfReport";

/// Inputs of the net claim calculation.
pub const NET_CLAIM_SOURCES: [&str; 3] = [ESTIMATED_REPAIR_COST, REPLACEMENT_COST, DEPRECIATION];

/// Date fields pre-filled with today's date when empty.
pub const DEFAULT_DATED: [&str; 3] = [DATE_OF_SURVEY, SURVEY_DATE, DATE_OF_REPORT];

//! Field layout of the insurance survey report page.

use survey_core::{FieldKind, FieldSpec, MemorySurface, field_ids};

pub const POLICY: &str = "Policy Information";
pub const INSURED: &str = "Insured Details";
pub const INCIDENT: &str = "Incident Details";
pub const SURVEY: &str = "Survey Details";
pub const ASSESSMENT: &str = "Damage Assessment";
pub const DECLARATION: &str = "Declaration";

/// Every field of the report, in page order.
pub fn survey_report_fields() -> Vec<FieldSpec> {
    use FieldKind::*;

    let field = |id: &str, kind: FieldKind, section: &str| FieldSpec::new(id, kind).in_section(section);

    vec![
        field("policyNumber", Text, POLICY).required(),
        field("insurerName", Text, POLICY).required(),
        field("policyType", Select, POLICY).required(),
        field("claimReference", Text, POLICY),
        field("insuredName", Text, INSURED).required(),
        field("insuredEmail", Email, INSURED).required(),
        field("insuredPhone", Tel, INSURED).required(),
        field("propertyAddress", TextArea, INSURED).required(),
        field(field_ids::DATE_OF_INCIDENT, Date, INCIDENT).required(),
        field("incidentType", Select, INCIDENT).required(),
        field("incidentDescription", TextArea, INCIDENT).required(),
        field(field_ids::SURVEY_DATE, Date, INCIDENT),
        field(field_ids::DATE_OF_SURVEY, Date, SURVEY).required(),
        field("surveyorName", Text, SURVEY).required(),
        field("surveyorEmail", Email, SURVEY),
        field("surveyorPhone", Tel, SURVEY),
        field("damageDescription", TextArea, ASSESSMENT).required(),
        field(field_ids::ESTIMATED_REPAIR_COST, Number, ASSESSMENT),
        field(field_ids::REPLACEMENT_COST, Number, ASSESSMENT),
        field(field_ids::DEPRECIATION, Number, ASSESSMENT),
        field(field_ids::NET_CLAIM_AMOUNT, Number, ASSESSMENT).readonly(),
        field(field_ids::DATE_OF_REPORT, Date, DECLARATION).required(),
        field("surveyorSignature", Text, DECLARATION).required(),
        field("declarationAccepted", Checkbox, DECLARATION).required(),
    ]
}

/// A blank report surface.
pub fn survey_report_surface() -> MemorySurface {
    MemorySurface::new(survey_report_fields())
}

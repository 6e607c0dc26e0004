use serde::{Deserialize, Serialize};

/// Input kind of a form field. Drives which validation rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    TextArea,
    Number,
    Date,
    Email,
    Tel,
    Select,
    Checkbox,
}

impl FieldKind {
    pub fn is_checkbox(&self) -> bool {
        matches!(self, Self::Checkbox)
    }
}

/// Current value held by a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Checkbox(bool),
}

impl FieldValue {
    /// The cleared value for a field of `kind`.
    pub fn empty_for(kind: FieldKind) -> Self {
        if kind.is_checkbox() {
            Self::Checkbox(false)
        } else {
            Self::Text(String::new())
        }
    }

    /// Returns `true` when the value counts as filled in: non-blank text or a
    /// checked box.
    pub fn is_filled(&self) -> bool {
        match self {
            Self::Text(text) => !text.trim().is_empty(),
            Self::Checkbox(checked) => *checked,
        }
    }

    /// Text content, or `""` for a checkbox.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Checkbox(_) => "",
        }
    }

    /// Form-data representation: checked boxes submit `"on"`, unchecked
    /// boxes submit nothing.
    pub fn to_form_data(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Checkbox(true) => Some("on".to_string()),
            Self::Checkbox(false) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Checkbox(value)
    }
}

/// Static description of a field as laid out by the hosting page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub id: String,
    pub kind: FieldKind,
    pub required: bool,
    pub readonly: bool,
    pub section: Option<String>,
}

impl FieldSpec {
    pub fn new(
        id: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            required: false,
            readonly: false,
            section: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn in_section(
        mut self,
        section: impl Into<String>,
    ) -> Self {
        self.section = Some(section.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn whitespace_text_is_not_filled() {
        assert!(!FieldValue::from("   ").is_filled());
        assert!(FieldValue::from(" x ").is_filled());
    }

    #[test]
    fn checkbox_is_filled_only_when_checked() {
        assert!(FieldValue::Checkbox(true).is_filled());
        assert!(!FieldValue::Checkbox(false).is_filled());
    }

    #[test]
    fn unchecked_checkbox_has_no_form_data() {
        assert_eq!(FieldValue::Checkbox(false).to_form_data(), None);
        assert_eq!(FieldValue::Checkbox(true).to_form_data(), Some("on".to_string()));
        assert_eq!(FieldValue::from("").to_form_data(), Some(String::new()));
    }

    #[test]
    fn builder_sets_flags() {
        let spec = FieldSpec::new("policyNumber", FieldKind::Text)
            .required()
            .in_section("policy");

        assert!(spec.required);
        assert!(!spec.readonly);
        assert_eq!(spec.section.as_deref(), Some("policy"));
    }
}

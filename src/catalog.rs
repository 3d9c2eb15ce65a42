//! Built-in form templates.
//!
//! DESIGN
//! ======
//! A template is a ready-made `FormDraft` the builder can instantiate in one
//! call. Its rules are ordinary `FieldValidation`s, so a form created from a
//! template is edited, validated, and exported like any other form.
//!
//! The GST registration template also restores forms that older browser
//! builds saved without fields: a fieldless imported form whose title
//! matches a template gets that template's fields.

use serde::Serialize;

use crate::model::{FieldType, FieldValidation, FormDraft, FormField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormTemplate {
    GstRegistration,
}

/// Catalog entry served by `GET /api/templates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub field_count: usize,
}

impl FormTemplate {
    pub const ALL: [Self; 1] = [Self::GstRegistration];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::GstRegistration => "gst-registration",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::GstRegistration => "GST Registration for Proprietorship",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::GstRegistration => "Application form for GST registration of a proprietorship business",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.slug() == slug)
    }

    /// Template whose title matches `title`, ignoring case and surrounding
    /// whitespace.
    #[must_use]
    pub fn from_title(title: &str) -> Option<Self> {
        let title = title.trim();
        Self::ALL.into_iter().find(|t| t.title().eq_ignore_ascii_case(title))
    }

    #[must_use]
    pub fn fields(self) -> Vec<FormField> {
        match self {
            Self::GstRegistration => gst_registration_fields(),
        }
    }

    #[must_use]
    pub fn draft(self) -> FormDraft {
        FormDraft {
            title: self.title().to_owned(),
            description: self.description().to_owned(),
            fields: self.fields(),
            is_public: true,
        }
    }

    #[must_use]
    pub fn summary(self) -> TemplateSummary {
        TemplateSummary {
            slug: self.slug(),
            title: self.title(),
            description: self.description(),
            field_count: self.fields().len(),
        }
    }
}

// =============================================================================
// GST REGISTRATION
// =============================================================================

pub const ADDRESS_PROOF_OPTIONS: [&str; 3] = ["If owned", "If on Rent", "If on Consent"];
pub const BANK_ACCOUNT_OPTIONS: [&str; 2] =
    ["Current Account in name of business", "Saving Bank Account of Proprietor"];

fn text(id: &str, field_type: FieldType, label: &str, placeholder: &str, validation: FieldValidation) -> FormField {
    FormField {
        id: id.to_owned(),
        field_type,
        label: label.to_owned(),
        placeholder: Some(placeholder.to_owned()),
        options: None,
        validation: FieldValidation { required: Some(true), ..validation },
    }
}

fn exact_length(len: usize) -> FieldValidation {
    FieldValidation { min_length: Some(len), max_length: Some(len), ..FieldValidation::default() }
}

fn min_length(len: usize) -> FieldValidation {
    FieldValidation { min_length: Some(len), ..FieldValidation::default() }
}

fn radio(id: &str, label: &str, options: &[&str]) -> FormField {
    FormField {
        id: id.to_owned(),
        field_type: FieldType::Radio,
        label: label.to_owned(),
        placeholder: None,
        options: Some(options.iter().map(|o| (*o).to_owned()).collect()),
        validation: FieldValidation { required: Some(true), ..FieldValidation::default() },
    }
}

fn upload(id: &str, label: &str) -> FormField {
    FormField {
        id: id.to_owned(),
        field_type: FieldType::File,
        label: label.to_owned(),
        placeholder: None,
        options: None,
        validation: FieldValidation { required: Some(false), ..FieldValidation::default() },
    }
}

fn gst_registration_fields() -> Vec<FormField> {
    vec![
        text("proprietorName", FieldType::Text, "Proprietor Name", "Enter proprietor's name", min_length(2)),
        text("panCard", FieldType::Text, "PAN Card Number", "Enter PAN card number", exact_length(10)),
        upload("proprietorPhoto", "Photo of Proprietor"),
        text(
            "aadharCard",
            FieldType::Text,
            "Aadhar Card of Proprietor",
            "Enter Aadhar card number",
            exact_length(12),
        ),
        radio("addressProofType", "Address Proof of Business", &ADDRESS_PROOF_OPTIONS),
        upload("electricityBill", "Electricity Bill"),
        upload("rentAgreement", "Rent Agreement"),
        upload("consentLetter", "Consent Letter"),
        upload("panCopyOwner", "PAN Copy of Owner"),
        text(
            "businessAddress",
            FieldType::Textarea,
            "Business Address",
            "Enter complete business address",
            min_length(10),
        ),
        radio("bankAccountType", "Bank Account", &BANK_ACCOUNT_OPTIONS),
        upload("bankDocument", "Cancelled cheque or First page of passbook or bank statement"),
        text(
            "businessName",
            FieldType::Text,
            "Name of Proprietorship Business",
            "Enter business name",
            min_length(3),
        ),
        text(
            "productService",
            FieldType::Textarea,
            "Product/Service dealing in",
            "Describe products or services",
            min_length(3),
        ),
        text("mobileNumber", FieldType::Text, "Mobile Number", "Enter mobile number", exact_length(10)),
        text("emailId", FieldType::Email, "Email Id", "Enter email address", FieldValidation::default()),
    ]
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;

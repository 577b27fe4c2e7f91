//! Contractual complaint intake
//!
//! Validates a complaint submission and estimates a case-winning label.
//! Nothing is stored or forwarded; the outcome is only shown to the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Warning shown when a required field is empty
pub const MISSING_FIELDS_WARNING: &str = "Please fill in all required fields.";

/// Acknowledgement shown for an accepted complaint
pub const SUCCESS_MESSAGE: &str =
    "Complaint registered successfully! A legal expert will review your case.";

/// Warning prefix for a rejected supporting document
pub const UNSUPPORTED_DOCUMENT_WARNING: &str = "Unsupported document type";

/// File extensions accepted for supporting documents
pub const SUPPORTED_DOCUMENT_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

/// Phrase that marks a description as strong
const STRONG_EVIDENCE: &str = "strong evidence";

/// Kind of contract the complaint concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractType {
    Employment,
    Lease,
    #[serde(rename = "NDA")]
    Nda,
    #[serde(rename = "Service Agreement")]
    ServiceAgreement,
    Other,
}

impl ContractType {
    /// All contract types, in display order
    pub const ALL: [ContractType; 5] = [
        ContractType::Employment,
        ContractType::Lease,
        ContractType::Nda,
        ContractType::ServiceAgreement,
        ContractType::Other,
    ];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            ContractType::Employment => "Employment",
            ContractType::Lease => "Lease",
            ContractType::Nda => "NDA",
            ContractType::ServiceAgreement => "Service Agreement",
            ContractType::Other => "Other",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ContractType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ContractType::ALL
            .iter()
            .copied()
            .find(|c| c.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown contract type: {}", s.trim()))
    }
}

/// A complaint as submitted
///
/// Free-text fields are kept as typed; empty means "not provided".
/// `contract_type` is `None` when nothing was selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Complaint {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub contract_type: Option<ContractType>,
    pub jurisdiction: String,
    pub description: String,
    pub needs_legal_assistance: bool,
    /// File name of the supporting document, if one was attached
    pub supporting_document: Option<String>,
}

/// Case-winning label derived from the description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Probability {
    High,
    Moderate,
    #[serde(rename = "Processing...")]
    Processing,
}

impl Probability {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Probability::High => "High",
            Probability::Moderate => "Moderate",
            Probability::Processing => "Processing...",
        }
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of submitting a complaint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum SubmissionOutcome {
    /// Accepted; carries the acknowledgement
    Success(String),
    /// Rejected; carries the warning to show
    Warning(String),
}

impl SubmissionOutcome {
    /// Whether the complaint was accepted
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success(_))
    }

    /// Message to display
    pub fn message(&self) -> &str {
        match self {
            SubmissionOutcome::Success(m) | SubmissionOutcome::Warning(m) => m,
        }
    }
}

impl Complaint {
    /// Names of required fields that are empty
    ///
    /// Content is not judged: whitespace counts as provided.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.email.is_empty() {
            missing.push("email");
        }
        if self.contract_type.is_none() {
            missing.push("contract type");
        }
        if self.jurisdiction.is_empty() {
            missing.push("jurisdiction");
        }
        if self.description.is_empty() {
            missing.push("description");
        }
        missing
    }

    /// Validates the submission
    ///
    /// Email and phone are accepted in any format.
    ///
    /// # Examples
    ///
    /// ```
    /// use lawaid::intake::{Complaint, ContractType, MISSING_FIELDS_WARNING};
    ///
    /// let mut complaint = Complaint::default();
    /// assert_eq!(complaint.submit().message(), MISSING_FIELDS_WARNING);
    ///
    /// complaint.name = "Asha".into();
    /// complaint.email = "asha".into();
    /// complaint.contract_type = Some(ContractType::Lease);
    /// complaint.jurisdiction = "Maharashtra".into();
    /// complaint.description = "Landlord kept the deposit".into();
    /// assert!(complaint.submit().is_success());
    /// ```
    pub fn submit(&self) -> SubmissionOutcome {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            tracing::debug!("Complaint rejected, missing: {}", missing.join(", "));
            return SubmissionOutcome::Warning(MISSING_FIELDS_WARNING.to_string());
        }

        if let Some(document) = &self.supporting_document {
            if !is_supported_document(document) {
                return SubmissionOutcome::Warning(format!(
                    "{}: {} (accepted: PDF, DOCX)",
                    UNSUPPORTED_DOCUMENT_WARNING, document
                ));
            }
        }

        tracing::info!(
            "Complaint accepted: contract={}, jurisdiction={}, assistance={}",
            self.contract_type.map(|c| c.label()).unwrap_or_default(),
            self.jurisdiction.trim(),
            self.needs_legal_assistance
        );
        SubmissionOutcome::Success(SUCCESS_MESSAGE.to_string())
    }

    /// Case-winning label for this complaint's description
    pub fn probability(&self) -> Probability {
        estimate_probability(&self.description)
    }
}

/// Placeholder heuristic: a literal "strong evidence" reads as High
///
/// # Examples
///
/// ```
/// use lawaid::intake::{estimate_probability, Probability};
///
/// assert_eq!(estimate_probability(""), Probability::Processing);
/// assert_eq!(estimate_probability("I have strong evidence"), Probability::High);
/// assert_eq!(estimate_probability("Strong Evidence"), Probability::Moderate);
/// ```
pub fn estimate_probability(description: &str) -> Probability {
    if description.is_empty() {
        Probability::Processing
    } else if description.contains(STRONG_EVIDENCE) {
        Probability::High
    } else {
        Probability::Moderate
    }
}

/// Whether a file name has an accepted document extension
pub fn is_supported_document(file_name: &str) -> bool {
    std::path::Path::new(file_name.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_DOCUMENT_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

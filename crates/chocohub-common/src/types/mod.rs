//! Common types used across ChocoHub

use crate::error::HubError;
use serde::{Deserialize, Serialize};

/// Publication type of a dataset or feature model
///
/// Stored as its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PublicationType {
    #[default]
    None,
    AnnotationCollection,
    Book,
    BookSection,
    ConferencePaper,
    DataManagementPlan,
    JournalArticle,
    Patent,
    Preprint,
    ProjectDeliverable,
    ProjectMilestone,
    Proposal,
    Report,
    SoftwareDocumentation,
    TaxonomicTreatment,
    TechnicalNote,
    Thesis,
    WorkingPaper,
    Other,
}

impl PublicationType {
    pub const ALL: [PublicationType; 19] = [
        PublicationType::None,
        PublicationType::AnnotationCollection,
        PublicationType::Book,
        PublicationType::BookSection,
        PublicationType::ConferencePaper,
        PublicationType::DataManagementPlan,
        PublicationType::JournalArticle,
        PublicationType::Patent,
        PublicationType::Preprint,
        PublicationType::ProjectDeliverable,
        PublicationType::ProjectMilestone,
        PublicationType::Proposal,
        PublicationType::Report,
        PublicationType::SoftwareDocumentation,
        PublicationType::TaxonomicTreatment,
        PublicationType::TechnicalNote,
        PublicationType::Thesis,
        PublicationType::WorkingPaper,
        PublicationType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationType::None => "none",
            PublicationType::AnnotationCollection => "annotation_collection",
            PublicationType::Book => "book",
            PublicationType::BookSection => "book_section",
            PublicationType::ConferencePaper => "conference_paper",
            PublicationType::DataManagementPlan => "data_management_plan",
            PublicationType::JournalArticle => "journal_article",
            PublicationType::Patent => "patent",
            PublicationType::Preprint => "preprint",
            PublicationType::ProjectDeliverable => "project_deliverable",
            PublicationType::ProjectMilestone => "project_milestone",
            PublicationType::Proposal => "proposal",
            PublicationType::Report => "report",
            PublicationType::SoftwareDocumentation => "software_documentation",
            PublicationType::TaxonomicTreatment => "taxonomic_treatment",
            PublicationType::TechnicalNote => "technical_note",
            PublicationType::Thesis => "thesis",
            PublicationType::WorkingPaper => "working_paper",
            PublicationType::Other => "other",
        }
    }
}

impl std::fmt::Display for PublicationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PublicationType {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        PublicationType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| HubError::InvalidPublicationType(s.to_string()))
    }
}

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Format a byte count for display, e.g. `"512 bytes"`, `"1.0 KB"` or `"1.5 KB"`
///
/// Scaled values are rounded to two decimals and always carry at least one
/// decimal digit.
pub fn human_readable_size(size: u64) -> String {
    fn scaled(size: u64, unit: u64) -> String {
        let value = (size as f64 / unit as f64 * 100.0).round() / 100.0;
        if value.fract() == 0.0 {
            format!("{value:.1}")
        } else {
            value.to_string()
        }
    }

    if size < KIB {
        format!("{} bytes", size)
    } else if size < MIB {
        format!("{} KB", scaled(size, KIB))
    } else if size < GIB {
        format!("{} MB", scaled(size, MIB))
    } else {
        format!("{} GB", scaled(size, GIB))
    }
}

// Submission: the analysis form's fields and their validation rules.
// Validation is pure and runs before any credential encoding or network call.

pub mod models;
pub mod validation;

pub use models::{
    experience_label, ExperiencePolicy, ResumeDocument, SubmissionFields, MAX_EXPERIENCE_YEARS,
    PDF_CONTENT_TYPE,
};
pub use validation::{validate, ValidationErrors};

pub mod issue;
pub mod locale;
pub mod report;

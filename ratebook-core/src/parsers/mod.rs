pub mod exhibits;
pub mod merge;
pub mod patterns;
pub mod rules;

pub use exhibits::ExhibitTableParser;
pub use merge::{merge_fragments, PAGE_BREAK};
pub use patterns::TitleCleaner;
pub use rules::RuleSectionParser;

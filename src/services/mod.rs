pub mod api;
pub mod database;
pub mod debounce;
pub mod filter;
pub mod pagination;
pub mod selection;
pub mod settings;
pub mod timezone;

pub use api::{ApiError, HttpApi, SubmissionApi};
pub use database::Database;
pub use debounce::Debouncer;
pub use filter::FilterState;
pub use pagination::PageLoader;
pub use selection::ExpansionState;
pub use settings::{AppSettings, ColorScheme, SettingsService};

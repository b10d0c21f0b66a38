pub mod aggregator;
pub mod dashboard;
pub mod filter;
pub mod normalize;
pub mod ordering;
pub mod pagination;
pub mod preferences;
pub mod providers;
pub mod search;
pub mod trending;

pub use aggregator::Aggregator;
pub use dashboard::{Dashboard, DashboardOptions, Section};
pub use preferences::PreferencesService;
pub use search::SearchCoordinator;

pub mod catalog;
pub mod features;
pub mod model;
pub mod win_probability;

pub use catalog::{City, Team};
pub use features::{derive, DerivedFeatures, MatchState};
pub use model::{LogisticPipeline, WinModel};
pub use win_probability::estimate_win_probability;

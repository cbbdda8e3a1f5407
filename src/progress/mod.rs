pub mod clock;
pub mod model;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use model::{MasteryPoint, ProgressState, SkillEstimate, SkillTrend, UpdateEvent};

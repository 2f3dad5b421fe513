pub mod app;
pub mod clock;
pub mod status;

pub use app::{AppState, DashboardSnapshot};
pub use clock::{Clock, SystemClock};
pub use status::{ActiveView, SessionState, Status, TrafficStats};

// Balance Walker
// Turns four-corner balance board readings into locomotion actions and joystick axes

pub mod axis;
pub mod calibration;
pub mod config;
pub mod error;
pub mod frequency;
pub mod geometry;
pub mod gesture;
pub mod live_status;
pub mod pipeline;
pub mod rerun_logger;
pub mod sample_buffer;
pub mod sensors;
pub mod session;
pub mod sinks;
pub mod types;

pub use axis::{map_axis, AxisValues};
pub use config::WalkerConfig;
pub use error::{WalkerError, WalkerResult};
pub use gesture::{Action, ActionFlags};
pub use pipeline::{Diagnostics, Pipeline, TickOutput};
pub use types::{BoardReading, CornerWeights};

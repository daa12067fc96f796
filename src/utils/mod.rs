pub use self::logger::{GateLogger, LogSink};
pub use self::timer::{Delay, TickClock};

pub mod logger;
pub mod timer;

mod contract;
mod result;
mod stub;

pub use contract::{AnalysisEngine, EngineCallbacks, FrameDescriptor, FrameHandle};
pub use result::{Corner, Detection, EngineStatus, FrameReport, ObjectClass};
pub use stub::StubEngine;

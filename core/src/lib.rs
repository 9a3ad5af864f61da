pub mod error;
pub mod ffi;
pub mod gym;
pub mod link;
pub mod link_mock;
pub mod location;
pub mod models;
pub mod protocol;
pub mod session;
pub mod storage;
pub mod storage_memory;
pub mod trace;

uniffi::setup_scaffolding!();

pub use error::{DecodeError, GymError, LinkError, LocationError, StoreError, TraceError};
pub use gym::{Event, Gym, Listener, ListenerId, Phase, Progress};
pub use link::{ByteSource, LinkConfig, Parity, StopBits, WATERROWER_LINK};
pub use location::{Locator, LocationSource, NoLocation, ProviderLocator};
pub use models::{
    Difficulty, Location, Measurement, Program, ProgramId, Segment, Snapshot, TargetMetric,
    Workout, WorkoutId,
};
pub use protocol::{Opcode, Protocol};
pub use session::Session;
pub use storage::{Store, WorkoutQuery};
pub use storage_memory::MemoryStore;
pub use trace::{replay, NullTrace, StringTrace, Trace, WriterTrace};

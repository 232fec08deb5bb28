//! Composition Stages
//!
//! Pull-based transforms that wrap a `SampleSource` and are themselves
//! sources. The mixing pipeline chains them:
//! volume → offset/loop → fade → mix bus.

mod fade;
mod looping;
mod mix_bus;
mod offset;
mod volume;

pub use fade::FadeOutStage;
pub use looping::LoopStage;
pub use mix_bus::MixBus;
pub use offset::OffsetStage;
pub use volume::VolumeStage;

pub mod audio;
pub mod core;
pub mod platform;
pub mod runtime;
pub mod video;

pub use self::core::{
    CoreError, EmulatorCore, FRAME_PIXELS, MIC_FRAME_SAMPLES, SCREEN_HEIGHT, SCREEN_WIDTH,
};
pub use platform::{
    AudioSink, AudioSinkFactory, ClockControl, MicSource, MicSourceFactory, PlatformError,
    PlatformHost, CLOCK_RATES_HZ, OUTPUT_BLOCK_SAMPLES,
};
pub use runtime::{Collaborators, Runtime, RuntimeError, RuntimeEvent, SharedState, FRAME_PERIOD};
pub use video::FrameStore;

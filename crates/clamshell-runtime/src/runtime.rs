mod audio_pump;
mod handle;
mod mic_pump;
mod pacer;
mod state;
mod types;

pub use handle::{Collaborators, Runtime};
pub use state::SharedState;
pub use types::{RuntimeError, RuntimeEvent, FRAME_PERIOD};

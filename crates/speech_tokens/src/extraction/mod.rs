mod batch_padder;
mod extractor;
mod frame_aligner;

pub use batch_padder::{BatchItem, BatchPadder};
pub use extractor::Extractor;
pub use frame_aligner::{FRAME_TOLERANCE, FrameAligner, duration_seconds, expected_frame_count};

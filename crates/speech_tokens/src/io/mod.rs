mod wav;

pub use wav::load_wav;

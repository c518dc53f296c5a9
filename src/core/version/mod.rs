mod era;

pub use era::{coerce, ForgeEra};

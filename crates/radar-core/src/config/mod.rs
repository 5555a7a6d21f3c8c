mod profile;
mod settings;

pub use profile::*;
pub use settings::*;

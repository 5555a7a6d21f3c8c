mod reader;

#[cfg(target_os = "windows")]
mod process;

#[cfg(test)]
pub mod mock;

pub use reader::{ADDRESS_FLOOR, ReadMemory};

#[cfg(target_os = "windows")]
pub use process::{MemoryReader, ProcessHandle};

#[cfg(test)]
pub use mock::{MockMemoryBuilder, MockMemoryReader, StagedEntity};

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmulatorError {
    /// Fetched byte is not part of the instruction set. PC is left on it.
    #[error("illegal opcode {opcode:02X} at PC={pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
}

#[derive(Error, Debug)]
pub enum SaveStateError {
    #[error("save state {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

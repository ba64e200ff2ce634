use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub mod analytics;
pub mod attendance;
pub mod date;
mod error;
pub mod initials;
pub mod ledger;
pub mod lookup;
pub mod migrate;
pub mod player;
pub mod registry;

pub use error::Error;
pub use ledger::Ledger;
pub use player::{Field, Player, PlayerPatch};

pub type Result<T> = std::result::Result<T, error::Error>;

/// Integer count of whole UTC days since the Unix epoch.
pub type Day = i64;

pub type PlayerId = u32;

pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let file = File::open(path)?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(value)
}

pub fn save_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

//! Version information

use anyhow::Result;
use avsc_loader::{InterfaceVersion, LIBRARY_NAME, LOADER_VERSION};

pub fn run() -> Result<()> {
    println!("Loader version:     {}", LOADER_VERSION);
    println!("Built for interface {}", InterfaceVersion::CURRENT);
    println!("Host library:       {}", LIBRARY_NAME);
    Ok(())
}

//! A script environment created directly from the host library

use anyhow::{Context, Result, anyhow};
use avsc_api::{ApiTable, ScriptEnvironment, SymbolDescriptor};
use avsc_loader::{HostLibrary, LibraryProvider, SystemLibrary};

const CREATE: &str = "avs_create_script_environment";
const DELETE: &str = "avs_delete_script_environment";

/// Owns one host script environment for the duration of a probe.
///
/// Dropping the session deletes the environment, which makes the host fire
/// every exit hook registered with it.
pub struct HostSession {
    env: *mut ScriptEnvironment,
    table: ApiTable,
    _library: Box<dyn HostLibrary>,
}

impl HostSession {
    /// Open the host library and create an environment of `interface_version`
    pub fn open(interface_version: i32) -> Result<Self> {
        let library = SystemLibrary.open()?;
        let table = ApiTable::new();
        for name in [CREATE, DELETE] {
            let descriptor = SymbolDescriptor::find(name)
                .ok_or_else(|| anyhow!("{} is not a known entry point", name))?;
            let address = library
                .resolve(name)
                .with_context(|| format!("host library does not export {}", name))?;
            table.bind(descriptor, address);
        }

        let create = table
            .avs_create_script_environment()
            .ok_or_else(|| anyhow!("{} not bound", CREATE))?;
        let env = unsafe { create(interface_version) };
        if env.is_null() {
            anyhow::bail!(
                "host refused to create a script environment for interface {}",
                interface_version
            );
        }
        tracing::debug!(interface_version, "Created script environment");

        Ok(Self {
            env,
            table,
            _library: library,
        })
    }

    pub fn env(&self) -> *mut ScriptEnvironment {
        self.env
    }
}

impl Drop for HostSession {
    fn drop(&mut self) {
        if let Some(delete) = self.table.avs_delete_script_environment() {
            unsafe { delete(self.env) };
            tracing::debug!("Deleted script environment");
        }
    }
}

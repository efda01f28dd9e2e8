//! Version negotiation against the host

use avsc_api::{AEP_INTERFACE_BUGFIX, AEP_INTERFACE_VERSION, ApiTable, InterfaceVersion, ScriptEnvironment};

use crate::error::LoaderError;

/// What the host can tell us about its interface version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCapability {
    /// The host reports its exact version through `avs_get_env_property`
    Exact(InterfaceVersion),
    /// Only `avs_check_version` is available: a yes/no answer for one major
    ProbeOnly { major_supported: bool },
}

impl HostCapability {
    /// Ask the host through whichever bootstrap entry point is bound.
    ///
    /// A property query that answers with a value outside `i32` counts as no
    /// answer; the host's version is then unknown and `avs_check_version`
    /// decides.
    ///
    /// # Safety
    ///
    /// `env` must be a live script environment of the library the table was
    /// resolved from.
    pub unsafe fn query(
        table: &ApiTable,
        env: *mut ScriptEnvironment,
        requested: InterfaceVersion,
    ) -> Result<Self, LoaderError> {
        if let Some(get_env_property) = table.avs_get_env_property() {
            let (major, bugfix) = unsafe {
                (
                    get_env_property(env, AEP_INTERFACE_VERSION),
                    get_env_property(env, AEP_INTERFACE_BUGFIX),
                )
            };
            match (i32::try_from(major), i32::try_from(bugfix)) {
                (Ok(major), Ok(bugfix)) => {
                    return Ok(Self::Exact(InterfaceVersion::new(major, bugfix)));
                }
                _ => tracing::warn!(
                    major,
                    bugfix,
                    "Host reported an out-of-range interface version, falling back to the probe"
                ),
            }
        }

        let check_version = table
            .avs_check_version()
            .ok_or_else(|| LoaderError::MissingBootstrapSymbol {
                name: "avs_check_version".to_string(),
            })?;
        // avs_check_version returns 0 when the version is supported
        let major_supported = unsafe { check_version(env, requested.major) } == 0;
        Ok(Self::ProbeOnly { major_supported })
    }

    /// The exact host version, when known
    pub fn version(&self) -> Option<InterfaceVersion> {
        match self {
            Self::Exact(version) => Some(*version),
            Self::ProbeOnly { .. } => None,
        }
    }
}

/// Accept or reject `requested` against what the host reported.
///
/// With only the probe available the bugfix level cannot be checked and is
/// taken as satisfied.
pub fn negotiate(requested: InterfaceVersion, host: HostCapability) -> Result<(), LoaderError> {
    let accepted = match host {
        HostCapability::Exact(version) => version.satisfies(&requested),
        HostCapability::ProbeOnly { major_supported } => major_supported,
    };

    if accepted {
        tracing::debug!(%requested, host = ?host, "Interface version accepted");
        Ok(())
    } else {
        Err(LoaderError::VersionTooOld {
            requested,
            found: host.version(),
        })
    }
}

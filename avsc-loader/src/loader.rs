//! ApiLoader - reference-counted, version-checked host API binding
//!
//! One loader owns one host library handle and one [`ApiTable`]. Every
//! successful [`ApiLoader::acquire`] takes a reference and registers an exit
//! hook with the host; the hook gives the reference back. The first
//! acquisition opens the library and resolves the table, and the release that
//! brings the count back to zero closes it again.
//!
//! # Lifecycle
//!
//! ```text
//! Unloaded -> Opening -> VersionChecking -> Resolving -> Ready
//!     ^                                                    |
//!     +------------- Failed / last release ----------------+
//! ```
//!
//! Open, resolve and unload run under one mutex, so a first-time acquisition
//! never interleaves with the unload of a previous generation. A second
//! acquirer that arrives while the first is still resolving does not wait on
//! that mutex: it fails fast with [`LoaderError::ConcurrentInitRace`].

use std::ffi::c_void;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering, fence};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use avsc_api::{
    ApiTable, BOOTSTRAP_SYMBOLS, PROPERTY_QUERY_SYMBOL, SYMBOLS, ScriptEnvironment,
    SymbolDescriptor,
};

use crate::error::LoaderError;
use crate::last_error::ErrorSlot;
use crate::library::{HostLibrary, LibraryProvider, SystemLibrary};
use crate::requirements::Requirements;
use crate::version::{HostCapability, negotiate};

/// Where the loader is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// No library open, table empty
    Unloaded = 0,
    /// Opening the host library
    Opening = 1,
    /// Bootstrap symbols bound, negotiating the interface version
    VersionChecking = 2,
    /// Resolving mandatory and optional entry points
    Resolving = 3,
    /// Table published
    Ready = 4,
    /// Unwinding a failed acquisition; always followed by `Unloaded`
    Failed = 5,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Opening,
            2 => Self::VersionChecking,
            3 => Self::Resolving,
            4 => Self::Ready,
            5 => Self::Failed,
            _ => Self::Unloaded,
        }
    }
}

/// How a missing export is treated during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Bootstrap,
    Mandatory,
    BestEffort,
}

/// Binds the host C API and manages its reference-counted lifetime.
///
/// Shared as `Arc<ApiLoader>`: each registered exit hook holds one strong
/// reference, so the loader outlives every registration the host still has.
pub struct ApiLoader<P: LibraryProvider = SystemLibrary> {
    provider: P,
    ref_count: AtomicUsize,
    phase: AtomicU8,
    /// Host library handle; the mutex also serializes open/resolve/unload
    library: Mutex<Option<Box<dyn HostLibrary>>>,
    table: ApiTable,
    last_error: ErrorSlot,
}

impl<P: LibraryProvider> ApiLoader<P> {
    /// Create an inert loader. Nothing is opened until the first acquisition.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            ref_count: AtomicUsize::new(0),
            phase: AtomicU8::new(Phase::Unloaded as u8),
            library: Mutex::new(None),
            table: ApiTable::new(),
            last_error: ErrorSlot::new(),
        }
    }

    /// Take a reference to the host API.
    ///
    /// The first acquisition opens the host library, negotiates the interface
    /// version, resolves `requirements.required` (all must be present) and then
    /// every other known entry point (absence tolerated). Later acquisitions
    /// re-check the version against the loaded host and the mandatory names
    /// against the bound slots, without resolving anything again.
    ///
    /// On success an exit hook is registered with `env`; the host fires it at
    /// environment teardown, which releases this reference. On failure the
    /// reference count is back to its value before the call and the reason is
    /// both returned and recorded for [`ApiLoader::last_error`].
    ///
    /// # Safety
    ///
    /// `env` must be a live script environment created by the host library
    /// this loader's provider opens, and must stay live until the host fires
    /// the registered exit hook.
    pub unsafe fn acquire<'a>(
        self: &'a Arc<Self>,
        env: *mut ScriptEnvironment,
        requirements: &Requirements,
    ) -> Result<&'a ApiTable, LoaderError> {
        match unsafe { self.try_acquire(env, requirements) } {
            Ok(()) => Ok(&self.table),
            Err(err) => {
                tracing::debug!(error = %err, "Host API acquisition failed");
                self.last_error.record(&err);
                Err(err)
            }
        }
    }

    unsafe fn try_acquire(
        self: &Arc<Self>,
        env: *mut ScriptEnvironment,
        requirements: &Requirements,
    ) -> Result<(), LoaderError> {
        // Unknown names are a caller bug; reject before touching the host.
        let mandatory = requirements.mandatory_descriptors()?;

        let previous = self.ref_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(count = previous + 1, "Host API reference taken");

        let result = if previous == 0 {
            unsafe { self.initialize(env, requirements, &mandatory) }
        } else {
            unsafe { self.revalidate(env, requirements, &mandatory) }
        };

        if result.is_err() {
            // Holders may have released meanwhile; the rollback can be the
            // last reference.
            self.put_back();
        }
        result
    }

    /// First-time path: open, negotiate, resolve, register.
    unsafe fn initialize(
        self: &Arc<Self>,
        env: *mut ScriptEnvironment,
        requirements: &Requirements,
        mandatory: &[&'static SymbolDescriptor],
    ) -> Result<(), LoaderError> {
        let mut library = self.lock_library();

        // The previous generation's last release has not unloaded yet; the
        // library is still live, so treat this like any later acquisition.
        if self.phase() == Phase::Ready {
            drop(library);
            return unsafe { self.revalidate(env, requirements, mandatory) };
        }

        let result = unsafe { self.load(&mut library, env, requirements, mandatory) };
        match result {
            Ok(()) => {
                self.set_phase(Phase::Ready);
                self.last_error.clear();
                tracing::info!(
                    library = self.provider.library_name(),
                    bound = self.table.bound_count(),
                    known = SYMBOLS.len(),
                    "Host API ready"
                );
                Ok(())
            }
            Err(err) => {
                self.set_phase(Phase::Failed);
                self.unload_locked(&mut library);
                Err(err)
            }
        }
    }

    unsafe fn load(
        self: &Arc<Self>,
        slot: &mut Option<Box<dyn HostLibrary>>,
        env: *mut ScriptEnvironment,
        requirements: &Requirements,
        mandatory: &[&'static SymbolDescriptor],
    ) -> Result<(), LoaderError> {
        self.set_phase(Phase::Opening);
        let library: &dyn HostLibrary = &**slot.insert(self.provider.open()?);
        tracing::info!(library = self.provider.library_name(), "Host library opened");

        self.set_phase(Phase::VersionChecking);
        for name in BOOTSTRAP_SYMBOLS {
            self.resolve(library, known(name)?, Resolution::Bootstrap)?;
        }
        self.resolve(library, known(PROPERTY_QUERY_SYMBOL)?, Resolution::BestEffort)?;

        let capability = unsafe { HostCapability::query(&self.table, env, requirements.version)? };
        negotiate(requirements.version, capability)?;

        self.set_phase(Phase::Resolving);
        for descriptor in mandatory {
            self.resolve(library, descriptor, Resolution::Mandatory)?;
        }
        for descriptor in SYMBOLS {
            if !self.table.is_bound(descriptor) {
                self.resolve(library, descriptor, Resolution::BestEffort)?;
            }
        }

        unsafe { self.register_exit_hook(env) }
    }

    /// Later-acquirer path: re-check the loaded host for this caller.
    unsafe fn revalidate(
        self: &Arc<Self>,
        env: *mut ScriptEnvironment,
        requirements: &Requirements,
        mandatory: &[&'static SymbolDescriptor],
    ) -> Result<(), LoaderError> {
        if self.phase() != Phase::Ready {
            return Err(LoaderError::ConcurrentInitRace);
        }

        let capability = unsafe { HostCapability::query(&self.table, env, requirements.version)? };
        if let Err(err) = negotiate(requirements.version, capability) {
            // Other holders lose the table too; they asked for less than this
            // caller and the host cannot give this caller what it needs.
            tracing::warn!(
                error = %err,
                holders = self.ref_count().saturating_sub(1),
                "Loaded host rejected by a later acquirer, unloading"
            );
            let mut library = self.lock_library();
            self.set_phase(Phase::Failed);
            self.unload_locked(&mut library);
            return Err(err);
        }

        if let Some(missing) = mandatory.iter().find(|d| !self.table.is_bound(d)) {
            return Err(LoaderError::MissingMandatorySymbol {
                name: missing.name().to_string(),
            });
        }

        unsafe { self.register_exit_hook(env) }
    }

    /// Look up one export and bind it.
    ///
    /// Returns whether the slot was bound. A missing export is an error for
    /// bootstrap and mandatory symbols and leaves the slot null otherwise.
    fn resolve(
        &self,
        library: &dyn HostLibrary,
        descriptor: &SymbolDescriptor,
        resolution: Resolution,
    ) -> Result<bool, LoaderError> {
        let name = descriptor.name();
        match library.resolve(name) {
            Some(address) => {
                self.table.bind(descriptor, address);
                tracing::debug!(symbol = name, ?resolution, "Bound host symbol");
                Ok(true)
            }
            None => match resolution {
                Resolution::Bootstrap => Err(LoaderError::MissingBootstrapSymbol {
                    name: name.to_string(),
                }),
                Resolution::Mandatory => Err(LoaderError::MissingMandatorySymbol {
                    name: name.to_string(),
                }),
                Resolution::BestEffort => {
                    tracing::debug!(symbol = name, "Optional host symbol not exported");
                    Ok(false)
                }
            },
        }
    }

    unsafe fn register_exit_hook(self: &Arc<Self>, env: *mut ScriptEnvironment) -> Result<(), LoaderError> {
        let at_exit = self
            .table
            .avs_at_exit()
            .ok_or_else(|| LoaderError::MissingBootstrapSymbol {
                name: "avs_at_exit".to_string(),
            })?;
        let user_data = Arc::into_raw(Arc::clone(self)) as *mut c_void;
        unsafe { at_exit(env, exit_hook::<P>, user_data) };
        Ok(())
    }

    /// Give back one reference; the release that reaches zero unloads.
    ///
    /// This is the body of the exit hook the host fires. Releasing with no
    /// references outstanding does nothing.
    pub fn release(&self) {
        if !self.put_back() {
            tracing::warn!("Host API released with no references outstanding");
        }
    }

    /// Drop one reference and unload on the transition to zero.
    ///
    /// Shared by the exit hook and the rollback of a failed acquisition.
    /// Returns false if no reference was outstanding.
    fn put_back(&self) -> bool {
        let updated = self
            .ref_count
            .fetch_update(Ordering::Release, Ordering::Relaxed, |count| count.checked_sub(1));
        let Ok(previous) = updated else {
            return false;
        };
        tracing::debug!(count = previous - 1, "Host API reference released");

        if previous == 1 {
            fence(Ordering::Acquire);
            self.unload_if_unreferenced();
        }
        true
    }

    /// Unload under the lock, unless a new first reference was taken after
    /// the count reached zero; the library then stays with that holder.
    fn unload_if_unreferenced(&self) {
        let mut library = self.lock_library();
        if self.ref_count.load(Ordering::Acquire) == 0 {
            self.unload_locked(&mut library);
        }
    }

    /// Unpublish, clear every slot, then close the handle.
    fn unload_locked(&self, library: &mut MutexGuard<'_, Option<Box<dyn HostLibrary>>>) {
        self.set_phase(Phase::Unloaded);
        self.table.clear();
        if library.take().is_some() {
            tracing::info!(library = self.provider.library_name(), "Host library closed");
        }
    }

    fn lock_library(&self) -> MutexGuard<'_, Option<Box<dyn HostLibrary>>> {
        self.library.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Outstanding references
    pub fn ref_count(&self) -> usize {
        self.ref_count.load(Ordering::Acquire)
    }

    /// The table, while it is published.
    ///
    /// Becomes `None` as soon as unloading begins. Function pointers copied
    /// out of the table before that must not be called afterwards.
    pub fn published(&self) -> Option<&ApiTable> {
        (self.phase() == Phase::Ready).then_some(&self.table)
    }

    /// Description of the most recent failed acquisition
    pub fn last_error(&self) -> String {
        self.last_error.message()
    }

    /// The recorded error slot, for C-style readers
    pub fn error_slot(&self) -> &ErrorSlot {
        &self.last_error
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: LibraryProvider + Default> Default for ApiLoader<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P: LibraryProvider> std::fmt::Debug for ApiLoader<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiLoader")
            .field("library", &self.provider.library_name())
            .field("phase", &self.phase())
            .field("ref_count", &self.ref_count())
            .field("table", &self.table)
            .finish()
    }
}

fn known(name: &'static str) -> Result<&'static SymbolDescriptor, LoaderError> {
    SymbolDescriptor::find(name).ok_or_else(|| LoaderError::UnknownRequiredSymbol {
        name: name.to_string(),
    })
}

/// Exit hook registered with `avs_at_exit`.
///
/// `user_data` is a strong reference produced by `Arc::into_raw` at
/// registration; it is consumed here.
unsafe extern "system" fn exit_hook<P: LibraryProvider>(
    user_data: *mut c_void,
    _env: *mut ScriptEnvironment,
) {
    if user_data.is_null() {
        return;
    }
    let loader = unsafe { Arc::from_raw(user_data as *const ApiLoader<P>) };
    loader.release();
}

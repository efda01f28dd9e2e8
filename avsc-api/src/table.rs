//! The function table and its symbol index
//!
//! The table holds one atomic slot per known entry point. Slots are written
//! only through [`ApiTable::bind`] and read through the typed accessors that
//! `declare_api!` generates, so every non-null slot
//! holds an address that was resolved from the host library under the
//! symbol's own name.

use std::ffi::c_void;
use std::fmt;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::symbols::{ApiTable, SYMBOLS};

/// Symbols needed before version negotiation and shutdown registration
pub const BOOTSTRAP_SYMBOLS: [&str; 2] = ["avs_check_version", "avs_at_exit"];

/// Optional symbol used to read the host's exact interface version
pub const PROPERTY_QUERY_SYMBOL: &str = "avs_get_env_property";

/// A non-null address of an exported host symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolAddress(NonNull<c_void>);

// SAFETY: an address of code in a loaded library carries no thread affinity.
unsafe impl Send for SymbolAddress {}
unsafe impl Sync for SymbolAddress {}

impl SymbolAddress {
    /// Wrap a raw address returned by the platform symbol lookup.
    ///
    /// Returns `None` for a null address.
    ///
    /// # Safety
    ///
    /// `addr` must be the address the currently open host library exports
    /// under the name it will be bound to, so that it has that entry point's
    /// declared signature and calling convention.
    pub unsafe fn from_raw(addr: *mut c_void) -> Option<Self> {
        NonNull::new(addr).map(Self)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// One entry of the declarative symbol list: a name and its slot accessor.
pub struct SymbolDescriptor {
    pub(crate) name: &'static str,
    pub(crate) slot: fn(&ApiTable) -> &AtomicPtr<c_void>,
}

impl SymbolDescriptor {
    /// Exported name of the entry point
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a descriptor by exported name
    pub fn find(name: &str) -> Option<&'static SymbolDescriptor> {
        SYMBOLS.iter().find(|d| d.name == name)
    }

    /// All known descriptors, in declaration order
    pub fn all() -> &'static [SymbolDescriptor] {
        SYMBOLS
    }

    fn slot<'t>(&self, table: &'t ApiTable) -> &'t AtomicPtr<c_void> {
        (self.slot)(table)
    }
}

impl fmt::Debug for SymbolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SymbolDescriptor").field(&self.name).finish()
    }
}

impl ApiTable {
    /// Store a resolved address in the descriptor's slot
    pub fn bind(&self, descriptor: &SymbolDescriptor, address: SymbolAddress) {
        descriptor
            .slot(self)
            .store(address.as_ptr(), Ordering::Release);
    }

    /// Whether the descriptor's slot holds an address
    pub fn is_bound(&self, descriptor: &SymbolDescriptor) -> bool {
        !descriptor.slot(self).load(Ordering::Acquire).is_null()
    }

    /// Whether the named entry point is bound. Unknown names are never bound.
    pub fn is_bound_name(&self, name: &str) -> bool {
        SymbolDescriptor::find(name).is_some_and(|d| self.is_bound(d))
    }

    /// Reset every slot to null
    pub fn clear(&self) {
        for descriptor in SYMBOLS {
            descriptor.slot(self).store(ptr::null_mut(), Ordering::Release);
        }
    }

    /// Names of the bound entry points, in declaration order
    pub fn bound_symbols(&self) -> impl Iterator<Item = &'static str> + '_ {
        SYMBOLS
            .iter()
            .filter(move |d| self.is_bound(d))
            .map(SymbolDescriptor::name)
    }

    /// Names of the entry points left unbound, in declaration order
    pub fn unbound_symbols(&self) -> impl Iterator<Item = &'static str> + '_ {
        SYMBOLS
            .iter()
            .filter(move |d| !self.is_bound(d))
            .map(SymbolDescriptor::name)
    }

    pub fn bound_count(&self) -> usize {
        self.bound_symbols().count()
    }
}

impl Default for ApiTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ApiTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiTable")
            .field("bound", &self.bound_count())
            .field("known", &SYMBOLS.len())
            .finish()
    }
}

/// Declare the host's entry points.
///
/// Each line is `name: fn(args) -> ret;` using the C signature of the export.
/// The expansion defines [`ApiTable`] with one null-initialized slot per
/// entry, a typed accessor per entry returning `Option<unsafe extern "system" fn ...>`,
/// and the ordered `SYMBOLS` index that drives resolution.
macro_rules! declare_api {
    ($( $(#[$meta:meta])* $name:ident : fn($($arg:ty),* $(,)?) $(-> $ret:ty)? ; )*) => {
        /// Function table of the host C API, one slot per known entry point
        pub struct ApiTable {
            $( $name: ::std::sync::atomic::AtomicPtr<::std::ffi::c_void>, )*
        }

        #[allow(clippy::type_complexity)]
        impl ApiTable {
            /// A table with every slot null
            pub const fn new() -> Self {
                Self {
                    $( $name: ::std::sync::atomic::AtomicPtr::new(::std::ptr::null_mut()), )*
                }
            }

            $(
                $(#[$meta])*
                #[inline]
                pub fn $name(&self) -> Option<unsafe extern "system" fn($($arg),*) $(-> $ret)?> {
                    let addr = self.$name.load(::std::sync::atomic::Ordering::Acquire);
                    if addr.is_null() {
                        return None;
                    }
                    // SAFETY: the slot is only written by `bind` with an address
                    // exported under this name, which has this signature.
                    Some(unsafe {
                        ::std::mem::transmute::<
                            *mut ::std::ffi::c_void,
                            unsafe extern "system" fn($($arg),*) $(-> $ret)?,
                        >(addr)
                    })
                }
            )*
        }

        /// Ordered index of every declared entry point
        pub static SYMBOLS: &[$crate::table::SymbolDescriptor] = &[
            $( $crate::table::SymbolDescriptor {
                name: stringify!($name),
                slot: |table| &table.$name,
            }, )*
        ];
    };
}

pub(crate) use declare_api;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    unsafe extern "system" fn stand_in() {}

    fn address() -> SymbolAddress {
        unsafe { SymbolAddress::from_raw(stand_in as *mut c_void) }.unwrap()
    }

    #[test]
    fn test_new_table_is_all_null() {
        let table = ApiTable::new();
        assert_eq!(table.bound_count(), 0);
        assert!(table.avs_get_frame().is_none());
        assert_eq!(table.unbound_symbols().count(), SYMBOLS.len());
    }

    #[test]
    fn test_symbol_names_are_unique() {
        let names: HashSet<_> = SYMBOLS.iter().map(|d| d.name()).collect();
        assert_eq!(names.len(), SYMBOLS.len());
    }

    #[test]
    fn test_bootstrap_symbols_are_declared() {
        for name in BOOTSTRAP_SYMBOLS {
            assert!(SymbolDescriptor::find(name).is_some(), "{name} missing");
        }
        assert!(SymbolDescriptor::find(PROPERTY_QUERY_SYMBOL).is_some());
    }

    #[test]
    fn test_find_unknown_name() {
        assert!(SymbolDescriptor::find("avs_not_an_export").is_none());
    }

    #[test]
    fn test_bind_sets_only_that_slot() {
        let table = ApiTable::new();
        let descriptor = SymbolDescriptor::find("avs_release_clip").unwrap();
        table.bind(descriptor, address());

        assert!(table.is_bound(descriptor));
        assert!(table.is_bound_name("avs_release_clip"));
        assert!(table.avs_release_clip().is_some());
        assert_eq!(table.bound_count(), 1);
        assert_eq!(
            table.bound_symbols().collect::<Vec<_>>(),
            vec!["avs_release_clip"]
        );
    }

    #[test]
    fn test_clear_resets_every_slot() {
        let table = ApiTable::new();
        for descriptor in SYMBOLS {
            table.bind(descriptor, address());
        }
        assert_eq!(table.bound_count(), SYMBOLS.len());

        table.clear();
        assert_eq!(table.bound_count(), 0);
        assert!(table.avs_at_exit().is_none());
    }

    #[test]
    fn test_null_address_is_rejected() {
        assert!(unsafe { SymbolAddress::from_raw(std::ptr::null_mut()) }.is_none());
    }

    #[test]
    fn test_debug_reports_counts() {
        let table = ApiTable::new();
        let text = format!("{:?}", table);
        assert!(text.contains("bound: 0"));
    }
}

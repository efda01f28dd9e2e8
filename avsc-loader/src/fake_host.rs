//! In-process stand-in for the host library, for tests

use std::ffi::{c_int, c_void};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use avsc_api::{
    AEP_INTERFACE_BUGFIX, AEP_INTERFACE_VERSION, SYMBOLS, ScriptEnvironment, ShutdownFunc,
    SymbolAddress,
};

use crate::error::LoaderError;
use crate::library::{HostLibrary, LibraryProvider};

type Callback = Box<dyn FnOnce() + Send>;

/// A script environment that reports a fixed interface version and keeps the
/// exit hooks registered with it until torn down.
pub struct FakeEnv {
    major: i32,
    bugfix: i32,
    hooks: Mutex<Vec<(ShutdownFunc, usize)>>,
    on_version_query: Mutex<Option<Callback>>,
}

impl FakeEnv {
    pub fn new(major: i32, bugfix: i32) -> Self {
        Self {
            major,
            bugfix,
            hooks: Mutex::new(Vec::new()),
            on_version_query: Mutex::new(None),
        }
    }

    pub fn as_ptr(&self) -> *mut ScriptEnvironment {
        self as *const Self as *mut ScriptEnvironment
    }

    /// Run `callback` once, the next time the host is asked for its version
    pub fn on_version_query(&self, callback: impl FnOnce() + Send + 'static) {
        *self.on_version_query.lock().unwrap() = Some(Box::new(callback));
    }

    pub fn pending_hooks(&self) -> usize {
        self.hooks.lock().unwrap().len()
    }

    /// Fire the oldest registered hook. Returns false if none was pending.
    pub fn fire_one(&self) -> bool {
        let hook = {
            let mut hooks = self.hooks.lock().unwrap();
            if hooks.is_empty() {
                None
            } else {
                Some(hooks.remove(0))
            }
        };
        match hook {
            Some((func, user_data)) => {
                unsafe { func(user_data as *mut c_void, self.as_ptr()) };
                true
            }
            None => false,
        }
    }

    /// Fire every pending hook, as the host does when an environment is deleted
    pub fn teardown(&self) {
        let hooks: Vec<_> = self.hooks.lock().unwrap().drain(..).collect();
        for (func, user_data) in hooks {
            unsafe { func(user_data as *mut c_void, self.as_ptr()) };
        }
    }

    fn from_ptr<'a>(env: *mut ScriptEnvironment) -> &'a FakeEnv {
        unsafe { &*(env as *const FakeEnv) }
    }

    fn run_version_callback(&self) {
        let callback = self.on_version_query.lock().unwrap().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

unsafe extern "system" fn fake_check_version(env: *mut ScriptEnvironment, major: c_int) -> c_int {
    let env = FakeEnv::from_ptr(env);
    env.run_version_callback();
    if major <= env.major { 0 } else { 1 }
}

unsafe extern "system" fn fake_get_env_property(env: *mut ScriptEnvironment, property: c_int) -> usize {
    let env = FakeEnv::from_ptr(env);
    match property {
        AEP_INTERFACE_VERSION => {
            env.run_version_callback();
            env.major as usize
        }
        AEP_INTERFACE_BUGFIX => env.bugfix as usize,
        _ => 0,
    }
}

unsafe extern "system" fn fake_at_exit(
    env: *mut ScriptEnvironment,
    func: ShutdownFunc,
    user_data: *mut c_void,
) {
    let env = FakeEnv::from_ptr(env);
    env.hooks.lock().unwrap().push((func, user_data as usize));
}

/// Address given to every export the tests never call
unsafe extern "system" fn fake_unused() {}

fn fake_address(name: &str) -> usize {
    match name {
        "avs_check_version" => fake_check_version as usize,
        "avs_get_env_property" => fake_get_env_property as usize,
        "avs_at_exit" => fake_at_exit as usize,
        _ => fake_unused as usize,
    }
}

/// Provider that "opens" an in-process export list and counts opens and closes
#[derive(Clone)]
pub struct FakeHost {
    exports: Option<Vec<(&'static str, usize)>>,
    opens: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl FakeHost {
    /// A host exporting every known entry point
    pub fn new() -> Self {
        let exports = SYMBOLS
            .iter()
            .map(|d| (d.name(), fake_address(d.name())))
            .collect();
        Self {
            exports: Some(exports),
            opens: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A host that is not installed at all
    pub fn missing() -> Self {
        Self {
            exports: None,
            ..Self::new()
        }
    }

    /// Same host with one export removed
    pub fn without(mut self, name: &str) -> Self {
        if let Some(exports) = self.exports.as_mut() {
            exports.retain(|(export, _)| *export != name);
        }
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl LibraryProvider for FakeHost {
    fn library_name(&self) -> &str {
        "libavisynth-fake.so"
    }

    fn open(&self) -> Result<Box<dyn HostLibrary>, LoaderError> {
        let exports = self.exports.clone().ok_or_else(|| LoaderError::LibraryNotFound {
            library: self.library_name().to_string(),
            reason: "cannot open shared object file: No such file or directory".to_string(),
        })?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeLibrary {
            exports,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct FakeLibrary {
    exports: Vec<(&'static str, usize)>,
    closes: Arc<AtomicUsize>,
}

impl HostLibrary for FakeLibrary {
    fn resolve(&self, name: &str) -> Option<SymbolAddress> {
        let (_, address) = self.exports.iter().find(|(export, _)| *export == name)?;
        unsafe { SymbolAddress::from_raw(*address as *mut c_void) }
    }
}

impl Drop for FakeLibrary {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

//! One acquisition against the installed host

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use avsc_api::{ApiTable, INTERFACE_VERSION};
use avsc_loader::{ApiLoader, InterfaceVersion, Requirements, SystemLibrary};
use clap::Args;

use crate::session::HostSession;

/// Check arguments
#[derive(Args)]
pub struct CheckArgs {
    /// Minimum interface version
    #[arg(long, default_value_t = INTERFACE_VERSION)]
    pub major: i32,

    /// Minimum bugfix level within the interface version
    #[arg(long, default_value_t = 0)]
    pub bugfix: i32,

    /// Entry point that must resolve (repeatable)
    #[arg(short, long, value_name = "SYMBOL")]
    pub require: Vec<String>,

    /// Read the requirements from a TOML file
    #[arg(long, value_name = "FILE", conflicts_with_all = ["major", "bugfix", "require"])]
    pub requirements: Option<PathBuf>,

    /// List every entry point, not only the unresolved ones
    #[arg(long)]
    pub all: bool,
}

impl CheckArgs {
    fn to_requirements(&self) -> Result<Requirements> {
        match &self.requirements {
            Some(path) => Ok(Requirements::load(path)?),
            None => Ok(Requirements::with_symbols(
                self.major,
                self.bugfix,
                self.require.iter().cloned(),
            )),
        }
    }
}

/// Run check command
pub fn run(args: CheckArgs) -> Result<()> {
    let requirements = args.to_requirements()?;
    let session = HostSession::open(requirements.version.major)?;
    let loader = Arc::new(ApiLoader::new(SystemLibrary));

    let outcome = unsafe { loader.acquire(session.env(), &requirements) };
    let failure = match outcome {
        Ok(table) => {
            print!("{}", render_report(table, &requirements, args.all));
            None
        }
        Err(err) => {
            println!("Acquisition failed: {}", err);
            Some(err)
        }
    };
    println!("Phase: {:?}, references: {}", loader.phase(), loader.ref_count());

    drop(session);
    println!(
        "After teardown: phase {:?}, references: {}",
        loader.phase(),
        loader.ref_count()
    );

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn render_report(table: &ApiTable, requirements: &Requirements, all: bool) -> String {
    let mut out = String::new();
    let bound: Vec<_> = table.bound_symbols().collect();
    let unbound: Vec<_> = table.unbound_symbols().collect();

    let _ = writeln!(out, "Requested interface: >= {}", requirements.version);
    if requirements.version == InterfaceVersion::CURRENT {
        let _ = writeln!(out, "  (the interface this loader was built for)");
    }
    let _ = writeln!(
        out,
        "Resolved {} of {} entry points",
        bound.len(),
        bound.len() + unbound.len()
    );

    if !requirements.required.is_empty() {
        let _ = writeln!(out, "Required:");
        for name in &requirements.required {
            let _ = writeln!(out, "  {}", name);
        }
    }

    if all {
        let _ = writeln!(out, "Resolved:");
        for name in &bound {
            let _ = writeln!(out, "  {}", name);
        }
    }

    if unbound.is_empty() {
        let _ = writeln!(out, "Every known entry point is exported by this host");
    } else {
        let _ = writeln!(out, "Not exported by this host:");
        for name in &unbound {
            let _ = writeln!(out, "  {}", name);
        }
    }
    out
}

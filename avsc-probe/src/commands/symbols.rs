//! The loader's symbol index

use anyhow::Result;
use avsc_api::{BOOTSTRAP_SYMBOLS, PROPERTY_QUERY_SYMBOL, SymbolDescriptor};
use clap::Args;

/// Symbols arguments
#[derive(Args)]
pub struct SymbolsArgs {
    /// Only the entry points needed before version negotiation
    #[arg(long)]
    pub bootstrap: bool,
}

/// Run symbols command
pub fn run(args: SymbolsArgs) -> Result<()> {
    for name in listed(args.bootstrap) {
        println!("{}", name);
    }
    Ok(())
}

fn listed(bootstrap: bool) -> Vec<&'static str> {
    if bootstrap {
        BOOTSTRAP_SYMBOLS
            .into_iter()
            .chain([PROPERTY_QUERY_SYMBOL])
            .collect()
    } else {
        SymbolDescriptor::all().iter().map(SymbolDescriptor::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_listing() {
        assert_eq!(
            listed(true),
            vec!["avs_check_version", "avs_at_exit", "avs_get_env_property"]
        );
    }

    #[test]
    fn test_full_listing_is_declaration_order() {
        let names = listed(false);
        assert_eq!(names.len(), SymbolDescriptor::all().len());
        assert_eq!(names[0], "avs_check_version");
        assert!(names.contains(&"avs_get_frame"));
    }
}

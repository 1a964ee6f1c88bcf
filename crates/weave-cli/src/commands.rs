//! Command implementations.

use std::path::PathBuf;

use anyhow::Result;

use weave_core::{LinkerConfig, compile};
use weave_model::{CompileReport, LinkOptions};

use crate::cli::LinkArgs;

pub fn run_link(args: &LinkArgs) -> Result<CompileReport> {
    let output_root = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("generated"));
    let mut options = LinkOptions::new(args.modules.clone(), output_root);
    options.force = args.force;
    options.dry_run = args.dry_run;
    let config = LinkerConfig::with_default_set(options);
    Ok(compile(&config)?)
}

pub fn run_categories() -> Result<()> {
    let config = LinkerConfig::with_default_set(LinkOptions::default());
    println!("Declaration categories:");
    for category in &config.categories {
        println!("  {:<14} {}", category.name(), category.description());
    }
    println!();
    println!("Module hooks:");
    for hook in &config.module_hooks {
        println!("  {}", hook.name());
    }
    Ok(())
}

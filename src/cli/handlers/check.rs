use std::rc::Rc;

use super::load_definition_from;
use crate::io::FsDocumentSource;
use crate::ops::check::{self, CheckError, CheckWarning};

pub fn cmd_check(dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let def = load_definition_from(dir)?;
    let source = Rc::new(FsDocumentSource::new(&def.root));
    let result = check::check_tree(&def.file.nodes, source);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.errors.is_empty() {
        println!("Errors:");
        for err in &result.errors {
            match err {
                CheckError::Structural { message } => println!("  {}", message),
            }
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            println!();
        }
        println!("Warnings:");
        for warn in &result.warnings {
            match warn {
                CheckWarning::SkippedDocument { url, reason } => {
                    println!("  skipped {}: {}", url, reason);
                }
                CheckWarning::EmptyContainer { node } => {
                    println!("  container {} has no children", node);
                }
                CheckWarning::LeafOpenByDefault { node } => {
                    println!("  leaf {} sets open_by_default (ignored)", node);
                }
            }
        }
    }
    if result.valid {
        println!(
            "✓ {} is valid ({} nodes, {} words)",
            def.file.tree.name, result.nodes, result.words
        );
    } else {
        println!("✗ {} has errors", def.file.tree.name);
    }
    Ok(())
}

use std::rc::Rc;

use futures::executor::block_on;
use serde::Serialize;

use crate::index::{BuildReport, DocumentSource, IndexBuilder, IndexInput};
use crate::model::{NodeDecl, NodeStore};

/// Structured result from `pft check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub nodes: usize,
    pub words: usize,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A problem that prevents the tree from loading
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    #[serde(rename = "structural")]
    Structural { message: String },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// A document or overlay the index build had to skip
    #[serde(rename = "skipped_document")]
    SkippedDocument { url: String, reason: String },
    /// Container with no children; shown as a plain row
    #[serde(rename = "empty_container")]
    EmptyContainer { node: String },
    /// `open_by_default` on a leaf has no effect
    #[serde(rename = "leaf_open_by_default")]
    LeafOpenByDefault { node: String },
}

/// Validate declarations and index every document once.
///
/// Read-only: nothing is persisted.
pub fn check_tree(decls: &[NodeDecl], source: Rc<dyn DocumentSource>) -> CheckResult {
    let mut result = CheckResult::default();
    let store = match NodeStore::build(decls) {
        Ok(store) => store,
        Err(e) => {
            result.errors.push(CheckError::Structural {
                message: e.to_string(),
            });
            return result;
        }
    };
    result.nodes = store.len();

    for node in store.iter() {
        if node.is_container() && node.children().is_empty() {
            result.warnings.push(CheckWarning::EmptyContainer {
                node: node.key.clone(),
            });
        }
        if !node.is_container() && node.open_by_default {
            result.warnings.push(CheckWarning::LeafOpenByDefault {
                node: node.key.clone(),
            });
        }
    }

    let builder = IndexBuilder::new();
    if let Ok(index) = block_on(builder.build(IndexInput::from_store(&store), source)) {
        result.words = index.len();
    }
    add_report_warnings(&mut result, &builder.report());

    result.valid = result.errors.is_empty();
    result
}

fn add_report_warnings(result: &mut CheckResult, report: &BuildReport) {
    for skipped in &report.skipped {
        result.warnings.push(CheckWarning::SkippedDocument {
            url: skipped.url.clone(),
            reason: skipped.reason.clone(),
        });
    }
}

//! The `notebook` post-processor: strips generated output from Jupyter
//! notebooks so patches only capture source changes.
//!
//! Every code cell of every `.ipynb` file gets `outputs` reset to `[]` and
//! `execution_count` reset to `null`. Notebooks that already carry no
//! generated output are not rewritten.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::filesystem;
use crate::postprocess::PostProcessor;
use crate::registry::Registrar;

pub const NAME: &str = "notebook";

const NOTEBOOK_EXTENSION: &str = "ipynb";

pub struct StripNotebooks;

impl PostProcessor for StripNotebooks {
    fn process(&self, dir: &Path) -> Result<()> {
        for relative in filesystem::walk_files(dir)? {
            if relative.extension().and_then(|ext| ext.to_str()) != Some(NOTEBOOK_EXTENSION) {
                continue;
            }
            let path = dir.join(&relative);
            let mut notebook: Value =
                serde_json::from_slice(&fs::read(&path)?).map_err(|e| Error::PostProcessor {
                    name: NAME.to_string(),
                    message: format!("{} is not a valid notebook: {}", relative.display(), e),
                })?;

            if strip_outputs(&mut notebook) {
                debug!("Stripped outputs from {}", relative.display());
                fs::write(&path, to_notebook_json(&notebook)?)?;
            }
        }
        Ok(())
    }
}

/// Clear outputs and execution counts of every code cell.
///
/// Returns whether anything changed.
pub fn strip_outputs(notebook: &mut Value) -> bool {
    let Some(cells) = notebook.get_mut("cells").and_then(Value::as_array_mut) else {
        return false;
    };

    let mut changed = false;
    for cell in cells {
        if cell.get("cell_type").and_then(Value::as_str) != Some("code") {
            continue;
        }
        let Some(cell) = cell.as_object_mut() else {
            continue;
        };
        if cell.get("outputs") != Some(&Value::Array(Vec::new())) {
            cell.insert("outputs".to_string(), Value::Array(Vec::new()));
            changed = true;
        }
        if cell.get("execution_count") != Some(&Value::Null) {
            cell.insert("execution_count".to_string(), Value::Null);
            changed = true;
        }
    }
    changed
}

/// Serialize the way Jupyter does: one-space indentation, trailing newline.
fn to_notebook_json(notebook: &Value) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b" "));
    notebook.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Register the `notebook` post-processor.
pub fn register(registrar: &mut Registrar) -> Result<()> {
    registrar.register_post_processor(NAME, StripNotebooks)
}

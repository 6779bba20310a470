use crate::cli::EditParams;
use crate::error::FadeError;
use crate::merge::{MergeOutcome, commit_edit, merge};
use crate::payload::{PayloadEditor, ScriptKind, edit_payload};
use crate::project;

fn payload_field(kind: ScriptKind) -> &'static str {
    match kind {
        ScriptKind::PostInst => "postinst_payload",
        ScriptKind::PreRm => "prerm_payload",
    }
}

/// Applies the requested changes and persists them. A request that changes
/// nothing leaves every file untouched.
pub fn run_edit(
    params: EditParams,
    editor: &dyn PayloadEditor,
) -> Result<MergeOutcome, FadeError> {
    let EditParams {
        paths,
        update,
        edit_scripts,
    } = params;

    let current = project::load(&paths)?;
    let mut outcome = merge(&current, update);

    for kind in edit_scripts {
        if edit_payload(editor, &mut outcome.config, kind)? {
            outcome.record_change(payload_field(kind));
        }
    }

    if outcome.is_noop() {
        tracing::info!("Nothing to change in {}", paths.root().display());
        return Ok(outcome);
    }

    commit_edit(&paths, &current, &outcome)?;
    tracing::info!("Updated {}", outcome.changed.join(", "));
    Ok(outcome)
}

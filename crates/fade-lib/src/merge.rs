use crate::config::{PartialProjectConfig, ProjectConfig, validate_config};
use crate::error::FadeError;
use crate::launcher::{install_launcher, remove_launcher};
use crate::project::{self, ProjectPaths};
use std::collections::BTreeSet;

/// Incremental edit of a list field: `current ∪ add \ remove`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListDelta {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl ListDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// Keeps the order of `current`, appends new entries in request order and
    /// drops every removed entry, including ones added by the same delta.
    pub fn apply(&self, current: &[String]) -> Vec<String> {
        let mut result = current.to_vec();
        for item in &self.add {
            if !result.contains(item) {
                result.push(item.clone());
            }
        }
        result.retain(|item| !self.remove.contains(item));
        result
    }
}

/// A requested change to an existing project.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    /// Wholesale replacements; `None` leaves a field alone.
    pub fields: PartialProjectConfig,
    pub depends: ListDelta,
    pub blacklist: ListDelta,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    pub config: ProjectConfig,
    /// Names of the fields that changed, in schema order.
    pub changed: Vec<&'static str>,
    /// Name, type or run command changed, so the staged launcher is stale.
    pub regenerate_launcher: bool,
}

impl MergeOutcome {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn record_change(&mut self, field: &'static str) {
        if !self.changed.contains(&field) {
            self.changed.push(field);
        }
    }
}

/// Overwrites `current` with `requested` unless it is absent or equal.
pub fn merge_field<T: PartialEq>(current: &mut T, requested: Option<T>) -> bool {
    merge_field_by(current, requested, |a, b| a == b)
}

pub fn merge_field_by<T>(
    current: &mut T,
    requested: Option<T>,
    equal: impl Fn(&T, &T) -> bool,
) -> bool {
    match requested {
        Some(requested) if !equal(current, &requested) => {
            *current = requested;
            true
        }
        _ => false,
    }
}

fn set_equal(a: &Vec<String>, b: &Vec<String>) -> bool {
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

/// Computes the configuration that results from applying `update` to `current`.
/// Nothing is written; see [`commit_edit`].
pub fn merge(current: &ProjectConfig, update: ConfigUpdate) -> MergeOutcome {
    let ConfigUpdate {
        fields,
        depends,
        blacklist,
    } = update;
    let mut config = current.clone();

    // Evaluated in order: wholesale replacements land before list deltas.
    let changes = [
        ("name", merge_field(&mut config.name, fields.name)),
        ("version", merge_field(&mut config.version, fields.version)),
        (
            "description",
            merge_field(&mut config.description, fields.description),
        ),
        ("url", merge_field(&mut config.url, fields.url)),
        (
            "architecture",
            merge_field(&mut config.architecture, fields.architecture),
        ),
        ("priority", merge_field(&mut config.priority, fields.priority)),
        (
            "maintainer_name",
            merge_field(&mut config.maintainer_name, fields.maintainer_name),
        ),
        (
            "maintainer_email",
            merge_field(&mut config.maintainer_email, fields.maintainer_email),
        ),
        (
            "type",
            merge_field(&mut config.project_type, fields.project_type),
        ),
        ("run", merge_field(&mut config.run, fields.run)),
        ("depends", merge_field(&mut config.depends, fields.depends)),
        ("depends", {
            let next = (!depends.is_empty()).then(|| depends.apply(&config.depends));
            merge_field(&mut config.depends, next)
        }),
        (
            "blacklist",
            merge_field_by(&mut config.blacklist, fields.blacklist, set_equal),
        ),
        ("blacklist", {
            let next = (!blacklist.is_empty()).then(|| blacklist.apply(&config.blacklist));
            merge_field_by(&mut config.blacklist, next, set_equal)
        }),
        (
            "postinst_payload",
            merge_field(
                &mut config.postinst_payload,
                fields.postinst_payload.map(Some),
            ),
        ),
        (
            "prerm_payload",
            merge_field(&mut config.prerm_payload, fields.prerm_payload.map(Some)),
        ),
    ];

    let mut outcome = MergeOutcome {
        config,
        changed: Vec::new(),
        regenerate_launcher: false,
    };
    for (field, did_change) in changes {
        if did_change {
            outcome.record_change(field);
        }
    }
    outcome.regenerate_launcher = outcome.config.name != current.name
        || outcome.config.project_type != current.project_type
        || outcome.config.run != current.run;

    outcome
}

/// Persists a merge result.
///
/// The launcher is replaced before the configuration is written, so a failure
/// leaves the old configuration next to either the old launcher or none.
pub fn commit_edit(
    paths: &ProjectPaths,
    previous: &ProjectConfig,
    outcome: &MergeOutcome,
) -> Result<(), FadeError> {
    validate_config(&outcome.config)?;

    if outcome.regenerate_launcher {
        tracing::info!(
            "Launcher inputs changed, regenerating {} launcher...",
            outcome.config.project_type
        );
        remove_launcher(paths, &previous.name)?;
        install_launcher(paths, &outcome.config)?;
    }

    project::save(paths, &outcome.config)
}

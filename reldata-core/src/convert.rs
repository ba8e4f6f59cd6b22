//! Convert vector-based ML datasets to relational (logic fact) datasets
//!
//! A feature matrix `x` of shape `(rows, columns)` and a target vector `y` of
//! shape `(rows,)` become:
//! - one fact per cell: `v1(id3,v1_2).`
//! - one example per row, shaped by the [`Task`] inferred from `y`'s dtype
//! - one mode declaration per feature column plus one for the target
//!
//! Row identifiers are 1-indexed (`id1`, `id2`, ...).

use ndarray::{ArrayView1, ArrayView2};

use crate::error::{DatasetError, Result};
use crate::models::{Element, RelationalDataset};

/// Kind of learning problem encoded by the target vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Integer labels, all in {0, 1}
    Binary,
    /// Integer labels with at least one value outside {0, 1}
    Multiclass,
    /// Floating-point targets
    Regression,
}

impl Task {
    /// Infer the task from the dtype of `y`, and for integer targets, its labels.
    pub fn infer<B: Element>(y: &ArrayView1<'_, B>) -> Result<Self> {
        let dtype = B::DTYPE;
        if dtype.is_float() {
            return Ok(Task::Regression);
        }
        if !dtype.is_integer() {
            return Err(DatasetError::UnsupportedDtype(dtype));
        }

        let binary = y
            .iter()
            .all(|v| matches!(v.as_label(), Some(0) | Some(1)));

        Ok(if binary { Task::Binary } else { Task::Multiclass })
    }
}

/// Default relation names: `v1 .. v{columns + 1}`, the last one naming the target.
pub fn default_names(columns: usize) -> Vec<String> {
    (1..=columns + 1).map(|i| format!("v{}", i)).collect()
}

/// Convert a feature matrix `x` and target vector `y` into a [`RelationalDataset`]
/// plus mode declarations.
///
/// `names` must hold one name per column of `x` followed by the target name.
/// When omitted, [`default_names`] is used.
pub fn from_numpy<A, B, S>(
    x: ArrayView2<'_, A>,
    y: ArrayView1<'_, B>,
    names: Option<&[S]>,
) -> Result<(RelationalDataset, Vec<String>)>
where
    A: Element,
    B: Element,
    S: AsRef<str>,
{
    let (rows, columns) = x.dim();

    if y.len() != rows {
        return Err(DatasetError::ShapeMismatch {
            expected: format!("y of length {}", rows),
            got: format!("y of length {}", y.len()),
        });
    }

    let names: Vec<String> = match names {
        Some(n) if n.len() != columns + 1 => {
            return Err(DatasetError::ShapeMismatch {
                expected: format!("{} names ({} features + target)", columns + 1, columns),
                got: format!("{} names", n.len()),
            });
        }
        Some(n) => n.iter().map(|s| s.as_ref().to_string()).collect(),
        None => default_names(columns),
    };

    let task = Task::infer(&y)?;
    let target = &names[columns];

    tracing::debug!(rows, columns, ?task, target = %target, "Converting vector dataset");

    let (pos, neg) = examples(&y, target, task);
    let facts = feature_facts(&x, &names[..columns]);
    let modes = modes(&names, task);

    Ok((RelationalDataset::new(pos, neg, facts), modes))
}

fn examples<B: Element>(y: &ArrayView1<'_, B>, target: &str, task: Task) -> (Vec<String>, Vec<String>) {
    let mut pos = Vec::new();
    let mut neg = Vec::new();

    for (i, label) in y.iter().enumerate() {
        let id = i + 1;
        match task {
            Task::Binary => {
                let fact = format!("{}(id{}).", target, id);
                if label.as_label() == Some(1) {
                    pos.push(fact);
                } else {
                    neg.push(fact);
                }
            }
            Task::Multiclass => {
                pos.push(format!("{t}(id{id},{t}_{l}).", t = target, id = id, l = label.render()));
            }
            Task::Regression => {
                pos.push(format!("regressionExample({}(id{}),{}).", target, id, label.render()));
            }
        }
    }

    (pos, neg)
}

/// Column-major: all rows of the first feature, then the second, ...
fn feature_facts<A: Element>(x: &ArrayView2<'_, A>, features: &[String]) -> Vec<String> {
    let mut facts = Vec::with_capacity(x.len());
    for (column, var) in x.columns().into_iter().zip(features) {
        for (i, value) in column.iter().enumerate() {
            facts.push(format!("{v}(id{id},{v}_{val}).", v = var, id = i + 1, val = value.render()));
        }
    }
    facts
}

fn modes(names: &[String], task: Task) -> Vec<String> {
    let (target, features) = match names.split_last() {
        Some(split) => split,
        None => return Vec::new(),
    };

    let mut modes: Vec<String> = features
        .iter()
        .map(|name| format!("{n}(+id,#var{n}).", n = name))
        .collect();

    modes.push(match task {
        Task::Multiclass => format!("{}(+id,#classlabel).", target),
        Task::Binary | Task::Regression => format!("{}(+id).", target),
    });

    modes
}

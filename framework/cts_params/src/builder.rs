//! Combinator builder for parameter expansion.
//!
//! Builders are plain values: every combinator consumes the builder and
//! returns a new one, so a builder handed to a test can never change under
//! it. Expansion is a cartesian product over the declared axes with the
//! first-declared axis as the outermost loop.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::{ParamSet, ParamsError};

type Predicate = Arc<dyn Fn(&ParamSet) -> bool + Send + Sync>;

/// One dimension of variation.
#[derive(Clone)]
pub enum Axis {
    /// `name` takes each value in turn.
    Options { name: String, values: Vec<Value> },
    /// Raw partial parameter sets.
    Sets(Vec<ParamSet>),
    /// Another builder's full expansion.
    Nested(ParamsBuilder),
}

impl Axis {
    /// Materialize the axis values as partial parameter sets.
    fn sets(&self) -> Result<Vec<ParamSet>, ParamsError> {
        match self {
            Axis::Options { name, values } => Ok(values
                .iter()
                .map(|v| ParamSet::new().with(name.clone(), v.clone()))
                .collect()),
            Axis::Sets(sets) => Ok(sets.clone()),
            Axis::Nested(builder) => builder.iter().collect(),
        }
    }

    /// Number of values along this axis, before any filter.
    pub fn len(&self) -> usize {
        match self {
            Axis::Options { values, .. } => values.len(),
            Axis::Sets(sets) => sets.len(),
            Axis::Nested(builder) => builder.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Options { name, values } => f
                .debug_struct("Options")
                .field("name", name)
                .field("values", values)
                .finish(),
            Axis::Sets(sets) => f.debug_tuple("Sets").field(sets).finish(),
            Axis::Nested(builder) => f.debug_tuple("Nested").field(builder).finish(),
        }
    }
}

impl From<Vec<ParamSet>> for Axis {
    fn from(sets: Vec<ParamSet>) -> Self {
        Axis::Sets(sets)
    }
}

impl From<ParamsBuilder> for Axis {
    fn from(builder: ParamsBuilder) -> Self {
        Axis::Nested(builder)
    }
}

/// A named list of discrete values.
pub fn options<V: Into<Value>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Axis {
    Axis::Options {
        name: name.into(),
        values: values.into_iter().map(Into::into).collect(),
    }
}

/// Alias of [`options`].
pub fn poptions<V: Into<Value>>(
    name: impl Into<String>,
    values: impl IntoIterator<Item = V>,
) -> Axis {
    options(name, values)
}

/// Boolean axis: `false`, then `true`.
pub fn pbool(name: impl Into<String>) -> Axis {
    options(name, [false, true])
}

/// An empty builder. Expands to exactly one empty parameter set.
pub fn params() -> ParamsBuilder {
    ParamsBuilder::default()
}

/// Immutable parameter expression.
#[derive(Clone, Default)]
pub struct ParamsBuilder {
    axes: Vec<Axis>,
    filters: Vec<Predicate>,
}

impl ParamsBuilder {
    /// Cartesian product with `axis`.
    #[must_use]
    pub fn combine(mut self, axis: impl Into<Axis>) -> Self {
        self.axes.push(axis.into());
        self
    }

    /// Shorthand for `combine(options(name, values))`.
    #[must_use]
    pub fn options<V: Into<Value>>(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.combine(options(name, values))
    }

    /// Shorthand for `combine(pbool(name))`.
    #[must_use]
    pub fn bool(self, name: impl Into<String>) -> Self {
        self.combine(pbool(name))
    }

    /// Keep only sets for which `pred` holds.
    #[must_use]
    pub fn filter<P>(mut self, pred: P) -> Self
    where
        P: Fn(&ParamSet) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(pred));
        self
    }

    /// Drop sets for which `pred` holds.
    #[must_use]
    pub fn unless<P>(self, pred: P) -> Self
    where
        P: Fn(&ParamSet) -> bool + Send + Sync + 'static,
    {
        self.filter(move |set| !pred(set))
    }

    /// Drop every set that matches one of `partials` (see [`ParamSet::matches`]).
    #[must_use]
    pub fn exclude(self, partials: Vec<ParamSet>) -> Self {
        self.unless(move |set| partials.iter().any(|p| set.matches(p)))
    }

    /// Number of declared axes.
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Lazily iterate the expansion. Can be called any number of times.
    pub fn iter(&self) -> Expansion<'_> {
        Expansion::new(self)
    }

    /// Product of the axis sizes, before filters are applied.
    ///
    /// Nested builders count with their own unfiltered product. Merge
    /// conflicts are not detected here; use [`expand`](Self::expand).
    pub fn len(&self) -> usize {
        self.axes.iter().map(Axis::len).product()
    }

    /// True if some axis has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the expansion, rejecting merge conflicts and sets that
    /// share a public identity.
    pub fn expand(&self) -> Result<Vec<ParamSet>, ParamsError> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for set in self.iter() {
            let set = set?;
            let identity = set.identity();
            if !seen.insert(identity.clone()) {
                return Err(ParamsError::DuplicateParams { identity });
            }
            out.push(set);
        }
        tracing::trace!(count = out.len(), axes = self.axes.len(), "expanded parameters");
        Ok(out)
    }

    fn keeps(&self, set: &ParamSet) -> bool {
        self.filters.iter().all(|f| f(set))
    }
}

impl fmt::Debug for ParamsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamsBuilder")
            .field("axes", &self.axes)
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl From<Axis> for ParamsBuilder {
    fn from(axis: Axis) -> Self {
        params().combine(axis)
    }
}

impl From<Vec<ParamSet>> for ParamsBuilder {
    fn from(sets: Vec<ParamSet>) -> Self {
        params().combine(sets)
    }
}

impl<'a> IntoIterator for &'a ParamsBuilder {
    type Item = Result<ParamSet, ParamsError>;
    type IntoIter = Expansion<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a builder's expansion.
///
/// Axis values are materialized once up front; the product itself is walked
/// with an odometer over axis indices, last axis fastest.
pub struct Expansion<'a> {
    builder: &'a ParamsBuilder,
    axes: Vec<Vec<ParamSet>>,
    /// `None` once exhausted.
    cursor: Option<Vec<usize>>,
    error: Option<ParamsError>,
}

impl<'a> Expansion<'a> {
    fn new(builder: &'a ParamsBuilder) -> Self {
        let materialized: Result<Vec<_>, _> = builder.axes.iter().map(Axis::sets).collect();
        match materialized {
            Ok(axes) => {
                let cursor = if axes.iter().any(Vec::is_empty) {
                    None
                } else {
                    Some(vec![0; axes.len()])
                };
                Expansion {
                    builder,
                    axes,
                    cursor,
                    error: None,
                }
            }
            Err(e) => Expansion {
                builder,
                axes: Vec::new(),
                cursor: None,
                error: Some(e),
            },
        }
    }

    fn current(&self, cursor: &[usize]) -> Result<ParamSet, ParamsError> {
        let mut set = ParamSet::new();
        for (axis, &idx) in self.axes.iter().zip(cursor) {
            set.absorb(&axis[idx])?;
        }
        Ok(set)
    }

    fn advance(&mut self) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        for pos in (0..cursor.len()).rev() {
            cursor[pos] += 1;
            if cursor[pos] < self.axes[pos].len() {
                return;
            }
            cursor[pos] = 0;
        }
        // Carried out of the outermost axis (or there were no axes).
        self.cursor = None;
    }
}

impl Iterator for Expansion<'_> {
    type Item = Result<ParamSet, ParamsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.error.take() {
            return Some(Err(e));
        }
        loop {
            let cursor = self.cursor.as_ref()?;
            let item = self.current(cursor);
            self.advance();
            match item {
                Ok(set) if self.builder.keeps(&set) => return Some(Ok(set)),
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

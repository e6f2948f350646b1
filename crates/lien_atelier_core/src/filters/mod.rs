//! Filter library.
//!
//! Filters are the functions a binding expression pipes its value through:
//! `items | filter:query | orderBy:'-date' | limitTo:10`. Each one receives
//! the piped input, its positional arguments and the binder options.
//!
//! ## Built-in Filters
//!
//! | name | module |
//! |------|--------|
//! | `filter`, `orderBy`, `limitTo` | [`collection`] |
//! | `number`, `currency`, `date`, `json`, `lowercase`, `uppercase` | [`format`] |
//!
//! Custom filters are installed with [`FilterLibrary::register`], either as a
//! closure or as a [`Filter`] implementation. Registering under a built-in
//! name replaces the built-in.

pub mod collection;
pub mod format;

use lien_carton::{CompactString, FxHashMap, Value};
use lien_relief::{BinderOptions, EvaluationError};

pub use collection::{filter_items, limit_to, order_by, Criterion, OrderKey};
pub use format::{format_currency, format_number, DateFormatter};

/// A value transform usable in a filter pipe
pub trait Filter {
    fn apply(
        &self,
        input: &Value,
        args: &[Value],
        options: &BinderOptions,
    ) -> Result<Value, EvaluationError>;
}

impl<F> Filter for F
where
    F: Fn(&Value, &[Value], &BinderOptions) -> Result<Value, EvaluationError>,
{
    #[inline]
    fn apply(
        &self,
        input: &Value,
        args: &[Value],
        options: &BinderOptions,
    ) -> Result<Value, EvaluationError> {
        self(input, args, options)
    }
}

/// Registry of filters by name
pub struct FilterLibrary {
    filters: FxHashMap<CompactString, Box<dyn Filter>>,
}

impl Default for FilterLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FilterLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.filters.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("FilterLibrary")
            .field("filters", &names)
            .finish()
    }
}

impl FilterLibrary {
    /// A library holding the built-in filters
    pub fn new() -> Self {
        let mut library = Self::empty();
        library.register("filter", collection::filter_filter);
        library.register("orderBy", collection::order_by_filter);
        library.register("limitTo", collection::limit_to_filter);
        library.register("number", format::number_filter);
        library.register("currency", format::currency_filter);
        library.register("date", format::DateFilter::default());
        library.register("json", format::json_filter);
        library.register("lowercase", format::lowercase_filter);
        library.register("uppercase", format::uppercase_filter);
        library
    }

    /// A library without any filter
    pub fn empty() -> Self {
        Self {
            filters: FxHashMap::default(),
        }
    }

    /// Install a filter under `name`, replacing any previous one
    pub fn register(&mut self, name: &str, filter: impl Filter + 'static) {
        self.filters
            .insert(CompactString::new(name), Box::new(filter));
    }

    /// Install the formatter the `date` filter delegates to
    pub fn set_date_formatter(
        &mut self,
        formatter: impl Fn(&Value, Option<&str>) -> Value + 'static,
    ) {
        self.register("date", format::DateFilter::with_formatter(formatter));
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|filter| filter.as_ref())
    }

    /// Run the filter called `name`
    pub fn apply(
        &self,
        name: &str,
        input: &Value,
        args: &[Value],
        options: &BinderOptions,
    ) -> Result<Value, EvaluationError> {
        let filter = self
            .get(name)
            .ok_or_else(|| EvaluationError::UnknownFilter(CompactString::new(name)))?;
        filter.apply(input, args, options)
    }
}

/// Positional argument, with `null` standing for "not given"
#[inline]
pub(crate) fn arg(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|value| !value.is_null())
}

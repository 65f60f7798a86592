#![forbid(unsafe_code)]

//! Declarative binding at component creation.
//!
//! A component declares its bindings as a [`BindingPlan`] — either a static
//! list or a zero-argument producer evaluated at mount time — and the host
//! framework's creation hook passes it to [`Binder::mount`]. Destruction
//! goes through [`Binder::destroy`]; together the two calls are the whole
//! lifecycle seam a host integration needs.

use std::fmt;
use std::rc::Rc;

use tether_core::{BindError, BindOptions, Source, SyncTicket};

use crate::binder::Binder;

/// Ordered list of `(key, source)` pairs to bind at mount.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingPlan {
    entries: Vec<(String, Source)>,
}

impl BindingPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one declared binding.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, source: Source) -> Self {
        self.entries.push((key.into(), source));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Source)> {
        self.entries.iter().map(|(key, source)| (key.as_str(), source))
    }
}

impl FromIterator<(String, Source)> for BindingPlan {
    fn from_iter<I: IntoIterator<Item = (String, Source)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A component's binding declaration: a static plan, or a producer invoked
/// at each mount.
pub enum Declaration {
    Static(BindingPlan),
    Producer(Rc<dyn Fn() -> BindingPlan>),
}

impl Declaration {
    /// Declare a fixed plan.
    #[must_use]
    pub fn of(plan: BindingPlan) -> Self {
        Self::Static(plan)
    }

    /// Declare a plan computed at mount time.
    #[must_use]
    pub fn produced(producer: impl Fn() -> BindingPlan + 'static) -> Self {
        Self::Producer(Rc::new(producer))
    }

    /// The plan to mount right now.
    #[must_use]
    pub fn evaluate(&self) -> BindingPlan {
        match self {
            Self::Static(plan) => plan.clone(),
            Self::Producer(producer) => producer(),
        }
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(plan) => f.debug_tuple("Static").field(plan).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl Binder {
    /// Creation-time integration: bind every entry of the declaration with
    /// this binder's defaults, returning the per-entry tickets. An absent
    /// declaration is a no-op, not an error.
    pub fn mount(
        &self,
        declaration: Option<&Declaration>,
    ) -> Result<Vec<(String, SyncTicket)>, BindError> {
        let Some(declaration) = declaration else {
            return Ok(Vec::new());
        };
        let plan = declaration.evaluate();
        tracing::debug!(entries = plan.len(), "mounting declarative bindings");

        let mut tickets = Vec::with_capacity(plan.len());
        for (key, source) in plan.iter() {
            let ticket = self.bind(key, source.clone(), &BindOptions::new())?;
            tickets.push((key.to_owned(), ticket));
        }
        Ok(tickets)
    }
}

/// Build a [`BindingPlan`] from `key => source` pairs.
///
/// ```ignore
/// let plan = plan! {
///     "items" => Source::query("rooms/1/items").order_by_key(),
///     "profile" => Source::reference("users/ada"),
/// };
/// ```
#[macro_export]
macro_rules! plan {
    () => { $crate::lifecycle::BindingPlan::new() };
    ($($key:expr => $source:expr),+ $(,)?) => {{
        let mut plan = $crate::lifecycle::BindingPlan::new();
        $( plan = plan.with($key, $source); )+
        plan
    }};
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

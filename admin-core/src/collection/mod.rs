//! In-memory list state shared by every admin list screen.
//!
//! A [`CollectionView`] owns the full collection for one entity, the free-text
//! search term and the pagination settings. Everything shown on screen (the
//! visible slice, the item and page counts) is derived on demand by
//! [`CollectionView::view`]; nothing derived is ever stored.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use admin_core::{CollectionView, PageSizes, Provider};
//!
//! let mut providers: CollectionView<Provider> = CollectionView::new(PageSizes::default());
//! providers.load(&[
//!     json!({"id": 1, "name": "John Doe Supplies"}),
//!     json!({"id": 2, "name": "Jane Textiles"}),
//! ]);
//!
//! providers.set_search_term("doe");
//! let view = providers.view();
//!
//! assert_eq!(view.total_items, 1);
//! assert_eq!(view.visible_items[0].id, 1);
//! ```

mod search;

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::money::saturating_sum;
use crate::normalize::FromRaw;

pub use search::{Searchable, normalize_term};

/// Page sizes offered by list screens when none are configured.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 20, 50];

/// Page size selected when a screen first opens.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Errors raised by pagination settings. State is never modified when one
/// of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// The requested page size is not one of the allowed options.
    #[error("{requested} items per page is not allowed; expected one of {allowed:?}")]
    InvalidItemsPerPage { requested: usize, allowed: Vec<usize> },

    /// A page size option set was empty, contained zero, or did not include
    /// its own default.
    #[error("invalid page size options {options:?} with default {default}")]
    InvalidPageSizes { options: Vec<usize>, default: usize },
}

/// The allowed items-per-page values and the initial selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSizes {
    options: Vec<usize>,
    default: usize,
}

impl PageSizes {
    /// Validates and builds a page size set. Options are sorted and
    /// de-duplicated.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidPageSizes`] if `options` is empty, contains
    /// `0`, or does not contain `default`.
    pub fn new(
        options: impl IntoIterator<Item = usize>,
        default: usize,
    ) -> Result<Self, CollectionError> {
        let mut options: Vec<usize> = options.into_iter().collect();
        options.sort_unstable();
        options.dedup();

        if options.is_empty() || options.contains(&0) || !options.contains(&default) {
            return Err(CollectionError::InvalidPageSizes { options, default });
        }
        Ok(Self { options, default })
    }

    pub fn options(&self) -> &[usize] {
        &self.options
    }

    pub fn default_size(&self) -> usize {
        self.default
    }

    pub fn allows(&self, size: usize) -> bool {
        self.options.contains(&size)
    }
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            default: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Tagged form of every user-driven mutation, for callers that route UI
/// events through a single reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionAction {
    Search(String),
    ItemsPerPage(usize),
    Page(i64),
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
}

/// Everything a list screen renders for the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a, T> {
    pub visible_items: Vec<&'a T>,
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub items_per_page: usize,
}

impl<T> PageView<'_, T> {
    /// 1-based positions of the first and last visible items within the
    /// filtered collection, or `None` when nothing is visible.
    pub fn item_range(&self) -> Option<(usize, usize)> {
        if self.visible_items.is_empty() {
            return None;
        }
        let first = (self.current_page - 1) * self.items_per_page + 1;
        Some((first, first + self.visible_items.len() - 1))
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering>;

/// Number of pages needed for `total_items`. An empty collection still has
/// one (empty) page.
pub fn page_count(
    total_items: usize,
    items_per_page: usize,
) -> usize {
    total_items.div_ceil(items_per_page.max(1)).max(1)
}

/// Filterable, paginated view over one entity collection.
pub struct CollectionView<T> {
    all_items: Vec<T>,
    search_term: String,
    current_page: usize,
    items_per_page: usize,
    page_sizes: PageSizes,
    ordering: Option<Comparator<T>>,
}

impl<T> CollectionView<T> {
    /// Creates an empty view on page 1 using the default page size of
    /// `page_sizes`.
    pub fn new(page_sizes: PageSizes) -> Self {
        Self {
            all_items: Vec::new(),
            search_term: String::new(),
            current_page: 1,
            items_per_page: page_sizes.default_size(),
            page_sizes,
            ordering: None,
        }
    }

    /// Replaces the whole collection with already-typed records.
    ///
    /// The configured ordering (if any) is applied. The current page is
    /// kept but clamped into range for the new collection.
    pub fn replace(
        &mut self,
        items: Vec<T>,
    ) where
        T: Searchable,
    {
        self.all_items = items;
        if let Some(cmp) = &self.ordering {
            self.all_items.sort_by(|a, b| cmp(a, b));
        }
        let total_pages = self.total_pages();
        self.current_page = self.current_page.clamp(1, total_pages);
        debug!(
            items = self.all_items.len(),
            page = self.current_page,
            "collection replaced"
        );
    }

    /// Sets a stable sort applied to the collection now and on every
    /// subsequent load. Paging never re-sorts.
    pub fn set_ordering<F>(
        &mut self,
        cmp: F,
    ) where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        self.all_items.sort_by(&cmp);
        self.ordering = Some(Box::new(cmp));
    }

    pub fn items(&self) -> &[T] {
        &self.all_items
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn page_sizes(&self) -> &PageSizes {
        &self.page_sizes
    }

    /// Stores the lower-cased term and returns to page 1.
    pub fn set_search_term(
        &mut self,
        term: &str,
    ) {
        self.search_term = normalize_term(term);
        self.current_page = 1;
    }

    /// Changes the page size and returns to page 1.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidItemsPerPage`] when `n` is not an allowed
    /// option; the previous page size and page are kept.
    pub fn set_items_per_page(
        &mut self,
        n: usize,
    ) -> Result<(), CollectionError> {
        if !self.page_sizes.allows(n) {
            warn!(requested = n, "rejected page size");
            return Err(CollectionError::InvalidItemsPerPage {
                requested: n,
                allowed: self.page_sizes.options().to_vec(),
            });
        }
        self.items_per_page = n;
        self.current_page = 1;
        Ok(())
    }
}

impl<T: Searchable> CollectionView<T> {
    /// Normalizes `raw` records and replaces the collection with them.
    ///
    /// Malformed fields are coerced to defaults by [`FromRaw`], so every
    /// record is loaded. Returns the number of records now held.
    pub fn load(
        &mut self,
        raw: &[Value],
    ) -> usize
    where
        T: FromRaw,
    {
        let items = raw.iter().map(T::from_value).collect();
        self.replace(items);
        self.all_items.len()
    }

    /// Items matching the search term, in collection order.
    pub fn filtered(&self) -> Vec<&T> {
        self.matching().collect()
    }

    fn matching(&self) -> impl Iterator<Item = &T> {
        let term = self.search_term.as_str();
        self.all_items.iter().filter(move |item| item.matches(term))
    }

    pub fn total_items(&self) -> usize {
        self.matching().count()
    }

    pub fn total_pages(&self) -> usize {
        page_count(self.total_items(), self.items_per_page)
    }

    /// Moves to page `p`, clamped into `[1, total_pages]`. Returns the page
    /// actually selected.
    pub fn set_page(
        &mut self,
        p: i64,
    ) -> usize {
        let total_pages = self.total_pages();
        let page = usize::try_from(p.max(1)).unwrap_or(usize::MAX).min(total_pages);
        if i64::try_from(page).ok() != Some(p) {
            warn!(requested = p, clamped = page, total_pages, "page request out of range");
        }
        self.current_page = page;
        page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.current_page as i64 + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.set_page(self.current_page as i64 - 1)
    }

    pub fn first_page(&mut self) -> usize {
        self.set_page(1)
    }

    pub fn last_page(&mut self) -> usize {
        self.set_page(i64::MAX)
    }

    /// Applies one tagged action.
    ///
    /// # Errors
    ///
    /// Only [`CollectionAction::ItemsPerPage`] can fail; see
    /// [`set_items_per_page`](Self::set_items_per_page).
    pub fn dispatch(
        &mut self,
        action: CollectionAction,
    ) -> Result<(), CollectionError> {
        match action {
            CollectionAction::Search(term) => self.set_search_term(&term),
            CollectionAction::ItemsPerPage(n) => self.set_items_per_page(n)?,
            CollectionAction::Page(p) => {
                self.set_page(p);
            }
            CollectionAction::NextPage => {
                self.next_page();
            }
            CollectionAction::PreviousPage => {
                self.previous_page();
            }
            CollectionAction::FirstPage => {
                self.first_page();
            }
            CollectionAction::LastPage => {
                self.last_page();
            }
        }
        Ok(())
    }

    /// Derives the visible slice and pagination metadata in a single pass
    /// over the collection.
    pub fn view(&self) -> PageView<'_, T> {
        let per_page = self.items_per_page;
        let start = (self.current_page - 1) * per_page;
        let end = start + per_page;

        let mut total_items = 0;
        let mut visible_items = Vec::with_capacity(per_page);
        for item in self.matching() {
            if (start..end).contains(&total_items) {
                visible_items.push(item);
            }
            total_items += 1;
        }

        PageView {
            visible_items,
            total_items,
            total_pages: page_count(total_items, per_page),
            current_page: self.current_page,
            items_per_page: per_page,
        }
    }

    /// Sums a derived amount (stock, document totals) over the filtered
    /// items, saturating at the bounds of [`Decimal`].
    pub fn sum_by<F>(
        &self,
        f: F,
    ) -> Decimal
    where
        F: Fn(&T) -> Decimal,
    {
        saturating_sum(self.matching().map(f))
    }
}

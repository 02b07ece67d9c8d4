/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next_page: None }
    }

    pub fn with_next(items: Vec<T>, next_page: u32) -> Self {
        Self { items, next_page: Some(next_page) }
    }
}

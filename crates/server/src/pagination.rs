use serde::Deserialize;

pub const PER_PAGE: u64 = 25;
pub const MAX_PAGES: u64 = 10000;

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default)]
    page: u64,
}

impl Pagination {
    pub fn page(&self) -> u64 {
        self.page.clamp(1, MAX_PAGES)
    }

    pub fn limit(&self) -> u64 {
        PER_PAGE
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1) * PER_PAGE
    }
}

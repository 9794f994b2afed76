//! CMS, taxes and modules

use crate::http::MagentoClient;
use crate::pagination::{EntityStream, ListOptions};

impl MagentoClient {
    pub fn get_cms_pages(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/cmsPage/search", options)
    }

    pub fn get_cms_blocks(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/cmsBlock/search", options)
    }

    pub fn get_tax_classes(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/taxClasses/search", options)
    }

    pub fn get_tax_rates(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/taxRates/search", options)
    }

    pub fn get_tax_rules(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/taxRules/search", options)
    }

    /// Enabled modules
    pub fn get_modules(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/modules", options)
    }
}

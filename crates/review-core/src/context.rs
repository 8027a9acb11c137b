use std::sync::Arc;

use crate::api::ReviewApi;
use crate::feed::ChangeFeed;
use crate::i18n::{Translate, Translator};
use crate::status::{map_error_to_message, ErrorMapper};

/// Collaborators shared by every controller of one console session.
#[derive(Clone)]
pub struct ReviewContext {
    pub api: Arc<dyn ReviewApi>,
    pub translator: Arc<dyn Translate>,
    pub mapper: Arc<ErrorMapper>,
    pub feed: ChangeFeed,
}

impl ReviewContext {
    pub fn new(api: Arc<dyn ReviewApi>) -> Self {
        let mapper: Arc<ErrorMapper> = Arc::new(map_error_to_message);
        Self {
            api,
            translator: Arc::new(Translator::default()),
            mapper,
            feed: ChangeFeed::new(),
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translate>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_error_mapper(mut self, mapper: Arc<ErrorMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn t(&self) -> &dyn Translate {
        &*self.translator
    }

    pub fn mapper(&self) -> Option<&ErrorMapper> {
        Some(&*self.mapper)
    }
}

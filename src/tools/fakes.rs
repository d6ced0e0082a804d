//! In-memory `WikiApi` for tool and server tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::clients::mediawiki::{UpstreamError, WikiApi};
use crate::domain::{PageContent, WikiPage, DEFAULT_VARIANT};

#[derive(Clone, Default)]
pub struct FakeWiki {
    pages: Vec<WikiPage>,
    content: Option<PageContent>,
    failure: Option<String>,
    searches: Arc<Mutex<Vec<(String, u32)>>>,
    titles: Arc<Mutex<Vec<String>>>,
}

impl FakeWiki {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_pages(mut self, pages: Vec<WikiPage>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_html(mut self, title: &str, html: &str) -> Self {
        let mut text = HashMap::new();
        text.insert(DEFAULT_VARIANT.to_string(), html.to_string());
        self.content = Some(PageContent { title: title.to_string(), text });
        self
    }

    pub fn with_content(mut self, content: PageContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn last_search(&self) -> Option<(String, u32)> {
        self.searches.lock().unwrap().last().cloned()
    }

    pub fn last_title(&self) -> Option<String> {
        self.titles.lock().unwrap().last().cloned()
    }

    fn fail(&self) -> Option<UpstreamError> {
        self.failure.as_ref().map(|info| UpstreamError::Api {
            code: "fake".into(),
            info: info.clone(),
        })
    }
}

#[async_trait]
impl WikiApi for FakeWiki {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<WikiPage>, UpstreamError> {
        self.searches.lock().unwrap().push((query.to_string(), limit));
        match self.fail() {
            Some(e) => Err(e),
            None => Ok(self.pages.clone()),
        }
    }

    async fn page_content(&self, title: &str) -> Result<PageContent, UpstreamError> {
        self.titles.lock().unwrap().push(title.to_string());
        if let Some(e) = self.fail() {
            return Err(e);
        }
        Ok(self.content.clone().unwrap_or_else(|| PageContent {
            title: title.to_string(),
            text: HashMap::new(),
        }))
    }
}

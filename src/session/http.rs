//! HTTP-backed page session
//!
//! Models the source's browser-oriented navigation over plain HTTP: a
//! cookie-holding client plus an explicit window stack of fetched views.
//! `enter` pushes a view the way the source opens a new window; `leave`
//! pops it and returns to the enclosing view.

use super::{PageSession, SessionFactory};
use crate::config::{ClientConfig, SourceConfig};
use crate::markup::{self, Link};
use crate::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// One open view: where we are and what the server sent
#[derive(Debug, Clone)]
struct PageView {
    url: Url,
    address: String,
    html: String,
}

/// A live session against the form-driven source
pub struct HttpSession {
    client: Client,
    source: SourceConfig,
    stack: Vec<PageView>,
}

/// Builds the HTTP client the session runs on
///
/// The cookie store is required: the source keys its query state to the
/// session cookie.
pub fn build_http_client(config: &ClientConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

impl HttpSession {
    /// Opens a session by fetching the query page
    pub async fn connect(source: &SourceConfig, client_cfg: &ClientConfig) -> Result<Self> {
        let client = build_http_client(client_cfg)?;
        let base = Url::parse(&source.base_url)?;

        let mut session = Self {
            client,
            source: source.clone(),
            stack: Vec::new(),
        };
        let view = session.fetch(base).await?;
        session.stack.push(view);
        Ok(session)
    }

    fn top(&self) -> &PageView {
        self.stack.last().expect("stack holds at least the root view")
    }

    async fn fetch(&self, url: Url) -> Result<PageView> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Navigation {
                target: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }
        let address = response.url().to_string();
        let final_url = response.url().clone();
        let html = response.text().await?;
        Ok(PageView {
            url: final_url,
            address,
            html,
        })
    }

    /// Resolves the value an option label submits, distinguishing a
    /// missing control from an unknown label
    fn option_value(&self, selector_id: &str, label: &str) -> Result<String> {
        let html = &self.top().html;
        let labels = markup::select_option_labels(html, selector_id).ok_or_else(|| {
            CatalogError::FormInteraction {
                control: selector_id.to_string(),
            }
        })?;
        if !labels.iter().any(|l| l == label) {
            return Err(CatalogError::UnknownOption {
                label: label.to_string(),
                selector: selector_id.to_string(),
            });
        }
        markup::select_option_value(html, selector_id, label).ok_or_else(|| {
            CatalogError::UnknownOption {
                label: label.to_string(),
                selector: selector_id.to_string(),
            }
        })
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn query_scope(&mut self, program_type: &str, scope_label: &str) -> Result<()> {
        let type_value = self.option_value(&self.source.type_selector, program_type)?;
        let scope_value = self.option_value(&self.source.scope_selector, scope_label)?;

        let html = &self.top().html;
        let button_value = markup::input_value(html, &self.source.query_button).ok_or_else(|| {
            CatalogError::FormInteraction {
                control: self.source.query_button.clone(),
            }
        })?;

        // Postback: echo the hidden state fields, set the two selects,
        // name the button that fired
        let mut form: Vec<(String, String)> = markup::hidden_inputs(html);
        form.push((self.source.type_selector.clone(), type_value));
        form.push((self.source.scope_selector.clone(), scope_value));
        form.push((self.source.query_button.clone(), button_value));

        let action = match markup::form_action(html) {
            Some(action) => self.top().url.join(&action)?,
            None => self.top().url.clone(),
        };

        tracing::debug!("Submitting query form to {}", action);
        let response = self.client.post(action.clone()).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Navigation {
                target: action.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let address = response.url().to_string();
        let url = response.url().clone();
        let html = response.text().await?;
        *self.stack.last_mut().expect("root view") = PageView { url, address, html };
        Ok(())
    }

    fn current_markup(&self) -> &str {
        &self.top().html
    }

    fn current_address(&self) -> &str {
        &self.top().address
    }

    async fn enter(&mut self, link: &Link) -> Result<()> {
        if link.address.is_empty() || link.address.starts_with("javascript:") {
            return Err(CatalogError::Navigation {
                target: link.name.clone(),
                message: format!("address '{}' is not navigable", link.address),
            });
        }
        let target = self.top().url.join(&link.address)?;
        tracing::debug!("Entering '{}' at {}", link.name, target);
        let view = self.fetch(target).await?;
        self.stack.push(view);
        Ok(())
    }

    async fn leave(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(CatalogError::WindowStackUnderflow);
        }
        self.stack.pop();
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        let url = self.top().url.clone();
        tracing::debug!("Refreshing {}", url);
        let view = self.fetch(url).await?;
        *self.stack.last_mut().expect("root view") = view;
        Ok(())
    }

    fn option_labels(&self, selector_id: &str) -> Result<Vec<String>> {
        markup::select_option_labels(&self.top().html, selector_id).ok_or_else(|| {
            CatalogError::FormInteraction {
                control: selector_id.to_string(),
            }
        })
    }
}

/// Opens fresh [`HttpSession`]s against a configured source
#[derive(Clone)]
pub struct HttpSessionFactory {
    source: SourceConfig,
    client: ClientConfig,
}

impl HttpSessionFactory {
    pub fn new(source: SourceConfig, client: ClientConfig) -> Self {
        Self { source, client }
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession> {
        HttpSession::connect(&self.source, &self.client).await
    }
}

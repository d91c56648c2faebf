//! Page session capability
//!
//! A [`PageSession`] is the crawler's only handle on the interactive
//! source: submit the query form, read the current page, navigate into a
//! link's target (a new view on the window stack), and come back. One
//! session is owned by exactly one in-flight operation at a time; a
//! session abandoned to a timed-out operation is never touched again,
//! replacements come from the [`SessionFactory`].

mod http;

pub use http::{build_http_client, HttpSession, HttpSessionFactory};

use crate::markup::Link;
use crate::Result;
use async_trait::async_trait;

/// Navigation capability over the form-driven source
#[async_trait]
pub trait PageSession: Send {
    /// Submits the selection form for a (program type, scope) pair,
    /// replacing the current view with the result listing
    ///
    /// Fails with `FormInteraction` when the expected form controls are
    /// absent (e.g., the page has not finished rendering).
    async fn query_scope(&mut self, program_type: &str, scope_label: &str) -> Result<()>;

    /// Raw markup of the current view
    fn current_markup(&self) -> &str;

    /// Resolved address of the current view (for audit logging)
    fn current_address(&self) -> &str;

    /// Navigates into the link's target, switching to the newly opened
    /// view
    async fn enter(&mut self, link: &Link) -> Result<()>;

    /// Closes the current view and returns to the enclosing one
    ///
    /// Every `enter` must be paired with exactly one `leave`, including
    /// on early exits; an unbalanced stack corrupts all subsequent
    /// navigation in the scope.
    async fn leave(&mut self) -> Result<()>;

    /// Re-fetches the current view in place
    async fn refresh(&mut self) -> Result<()>;

    /// Option labels offered by a select control on the current view
    fn option_labels(&self, selector_id: &str) -> Result<Vec<String>>;
}

/// Produces fresh sessions, both at scope start and as replacements after
/// a bounded navigation is abandoned
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: PageSession + Send + 'static;

    async fn open(&self) -> Result<Self::Session>;
}

//! HTML email templates
//!
//! One compiled-in template per email kind, all extending `base.html` for the
//! company header and footer.

pub mod renderer;
pub mod types;

pub use renderer::TemplateRenderer;
pub use types::{CompanyView, ProductRow, SocialLink};

//! Built-in listing templates using the Tera template engine
//!
//! Templates are embedded in the binary; HTML output is autoescaped since
//! every field comes from the content API.

use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::Result;
use crate::feed::RenderState;
use crate::helpers::Helpers;
use crate::i18n::I18n;

/// Static files written next to the rendered pages
pub const EMBEDDED_ASSETS: &[(&str, &str)] = &[("Logo.svg", include_str!("site/Logo.svg"))];

/// Template renderer with the embedded listing templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            // Partials
            ("partials/post.html", include_str!("site/partials/post.html")),
            (
                "partials/load_more.html",
                include_str!("site/partials/load_more.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Renders the listing page for a snapshot
pub struct ListingPage<'a> {
    pub config: &'a SiteConfig,
    pub i18n: &'a I18n,
    pub state: &'a RenderState,
    /// Message of the last failed load, if any
    pub error: Option<&'a str>,
}

impl ListingPage<'_> {
    pub fn context(&self) -> Result<Context> {
        let helpers = Helpers::new(self.config.clone());
        let posts = self
            .state
            .posts()
            .iter()
            .map(|p| PostView::new(&helpers, p))
            .collect::<Result<Vec<_>>>()?;

        let mut context = Context::new();
        context.insert("config", &ConfigData::from(self.config));
        context.insert("labels", &self.i18n.get_all_translations());
        context.insert("posts", &posts);
        context.insert("has_more", &self.state.has_more());
        context.insert("load_more_url", &helpers.url_for("load-more"));
        context.insert("error", &self.error);
        Ok(context)
    }

    pub fn render(&self, renderer: &TemplateRenderer) -> Result<String> {
        renderer.render("index.html", &self.context()?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub uid: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Formatted for display
    pub date: String,
    /// ISO 8601 for the `datetime` attribute
    pub datetime: Option<String>,
    pub url: Option<String>,
}

impl PostView {
    pub fn new(helpers: &Helpers, post: &Post) -> Result<Self> {
        Ok(Self {
            uid: post.uid.clone(),
            title: post.data.title.clone(),
            subtitle: post.data.subtitle.clone(),
            author: post.data.author.clone(),
            date: helpers.post_date(post)?,
            datetime: helpers.post_datetime(post),
            url: helpers.post_url(post),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub language: String,
    pub logo: String,
    pub root: String,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
            logo: crate::helpers::url_for(config, &config.logo),
            root: config.root.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Page;

    fn render(state: &RenderState, error: Option<&str>) -> String {
        let config = SiteConfig::default();
        let i18n = I18n::new(&config.language);
        let page = ListingPage {
            config: &config,
            i18n: &i18n,
            state,
            error,
        };
        page.render(&TemplateRenderer::new().unwrap()).unwrap()
    }

    fn post(uid: &str, title: &str) -> Post {
        Post::new(uid, Some("2021-01-01"), title, "Subtitle", "Author")
    }

    #[test]
    fn test_render_first_page_with_button() {
        let state = RenderState::from_page(Page::new(
            vec![post("a", "T1")],
            Some("https://api/page2".to_string()),
        ));
        let html = render(&state, None);
        assert_eq!(html.matches("<h1>").count(), 1);
        assert!(html.contains("<h1>T1</h1>"));
        assert!(html.contains("01 Jan 2021"));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains("<title>Home | spacetraveling.</title>"));
        assert!(!html.contains("role=\"alert\""));
    }

    #[test]
    fn test_render_exhausted_hides_button() {
        let state = RenderState::from_page(Page::new(
            vec![post("a", "T1"), post("b", "T2")],
            None,
        ));
        let html = render(&state, None);
        assert_eq!(html.matches("<h1>").count(), 2);
        assert!(html.find("T1").unwrap() < html.find("T2").unwrap());
        assert!(!html.contains("Carregar mais posts"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn test_render_empty_cursor_hides_button() {
        let state = RenderState::from_page(Page::new(vec![post("a", "T1")], Some(String::new())));
        assert!(!render(&state, None).contains("<form"));
    }

    #[test]
    fn test_render_error_keeps_button() {
        let state = RenderState::from_page(Page::new(
            vec![post("a", "T1")],
            Some("https://api/page2".to_string()),
        ));
        let html = render(&state, Some("HTTP 500"));
        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("Carregar mais posts"));
    }

    #[test]
    fn test_render_escapes_content() {
        let state = RenderState::from_page(Page::new(
            vec![post("a", "<script>alert(1)</script>")],
            None,
        ));
        let html = render(&state, None);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_post_without_uid_is_not_linked() {
        let mut orphan = post("x", "Orphan");
        orphan.uid = None;
        let state = RenderState::from_page(Page::new(vec![orphan], None));
        let html = render(&state, None);
        assert!(html.contains("<h1>Orphan</h1>"));
        assert!(!html.contains("<a class=\"post\""));
    }
}

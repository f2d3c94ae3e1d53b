//! Generator module - renders the listing page to static files

use std::fs;
use std::io;

use walkdir::WalkDir;

use crate::content::Page;
use crate::error::Result;
use crate::feed::RenderState;
use crate::i18n::I18n;
use crate::templates::{ListingPage, TemplateRenderer, EMBEDDED_ASSETS};
use crate::Blog;

/// File holding the initial page, the listing's serialized props
pub const PROPS_FILE: &str = "posts.json";

/// Static site generator using the embedded templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    i18n: I18n,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let i18n = blog.i18n()?;

        Ok(Self {
            blog: blog.clone(),
            renderer,
            i18n,
        })
    }

    /// Render the listing page for a snapshot
    pub fn render_listing(&self, state: &RenderState, error: Option<&str>) -> Result<String> {
        ListingPage {
            config: &self.blog.config,
            i18n: &self.i18n,
            state,
            error,
        }
        .render(&self.renderer)
    }

    /// Write the site for the initial page
    pub fn generate(&self, page: &Page) -> Result<()> {
        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir)?;

        // Embedded assets first so files from the static dir can replace them
        for (name, content) in EMBEDDED_ASSETS {
            fs::write(public_dir.join(name), content)?;
        }
        self.copy_static_assets()?;

        let state = RenderState::from_page(page.clone());
        let html = self.render_listing(&state, None)?;
        fs::write(public_dir.join("index.html"), html)?;
        tracing::debug!("Generated: index.html");

        let props = serde_json::to_string_pretty(page)?;
        fs::write(public_dir.join(PROPS_FILE), props)?;
        tracing::debug!("Generated: {}", PROPS_FILE);

        Ok(())
    }

    /// Copy user assets (logo, favicon, ...) into the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path
                .strip_prefix(static_dir)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            let dest = self.blog.public_dir.join(relative);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}

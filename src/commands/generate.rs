//! Generate static files

use anyhow::Result;

use crate::content::ContentLoader;
use crate::generator::Generator;
use crate::Blog;

/// Fetch the first page of posts and write the site
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let client = blog.client()?;
    let page = ContentLoader::new(&client).load_first_page().await?;

    let generator = Generator::new(blog)?;
    generator.generate(&page)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts into {:?} in {:.2}s",
        page.results.len(),
        blog.public_dir,
        duration.as_secs_f64()
    );

    Ok(())
}

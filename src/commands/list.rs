//! List posts from the content API

use anyhow::Result;

use crate::content::{ContentLoader, Post};
use crate::feed::Feed;
use crate::helpers::Helpers;
use crate::Blog;

/// Print the first page, or every page when `all` is set
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let client = blog.client()?;
    let page = ContentLoader::new(&client).load_first_page().await?;

    let feed = Feed::new(client, page);
    if all {
        let mut updates = feed.subscribe();
        let progress = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let len = updates.borrow_and_update().len();
                println!("  ... {} posts", len);
            }
        });
        let loaded = feed.load_all().await;
        progress.abort();
        let pages = loaded?;
        tracing::info!("Followed {} more pages", pages);
    }

    let state = feed.snapshot();
    let helpers = Helpers::new(blog.config.clone());
    let i18n = blog.i18n()?;
    println!("{} ({}):", i18n.get("home"), state.len());
    for post in state.posts() {
        println!("{}", format_line(&helpers, post)?);
    }
    if let Some(cursor) = state.cursor() {
        println!("{}: {}", i18n.get("load_more"), cursor);
    }

    Ok(())
}

fn format_line(helpers: &Helpers, post: &Post) -> Result<String> {
    Ok(format!(
        "  {} - {} by {} [{}]",
        helpers.post_date(post)?,
        post.data.title,
        post.data.author,
        post.uid.as_deref().unwrap_or("-")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_format_line() {
        let helpers = Helpers::new(SiteConfig::default());
        let post = Post::new("a", Some("2021-01-01"), "T1", "S1", "A1");
        assert_eq!(
            format_line(&helpers, &post).unwrap(),
            "  01 Jan 2021 - T1 by A1 [a]"
        );

        let mut orphan = post.clone();
        orphan.uid = None;
        orphan.first_publication_date = None;
        assert_eq!(format_line(&helpers, &orphan).unwrap(), "   - T1 by A1 [-]");
    }

    #[tokio::test]
    async fn test_list_all_follows_cursor() {
        let server = MockServer::start().await;
        let page2 = format!("{}/api/v2/documents/search?page=2", server.uri());
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "refs": [{"id": "master", "ref": "r1", "isMasterRef": true}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"uid": "b", "data": {"title": "T2"}}],
                "next_page": null
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("ref", "r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"uid": "a", "data": {"title": "T1"}}],
                "next_page": page2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        blog.config.api.endpoint = Some(format!("{}/api/v2", server.uri()));

        run(&blog, true).await.unwrap();
    }
}

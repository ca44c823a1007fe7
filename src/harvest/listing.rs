//! Listing page harvesting

use crate::harvest::error::HarvestError;
use crate::harvest::extraction::{CompiledSelectors, extract_links};
use crate::http::HttpClient;
use tracing::{info, instrument};

/// Fetch the listing page and return its detail links in document order
#[instrument(skip(client, selectors))]
pub async fn harvest_listing(
    client: &HttpClient,
    entry_url: &str,
    selectors: &CompiledSelectors,
) -> Result<Vec<String>, HarvestError> {
    let page = client.get(entry_url).await?.ensure_ok_for(entry_url)?;
    let links = extract_links(&page.body, selectors);

    info!("Found {} detail links on {}", links.len(), entry_url);
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use mockito::Server;

    #[tokio::test]
    async fn test_harvest_listing() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/shirts.php")
            .with_status(200)
            .with_body(
                r#"<ul class="products">
                     <li><a href="shirt.php?id=101">one</a></li>
                     <li><a href="shirt.php?id=102">two</a></li>
                   </ul>"#,
            )
            .create_async()
            .await;

        let selectors = CompiledSelectors::compile(&SelectorConfig::default()).unwrap();
        let links = harvest_listing(
            &HttpClient::default(),
            &format!("{}/shirts.php", server.url()),
            &selectors,
        )
        .await
        .unwrap();

        assert_eq!(links, vec!["shirt.php?id=101", "shirt.php?id=102"]);
    }

    #[tokio::test]
    async fn test_listing_404_is_a_status_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/shirts.php")
            .with_status(404)
            .create_async()
            .await;

        let selectors = CompiledSelectors::compile(&SelectorConfig::default()).unwrap();
        let err = harvest_listing(
            &HttpClient::default(),
            &format!("{}/shirts.php", server.url()),
            &selectors,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Not Found (404)"));
    }

    #[tokio::test]
    async fn test_redirected_listing_error_names_entry_url() {
        let mut server = Server::new_async().await;
        let _moved = server
            .mock("GET", "/shirts.php")
            .with_status(301)
            .with_header("location", "/catalog/shirts.php")
            .create_async()
            .await;
        let _gone = server
            .mock("GET", "/catalog/shirts.php")
            .with_status(404)
            .create_async()
            .await;

        let entry_url = format!("{}/shirts.php", server.url());
        let selectors = CompiledSelectors::compile(&SelectorConfig::default()).unwrap();
        let err = harvest_listing(&HttpClient::default(), &entry_url, &selectors)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("Error connecting to {} Not Found (404)", entry_url)
        );
    }
}

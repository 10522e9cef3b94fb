use log::info;
use reqwest::Client;

use super::{error::CatalogError, models::lecture_model::Lecture};

/// A trait, necessary for every entity that will be used for getting the lecture catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogGetter {
    async fn get_lectures(&self, url: &str) -> Result<Vec<Lecture>, CatalogError>;
}

/// Allows to use Client for getting the catalog from where it is published.
impl CatalogGetter for Client {
    async fn get_lectures(&self, url: &str) -> Result<Vec<Lecture>, CatalogError> {
        info!("Getting lectures from {}", url);
        let response = self
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| CatalogError::from_reqwest(url, err))?;
        let lectures: Vec<Lecture> = response
            .json()
            .await
            .map_err(|err| CatalogError::from_reqwest(url, err))?;
        info!("Received {} lectures from {}", lectures.len(), url);
        Ok(lectures)
    }
}

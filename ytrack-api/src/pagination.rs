//! Lazy `$skip`/`$top` pagination over list endpoints.

use futures::{Stream, TryStreamExt, future, stream};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{ApiRequest, YouTrackClient};
use crate::consts::PAGE_SIZE;
use crate::error::{Result, YouTrackError};

/// Pages through a list endpoint one request at a time.
///
/// Pages are fetched sequentially and only when the consumer asks for more
/// items. The sequence ends after the first page holding fewer than
/// [`PAGE_SIZE`] items.
#[derive(Clone)]
pub(crate) struct Paginator<'a> {
  client: &'a YouTrackClient,
  path: String,
  query: Vec<(String, String)>,
  tolerate_invalid_query: bool,
}

impl<'a> Paginator<'a> {
  pub(crate) fn new(client: &'a YouTrackClient, path: impl Into<String>) -> Self {
    Self {
      client,
      path: path.into(),
      query: Vec::new(),
      tolerate_invalid_query: false,
    }
  }

  pub(crate) fn query(mut self, key: &str, value: impl Into<String>) -> Self {
    self.query.push((key.to_string(), value.into()));
    self
  }

  /// End the sequence quietly when YouTrack rejects the search query
  pub(crate) fn tolerate_invalid_query(mut self) -> Self {
    self.tolerate_invalid_query = true;
    self
  }

  /// Stream every item of every page in server order
  pub(crate) fn items<T>(self) -> impl Stream<Item = Result<T>> + 'a
  where
    T: DeserializeOwned + 'a,
  {
    stream::try_unfold((self, Some(0usize)), |(pager, skip)| async move {
      let Some(skip) = skip else {
        return Ok::<_, YouTrackError>(None);
      };

      let page: Vec<T> = pager.fetch_page(skip).await?;
      let next = (page.len() >= PAGE_SIZE).then_some(skip + page.len());
      Ok(Some((page, (pager, next))))
    })
    .map_ok(|page| stream::iter(page.into_iter().map(Ok)))
    .try_flatten()
  }

  /// Stream items decoded as `R` and converted with `convert`, dropping the
  /// ones it rejects
  pub(crate) fn decode<R, T, F>(self, mut convert: F) -> impl Stream<Item = Result<T>> + 'a
  where
    R: DeserializeOwned + 'a,
    T: 'a,
    F: FnMut(R) -> Option<T> + 'a,
  {
    self
      .items::<R>()
      .try_filter_map(move |raw| future::ready(Ok(convert(raw))))
  }

  async fn fetch_page<T: DeserializeOwned>(&self, skip: usize) -> Result<Vec<T>> {
    let mut request = ApiRequest::get(self.path.as_str());
    for (key, value) in &self.query {
      request = request.query(key, value.as_str());
    }
    let request = request
      .query("$skip", skip.to_string())
      .query("$top", PAGE_SIZE.to_string());

    match self.client.send_json(&request).await {
      Err(YouTrackError::InvalidQuery { message }) if self.tolerate_invalid_query => {
        debug!("YouTrack rejected the query for {} ({message}); treating as no results", self.path);
        Ok(Vec::new())
      }
      result => result,
    }
  }
}

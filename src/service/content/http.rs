use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use super::{parse_calendar, render_day, Comic, ContentFetcher, FetchError};
use crate::config::ContentConfig;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JokePayload {
    Single { joke: String },
    Twopart { setup: String, delivery: String },
}

#[derive(Debug, Deserialize)]
struct ComicInfo {
    num: u32,
    title: String,
    img: String,
}

const COMIC_ATTEMPTS: usize = 3;

pub struct HttpContentFetcher {
    client: Client,
    config: ContentConfig,
}

impl HttpContentFetcher {
    pub fn new(client: Client, config: ContentConfig) -> Self {
        info!("Initializing HttpContentFetcher...");
        Self { client, config }
    }

    async fn comic_info(&self, url: Url) -> Result<Option<ComicInfo>, FetchError> {
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.json::<ComicInfo>().await?))
    }

    fn comic_url(&self, num: Option<u32>) -> Result<Url, FetchError> {
        let base = self.config.xkcd_url.trim_end_matches('/');
        let url = match num {
            Some(num) => format!("{}/{}/info.0.json", base, num),
            None => format!("{}/info.0.json", base),
        };
        Ok(Url::parse(&url)?)
    }

    fn calendar_url(&self, calendar_id: &str) -> Result<Url, FetchError> {
        let encoded: String = url::form_urlencoded::byte_serialize(calendar_id.as_bytes()).collect();
        Ok(Url::parse(
            &self.config.calendar_url_template.replace("{calendar_id}", &encoded),
        )?)
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn joke(&self) -> Result<String, FetchError> {
        let url = Url::parse(&self.config.joke_url)?;
        let payload = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<JokePayload>()
            .await?;

        Ok(match payload {
            JokePayload::Single { joke } => joke,
            JokePayload::Twopart { setup, delivery } => format!("{}\n\n{}", setup, delivery),
        })
    }

    async fn comic(&self) -> Result<Comic, FetchError> {
        let latest = self
            .comic_info(self.comic_url(None)?)
            .await?
            .ok_or_else(|| FetchError::Parse("latest comic not found".to_string()))?;

        for _ in 0..COMIC_ATTEMPTS {
            let num = rand::thread_rng().gen_range(1..=latest.num.max(1));
            match self.comic_info(self.comic_url(Some(num))?).await? {
                Some(info) => {
                    return Ok(Comic {
                        num: info.num,
                        title: info.title,
                        image_url: info.img,
                    })
                }
                None => debug!("Comic {} does not exist, drawing again", num),
            }
        }

        Ok(Comic {
            num: latest.num,
            title: latest.title,
            image_url: latest.img,
        })
    }

    async fn schedule(&self, calendar_id: &str) -> Result<String, FetchError> {
        let offset = FixedOffset::east_opt(self.config.schedule_utc_offset_hours * 3600)
            .ok_or_else(|| FetchError::Parse("invalid schedule offset".to_string()))?;

        let body = self
            .client
            .get(self.calendar_url(calendar_id)?)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let events = parse_calendar(&body, offset)?;
        let today = Utc::now().with_timezone(&offset).date_naive();

        Ok(render_day(&events, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn fetcher() -> HttpContentFetcher {
        HttpContentFetcher::new(Client::new(), AppConfig::new_test_config().content)
    }

    #[test]
    fn test_calendar_id_is_encoded_into_template() {
        let url = fetcher().calendar_url("team@group.calendar.google.com").unwrap();

        assert_eq!(
            url.as_str(),
            "https://calendar.google.com/calendar/ical/team%40group.calendar.google.com/public/basic.ics"
        );
    }

    #[test]
    fn test_comic_urls() {
        let fetcher = fetcher();

        assert_eq!(fetcher.comic_url(None).unwrap().as_str(), "https://xkcd.com/info.0.json");
        assert_eq!(
            fetcher.comic_url(Some(353)).unwrap().as_str(),
            "https://xkcd.com/353/info.0.json"
        );
    }

    #[test]
    fn test_joke_payload_shapes() {
        let single: JokePayload =
            serde_json::from_str(r#"{"error":false,"type":"single","joke":"A joke","id":1}"#).unwrap();
        assert!(matches!(single, JokePayload::Single { joke } if joke == "A joke"));

        let twopart: JokePayload =
            serde_json::from_str(r#"{"type":"twopart","setup":"Why?","delivery":"Because."}"#).unwrap();
        assert!(matches!(twopart, JokePayload::Twopart { .. }));
    }
}

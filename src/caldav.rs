use chrono::{DateTime, Utc};
use reqwest::{header, Method, Url};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::event::CalendarEvent;

pub mod xml;

const XML: &str = "application/xml; charset=utf-8";
const ICALENDAR: &str = "text/calendar; charset=utf-8";

pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// What happened during a sync
#[derive(Debug)]
pub struct Report {
    /// Collection receiving the events
    pub calendar: Url,
    /// True when the collection had to be created
    pub created: bool,
    /// Number of events sent
    pub pushed: usize,
}

/// Client of a CalDAV server.
///
/// Requests are sent one after the other, without timeout.
pub struct Client {
    http: reqwest::Client,
    url: Url,
    credentials: Credentials,
}

impl Client {
    pub fn new(url: &str, credentials: Credentials, user_agent: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::CalDav(format!("invalid URL '{url}': {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            url,
            credentials,
        })
    }

    /// Send a request and return the body of a successful answer
    async fn send(
        &self,
        method: Method,
        url: &Url,
        depth: Option<&str>,
        content_type: &str,
        body: String,
    ) -> Result<String> {
        let transport = |source: reqwest::Error| Error::Transport {
            url: url.to_string(),
            source,
        };

        debug!("{method} {url}");
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(header::CONTENT_TYPE, content_type)
            .body(body);
        if let Some(depth) = depth {
            request = request.header("Depth", depth);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(Error::CalDav(format!("{method} {url} answered {status}")));
        }

        Ok(text)
    }

    async fn propfind(&self, url: &Url, depth: &str, body: &str) -> Result<String> {
        self.send(method("PROPFIND")?, url, Some(depth), XML, body.to_owned())
            .await
    }

    /// Find the calendar home of the user and the calendars in it
    pub async fn calendars(&self) -> Result<(Url, Vec<Url>)> {
        let answer = self
            .propfind(&self.url, "0", xml::PRINCIPAL_REQUEST)
            .await?;
        let principal = match xml::principal(&answer).map_err(invalid_answer)? {
            Some(href) => collection_url(&self.url, &href)?,
            None => self.url.clone(),
        };

        let answer = self
            .propfind(&principal, "0", xml::HOME_SET_REQUEST)
            .await?;
        let home = match xml::home_set(&answer).map_err(invalid_answer)? {
            Some(href) => collection_url(&principal, &href)?,
            None => principal,
        };

        let answer = self.propfind(&home, "1", xml::CALENDARS_REQUEST).await?;
        let calendars = xml::calendars(&answer)
            .map_err(invalid_answer)?
            .iter()
            .inspect(|collection| {
                debug!(
                    "Found calendar {} ({})",
                    collection.href,
                    collection.name.as_deref().unwrap_or("unnamed")
                );
            })
            .map(|collection| collection_url(&home, &collection.href))
            .collect::<Result<Vec<_>>>()?;

        Ok((home, calendars))
    }

    /// Create a calendar in the home of the user
    pub async fn make_calendar(&self, home: &Url, name: &str) -> Result<Url> {
        let url = collection_url(home, &format!("{}/", Uuid::new_v4()))?;

        self.send(
            method("MKCALENDAR")?,
            &url,
            None,
            XML,
            xml::mkcalendar_request(name),
        )
        .await?;

        Ok(url)
    }

    /// Upload an event as a calendar of its own
    pub async fn put_event(
        &self,
        calendar: &Url,
        event: &CalendarEvent,
        stamp: DateTime<Utc>,
    ) -> Result<()> {
        let url = event_url(calendar, &event.uid)?;
        let body = crate::ics::calendar(std::slice::from_ref(event), stamp);

        self.send(Method::PUT, &url, None, ICALENDAR, body).await?;

        Ok(())
    }
}

/// Push every event in the first calendar of the user, creating one when
/// there is none. Nothing is done about events pushed by previous runs.
pub async fn sync(
    client: &Client,
    events: &[CalendarEvent],
    calendar_name: &str,
    stamp: DateTime<Utc>,
) -> Result<Report> {
    let (home, calendars) = client.calendars().await?;

    let (calendar, created) = match calendars.into_iter().next() {
        Some(calendar) => (calendar, false),
        None => (client.make_calendar(&home, calendar_name).await?, true),
    };

    for event in events {
        client.put_event(&calendar, event, stamp).await?;
    }

    Ok(Report {
        calendar,
        created,
        pushed: events.len(),
    })
}

fn method(name: &str) -> Result<Method> {
    Method::from_bytes(name.as_bytes()).map_err(|e| Error::CalDav(format!("{name}: {e}")))
}

fn invalid_answer(e: roxmltree::Error) -> Error {
    Error::CalDav(format!("invalid answer: {e}"))
}

/// Resolve an href as a collection, which always ends with a slash
fn collection_url(base: &Url, href: &str) -> Result<Url> {
    let mut url = base
        .join(href)
        .map_err(|e| Error::CalDav(format!("invalid href '{href}': {e}")))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Location of an event inside a calendar
fn event_url(calendar: &Url, uid: &str) -> Result<Url> {
    let mut url = calendar.clone();
    url.path_segments_mut()
        .map_err(|()| Error::CalDav(format!("{calendar} can't hold events")))?
        .pop_if_empty()
        .push(&format!("{uid}.ics"));

    Ok(url)
}

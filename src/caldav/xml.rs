//! Bodies sent to the server and readers for its multistatus answers.

use roxmltree::Document;

const DAV: &str = "DAV:";
const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";

pub const PRINCIPAL_REQUEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop><d:current-user-principal/></d:prop>
</d:propfind>"#;

pub const HOME_SET_REQUEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop><c:calendar-home-set/></d:prop>
</d:propfind>"#;

pub const CALENDARS_REQUEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop><d:resourcetype/><d:displayname/></d:prop>
</d:propfind>"#;

/// Collection found on the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    pub href: String,
    pub name: Option<String>,
}

/// Body of a MKCALENDAR request
pub fn mkcalendar_request(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<c:mkcalendar xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:set><d:prop><d:displayname>{}</d:displayname></d:prop></d:set>
</c:mkcalendar>"#,
        escape(name)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// First href inside a property
fn prop_href(xml: &str, namespace: &str, name: &str) -> Result<Option<String>, roxmltree::Error> {
    let document = Document::parse(xml)?;

    let href = document
        .descendants()
        .filter(|node| node.has_tag_name((namespace, name)))
        .flat_map(|node| node.descendants())
        .find(|node| node.has_tag_name((DAV, "href")))
        .and_then(|node| node.text())
        .map(|text| text.trim().to_owned());

    Ok(href)
}

pub fn principal(xml: &str) -> Result<Option<String>, roxmltree::Error> {
    prop_href(xml, DAV, "current-user-principal")
}

pub fn home_set(xml: &str) -> Result<Option<String>, roxmltree::Error> {
    prop_href(xml, CALDAV, "calendar-home-set")
}

/// Responses whose resource type is a calendar
pub fn calendars(xml: &str) -> Result<Vec<Collection>, roxmltree::Error> {
    let document = Document::parse(xml)?;

    let collections = document
        .descendants()
        .filter(|node| node.has_tag_name((DAV, "response")))
        .filter(|response| {
            response
                .descendants()
                .filter(|node| node.has_tag_name((DAV, "resourcetype")))
                .any(|kind| kind.children().any(|node| node.has_tag_name((CALDAV, "calendar"))))
        })
        .filter_map(|response| {
            let href = response
                .children()
                .find(|node| node.has_tag_name((DAV, "href")))?
                .text()?
                .trim()
                .to_owned();
            let name = response
                .descendants()
                .find(|node| node.has_tag_name((DAV, "displayname")))
                .and_then(|node| node.text())
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned);

            Some(Collection { href, name })
        })
        .collect();

    Ok(collections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINCIPAL: &str = r#"<?xml version="1.0"?>
<multistatus xmlns="DAV:">
  <response>
    <href>/</href>
    <propstat>
      <prop><current-user-principal><href>/alice/</href></current-user-principal></prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
  </response>
</multistatus>"#;

    const HOME_SET: &str = r#"<?xml version="1.0"?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/alice/</D:href>
    <D:propstat>
      <D:prop><C:calendar-home-set><D:href>/alice/calendars/</D:href></C:calendar-home-set></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    const LISTING: &str = r#"<?xml version="1.0"?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav" xmlns:CS="http://calendarserver.org/ns/">
  <D:response>
    <D:href>/alice/calendars/</D:href>
    <D:propstat>
      <D:prop><D:resourcetype><D:collection/></D:resourcetype><D:displayname/></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/alice/calendars/work/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <D:displayname>Work</D:displayname>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/alice/calendars/contacts/</D:href>
    <D:propstat>
      <D:prop><D:resourcetype><D:collection/><CS:addressbook/></D:resourcetype></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/alice/calendars/uni/</D:href>
    <D:propstat>
      <D:prop><D:resourcetype><D:collection/><C:calendar/></D:resourcetype></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    #[test]
    fn principal_href() {
        assert_eq!(principal(PRINCIPAL).unwrap().as_deref(), Some("/alice/"));
        assert_eq!(principal(HOME_SET).unwrap(), None);
    }

    #[test]
    fn home_set_href() {
        assert_eq!(
            home_set(HOME_SET).unwrap().as_deref(),
            Some("/alice/calendars/")
        );
    }

    #[test]
    fn only_calendars_are_listed() {
        assert_eq!(
            calendars(LISTING).unwrap(),
            vec![
                Collection {
                    href: "/alice/calendars/work/".to_owned(),
                    name: Some("Work".to_owned()),
                },
                Collection {
                    href: "/alice/calendars/uni/".to_owned(),
                    name: None,
                },
            ]
        );
    }

    #[test]
    fn invalid_answer() {
        assert!(calendars("<not xml").is_err());
    }

    #[test]
    fn calendar_name_is_escaped() {
        let body = mkcalendar_request("TU <Schedule> & more");

        assert!(body.contains("<d:displayname>TU &lt;Schedule&gt; &amp; more</d:displayname>"));
        assert!(Document::parse(&body).is_ok());
    }
}

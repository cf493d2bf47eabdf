use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use reqwest::blocking;

use crate::models::{Activity, RegState};
use crate::scraping::{agenda, detail, my_events};

const BASE_URL: &str = "https://mensa-idf.org/index.php";
// The landing page greets the member by name once the session is open.
const LOGIN_MARKER: &str = "Bonjour";
// Wire code of the add-guest action in the registration form.
const ACTION_ADD_GUEST: &str = "9";

/// Blocking client for the membership site. The session cookie lives in the
/// underlying HTTP client; authenticated calls additionally take a
/// [`Session`] so the member id travels with them explicitly instead of
/// through process-wide state.
pub struct Client {
    http: blocking::Client,
    base_url: String,
}

/// Proof of a successful login, carrying the member id the site expects
/// back in its registration forms.
pub struct Session {
    member_id: String,
}

impl Session {
    pub fn member_id(&self) -> &str {
        &self.member_id
    }
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let http = blocking::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(20))
            .user_agent("MensaScrape/0.1")
            .build()
            .context("unable to build http client")?;
        Ok(Client {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn login(&self, member_id: &str, password: &str) -> Result<Session> {
        let url = format!("{}?action=connection", self.base_url);
        let body = self.post_form(&url, &[("id", member_id), ("pw", password)])?;
        if !body.contains(LOGIN_MARKER) {
            bail!("login rejected for member {member_id}");
        }
        Ok(Session {
            member_id: member_id.to_string(),
        })
    }

    /// Ends the session server-side. The session value is consumed; the
    /// cookie store keeps nothing usable afterwards.
    pub fn logout(&self, _session: Session) -> Result<()> {
        let url = format!("{}?action=deconnection", self.base_url);
        self.get(&url).map(|_| ())
    }

    /// Fetch one month of the agenda. `month` and `year` drive both the
    /// page request and the display dates composed by the extractor.
    pub fn fetch_agenda(&self, _session: &Session, month: u32, year: i32) -> Result<Vec<Activity>> {
        let url = format!(
            "{}?action=iAgenda_iagenda&mois={month}&annee={year}",
            self.base_url
        );
        let html = self.get(&url)?;
        Ok(agenda::parse_document(&html, month, year))
    }

    pub fn fetch_activity(&self, _session: &Session, act_id: &str) -> Result<Activity> {
        let url = format!("{}?action=iAgenda_iactivite&id={act_id}", self.base_url);
        let html = self.get(&url)?;
        detail::parse_document(&html, act_id)
            .with_context(|| format!("unrecognized page for activity {act_id}"))
    }

    pub fn fetch_my_events(&self, _session: &Session) -> Result<Vec<Activity>> {
        let url = format!("{}?action=iAgenda_ievenements", self.base_url);
        let html = self.get(&url)?;
        Ok(my_events::parse_document(&html))
    }

    /// Submit the registration action for the member's current state and
    /// report the state the response leaves the member in. The server picks
    /// the transition (enroll, withdraw, join or leave the waiting list)
    /// from the submitted `d` code.
    pub fn toggle_registration(
        &self,
        session: &Session,
        act_id: &str,
        current: RegState,
    ) -> Result<RegState> {
        let url = format!("{}?action=iAgenda_iactivite", self.base_url);
        let code = current.code().to_string();
        let body = self.post_form(
            &url,
            &[
                ("action", "iAgenda_iactivite"),
                ("membre", session.member_id()),
                ("id", act_id),
                ("d", &code),
            ],
        )?;
        Ok(detail::registration_state(&body))
    }

    pub fn add_guest(
        &self,
        session: &Session,
        act_id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<()> {
        let url = format!("{}?action=iAgenda_iactivite", self.base_url);
        self.post_form(
            &url,
            &[
                ("action", "iAgenda_iactivite"),
                ("d", ACTION_ADD_GUEST),
                ("membre", session.member_id()),
                ("id", act_id),
                ("nom_invite", last_name),
                ("prenom_invite", first_name),
            ],
        )?;
        Ok(())
    }

    fn get(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .with_context(|| format!("request failed for {url}"))?;
        let response = response
            .error_for_status()
            .with_context(|| format!("non-success status for {url}"))?;
        response
            .text()
            .with_context(|| format!("unable to read response body for {url}"))
    }

    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<String> {
        let response = self
            .http
            .post(url)
            .form(fields)
            .send()
            .with_context(|| format!("request failed for {url}"))?;
        let response = response
            .error_for_status()
            .with_context(|| format!("non-success status for {url}"))?;
        response
            .text()
            .with_context(|| format!("unable to read response body for {url}"))
    }
}

/// Initial navigation context for the agenda: today's month and year.
pub fn current_month_year() -> (u32, i32) {
    let now = Local::now();
    (now.month(), now.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_month_is_in_range() {
        let (month, year) = current_month_year();
        assert!((1..=12).contains(&month));
        assert!(year >= 2025);
    }

    #[test]
    fn client_builds_with_custom_base_url() {
        let client = Client::with_base_url("http://localhost:8080/index.php").expect("client");
        assert_eq!(client.base_url, "http://localhost:8080/index.php");
    }
}
